//! # 化学数据模块
//!
//! 静态化学数据表：元素氧化态、Shannon 离子半径、键价参数。
//!
//! ## 依赖关系
//! - 被 `models/`, `oxi/`, `validators/` 使用
//! - 子模块: elements, shannon, bond_valence

pub mod bond_valence;
pub mod elements;
pub mod shannon;
