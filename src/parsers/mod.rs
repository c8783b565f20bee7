//! # 结构文件解析模块
//!
//! ## 依赖关系
//! - 被 `pipeline.rs`, `commands/` 使用
//! - 子模块: res

pub mod res;

pub use res::{parse_res_content, parse_res_file};
