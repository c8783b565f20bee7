//! # 数据模型模块
//!
//! ## 依赖关系
//! - 被 `parsers/`, `oxi/`, `validators/`, `pipeline.rs`, `db/` 使用
//! - 子模块: material, structure

pub mod material;
pub mod structure;

pub use material::Material;
pub use structure::{Crystal, Lattice, Site};
