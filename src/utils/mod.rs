//! # 通用工具模块
//!
//! ## 依赖关系
//! - 被 `pipeline.rs`, `commands/` 使用
//! - 子模块: output, progress

pub mod output;
pub mod progress;
