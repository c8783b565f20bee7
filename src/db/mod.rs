//! # 持久化模块
//!
//! ## 依赖关系
//! - 被 `pipeline.rs`, `commands/`, `validators/space_group.rs` 使用
//! - 子模块: schema, store

pub mod schema;
pub mod store;

pub use store::{AuditStore, SpaceGroupStat, StoreStatistics, StoredValidation, SummaryRow};
