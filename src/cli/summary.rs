//! # summary 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/summary.rs`

use clap::Args;
use std::path::PathBuf;

/// summary 子命令参数
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Path to the audit database
    #[arg(long, env = "CRYSAUDIT_DB", default_value = "crysaudit.db")]
    pub db: PathBuf,
}
