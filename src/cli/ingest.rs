//! # ingest 子命令 CLI 定义
//!
//! 摄入材料元数据 CSV，可选加载空间群统计 CSV。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/ingest.rs`

use clap::Args;
use std::path::PathBuf;

/// ingest 子命令参数
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Path to the materials summary CSV
    pub csv: PathBuf,

    /// Directory containing per-material .res structure files
    #[arg(long)]
    pub structures: PathBuf,

    /// Path to the audit database
    #[arg(long, env = "CRYSAUDIT_DB", default_value = "crysaudit.db")]
    pub db: PathBuf,

    /// Optional CSV with per-chemsys experimental space group statistics
    #[arg(long)]
    pub sg_stats: Option<PathBuf>,
}
