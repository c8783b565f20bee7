//! # validate 子命令 CLI 定义
//!
//! 对单个材料或整个集合执行全部检验。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/validate.rs`

use clap::Args;
use std::path::PathBuf;

/// validate 子命令参数
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory containing per-material .res structure files
    #[arg(long)]
    pub structures: PathBuf,

    /// Path to the audit database
    #[arg(long, env = "CRYSAUDIT_DB", default_value = "crysaudit.db")]
    pub db: PathBuf,

    /// Validate a single material instead of the whole collection
    #[arg(long)]
    pub material: Option<String>,

    /// Recompute even when results already exist
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Stop after the first N materials (batch mode only)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Resolve method disagreements toward the bond-geometry result
    #[arg(long, default_value_t = false)]
    pub prefer_bond_geometry: bool,
}
