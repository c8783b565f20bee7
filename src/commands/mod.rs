//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `pipeline.rs`, `db/`, `models/`, `utils/`
//! - 子模块: ingest, validate, summary, show

pub mod ingest;
pub mod show;
pub mod summary;
pub mod validate;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Ingest(args) => ingest::execute(args),
        Commands::Validate(args) => validate::execute(args),
        Commands::Summary(args) => summary::execute(args),
        Commands::Show(args) => show::execute(args),
    }
}
