//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `ingest`: 摄入材料元数据 CSV（可附带空间群统计）
//! - `validate`: 对单个材料或整个集合执行检验
//! - `summary`: 逐检验聚合统计表
//! - `show`: 查看单个材料的赋值与检验结果
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: ingest, validate, summary, show

pub mod ingest;
pub mod show;
pub mod summary;
pub mod validate;

use clap::{Parser, Subcommand};

/// crysaudit - 晶体结构预测的化学规则审计工具
#[derive(Parser)]
#[command(name = "crysaudit")]
#[command(version)]
#[command(about = "Chemistry-rule audit pipeline for generated crystal structures", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Ingest material metadata CSV into the audit database
    Ingest(ingest::IngestArgs),

    /// Run validation checks (single material or whole collection)
    Validate(validate::ValidateArgs),

    /// Show per-check aggregate statistics
    Summary(summary::SummaryArgs),

    /// Show assignment and check results for one material
    Show(show::ShowArgs),
}
