//! # summary 命令实现
//!
//! 从 v_audit_summary 视图渲染逐检验聚合表，并附数据库整体统计。
//!
//! ## 依赖关系
//! - 使用 `cli/summary.rs` 定义的参数
//! - 使用 `db/`, `utils/output.rs`
//! - 使用 `tabled`

use crate::cli::summary::SummaryArgs;
use crate::db::AuditStore;
use crate::error::Result;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 聚合表的一行
#[derive(Debug, Tabled)]
struct SummaryTableRow {
    #[tabled(rename = "Check")]
    check_name: String,
    #[tabled(rename = "Tier")]
    tier: i64,
    #[tabled(rename = "Total")]
    total: i64,
    #[tabled(rename = "Completed")]
    computed: i64,
    #[tabled(rename = "Passed")]
    passed: i64,
    #[tabled(rename = "Failed")]
    failed: i64,
    #[tabled(rename = "Skipped")]
    skipped: i64,
    #[tabled(rename = "Errors")]
    errors: i64,
}

/// 执行 summary 命令
pub fn execute(args: SummaryArgs) -> Result<()> {
    output::print_header("Audit Summary");

    let store = AuditStore::open(&args.db)?;

    let stats = store.statistics()?;
    output::print_info(&format!("Materials: {}", stats.total_materials));
    for (confidence, count) in &stats.oxi_confidence_counts {
        output::print_info(&format!("Oxidation confidence {confidence}: {count}"));
    }
    for (class, count) in &stats.compound_class_counts {
        output::print_info(&format!("Compound class {class}: {count}"));
    }

    let summary = store.audit_summary()?;
    if summary.is_empty() {
        output::print_warning("No validation results yet. Run `crysaudit validate` first.");
        return Ok(());
    }

    let rows: Vec<SummaryTableRow> = summary
        .iter()
        .map(|s| SummaryTableRow {
            check_name: s.check_name.clone(),
            tier: s.tier,
            total: s.total,
            computed: s.computed,
            passed: s.passed,
            failed: s.failed,
            skipped: s.skipped_no_params + s.skipped_na,
            errors: s.errors,
        })
        .collect();

    output::print_separator();
    let table = Table::new(&rows);
    println!("{table}");

    Ok(())
}
