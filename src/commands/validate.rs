//! # validate 命令实现
//!
//! 单材料模式打印逐检验结果；批处理模式按 ID 字典序顺序执行，
//! 依赖数据库断点自动跳过已完成的 (材料, 检验)。
//!
//! ## 依赖关系
//! - 使用 `cli/validate.rs` 定义的参数
//! - 使用 `pipeline.rs`, `db/`, `config.rs`
//! - 使用 `utils/output.rs`

use crate::cli::validate::ValidateArgs;
use crate::config::{DisagreementPolicy, Thresholds};
use crate::db::AuditStore;
use crate::error::{AuditError, Result};
use crate::pipeline;
use crate::utils::output;
use crate::validators::Status;

/// 执行 validate 命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    if !args.structures.exists() {
        return Err(AuditError::DirectoryNotFound {
            path: args.structures.display().to_string(),
        });
    }

    let store = AuditStore::open(&args.db)?;
    let mut thresholds = Thresholds::default();
    if args.prefer_bond_geometry {
        thresholds.disagreement_policy = DisagreementPolicy::PreferBondGeometry;
    }

    match &args.material {
        Some(material_id) => {
            output::print_header(&format!("Validating {material_id}"));
            let outcome = pipeline::validate_material(
                &store,
                &args.structures,
                material_id,
                &thresholds,
                args.force,
            )?;

            output::print_info(&format!(
                "Oxidation states: {} (confidence: {})",
                outcome.oxi.method_used,
                outcome.oxi.confidence.as_str()
            ));
            if outcome.n_checkpointed > 0 {
                output::print_skip(&format!(
                    "{} checks already computed",
                    outcome.n_checkpointed
                ));
            }
            for r in &outcome.results {
                let line = match r.status {
                    Status::Completed => format!(
                        "{} (tier {}): score={} passed={}",
                        r.check_name,
                        r.tier,
                        r.score.map(|s| s.to_string()).unwrap_or_default(),
                        r.passed.map(|p| p.to_string()).unwrap_or_default()
                    ),
                    _ => format!("{} (tier {}): {}", r.check_name, r.tier, r.status.as_str()),
                };
                match r.status {
                    Status::Completed => output::print_success(&line),
                    Status::Error => output::print_error(&line),
                    _ => output::print_skip(&line),
                }
            }
            output::print_done("Material validated");
        }
        None => {
            output::print_header("Validating Collection");
            let n_materials = store.material_ids()?.len();
            output::print_info(&format!("{n_materials} materials in database"));

            let summary = match args.limit {
                Some(limit) => {
                    let ids = store.material_ids()?;
                    let mut summary = pipeline::BatchSummary {
                        n_total: ids.len().min(limit),
                        ..Default::default()
                    };
                    for material_id in ids.iter().take(limit) {
                        match pipeline::validate_material(
                            &store,
                            &args.structures,
                            material_id,
                            &thresholds,
                            args.force,
                        ) {
                            Ok(_) => summary.n_success += 1,
                            Err(e) => {
                                summary.n_error += 1;
                                output::print_error(&format!("{material_id}: {e}"));
                            }
                        }
                    }
                    summary
                }
                None => pipeline::run_all(&store, &args.structures, &thresholds, args.force)?,
            };

            output::print_done(&format!(
                "Pipeline complete: {} succeeded, {} errors",
                summary.n_success, summary.n_error
            ));
        }
    }

    Ok(())
}
