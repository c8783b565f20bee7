//! # show 命令实现
//!
//! 打印单个材料的元数据、氧化态共识与逐检验结果。
//!
//! ## 依赖关系
//! - 使用 `cli/show.rs` 定义的参数
//! - 使用 `db/`, `utils/output.rs`

use crate::cli::show::ShowArgs;
use crate::db::AuditStore;
use crate::error::{AuditError, Result};
use crate::utils::output;

/// 执行 show 命令
pub fn execute(args: ShowArgs) -> Result<()> {
    let store = AuditStore::open(&args.db)?;

    let material = store
        .get_material(&args.material_id)?
        .ok_or_else(|| AuditError::MaterialNotFound(args.material_id.clone()))?;

    output::print_header(&format!(
        "{} ({})",
        material.material_id, material.reduced_formula
    ));
    output::print_info(&format!("Chemical system: {}", material.chemsys()));
    output::print_info(&format!(
        "Oxide type: {} / {}",
        material.oxide_type, material.compound_class
    ));
    if let (Some(sg), Some(n)) = (&material.space_group, material.space_group_number) {
        output::print_info(&format!("Space group: {sg} (#{n})"));
    }
    output::print_info(&format!(
        "{} sites, volume {:.2} Å³, density {:.2} g/cm³",
        material.n_sites, material.volume, material.density
    ));

    match store.get_oxi_assignment(&args.material_id)? {
        Some(oxi) => {
            output::print_separator();
            output::print_info(&format!(
                "Oxidation states via {} (confidence: {})",
                oxi.method_used,
                oxi.confidence.as_str()
            ));
            if let Some(states) = &oxi.states {
                for (el, state) in states {
                    println!("    {el}: {state:+}");
                }
            }
            if oxi.has_mixed_valence {
                for mv in &oxi.mixed_valence_elements {
                    output::print_warning(&format!(
                        "Mixed valence: {} {:?}",
                        mv.element, mv.states
                    ));
                }
            }
        }
        None => output::print_warning("No oxidation state assignment recorded"),
    }

    let results = store.get_validation_results(&args.material_id)?;
    if results.is_empty() {
        output::print_warning("No validation results recorded");
        return Ok(());
    }

    output::print_separator();
    for r in &results {
        match r.status.as_str() {
            "completed" => {
                let line = format!(
                    "{} (tier {}): score={} passed={} confidence={:.1}",
                    r.check_name,
                    r.tier,
                    r.score.map(|s| s.to_string()).unwrap_or_default(),
                    r.passed.map(|p| p.to_string()).unwrap_or_default(),
                    r.confidence
                );
                if r.passed == Some(false) {
                    output::print_warning(&line);
                } else {
                    output::print_success(&line);
                }
            }
            "error" => output::print_error(&format!(
                "{}: {}",
                r.check_name,
                r.error_message.as_deref().unwrap_or("unknown error")
            )),
            status => output::print_skip(&format!(
                "{}: {} ({})",
                r.check_name,
                status,
                r.details["skip_reason"].as_str().unwrap_or("")
            )),
        }
    }

    Ok(())
}
