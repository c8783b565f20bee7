//! # 审计管线编排
//!
//! 单材料流程（validate_material）：
//!   1. 读取材料元数据与结构文件
//!   2. 取或算氧化态共识（算一次立即落库，所有检验共用）
//!   3. 断点过滤：已有结果的 (材料, 检验) 不重算（除非 force）
//!   4. 仅当 Shannon / Pauling 待执行时构建配位缓存
//!   5. 逐检验执行，结果在单个事务内写入，材料末尾提交
//!
//! 批处理（run_all）按材料 ID 字典序顺序执行，单材料失败
//! 只计数不中断。每材料一次提交意味着任意时刻中断后重跑
//! 自动从断点继续，已完成的材料秒级跳过。
//!
//! ## 依赖关系
//! - 被 `commands/validate.rs` 使用
//! - 使用 `db/`, `oxi/`, `validators/`, `neighbors.rs`, `parsers/`,
//!   `utils/progress.rs`

use crate::config::Thresholds;
use crate::db::AuditStore;
use crate::error::{AuditError, Result};
use crate::neighbors::NeighborCache;
use crate::oxi::{self, OxidationAssignment};
use crate::parsers::parse_res_file;
use crate::utils::progress::create_progress_bar;
use crate::validators::{
    all_validators, ValidationContext, ValidationResult, CACHE_DEPENDENT_CHECKS,
};

use std::path::Path;

/// 单材料的校验产出
#[derive(Debug)]
pub struct MaterialOutcome {
    pub material_id: String,
    pub oxi: OxidationAssignment,
    /// 本次新计算的结果（断点跳过的不在内）
    pub results: Vec<ValidationResult>,
    /// 断点跳过的检验数
    pub n_checkpointed: usize,
}

/// 批处理汇总
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub n_total: usize,
    pub n_success: usize,
    pub n_error: usize,
}

/// 对单个材料执行全部检验
pub fn validate_material(
    store: &AuditStore,
    structures_dir: &Path,
    material_id: &str,
    thresholds: &Thresholds,
    force: bool,
) -> Result<MaterialOutcome> {
    let material = store
        .get_material(material_id)?
        .ok_or_else(|| AuditError::MaterialNotFound(material_id.to_string()))?;

    let structure_path = structures_dir.join(format!("{material_id}.res"));
    if !structure_path.exists() {
        return Err(AuditError::StructureNotFound {
            material_id: material_id.to_string(),
            path: structure_path.display().to_string(),
        });
    }
    let crystal = parse_res_file(&structure_path)?;

    // 氧化态共识：算一次立即提交，中断后重跑直接复用
    let assignment = match store.get_oxi_assignment(material_id)? {
        Some(existing) if !force => existing,
        _ => {
            let computed = oxi::assign(&crystal, thresholds);
            store.insert_oxi_assignment(material_id, &computed)?;
            computed
        }
    };

    let validators = all_validators();
    let mut pending = Vec::new();
    let mut n_checkpointed = 0usize;
    for v in validators {
        if !force && store.has_validation_result(material_id, v.check_name())? {
            n_checkpointed += 1;
        } else {
            pending.push(v);
        }
    }

    if pending.is_empty() {
        return Ok(MaterialOutcome {
            material_id: material_id.to_string(),
            oxi: assignment,
            results: Vec::new(),
            n_checkpointed,
        });
    }

    // 配位缓存开销大，只在依赖它的检验待执行时构建
    let needs_cache = pending
        .iter()
        .any(|v| CACHE_DEPENDENT_CHECKS.contains(&v.check_name()));
    let cache = if needs_cache {
        Some(NeighborCache::build(&crystal, thresholds))
    } else {
        None
    };

    let sg_stats = store.get_spacegroup_stats(&material.chemsys())?;

    let ctx = ValidationContext {
        crystal: &crystal,
        material: &material,
        oxi: Some(&assignment),
        neighbors: cache.as_ref(),
        sg_stats: &sg_stats,
        thresholds,
    };

    // 材料级事务：全部检验结果一次提交
    store.begin()?;
    let mut results = Vec::with_capacity(pending.len());
    for validator in &pending {
        let result = validator.validate(&ctx);
        if let Err(e) = store.insert_validation_result(material_id, &result) {
            let _ = store.rollback();
            return Err(e);
        }
        results.push(result);
    }
    store.commit()?;

    Ok(MaterialOutcome {
        material_id: material_id.to_string(),
        oxi: assignment,
        results,
        n_checkpointed,
    })
}

/// 对数据库内全部材料顺序执行检验
pub fn run_all(
    store: &AuditStore,
    structures_dir: &Path,
    thresholds: &Thresholds,
    force: bool,
) -> Result<BatchSummary> {
    let ids = store.material_ids()?;
    let mut summary = BatchSummary {
        n_total: ids.len(),
        ..Default::default()
    };

    let pb = create_progress_bar(ids.len() as u64, "Validating");
    for material_id in &ids {
        match validate_material(store, structures_dir, material_id, thresholds, force) {
            Ok(_) => summary.n_success += 1,
            Err(e) => {
                summary.n_error += 1;
                pb.println(format!("[ERR] {material_id}: {e}"));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(summary)
}
