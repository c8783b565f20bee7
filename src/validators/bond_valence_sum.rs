//! # 键价和与全局不稳定指数检验 (tier 2)
//!
//! 用 Brown–Altermatt 经验参数从实际键长计算每个位点的键价和
//! （BVS，有符号：阴离子为负），与指派的氧化态比较。
//! 全局不稳定指数 GII 为逐位点偏差的 RMS，score = GII。
//! GII 是连续指标，passed（GII < 参考阈值）只是参考值。
//!
//! 半独立：经验参数来自实验数据库，但作用于模型弛豫后的几何。
//!
//! ## 依赖关系
//! - 被 `validators/mod.rs` 注册
//! - 使用 `chem/bond_valence.rs`, `neighbors.rs`, `oxi/`

use crate::chem::bond_valence;
use crate::neighbors;
use crate::validators::{
    skip_no_oxi, Independence, ValidationContext, ValidationResult, Validator,
};

use serde_json::json;

const CHECK_NAME: &str = "bond_valence_sum";
const TIER: u8 = 2;
const INDEPENDENCE: Independence = Independence::SemiIndependent;

pub struct BondValenceSumValidator;

impl Validator for BondValenceSumValidator {
    fn check_name(&self) -> &'static str {
        CHECK_NAME
    }

    fn tier(&self) -> u8 {
        TIER
    }

    fn independence(&self) -> Independence {
        INDEPENDENCE
    }

    fn validate(&self, ctx: &ValidationContext) -> ValidationResult {
        let (assignment, states) = match ctx.oxi.and_then(|o| o.states.as_ref().map(|s| (o, s))) {
            Some(pair) => pair,
            None => return skip_no_oxi(CHECK_NAME, TIER, INDEPENDENCE),
        };

        let mut site_results: Vec<serde_json::Value> = Vec::new();
        let mut n_computed = 0usize;
        let mut sum_sq_dev = 0.0;
        let mut n_bad_sites = 0usize;

        for (i, site) in ctx
            .crystal
            .sites
            .iter()
            .enumerate()
            .take(ctx.thresholds.max_sites_scanned)
        {
            let el = site.element.as_str();
            let signed_oxi = match states.get(el) {
                Some(s) if *s != 0 => *s,
                _ => continue,
            };

            let shell = neighbors::neighbors_within(ctx.crystal, i, ctx.thresholds.bvs_cutoff);
            if shell.is_empty() {
                continue;
            }

            // 有符号 BVS：阳离子位点对阴离子近邻累加，阴离子位点反号
            let mut bvs = 0.0;
            let mut n_bonds = 0usize;
            for n in &shell {
                let n_oxi = match states.get(&n.element) {
                    Some(s) => *s,
                    None => continue,
                };
                let contribution = if signed_oxi > 0 && n_oxi < 0 {
                    bond_valence::r0(el, signed_oxi, &n.element)
                        .map(|r0| bond_valence::bond_valence(r0, n.distance))
                } else if signed_oxi < 0 && n_oxi > 0 {
                    bond_valence::r0(&n.element, n_oxi, el)
                        .map(|r0| -bond_valence::bond_valence(r0, n.distance))
                } else {
                    None // 同号对不参与键价
                };
                if let Some(v) = contribution {
                    bvs += v;
                    n_bonds += 1;
                }
            }
            if n_bonds == 0 {
                continue;
            }

            let deviation = (bvs - signed_oxi as f64).abs();
            let expected_abs = signed_oxi.abs() as f64;
            let relative_dev = deviation / expected_abs;
            sum_sq_dev += deviation * deviation;
            n_computed += 1;
            if relative_dev > ctx.thresholds.bvs_tolerance {
                n_bad_sites += 1;
            }

            site_results.push(json!({
                "site_index": i,
                "element": el,
                "oxi_state": signed_oxi,
                "bvs": round3(bvs),
                "expected": signed_oxi,
                "deviation": round3(deviation),
                "relative_deviation": round3(relative_dev),
            }));
        }

        if n_computed == 0 {
            return ValidationResult::skip_no_params(
                CHECK_NAME,
                TIER,
                INDEPENDENCE,
                "Could not compute BVS for any sites (missing BV parameters)",
                json!({ "oxi_state_confidence": assignment.confidence.as_str() }),
            );
        }

        let gii = (sum_sq_dev / n_computed as f64).sqrt();
        let passed = gii < ctx.thresholds.gii_threshold;

        site_results.sort_by(|a, b| {
            let da = a["deviation"].as_f64().unwrap_or(0.0);
            let db = b["deviation"].as_f64().unwrap_or(0.0);
            db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
        });
        site_results.truncate(5);

        ValidationResult::completed(
            CHECK_NAME,
            TIER,
            INDEPENDENCE,
            passed,
            assignment.confidence.weight(),
            round4(gii),
            json!({
                "global_instability_index": round4(gii),
                "gii_reference": ctx.thresholds.gii_threshold,
                "n_sites_analyzed": n_computed,
                "n_sites_total": ctx.crystal.n_sites(),
                "n_sites_above_tolerance": n_bad_sites,
                "bvs_tolerance": ctx.thresholds.bvs_tolerance,
                "worst_sites": site_results,
                "oxi_state_confidence": assignment.confidence.as_str(),
                "oxi_state_method": assignment.method_used,
            }),
        )
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}
