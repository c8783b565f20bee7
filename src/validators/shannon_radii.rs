//! # Shannon 半径键长检验 (tier 1)
//!
//! 逐键比较实际键长与 Shannon 离子半径之和的期望键长。
//! score = 违规键占比，违规占比 <= 20% 视为通过。
//! 配位数来自共享的 NeighborCache。
//!
//! ## 依赖关系
//! - 被 `validators/mod.rs` 注册
//! - 使用 `chem/shannon.rs`, `neighbors.rs`, `oxi/`

use crate::chem::shannon::{self, RadiusSource};
use crate::validators::{
    skip_no_oxi, Independence, ValidationContext, ValidationResult, Validator,
};

use serde_json::json;

const CHECK_NAME: &str = "shannon_radii";
const TIER: u8 = 1;
const INDEPENDENCE: Independence = Independence::FullyIndependent;

/// 违规键占比的通过上限
const MAX_VIOLATION_FRACTION: f64 = 0.2;

pub struct ShannonRadiiValidator;

impl Validator for ShannonRadiiValidator {
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

        let cache = match ctx.neighbors {
            Some(c) => c,
            None => {
                return ValidationResult::error(
                    CHECK_NAME,
                    TIER,
                    INDEPENDENCE,
                    "Coordination cache was not built".to_string(),
                    json!({ "oxi_state_confidence": assignment.confidence.as_str() }),
                )
            }
        };

        let tolerance = ctx.thresholds.shannon_tolerance;
        let mut n_checked = 0usize;
        let mut n_violations = 0usize;
        let mut n_fallback = 0usize;
        let mut violations: Vec<serde_json::Value> = Vec::new();
        let mut missing_params: Vec<String> = Vec::new();

        for (i, site) in ctx
            .crystal
            .sites
            .iter()
            .enumerate()
            .take(ctx.thresholds.max_sites_scanned)
        {
            let el_i = site.element.as_str();
            let oxi_i = match states.get(el_i) {
                Some(s) => *s,
                None => {
                    missing_params.push(el_i.to_string());
                    continue;
                }
            };

            let shell = match cache.get(i) {
                Some(s) => s,
                None => continue,
            };
            let cn_i = shell.len();

            let (r_i, src_i) = match shannon::shannon_radius(el_i, oxi_i, cn_i as u32) {
                Some(pair) => pair,
                None => {
                    missing_params.push(format!("{el_i}({oxi_i:+},CN={cn_i})"));
                    continue;
                }
            };
            if src_i == RadiusSource::TableNearestState {
                n_fallback += 1;
            }

            for n in shell {
                let el_j = n.element.as_str();
                let oxi_j = match states.get(el_j) {
                    Some(s) => *s,
                    None => continue,
                };
                // 近邻自身的配位数，缓存缺失时退回中心原子的配位数
                let cn_j = cache.coordination(n.site_index).unwrap_or(cn_i);
                let (r_j, src_j) = match shannon::shannon_radius(el_j, oxi_j, cn_j as u32) {
                    Some(pair) => pair,
                    None => continue,
                };
                if src_j == RadiusSource::TableNearestState {
                    n_fallback += 1;
                }

                let expected = r_i + r_j;
                let deviation = if expected > 0.0 {
                    (n.distance - expected).abs() / expected
                } else {
                    0.0
                };

                n_checked += 1;
                if deviation > tolerance {
                    n_violations += 1;
                    violations.push(json!({
                        "site_i": i,
                        "el_i": el_i,
                        "oxi_i": oxi_i,
                        "el_j": el_j,
                        "oxi_j": oxi_j,
                        "expected": round3(expected),
                        "actual": round3(n.distance),
                        "deviation": round3(deviation),
                    }));
                }
            }
        }

        if n_checked == 0 {
            missing_params.sort();
            missing_params.dedup();
            missing_params.truncate(10);
            return ValidationResult::skip_no_params(
                CHECK_NAME,
                TIER,
                INDEPENDENCE,
                "No bonds could be checked (missing Shannon radii parameters)",
                json!({
                    "oxi_state_confidence": assignment.confidence.as_str(),
                    "missing_params": missing_params,
                }),
            );
        }

        let violation_fraction = n_violations as f64 / n_checked as f64;
        let passed = violation_fraction <= MAX_VIOLATION_FRACTION;

        // 偏差最大的违规排前
        violations.sort_by(|a, b| {
            let da = a["deviation"].as_f64().unwrap_or(0.0);
            let db = b["deviation"].as_f64().unwrap_or(0.0);
            db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
        });
        violations.truncate(10);

        let mut details = json!({
            "n_bonds_checked": n_checked,
            "n_violations": n_violations,
            "violation_fraction": round4(violation_fraction),
            "tolerance": tolerance,
            "n_radius_fallback": n_fallback,
            "worst_violations": violations,
            "oxi_state_confidence": assignment.confidence.as_str(),
            "oxi_state_method": assignment.method_used,
        });

        if ctx.material.compound_class != "pure_oxide" {
            details["compound_class_warning"] = json!(format!(
                "This {} contains non-oxide anions. Shannon radii for non-O bonds \
                 may use different reference values than assumed here.",
                ctx.material.compound_class
            ));
        }

        ValidationResult::completed(
            CHECK_NAME,
            TIER,
            INDEPENDENCE,
            passed,
            assignment.confidence.weight(),
            round4(violation_fraction),
            details,
        )
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::models::{Crystal, Lattice, Material, Site};
    use crate::neighbors::NeighborCache;
    use crate::oxi;
    use crate::validators::Status;

    fn perovskite(a: f64) -> Crystal {
        let lattice = Lattice::from_parameters(a, a, a, 90.0, 90.0, 90.0);
        Crystal::new(
            "CaTiO3",
            lattice,
            vec![
                Site::new("Ca", [0.0, 0.0, 0.0]),
                Site::new("Ti", [0.5, 0.5, 0.5]),
                Site::new("O", [0.5, 0.5, 0.0]),
                Site::new("O", [0.5, 0.0, 0.5]),
                Site::new("O", [0.0, 0.5, 0.5]),
            ],
        )
    }

    fn material(compound_class: &str) -> Material {
        Material {
            material_id: "m-1".to_string(),
            composition: "Ca1 Ti1 O3".to_string(),
            reduced_formula: "CaTiO3".to_string(),
            elements: vec!["Ca".to_string(), "O".to_string(), "Ti".to_string()],
            n_sites: 5,
            volume: 59.5,
            density: 4.0,
            space_group: Some("Pm-3m".to_string()),
            space_group_number: Some(221),
            crystal_system: Some("cubic".to_string()),
            oxide_type: "ABO3".to_string(),
            compound_class: compound_class.to_string(),
        }
    }

    /// 岩盐 MgO 常规晶胞：Mg–O 2.106 Å，与 Shannon 半径和 2.12 Å 几乎一致
    fn rocksalt_mgo() -> Crystal {
        let lattice = Lattice::from_parameters(4.212, 4.212, 4.212, 90.0, 90.0, 90.0);
        Crystal::new(
            "MgO",
            lattice,
            vec![
                Site::new("Mg", [0.0, 0.0, 0.0]),
                Site::new("Mg", [0.5, 0.5, 0.0]),
                Site::new("Mg", [0.5, 0.0, 0.5]),
                Site::new("Mg", [0.0, 0.5, 0.5]),
                Site::new("O", [0.5, 0.0, 0.0]),
                Site::new("O", [0.0, 0.5, 0.0]),
                Site::new("O", [0.0, 0.0, 0.5]),
                Site::new("O", [0.5, 0.5, 0.5]),
            ],
        )
    }

    #[test]
    fn test_realistic_rocksalt_passes() {
        let crystal = rocksalt_mgo();
        let mat = material("pure_oxide");
        let th = Thresholds::default();
        let assignment = oxi::assign(&crystal, &th);
        let cache = NeighborCache::build(&crystal, &th);

        let ctx = ValidationContext {
            crystal: &crystal,
            material: &mat,
            oxi: Some(&assignment),
            neighbors: Some(&cache),
            sg_stats: &[],
            thresholds: &th,
        };
        let r = ShannonRadiiValidator.validate(&ctx);
        assert_eq!(r.status, Status::Completed);
        assert_eq!(r.passed, Some(true));
        assert_eq!(r.details["n_bonds_checked"], 48);
        assert_eq!(r.details["n_violations"], 0);
    }

    #[test]
    fn test_compressed_cell_fails() {
        // 晶胞压缩 25%：所有键长远短于半径和
        let crystal = perovskite(2.9);
        let mat = material("pure_oxide");
        let th = Thresholds::default();
        let assignment = oxi::assign(&crystal, &th);
        let cache = NeighborCache::build(&crystal, &th);

        let ctx = ValidationContext {
            crystal: &crystal,
            material: &mat,
            oxi: Some(&assignment),
            neighbors: Some(&cache),
            sg_stats: &[],
            thresholds: &th,
        };
        let r = ShannonRadiiValidator.validate(&ctx);
        assert_eq!(r.status, Status::Completed);
        assert_eq!(r.passed, Some(false));
        assert!(r.score.unwrap() > 0.2);
        assert!(!r.details["worst_violations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_non_pure_oxide_warning() {
        let crystal = perovskite(3.905);
        let mat = material("oxyhalide");
        let th = Thresholds::default();
        let assignment = oxi::assign(&crystal, &th);
        let cache = NeighborCache::build(&crystal, &th);

        let ctx = ValidationContext {
            crystal: &crystal,
            material: &mat,
            oxi: Some(&assignment),
            neighbors: Some(&cache),
            sg_stats: &[],
            thresholds: &th,
        };
        let r = ShannonRadiiValidator.validate(&ctx);
        assert!(r.details["compound_class_warning"].is_string());
    }

    #[test]
    fn test_missing_cache_is_error() {
        let crystal = perovskite(3.905);
        let mat = material("pure_oxide");
        let th = Thresholds::default();
        let assignment = oxi::assign(&crystal, &th);

        let ctx = ValidationContext {
            crystal: &crystal,
            material: &mat,
            oxi: Some(&assignment),
            neighbors: None,
            sg_stats: &[],
            thresholds: &th,
        };
        let r = ShannonRadiiValidator.validate(&ctx);
        assert_eq!(r.status, Status::Error);
        assert!(r.error_message.is_some());
    }
}
