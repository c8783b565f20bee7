//! # Pauling 第二规则检验 (tier 1)
//!
//! 静电价原理：每个 O²⁻ 位点收到的静电键强之和
//! （阳离子价态 / 阳离子配位数，逐配位阳离子求和）应约等于 2。
//! score = 违规氧位点占比，占比 <= 25% 视为通过。
//! 仅评估氧位点，无氧材料跳过（not_applicable）。
//!
//! ## 依赖关系
//! - 被 `validators/mod.rs` 注册
//! - 使用 `neighbors.rs`, `oxi/`

use crate::validators::{
    skip_no_oxi, Independence, ValidationContext, ValidationResult, Validator,
};

use serde_json::json;

const CHECK_NAME: &str = "pauling_rule2";
const TIER: u8 = 1;
const INDEPENDENCE: Independence = Independence::FullyIndependent;

/// O²⁻ 的期望价 |−2|
const EXPECTED_VALENCE: f64 = 2.0;

/// 违规位点占比的通过上限
const MAX_VIOLATION_FRACTION: f64 = 0.25;

pub struct PaulingRule2Validator;

impl Validator for PaulingRule2Validator {
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

        let o_indices: Vec<usize> = ctx
            .crystal
            .sites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.element == "O")
            .map(|(i, _)| i)
            .collect();
        if o_indices.is_empty() {
            return ValidationResult::skip_not_applicable(
                CHECK_NAME,
                TIER,
                INDEPENDENCE,
                "No oxygen sites found in structure",
                json!({}),
            );
        }

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

        let tolerance = ctx.thresholds.pauling_r2_tolerance;
        let mut n_checked = 0usize;
        let mut n_violations = 0usize;
        let mut failing_sites: Vec<serde_json::Value> = Vec::new();

        for &o_idx in &o_indices {
            let shell = match cache.get(o_idx) {
                Some(s) => s,
                None => continue,
            };

            let mut bond_strength_sum = 0.0;
            let mut contributions: Vec<serde_json::Value> = Vec::new();

            for n in shell {
                let state = match states.get(&n.element) {
                    Some(s) if *s > 0 => *s,
                    _ => continue, // 阴离子与未知元素不贡献
                };
                // 阳离子自身配位数，缓存缺失时退回氧位点的配位数
                let cation_cn = cache.coordination(n.site_index).unwrap_or(shell.len());
                if cation_cn == 0 {
                    continue;
                }
                let strength = state as f64 / cation_cn as f64;
                bond_strength_sum += strength;
                contributions.push(json!({
                    "element": n.element,
                    "oxi_state": state,
                    "cn": cation_cn,
                    "strength": round3(strength),
                }));
            }

            if contributions.is_empty() {
                continue;
            }

            n_checked += 1;
            let deviation = (bond_strength_sum - EXPECTED_VALENCE).abs() / EXPECTED_VALENCE;
            if deviation > tolerance {
                n_violations += 1;
                failing_sites.push(json!({
                    "o_site_index": o_idx,
                    "bond_strength_sum": round3(bond_strength_sum),
                    "expected": EXPECTED_VALENCE,
                    "deviation": round3(deviation),
                    "cation_contributions": contributions,
                }));
            }

            if n_checked >= ctx.thresholds.max_sites_scanned {
                break;
            }
        }

        if n_checked == 0 {
            return ValidationResult::skip_no_params(
                CHECK_NAME,
                TIER,
                INDEPENDENCE,
                "No oxygen sites could be analyzed",
                json!({ "oxi_state_confidence": assignment.confidence.as_str() }),
            );
        }

        let violation_fraction = n_violations as f64 / n_checked as f64;
        let passed = violation_fraction <= MAX_VIOLATION_FRACTION;

        failing_sites.sort_by(|a, b| {
            let da = a["deviation"].as_f64().unwrap_or(0.0);
            let db = b["deviation"].as_f64().unwrap_or(0.0);
            db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
        });
        failing_sites.truncate(5);

        let mut details = json!({
            "n_oxygen_sites_checked": n_checked,
            "n_violations": n_violations,
            "violation_fraction": round4(violation_fraction),
            "tolerance": tolerance,
            "worst_sites": failing_sites,
            "oxi_state_confidence": assignment.confidence.as_str(),
            "oxi_state_method": assignment.method_used,
        });

        if ctx.material.compound_class != "pure_oxide" {
            details["compound_class_warning"] = json!(format!(
                "This {} contains non-oxide anions. Only oxide anion sites \
                 are evaluated by this check.",
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

    fn perovskite() -> Crystal {
        let lattice = Lattice::from_parameters(3.905, 3.905, 3.905, 90.0, 90.0, 90.0);
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

    fn rocksalt() -> Crystal {
        let lattice = Lattice::from_parameters(5.64, 5.64, 5.64, 90.0, 90.0, 90.0);
        Crystal::new(
            "NaCl",
            lattice,
            vec![
                Site::new("Na", [0.0, 0.0, 0.0]),
                Site::new("Cl", [0.5, 0.0, 0.0]),
            ],
        )
    }

    fn material(id: &str, compound_class: &str) -> Material {
        Material {
            material_id: id.to_string(),
            composition: "Ca1 Ti1 O3".to_string(),
            reduced_formula: "CaTiO3".to_string(),
            elements: vec!["Ca".to_string(), "O".to_string(), "Ti".to_string()],
            n_sites: 5,
            volume: 59.5,
            density: 4.0,
            space_group: None,
            space_group_number: None,
            crystal_system: None,
            oxide_type: "ABO3".to_string(),
            compound_class: compound_class.to_string(),
        }
    }

    #[test]
    fn test_no_oxygen_not_applicable() {
        let crystal = rocksalt();
        let mat = material("m-nacl", "non_oxide");
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
        let r = PaulingRule2Validator.validate(&ctx);
        assert_eq!(r.status, Status::SkippedNotApplicable);
    }

    /// 岩盐 MgO 常规晶胞
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
    fn test_rocksalt_mgo_satisfies_rule() {
        // O 配 6 个 Mg，Mg 配 6 个 O：键强和 = 6 × 2/6 = 2.0
        let crystal = rocksalt_mgo();
        let mat = material("m-mgo", "pure_oxide");
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
        let r = PaulingRule2Validator.validate(&ctx);
        assert_eq!(r.status, Status::Completed);
        assert_eq!(r.passed, Some(true));
        assert_eq!(r.details["n_oxygen_sites_checked"], 4);
        assert_eq!(r.details["n_violations"], 0);
    }

    #[test]
    fn test_distant_cations_outside_shell_flagged() {
        // 立方钙钛矿中 O 的第一壳层只含 2 个 Ti（Ca 在 d_min×1.41 处，
        // 超出配位窗口）：键强和 = 2 × 4/6 ≈ 1.33，偏差 0.33 > 容限
        let crystal = perovskite();
        let mat = material("m-cto", "pure_oxide");
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
        let r = PaulingRule2Validator.validate(&ctx);
        assert_eq!(r.status, Status::Completed);
        assert_eq!(r.passed, Some(false));
        assert_eq!(r.details["n_violations"], 3);
        let worst = r.details["worst_sites"].as_array().unwrap();
        assert!(!worst.is_empty());
        assert!((worst[0]["bond_strength_sum"].as_f64().unwrap() - 1.333).abs() < 1e-3);
    }

    #[test]
    fn test_non_pure_oxide_warning() {
        let crystal = perovskite();
        let mat = material("m-cto", "oxyhalide");
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
        let r = PaulingRule2Validator.validate(&ctx);
        assert_eq!(r.status, Status::Completed);
        assert!(r.details["compound_class_warning"].is_string());

        // 纯氧化物不带该警告
        let pure = material("m-cto", "pure_oxide");
        let ctx = ValidationContext {
            crystal: &crystal,
            material: &pure,
            oxi: Some(&assignment),
            neighbors: Some(&cache),
            sg_stats: &[],
            thresholds: &th,
        };
        let r = PaulingRule2Validator.validate(&ctx);
        assert!(r.details["compound_class_warning"].is_null());
    }

    #[test]
    fn test_missing_assignment_skips() {
        let crystal = perovskite();
        let mat = material("m-cto", "pure_oxide");
        let th = Thresholds::default();
        let cache = NeighborCache::build(&crystal, &th);

        let ctx = ValidationContext {
            crystal: &crystal,
            material: &mat,
            oxi: None,
            neighbors: Some(&cache),
            sg_stats: &[],
            thresholds: &th,
        };
        let r = PaulingRule2Validator.validate(&ctx);
        assert_eq!(r.status, Status::SkippedNoParams);
    }
}
