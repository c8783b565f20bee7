//! # Goldschmidt 容忍因子检验 (tier 1)
//!
//! 仅适用于 ABO3 钙钛矿：t = (r_A + r_O) / (√2 × (r_B + r_O))。
//! 稳定钙钛矿通常落在 0.71 <= t <= 1.05。score = t。
//! A 位按 CN 12/8/6、B 位按 CN 6/4 的优先序查精确 Shannon 半径，
//! 两种 A/B 归属都尝试，取 A 位半径更大（更合理）的一组。
//!
//! ## 依赖关系
//! - 被 `validators/mod.rs` 注册
//! - 使用 `chem/shannon.rs`, `models/material.rs`, `oxi/`

use crate::chem::shannon;
use crate::models::material::parse_formula;
use crate::validators::{
    skip_no_oxi, Independence, ValidationContext, ValidationResult, Validator,
};

use serde_json::json;

const CHECK_NAME: &str = "goldschmidt";
const TIER: u8 = 1;
const INDEPENDENCE: Independence = Independence::FullyIndependent;

/// O²⁻ 在 6 配位下的 Shannon 半径
const R_OXYGEN: f64 = 1.40;

/// 钙钛矿位点的优先配位数查半径
fn perovskite_radius(element: &str, oxi_state: i32, site: PerovskiteSite) -> Option<f64> {
    let cns: &[u32] = match site {
        PerovskiteSite::A => &[12, 8, 6],
        PerovskiteSite::B => &[6, 4],
    };
    cns.iter()
        .find_map(|cn| shannon::exact_radius(element, oxi_state, *cn))
}

#[derive(Clone, Copy)]
enum PerovskiteSite {
    A,
    B,
}

pub struct GoldschmidtValidator;

impl Validator for GoldschmidtValidator {
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
        if ctx.material.oxide_type != "ABO3" {
            return ValidationResult::skip_not_applicable(
                CHECK_NAME,
                TIER,
                INDEPENDENCE,
                &format!(
                    "Not an ABO3 perovskite (oxide_type={})",
                    ctx.material.oxide_type
                ),
                json!({}),
            );
        }

        let (assignment, states) = match ctx.oxi.and_then(|o| o.states.as_ref().map(|s| (o, s))) {
            Some(pair) => pair,
            None => return skip_no_oxi(CHECK_NAME, TIER, INDEPENDENCE),
        };

        let counts = match parse_formula(&ctx.material.reduced_formula) {
            Ok(c) => c,
            Err(e) => {
                return ValidationResult::error(
                    CHECK_NAME,
                    TIER,
                    INDEPENDENCE,
                    format!("Could not parse reduced formula: {e}"),
                    json!({}),
                )
            }
        };

        let cations: Vec<String> = counts.keys().filter(|el| *el != "O").cloned().collect();
        if cations.len() != 2 {
            return ValidationResult::skip_not_applicable(
                CHECK_NAME,
                TIER,
                INDEPENDENCE,
                &format!("Expected 2 cations, found {}", cations.len()),
                json!({}),
            );
        }

        let oxi_0 = states.get(&cations[0]).copied();
        let oxi_1 = states.get(&cations[1]).copied();
        let (oxi_0, oxi_1) = match (oxi_0, oxi_1) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return ValidationResult::skip_no_params(
                    CHECK_NAME,
                    TIER,
                    INDEPENDENCE,
                    "Missing oxidation states for cations",
                    json!({ "oxi_state_confidence": assignment.confidence.as_str() }),
                )
            }
        };

        // 两种 A/B 归属：(A=cation0, B=cation1) 与对调
        let mut candidates: Vec<(&str, i32, f64, &str, i32, f64)> = Vec::new();
        let r_a_0 = perovskite_radius(&cations[0], oxi_0, PerovskiteSite::A);
        let r_a_1 = perovskite_radius(&cations[1], oxi_1, PerovskiteSite::A);
        let r_b_0 = perovskite_radius(&cations[0], oxi_0, PerovskiteSite::B);
        let r_b_1 = perovskite_radius(&cations[1], oxi_1, PerovskiteSite::B);

        if let (Some(ra), Some(rb)) = (r_a_0, r_b_1) {
            candidates.push((&cations[0], oxi_0, ra, &cations[1], oxi_1, rb));
        }
        if let (Some(ra), Some(rb)) = (r_a_1, r_b_0) {
            candidates.push((&cations[1], oxi_1, ra, &cations[0], oxi_0, rb));
        }

        if candidates.is_empty() {
            let mut oxi_map = serde_json::Map::new();
            oxi_map.insert(cations[0].clone(), json!(oxi_0));
            oxi_map.insert(cations[1].clone(), json!(oxi_1));
            return ValidationResult::skip_no_params(
                CHECK_NAME,
                TIER,
                INDEPENDENCE,
                "Shannon radii not available for perovskite coordination",
                json!({
                    "cations": cations,
                    "oxi_states": oxi_map,
                    "oxi_state_confidence": assignment.confidence.as_str(),
                }),
            );
        }

        // A 位半径更大的归属更符合钙钛矿几何
        let best = candidates
            .iter()
            .max_by(|x, y| x.2.partial_cmp(&y.2).unwrap_or(std::cmp::Ordering::Equal))
            .copied();
        let (a_el, a_oxi, r_a, b_el, b_oxi, r_b) = match best {
            Some(c) => c,
            None => unreachable!("candidates checked non-empty above"),
        };

        let t = (r_a + R_OXYGEN) / (std::f64::consts::SQRT_2 * (r_b + R_OXYGEN));
        let t = (t * 10000.0).round() / 10000.0;
        let in_range = ctx.thresholds.goldschmidt_min <= t && t <= ctx.thresholds.goldschmidt_max;

        ValidationResult::completed(
            CHECK_NAME,
            TIER,
            INDEPENDENCE,
            in_range,
            assignment.confidence.weight(),
            t,
            json!({
                "a_site": { "element": a_el, "oxi_state": a_oxi, "radius": r_a },
                "b_site": { "element": b_el, "oxi_state": b_oxi, "radius": r_b },
                "r_O": R_OXYGEN,
                "tolerance_factor": t,
                "in_stable_range": in_range,
                "stable_range": [ctx.thresholds.goldschmidt_min, ctx.thresholds.goldschmidt_max],
                "oxi_state_confidence": assignment.confidence.as_str(),
                "oxi_state_method": assignment.method_used,
            }),
        )
    }
}
