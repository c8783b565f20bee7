//! # 电荷中性检验 (tier 1)
//!
//! 氧化态按成分加权求和应为零。score = 总电荷（有符号），
//! |总电荷| < 0.01 视为通过。置信度继承氧化态共识置信度。
//!
//! ## 依赖关系
//! - 被 `validators/mod.rs` 注册
//! - 使用 `oxi/`, `models/structure.rs`

use crate::validators::{
    skip_no_oxi, Independence, ValidationContext, ValidationResult, Validator,
};

use serde_json::json;

const CHECK_NAME: &str = "charge_neutrality";
const TIER: u8 = 1;
const INDEPENDENCE: Independence = Independence::FullyIndependent;

pub struct ChargeNeutralityValidator;

impl Validator for ChargeNeutralityValidator {
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
        let oxi = match ctx.oxi.and_then(|o| o.states.as_ref().map(|s| (o, s))) {
            Some(pair) => pair,
            None => return skip_no_oxi(CHECK_NAME, TIER, INDEPENDENCE),
        };
        let (assignment, states) = oxi;

        let mut total_charge = 0.0;
        let mut element_charges = serde_json::Map::new();

        for (el, count) in ctx.crystal.composition() {
            let state = match states.get(&el) {
                Some(s) => *s,
                None => {
                    return ValidationResult::skip_no_params(
                        CHECK_NAME,
                        TIER,
                        INDEPENDENCE,
                        &format!("No oxidation state for element {el}"),
                        json!({
                            "oxi_state_confidence": assignment.confidence.as_str(),
                            "missing_element": el,
                        }),
                    )
                }
            };
            let charge = state as f64 * count as f64;
            total_charge += charge;
            element_charges.insert(
                el,
                json!({ "oxi_state": state, "count": count, "charge": charge }),
            );
        }

        let passed = total_charge.abs() < 0.01;

        ValidationResult::completed(
            CHECK_NAME,
            TIER,
            INDEPENDENCE,
            passed,
            assignment.confidence.weight(),
            total_charge,
            json!({
                "total_charge": total_charge,
                "element_charges": element_charges,
                "oxi_state_confidence": assignment.confidence.as_str(),
                "oxi_state_method": assignment.method_used,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::models::{Crystal, Lattice, Material, Site};
    use crate::oxi::{self, Confidence};
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

    fn material() -> Material {
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
            compound_class: "pure_oxide".to_string(),
        }
    }

    fn ctx<'a>(
        crystal: &'a Crystal,
        material: &'a Material,
        oxi: Option<&'a oxi::OxidationAssignment>,
        thresholds: &'a Thresholds,
    ) -> ValidationContext<'a> {
        ValidationContext {
            crystal,
            material,
            oxi,
            neighbors: None,
            sg_stats: &[],
            thresholds,
        }
    }

    #[test]
    fn test_neutral_composition_passes() {
        let crystal = perovskite();
        let mat = material();
        let th = Thresholds::default();
        let assignment = oxi::assign(&crystal, &th);
        let c = ctx(&crystal, &mat, Some(&assignment), &th);

        let r = ChargeNeutralityValidator.validate(&c);
        assert_eq!(r.status, Status::Completed);
        assert_eq!(r.passed, Some(true));
        assert!(r.score.unwrap().abs() < 1e-9);
        assert!((r.confidence - Confidence::BothAgree.weight()).abs() < 1e-9);
        assert_eq!(r.details["oxi_state_confidence"], "both_agree");
    }

    #[test]
    fn test_missing_assignment_skips() {
        let crystal = perovskite();
        let mat = material();
        let th = Thresholds::default();
        let c = ctx(&crystal, &mat, None, &th);

        let r = ChargeNeutralityValidator.validate(&c);
        assert_eq!(r.status, Status::SkippedNoParams);
        assert!(r.passed.is_none());
    }

    #[test]
    fn test_unbalanced_states_fail() {
        // 人为造一组不平衡赋值：Ti 当作 +3
        let crystal = perovskite();
        let mat = material();
        let th = Thresholds::default();
        let mut assignment = oxi::assign(&crystal, &th);
        if let Some(states) = assignment.states.as_mut() {
            states.insert("Ti".to_string(), 3);
        }
        let c = ctx(&crystal, &mat, Some(&assignment), &th);

        let r = ChargeNeutralityValidator.validate(&c);
        assert_eq!(r.status, Status::Completed);
        assert_eq!(r.passed, Some(false));
        assert!((r.score.unwrap() + 1.0).abs() < 1e-9);
    }
}
