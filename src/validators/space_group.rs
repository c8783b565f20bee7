//! # 空间群合理性检验 (tier 2)
//!
//! 将材料声称的空间群与同化学体系实验数据库中的空间群分布比较。
//! score = 该空间群在实验条目中的占比，占比 >= 最小阈值视为合理。
//! 无空间群编号或无该体系的实验统计时跳过（no_params）。
//!
//! 半独立：依赖外部实验分布数据，不依赖氧化态赋值。
//!
//! ## 依赖关系
//! - 被 `validators/mod.rs` 注册
//! - 使用 `db/store.rs` 的空间群统计, `models/material.rs`

use crate::validators::{Independence, ValidationContext, ValidationResult, Validator};

use serde_json::json;

const CHECK_NAME: &str = "space_group";
const TIER: u8 = 2;
const INDEPENDENCE: Independence = Independence::SemiIndependent;

/// 半独立检验的固有置信度
const CONFIDENCE: f64 = 0.7;

pub struct SpaceGroupValidator;

impl Validator for SpaceGroupValidator {
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
        let sg_number = match ctx.material.space_group_number {
            Some(n) => n,
            None => {
                return ValidationResult::skip_no_params(
                    CHECK_NAME,
                    TIER,
                    INDEPENDENCE,
                    "No space group number available",
                    json!({}),
                )
            }
        };

        let chemsys = ctx.material.chemsys();
        if ctx.sg_stats.is_empty() {
            return ValidationResult::skip_no_params(
                CHECK_NAME,
                TIER,
                INDEPENDENCE,
                &format!("No experimental space group data for chemical system {chemsys}"),
                json!({ "chemsys": chemsys, "space_group_number": sg_number }),
            );
        }

        let total_entries: i64 = ctx.sg_stats.iter().map(|s| s.count).sum();
        let (fraction, count) = ctx
            .sg_stats
            .iter()
            .find(|s| s.space_group_number == sg_number)
            .map(|s| (s.fraction, s.count))
            .unwrap_or((0.0, 0));

        let passed = fraction >= ctx.thresholds.spacegroup_min_fraction;

        // 统计已按计数降序，前 5 名作为上下文
        let top_sgs: Vec<serde_json::Value> = ctx
            .sg_stats
            .iter()
            .take(5)
            .map(|s| {
                json!({
                    "space_group_number": s.space_group_number,
                    "space_group": s.space_group,
                    "count": s.count,
                    "fraction": s.fraction,
                })
            })
            .collect();

        ValidationResult::completed(
            CHECK_NAME,
            TIER,
            INDEPENDENCE,
            passed,
            CONFIDENCE,
            round4(fraction),
            json!({
                "chemsys": chemsys,
                "space_group_number": sg_number,
                "space_group": ctx.material.space_group,
                "fraction_in_experimental": round4(fraction),
                "count_in_experimental": count,
                "total_experimental_entries": total_entries,
                "min_fraction_threshold": ctx.thresholds.spacegroup_min_fraction,
                "top_experimental_space_groups": top_sgs,
            }),
        )
    }
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}
