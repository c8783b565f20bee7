//! # 规则校验器框架
//!
//! 定义统一的校验器接口与结果类型。每个校验器输出连续信号
//! （score + details），`passed` 只是阈值参考布尔值，管线从不
//! 因任何单项结果中止或过滤材料。
//!
//! 状态语义：
//! - completed: 检验执行完毕（通过与否看 passed / score）
//! - skipped_no_params: 缺少必要参数（氧化态、半径表、统计数据）
//! - skipped_not_applicable: 检验不适用于该材料类型
//! - error: 检验自身执行出错
//!
//! 独立性分级标注每项检验与生成模型训练数据的独立程度，
//! 持久化后供下游加权使用。
//!
//! ## 依赖关系
//! - 被 `pipeline.rs`, `db/store.rs` 使用
//! - 子模块: charge_neutrality, shannon_radii, pauling_rule2,
//!   goldschmidt, bond_valence_sum, space_group
//! - 使用 `models/`, `oxi/`, `neighbors.rs`, `config.rs`, `db/store.rs`

pub mod bond_valence_sum;
pub mod charge_neutrality;
pub mod goldschmidt;
pub mod pauling_rule2;
pub mod shannon_radii;
pub mod space_group;

use crate::config::Thresholds;
use crate::db::SpaceGroupStat;
use crate::models::{Crystal, Material};
use crate::neighbors::NeighborCache;
use crate::oxi::OxidationAssignment;

use serde_json::Value;

/// 依赖配位缓存的检验名单：任一待执行时才构建 NeighborCache
pub const CACHE_DEPENDENT_CHECKS: &[&str] = &["shannon_radii", "pauling_rule2"];

/// 检验与生成模型训练数据的独立程度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Independence {
    /// 完全独立：纯经验化学规则
    FullyIndependent,
    /// 半独立：经验参数作用于模型弛豫后的几何/元数据
    SemiIndependent,
}

impl Independence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Independence::FullyIndependent => "fully_independent",
            Independence::SemiIndependent => "semi_independent",
        }
    }
}

/// 单项检验执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Completed,
    SkippedNoParams,
    SkippedNotApplicable,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Completed => "completed",
            Status::SkippedNoParams => "skipped_no_params",
            Status::SkippedNotApplicable => "skipped_not_applicable",
            Status::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Status::Completed),
            "skipped_no_params" => Some(Status::SkippedNoParams),
            "skipped_not_applicable" => Some(Status::SkippedNotApplicable),
            "error" => Some(Status::Error),
            _ => None,
        }
    }
}

/// 单项检验对单个材料的结果
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub check_name: &'static str,
    /// 1 = 经典化学规则, 2 = 经验统计检验
    pub tier: u8,
    pub independence: Independence,
    pub status: Status,
    /// 仅 status = completed 时有意义的参考布尔值
    pub passed: Option<bool>,
    /// 继承自氧化态共识置信度（或检验固有置信度）
    pub confidence: f64,
    /// 检验特有的连续数值信号
    pub score: Option<f64>,
    /// 检验特有的结构化细节（JSON）
    pub details: Value,
    pub error_message: Option<String>,
}

impl ValidationResult {
    pub fn completed(
        check_name: &'static str,
        tier: u8,
        independence: Independence,
        passed: bool,
        confidence: f64,
        score: f64,
        details: Value,
    ) -> Self {
        ValidationResult {
            check_name,
            tier,
            independence,
            status: Status::Completed,
            passed: Some(passed),
            confidence,
            score: Some(score),
            details,
            error_message: None,
        }
    }

    pub fn skip_no_params(
        check_name: &'static str,
        tier: u8,
        independence: Independence,
        reason: &str,
        mut details: Value,
    ) -> Self {
        insert_reason(&mut details, reason);
        ValidationResult {
            check_name,
            tier,
            independence,
            status: Status::SkippedNoParams,
            passed: None,
            confidence: 0.0,
            score: None,
            details,
            error_message: None,
        }
    }

    pub fn skip_not_applicable(
        check_name: &'static str,
        tier: u8,
        independence: Independence,
        reason: &str,
        mut details: Value,
    ) -> Self {
        insert_reason(&mut details, reason);
        ValidationResult {
            check_name,
            tier,
            independence,
            status: Status::SkippedNotApplicable,
            passed: None,
            confidence: 0.0,
            score: None,
            details,
            error_message: None,
        }
    }

    pub fn error(
        check_name: &'static str,
        tier: u8,
        independence: Independence,
        message: String,
        details: Value,
    ) -> Self {
        ValidationResult {
            check_name,
            tier,
            independence,
            status: Status::Error,
            passed: None,
            confidence: 0.0,
            score: None,
            details,
            error_message: Some(message),
        }
    }
}

fn insert_reason(details: &mut Value, reason: &str) {
    if let Value::Object(map) = details {
        map.insert("skip_reason".to_string(), Value::String(reason.to_string()));
    }
}

/// 校验器共享的只读上下文
pub struct ValidationContext<'a> {
    pub crystal: &'a Crystal,
    pub material: &'a Material,
    /// 氧化态共识结果；无赋值的材料为 None
    pub oxi: Option<&'a OxidationAssignment>,
    /// 配位缓存；仅依赖缓存的检验待执行时才构建
    pub neighbors: Option<&'a NeighborCache>,
    /// 该材料化学体系的实验空间群分布（按计数降序）
    pub sg_stats: &'a [SpaceGroupStat],
    pub thresholds: &'a Thresholds,
}

/// 校验器统一接口
pub trait Validator {
    fn check_name(&self) -> &'static str;
    fn tier(&self) -> u8;
    fn independence(&self) -> Independence;
    fn validate(&self, ctx: &ValidationContext) -> ValidationResult;
}

/// 固定执行顺序的全部校验器（tier 1 在前）
pub fn all_validators() -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(charge_neutrality::ChargeNeutralityValidator),
        Box::new(shannon_radii::ShannonRadiiValidator),
        Box::new(pauling_rule2::PaulingRule2Validator),
        Box::new(goldschmidt::GoldschmidtValidator),
        Box::new(bond_valence_sum::BondValenceSumValidator),
        Box::new(space_group::SpaceGroupValidator),
    ]
}

/// 氧化态缺失时的统一跳过结果
pub fn skip_no_oxi(
    check_name: &'static str,
    tier: u8,
    independence: Independence,
) -> ValidationResult {
    ValidationResult::skip_no_params(
        check_name,
        tier,
        independence,
        "No oxidation state assignment available",
        serde_json::json!({ "oxi_state_confidence": "none" }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            Status::Completed,
            Status::SkippedNoParams,
            Status::SkippedNotApplicable,
            Status::Error,
        ] {
            assert_eq!(Status::from_str(s.as_str()), Some(s));
        }
        assert_eq!(Status::from_str("bogus"), None);
    }

    #[test]
    fn test_validator_roster_order() {
        let names: Vec<&str> = all_validators().iter().map(|v| v.check_name()).collect();
        assert_eq!(
            names,
            vec![
                "charge_neutrality",
                "shannon_radii",
                "pauling_rule2",
                "goldschmidt",
                "bond_valence_sum",
                "space_group",
            ]
        );
        // tier 1 全部排在 tier 2 之前
        let tiers: Vec<u8> = all_validators().iter().map(|v| v.tier()).collect();
        assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_skip_reason_injected() {
        let r = ValidationResult::skip_no_params(
            "charge_neutrality",
            1,
            Independence::FullyIndependent,
            "missing table entry",
            serde_json::json!({}),
        );
        assert_eq!(r.status, Status::SkippedNoParams);
        assert_eq!(r.details["skip_reason"], "missing table entry");
        assert_eq!(r.confidence, 0.0);
        assert!(r.passed.is_none());
    }
}
