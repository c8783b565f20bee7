//! # 氧化态共识引擎
//!
//! 所有规则校验器都依赖这里的输出，是整个审计管线的关键模块。
//! 两种相互独立的估计方法：
//!   1. 键几何法（structure-aware，失败率较高）
//!   2. 成分电荷平衡法（composition-only，经验基础更广）
//!
//! 共识决策表：
//!   - 两法成功且展平后逐元素一致 → confidence = both_agree，取键几何结果
//!   - 两法成功但有分歧 → confidence = methods_disagree，
//!     按仲裁策略取舍（默认取成分法），两份原始结果都保留
//!   - 仅一法成功 → confidence = single_method，取成功者
//!   - 两法皆败 → confidence = no_assignment
//!
//! 混合价：键几何法对同一元素给出多个价态时置 has_mixed_valence，
//! 并记录升序价态列表 —— 与最终采用哪份结果无关。下游校验器
//! 使用展平后的单值赋值；需要完整混合价信息的消费方查阅保留的
//! 原始结果。
//!
//! 每个材料只计算一次并持久化，仅在显式 force 时重算。
//!
//! ## 依赖关系
//! - 被 `pipeline.rs`, `validators/` 使用
//! - 子模块: bond_geometry, composition
//! - 使用 `config.rs`, `models/structure.rs`

pub mod bond_geometry;
pub mod composition;

use crate::config::{DisagreementPolicy, Thresholds};
use crate::models::Crystal;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 元素 → 价态列表（多值即混合价），列表升序
pub type RawStates = BTreeMap<String, Vec<i32>>;

/// 元素 → 单一价态（展平后）
pub type FlatStates = BTreeMap<String, i32>;

/// 共识置信度，排序 BothAgree > SingleMethod > MethodsDisagree > NoAssignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    BothAgree,
    SingleMethod,
    MethodsDisagree,
    NoAssignment,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::BothAgree => "both_agree",
            Confidence::SingleMethod => "single_method",
            Confidence::MethodsDisagree => "methods_disagree",
            Confidence::NoAssignment => "no_assignment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "both_agree" => Some(Confidence::BothAgree),
            "single_method" => Some(Confidence::SingleMethod),
            "methods_disagree" => Some(Confidence::MethodsDisagree),
            "no_assignment" => Some(Confidence::NoAssignment),
            _ => None,
        }
    }

    /// 置信度权重，继承给各校验结果的 confidence 字段
    pub fn weight(&self) -> f64 {
        match self {
            Confidence::BothAgree => 0.9,
            Confidence::SingleMethod => 0.7,
            Confidence::MethodsDisagree => 0.4,
            Confidence::NoAssignment => 0.0,
        }
    }
}

/// 混合价元素记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedValence {
    pub element: String,
    /// 观测到的价态，升序
    pub states: Vec<i32>,
}

/// 氧化态共识结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OxidationAssignment {
    /// bond_geometry | charge_balance | both_agree | both_disagree | none
    pub method_used: String,

    /// 最终采用的展平赋值；两法皆败时为 None
    pub states: Option<FlatStates>,

    /// 键几何法原始结果（未展平，保留混合价信息）
    pub bond_geometry_result: Option<RawStates>,

    /// 成分电荷平衡法原始结果
    pub charge_balance_result: Option<FlatStates>,

    /// 共识置信度
    pub confidence: Confidence,

    /// 键几何法是否观测到混合价
    pub has_mixed_valence: bool,

    /// 混合价元素及其价态列表
    pub mixed_valence_elements: Vec<MixedValence>,
}

/// 对一个结构执行两法估计 + 共识决策
pub fn assign(crystal: &Crystal, thresholds: &Thresholds) -> OxidationAssignment {
    let bg = bond_geometry::estimate(crystal, thresholds);
    let cb = composition::estimate(&crystal.composition());
    consensus(bg, cb, thresholds.disagreement_policy)
}

/// 共识决策表（与估计本身分离，便于单测）
pub fn consensus(
    bg: Option<RawStates>,
    cb: Option<FlatStates>,
    policy: DisagreementPolicy,
) -> OxidationAssignment {
    let (has_mixed, mixed_els) = match &bg {
        Some(raw) => detect_mixed_valence(raw),
        None => (false, Vec::new()),
    };

    match (bg, cb) {
        (Some(bg), Some(cb)) => {
            let bg_flat = flatten(&bg);
            if bg_flat == cb {
                OxidationAssignment {
                    method_used: "both_agree".to_string(),
                    states: Some(bg_flat),
                    bond_geometry_result: Some(bg),
                    charge_balance_result: Some(cb),
                    confidence: Confidence::BothAgree,
                    has_mixed_valence: has_mixed,
                    mixed_valence_elements: mixed_els,
                }
            } else {
                let chosen = match policy {
                    DisagreementPolicy::PreferChargeBalance => cb.clone(),
                    DisagreementPolicy::PreferBondGeometry => bg_flat,
                };
                OxidationAssignment {
                    method_used: "both_disagree".to_string(),
                    states: Some(chosen),
                    bond_geometry_result: Some(bg),
                    charge_balance_result: Some(cb),
                    confidence: Confidence::MethodsDisagree,
                    has_mixed_valence: has_mixed,
                    mixed_valence_elements: mixed_els,
                }
            }
        }
        (Some(bg), None) => OxidationAssignment {
            method_used: "bond_geometry".to_string(),
            states: Some(flatten(&bg)),
            bond_geometry_result: Some(bg),
            charge_balance_result: None,
            confidence: Confidence::SingleMethod,
            has_mixed_valence: has_mixed,
            mixed_valence_elements: mixed_els,
        },
        (None, Some(cb)) => OxidationAssignment {
            method_used: "charge_balance".to_string(),
            states: Some(cb.clone()),
            bond_geometry_result: None,
            charge_balance_result: Some(cb),
            confidence: Confidence::SingleMethod,
            has_mixed_valence: false,
            mixed_valence_elements: Vec::new(),
        },
        (None, None) => OxidationAssignment {
            method_used: "none".to_string(),
            states: None,
            bond_geometry_result: None,
            charge_balance_result: None,
            confidence: Confidence::NoAssignment,
            has_mixed_valence: false,
            mixed_valence_elements: Vec::new(),
        },
    }
}

/// 多值赋值展平为单值（取列表首项，即最低价态）
///
/// 这是有意的有损简化：下游校验器需要每元素单一价态，
/// 完整混合价数据保留在 bond_geometry_result 中。
fn flatten(raw: &RawStates) -> FlatStates {
    raw.iter()
        .filter_map(|(el, states)| states.first().map(|s| (el.clone(), *s)))
        .collect()
}

/// 检测混合价元素
fn detect_mixed_valence(raw: &RawStates) -> (bool, Vec<MixedValence>) {
    let mixed: Vec<MixedValence> = raw
        .iter()
        .filter(|(_, states)| states.len() > 1)
        .map(|(el, states)| MixedValence {
            element: el.clone(),
            states: states.clone(),
        })
        .collect();
    (!mixed.is_empty(), mixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lattice, Site};

    fn raw(pairs: &[(&str, &[i32])]) -> RawStates {
        pairs
            .iter()
            .map(|(el, states)| (el.to_string(), states.to_vec()))
            .collect()
    }

    fn flat(pairs: &[(&str, i32)]) -> FlatStates {
        pairs.iter().map(|(el, s)| (el.to_string(), *s)).collect()
    }

    #[test]
    fn test_both_agree() {
        let bg = raw(&[("Ca", &[2]), ("Ti", &[4]), ("O", &[-2])]);
        let cb = flat(&[("Ca", 2), ("Ti", 4), ("O", -2)]);
        let a = consensus(Some(bg), Some(cb), DisagreementPolicy::default());

        assert_eq!(a.confidence, Confidence::BothAgree);
        assert_eq!(a.method_used, "both_agree");
        assert_eq!(a.states.unwrap().get("Ti"), Some(&4));
        assert!(!a.has_mixed_valence);
    }

    #[test]
    fn test_disagree_default_prefers_charge_balance() {
        let bg = raw(&[("Fe", &[2]), ("O", &[-2])]);
        let cb = flat(&[("Fe", 3), ("O", -2)]);
        let a = consensus(Some(bg.clone()), Some(cb.clone()), DisagreementPolicy::default());

        assert_eq!(a.confidence, Confidence::MethodsDisagree);
        assert_eq!(a.method_used, "both_disagree");
        assert_eq!(a.states.as_ref().unwrap().get("Fe"), Some(&3));
        // 两份原始结果都保留
        assert_eq!(a.bond_geometry_result, Some(bg));
        assert_eq!(a.charge_balance_result, Some(cb));
    }

    #[test]
    fn test_disagree_policy_prefer_bond_geometry() {
        let bg = raw(&[("Fe", &[2]), ("O", &[-2])]);
        let cb = flat(&[("Fe", 3), ("O", -2)]);
        let a = consensus(Some(bg), Some(cb), DisagreementPolicy::PreferBondGeometry);

        assert_eq!(a.confidence, Confidence::MethodsDisagree);
        assert_eq!(a.states.unwrap().get("Fe"), Some(&2));
    }

    #[test]
    fn test_single_method_arms() {
        let bg = raw(&[("Ti", &[4]), ("O", &[-2])]);
        let a = consensus(Some(bg), None, DisagreementPolicy::default());
        assert_eq!(a.confidence, Confidence::SingleMethod);
        assert_eq!(a.method_used, "bond_geometry");

        let cb = flat(&[("Ti", 4), ("O", -2)]);
        let b = consensus(None, Some(cb), DisagreementPolicy::default());
        assert_eq!(b.confidence, Confidence::SingleMethod);
        assert_eq!(b.method_used, "charge_balance");
    }

    #[test]
    fn test_no_assignment() {
        let a = consensus(None, None, DisagreementPolicy::default());
        assert_eq!(a.confidence, Confidence::NoAssignment);
        assert_eq!(a.method_used, "none");
        assert!(a.states.is_none());
    }

    #[test]
    fn test_mixed_valence_detected_regardless_of_choice() {
        // 磁铁矿式 Fe 混合价：展平取最低态参与比较，分歧时仍记录混合价
        let bg = raw(&[("Fe", &[2, 3]), ("O", &[-2])]);
        let cb = flat(&[("Fe", 3), ("O", -2)]);
        let a = consensus(Some(bg), Some(cb), DisagreementPolicy::default());

        assert!(a.has_mixed_valence);
        assert_eq!(
            a.mixed_valence_elements,
            vec![MixedValence {
                element: "Fe".to_string(),
                states: vec![2, 3],
            }]
        );
        // 默认策略取成分法结果
        assert_eq!(a.states.unwrap().get("Fe"), Some(&3));
    }

    #[test]
    fn test_confidence_ordering_by_weight() {
        assert!(Confidence::BothAgree.weight() > Confidence::SingleMethod.weight());
        assert!(Confidence::SingleMethod.weight() > Confidence::MethodsDisagree.weight());
        assert!(Confidence::MethodsDisagree.weight() > Confidence::NoAssignment.weight());
    }

    #[test]
    fn test_assign_perovskite_both_agree_and_deterministic() {
        let lattice = Lattice::from_parameters(3.905, 3.905, 3.905, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new("Ca", [0.0, 0.0, 0.0]),
            Site::new("Ti", [0.5, 0.5, 0.5]),
            Site::new("O", [0.5, 0.5, 0.0]),
            Site::new("O", [0.5, 0.0, 0.5]),
            Site::new("O", [0.0, 0.5, 0.5]),
        ];
        let crystal = Crystal::new("CaTiO3", lattice, sites);
        let th = Thresholds::default();

        let a = assign(&crystal, &th);
        assert_eq!(a.confidence, Confidence::BothAgree);
        let states = a.states.as_ref().unwrap();
        assert_eq!(states.get("Ca"), Some(&2));
        assert_eq!(states.get("Ti"), Some(&4));
        assert_eq!(states.get("O"), Some(&-2));

        // 重复运行结果逐位一致
        assert_eq!(a, assign(&crystal, &th));
    }
}
