//! # 材料元数据模型
//!
//! 材料记录在摄入时创建一次，进入校验核心后只读。
//! 同时提供化学式解析、氧化物类型分类（ABO3 / AB2O4 / ...）与
//! 化合物类别分类（纯氧化物 / 卤氧化物 / ...）。
//!
//! ## 依赖关系
//! - 被 `commands/ingest.rs`, `db/`, `validators/`, `pipeline.rs` 使用
//! - 使用 `chem/elements.rs` 的阴离子分类
//! - 使用 `regex` 解析约化化学式

use crate::chem::elements;
use crate::error::{AuditError, Result};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 已知氧化物类型的 (A, B, O) 比例模式
/// A <= B 为约化后的阳离子计数（升序）
const OXIDE_TYPE_RATIOS: &[((u32, u32, u32), &str)] = &[
    ((1, 1, 3), "ABO3"),
    ((1, 2, 4), "AB2O4"),
    ((2, 1, 4), "A2BO4"),
    ((1, 1, 2), "ABO2"),
    ((2, 2, 7), "A2B2O7"),
    ((1, 2, 6), "AB2O6"),
    ((2, 1, 3), "A2BO3"),
];

/// 材料元数据记录（不可变）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// 材料 ID
    pub material_id: String,

    /// 完整成分字符串
    pub composition: String,

    /// 约化化学式
    pub reduced_formula: String,

    /// 元素集合（已排序）
    pub elements: Vec<String>,

    /// 位点数
    pub n_sites: usize,

    /// 晶胞体积 (Å³)
    pub volume: f64,

    /// 密度 (g/cm³)
    pub density: f64,

    /// 空间群符号
    pub space_group: Option<String>,

    /// 空间群编号 (1-230)
    pub space_group_number: Option<i64>,

    /// 晶系
    pub crystal_system: Option<String>,

    /// 氧化物类型：ABO3, AB2O4, ... 或 "other"
    pub oxide_type: String,

    /// 化合物类别：pure_oxide, oxyhalide, ...
    pub compound_class: String,
}

impl Material {
    /// 化学体系键：排序后的元素以 "-" 连接（如 "Ca-O-Ti"）
    pub fn chemsys(&self) -> String {
        let mut els = self.elements.clone();
        els.sort();
        els.join("-")
    }
}

/// 解析约化化学式为 元素 → 计数（如 "CaTiO3" → {Ca:1, Ti:1, O:3}）
pub fn parse_formula(formula: &str) -> Result<BTreeMap<String, f64>> {
    let re = Regex::new(r"([A-Z][a-z]?)(\d*\.?\d*)").unwrap();
    let mut counts: BTreeMap<String, f64> = BTreeMap::new();
    let mut matched_len = 0;

    for cap in re.captures_iter(formula) {
        let el = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        let amt_str = cap.get(2).map(|m| m.as_str()).unwrap_or("");
        let amt: f64 = if amt_str.is_empty() {
            1.0
        } else {
            amt_str
                .parse()
                .map_err(|_| AuditError::InvalidFormula(formula.to_string()))?
        };
        *counts.entry(el.to_string()).or_insert(0.0) += amt;
        matched_len += el.len() + amt_str.len();
    }

    if counts.is_empty() || matched_len != formula.len() {
        return Err(AuditError::InvalidFormula(formula.to_string()));
    }
    Ok(counts)
}

/// 从约化化学式的元素比例分类氧化物类型
///
/// 已知局限：无法识别双钙钛矿、Ruddlesden-Popper 相等复杂结构型。
pub fn classify_oxide_type(reduced_formula: &str) -> String {
    let counts = match parse_formula(reduced_formula) {
        Ok(c) => c,
        Err(_) => return "other".to_string(),
    };

    let o_count = counts.get("O").copied().unwrap_or(0.0);
    if o_count == 0.0 {
        return "other".to_string();
    }

    // 阳离子计数升序 → (A, B)
    let mut cation_counts: Vec<f64> = counts
        .iter()
        .filter(|(el, _)| el.as_str() != "O")
        .map(|(_, amt)| *amt)
        .collect();
    if cation_counts.len() != 2 {
        return "other".to_string();
    }
    cation_counts.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));

    let raw = [cation_counts[0], cation_counts[1], o_count];
    let mut raw_int = [0u32; 3];
    for (k, x) in raw.iter().enumerate() {
        if x.fract() != 0.0 || *x <= 0.0 {
            return "other".to_string();
        }
        raw_int[k] = *x as u32;
    }

    let divisor = gcd(gcd(raw_int[0], raw_int[1]), raw_int[2]);
    let normalized = (
        raw_int[0] / divisor,
        raw_int[1] / divisor,
        raw_int[2] / divisor,
    );

    OXIDE_TYPE_RATIOS
        .iter()
        .find(|(ratio, _)| *ratio == normalized)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| "other".to_string())
}

/// 从元素集合分类化合物类别
///
/// 含氧且含卤素/硫族/氮/氢阴离子形成元素的材料不是纯氧化物，
/// 部分检验（Shannon, Pauling R2）只评估氧阴离子位点，需要标注。
pub fn classify_compound_class(els: &[String]) -> String {
    if !els.iter().any(|e| e == "O") {
        return "non_oxide".to_string();
    }
    if els.iter().any(|e| elements::is_halogen(e)) {
        return "oxyhalide".to_string();
    }
    if els.iter().any(|e| elements::is_chalcogen(e)) {
        return "oxychalcogenide".to_string();
    }
    if els.iter().any(|e| e == "N") {
        return "oxynitride".to_string();
    }
    if els.iter().any(|e| e == "H") {
        return "oxyhydride".to_string();
    }
    "pure_oxide".to_string()
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
