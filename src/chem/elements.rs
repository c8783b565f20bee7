//! # 元素化学数据表
//!
//! 提供两类静态数据：
//! 1. 各元素的已知氧化态列表（按经验常见度排序，供电荷平衡枚举
//!    与键几何法的候选态选取使用）
//! 2. 阴离子形成元素分类（O / 卤素 / 硫族 / N），供化合物类别
//!    分类与键价计算中的阴阳离子区分使用
//!
//! ## 依赖关系
//! - 被 `models/material.rs`, `oxi/`, `validators/` 使用
//! - 无外部模块依赖

/// 各元素的已知氧化态，按常见度排序（第一项为最常见）
static KNOWN_OXIDATION_STATES: &[(&str, &[i32])] = &[
    ("H", &[1, -1]),
    ("Li", &[1]),
    ("Be", &[2]),
    ("B", &[3]),
    ("C", &[4]),
    ("N", &[-3, 5, 3]),
    ("O", &[-2]),
    ("F", &[-1]),
    ("Na", &[1]),
    ("Mg", &[2]),
    ("Al", &[3]),
    ("Si", &[4]),
    ("P", &[5, 3]),
    ("S", &[-2, 6, 4]),
    ("Cl", &[-1, 7, 5]),
    ("K", &[1]),
    ("Ca", &[2]),
    ("Sc", &[3]),
    ("Ti", &[4, 3]),
    ("V", &[5, 4, 3]),
    ("Cr", &[3, 6]),
    ("Mn", &[2, 4, 3, 7]),
    ("Fe", &[3, 2]),
    ("Co", &[2, 3]),
    ("Ni", &[2, 3]),
    ("Cu", &[2, 1]),
    ("Zn", &[2]),
    ("Ga", &[3]),
    ("Ge", &[4]),
    ("As", &[5, 3]),
    ("Se", &[-2, 4, 6]),
    ("Br", &[-1, 5]),
    ("Rb", &[1]),
    ("Sr", &[2]),
    ("Y", &[3]),
    ("Zr", &[4]),
    ("Nb", &[5, 4]),
    ("Mo", &[6, 4]),
    ("Tc", &[7, 4]),
    ("Ru", &[4, 3, 5]),
    ("Rh", &[3, 4]),
    ("Pd", &[2, 4]),
    ("Ag", &[1]),
    ("Cd", &[2]),
    ("In", &[3]),
    ("Sn", &[4, 2]),
    ("Sb", &[3, 5]),
    ("Te", &[-2, 4, 6]),
    ("I", &[-1, 5, 7]),
    ("Cs", &[1]),
    ("Ba", &[2]),
    ("La", &[3]),
    ("Ce", &[3, 4]),
    ("Pr", &[3, 4]),
    ("Nd", &[3]),
    ("Sm", &[3]),
    ("Eu", &[3, 2]),
    ("Gd", &[3]),
    ("Tb", &[3, 4]),
    ("Dy", &[3]),
    ("Ho", &[3]),
    ("Er", &[3]),
    ("Tm", &[3]),
    ("Yb", &[3, 2]),
    ("Lu", &[3]),
    ("Hf", &[4]),
    ("Ta", &[5]),
    ("W", &[6, 4]),
    ("Re", &[7, 4]),
    ("Os", &[4, 6]),
    ("Ir", &[4, 3]),
    ("Pt", &[4, 2]),
    ("Au", &[3, 1]),
    ("Hg", &[2, 1]),
    ("Tl", &[1, 3]),
    ("Pb", &[2, 4]),
    ("Bi", &[3, 5]),
    ("Th", &[4]),
    ("U", &[6, 4]),
    ("Ac", &[3]),
];

/// 某元素的已知氧化态（按常见度排序）；未知元素返回空切片
pub fn known_oxidation_states(element: &str) -> &'static [i32] {
    KNOWN_OXIDATION_STATES
        .iter()
        .find(|(el, _)| *el == element)
        .map(|(_, states)| *states)
        .unwrap_or(&[])
}

/// 阴离子形成元素在晶体中的标准阴离子价态
///
/// 注意：H 不在其中 —— 氢在氧化物中通常是 H⁺，作为候选阳离子处理。
pub fn anion_state(element: &str) -> Option<i32> {
    match element {
        "O" | "S" | "Se" | "Te" => Some(-2),
        "F" | "Cl" | "Br" | "I" => Some(-1),
        "N" => Some(-3),
        _ => None,
    }
}

/// 是否为阴离子形成元素（O / 卤素 / 硫族 / N）
pub fn is_anion_former(element: &str) -> bool {
    anion_state(element).is_some()
}

/// 是否为卤素
pub fn is_halogen(element: &str) -> bool {
    matches!(element, "F" | "Cl" | "Br" | "I")
}

/// 是否为氧之外的硫族元素
pub fn is_chalcogen(element: &str) -> bool {
    matches!(element, "S" | "Se" | "Te")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_states_commonness_order() {
        // 第一项为最常见氧化态
        assert_eq!(known_oxidation_states("Fe")[0], 3);
        assert_eq!(known_oxidation_states("Ti")[0], 4);
        assert_eq!(known_oxidation_states("O"), &[-2]);
        assert!(known_oxidation_states("Xx").is_empty());
    }

    #[test]
    fn test_anion_classification() {
        assert_eq!(anion_state("O"), Some(-2));
        assert_eq!(anion_state("Cl"), Some(-1));
        assert_eq!(anion_state("N"), Some(-3));
        assert_eq!(anion_state("H"), None);
        assert_eq!(anion_state("Ca"), None);

        assert!(is_halogen("Br"));
        assert!(!is_halogen("O"));
        assert!(is_chalcogen("Se"));
        assert!(!is_chalcogen("O"));
        assert!(is_anion_former("Te"));
        assert!(!is_anion_former("Ti"));
    }
}
