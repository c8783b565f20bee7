//! # Shannon 有效离子半径表
//!
//! 常见氧化态与配位数下的 Shannon 有效离子半径（Å）。
//! 来源：Shannon (1976), Acta Cryst. A32, 751-767。
//!
//! 只收录最常见的配位数；查不到的物种由调用方按
//! `skipped_no_params` 处理。
//!
//! ## 依赖关系
//! - 被 `validators/shannon_radii.rs`, `validators/goldschmidt.rs` 使用
//! - 无外部模块依赖

/// 半径查表结果的来源标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusSource {
    /// (元素, 价态, 配位数) 精确命中
    TableExact,
    /// 同 (元素, 价态) 下最接近的配位数
    TableNearestCn,
    /// 同元素下最接近的价态（最后的回退手段）
    TableNearestState,
}

impl RadiusSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadiusSource::TableExact => "table_exact",
            RadiusSource::TableNearestCn => "table_nearest_cn",
            RadiusSource::TableNearestState => "table_nearest_state",
        }
    }
}

/// (元素, 氧化态, 配位数, 半径 Å)
pub static SHANNON_RADII: &[(&str, i32, u32, f64)] = &[
    // 碱金属
    ("Li", 1, 4, 0.59), ("Li", 1, 6, 0.76), ("Li", 1, 8, 0.92),
    ("Na", 1, 4, 0.99), ("Na", 1, 6, 1.02), ("Na", 1, 8, 1.18), ("Na", 1, 12, 1.39),
    ("K", 1, 6, 1.38), ("K", 1, 8, 1.51), ("K", 1, 12, 1.64),
    ("Rb", 1, 6, 1.52), ("Rb", 1, 8, 1.61), ("Rb", 1, 12, 1.72),
    ("Cs", 1, 6, 1.67), ("Cs", 1, 8, 1.74), ("Cs", 1, 12, 1.88),
    // 碱土金属
    ("Be", 2, 4, 0.27), ("Be", 2, 6, 0.45),
    ("Mg", 2, 4, 0.57), ("Mg", 2, 6, 0.72), ("Mg", 2, 8, 0.89),
    ("Ca", 2, 6, 1.00), ("Ca", 2, 8, 1.12), ("Ca", 2, 12, 1.34),
    ("Sr", 2, 6, 1.18), ("Sr", 2, 8, 1.26), ("Sr", 2, 12, 1.44),
    ("Ba", 2, 6, 1.35), ("Ba", 2, 8, 1.42), ("Ba", 2, 12, 1.61),
    // 3d 过渡金属 —— 常见氧化态
    ("Ti", 3, 6, 0.67), ("Ti", 4, 4, 0.42), ("Ti", 4, 6, 0.605),
    ("V", 3, 6, 0.64), ("V", 4, 6, 0.58), ("V", 5, 4, 0.355), ("V", 5, 6, 0.54),
    ("Cr", 3, 6, 0.615), ("Cr", 6, 4, 0.26), ("Cr", 6, 6, 0.44),
    ("Mn", 2, 6, 0.83), ("Mn", 3, 6, 0.645), ("Mn", 4, 6, 0.53),
    ("Fe", 2, 4, 0.63), ("Fe", 2, 6, 0.78), ("Fe", 3, 4, 0.49), ("Fe", 3, 6, 0.645),
    ("Co", 2, 6, 0.745), ("Co", 3, 6, 0.61), ("Co", 4, 6, 0.53),
    ("Ni", 2, 4, 0.55), ("Ni", 2, 6, 0.69), ("Ni", 3, 6, 0.56),
    ("Cu", 1, 4, 0.60), ("Cu", 2, 4, 0.57), ("Cu", 2, 6, 0.73),
    ("Zn", 2, 4, 0.60), ("Zn", 2, 6, 0.74),
    // 4d 过渡金属
    ("Zr", 4, 6, 0.72), ("Zr", 4, 8, 0.84),
    ("Nb", 5, 6, 0.64), ("Nb", 4, 6, 0.68),
    ("Mo", 4, 6, 0.65), ("Mo", 6, 4, 0.41), ("Mo", 6, 6, 0.59),
    ("Ru", 4, 6, 0.62), ("Ru", 3, 6, 0.68), ("Ru", 5, 6, 0.565),
    ("Rh", 3, 6, 0.665), ("Rh", 4, 6, 0.60),
    ("Pd", 2, 4, 0.64), ("Pd", 4, 6, 0.615),
    ("Ag", 1, 4, 1.00), ("Ag", 1, 6, 1.15),
    ("Cd", 2, 6, 0.95), ("Cd", 2, 8, 1.10),
    // 5d 过渡金属
    ("Hf", 4, 6, 0.71), ("Hf", 4, 8, 0.83),
    ("Ta", 5, 6, 0.64), ("Ta", 4, 6, 0.68),
    ("W", 4, 6, 0.66), ("W", 6, 4, 0.42), ("W", 6, 6, 0.60),
    ("Re", 4, 6, 0.63), ("Re", 7, 6, 0.53),
    ("Os", 4, 6, 0.63), ("Os", 6, 6, 0.545),
    ("Ir", 3, 6, 0.68), ("Ir", 4, 6, 0.625), ("Ir", 5, 6, 0.57),
    ("Pt", 2, 4, 0.60), ("Pt", 4, 6, 0.625),
    ("Au", 1, 6, 1.37), ("Au", 3, 4, 0.68), ("Au", 3, 6, 0.85),
    // 后过渡金属
    ("Al", 3, 4, 0.39), ("Al", 3, 6, 0.535),
    ("Ga", 3, 4, 0.47), ("Ga", 3, 6, 0.62),
    ("In", 3, 6, 0.80), ("In", 3, 8, 0.92),
    ("Sn", 2, 6, 0.93), ("Sn", 4, 6, 0.69),
    ("Tl", 1, 6, 1.50), ("Tl", 3, 6, 0.885),
    ("Pb", 2, 6, 1.19), ("Pb", 2, 8, 1.29), ("Pb", 4, 6, 0.775),
    ("Bi", 3, 6, 1.03), ("Bi", 5, 6, 0.76),
    ("Sb", 3, 6, 0.76), ("Sb", 5, 6, 0.60),
    // 稀土
    ("Sc", 3, 6, 0.745), ("Sc", 3, 8, 0.87),
    ("Y", 3, 6, 0.90), ("Y", 3, 8, 1.019),
    ("La", 3, 6, 1.032), ("La", 3, 8, 1.16), ("La", 3, 12, 1.36),
    ("Ce", 3, 6, 1.01), ("Ce", 4, 6, 0.87), ("Ce", 4, 8, 0.97),
    ("Pr", 3, 6, 0.99), ("Pr", 4, 6, 0.85),
    ("Nd", 3, 6, 0.983), ("Nd", 3, 8, 1.109),
    ("Sm", 3, 6, 0.958), ("Sm", 3, 8, 1.079),
    ("Eu", 2, 6, 1.17), ("Eu", 3, 6, 0.947),
    ("Gd", 3, 6, 0.938), ("Gd", 3, 8, 1.053),
    ("Tb", 3, 6, 0.923), ("Tb", 4, 6, 0.76),
    ("Dy", 3, 6, 0.912), ("Dy", 3, 8, 1.027),
    ("Ho", 3, 6, 0.901), ("Ho", 3, 8, 1.015),
    ("Er", 3, 6, 0.89), ("Er", 3, 8, 1.004),
    ("Tm", 3, 6, 0.88), ("Tm", 3, 8, 0.994),
    ("Yb", 2, 6, 1.02), ("Yb", 3, 6, 0.868),
    ("Lu", 3, 6, 0.861), ("Lu", 3, 8, 0.977),
    // 锕系（有限收录）
    ("Th", 4, 6, 0.94), ("Th", 4, 8, 1.05),
    ("U", 4, 6, 0.89), ("U", 6, 6, 0.73),
    ("Ac", 3, 6, 1.12),
    // 氧（阴离子）
    ("O", -2, 2, 1.35), ("O", -2, 3, 1.36), ("O", -2, 4, 1.38), ("O", -2, 6, 1.40),
    // 卤素（含卤三元氧化物，如 Mn4Br6O）
    ("F", -1, 4, 1.31), ("F", -1, 6, 1.33),
    ("Cl", -1, 6, 1.81), ("Cl", 7, 4, 0.08),
    ("Br", -1, 6, 1.96), ("Br", 5, 6, 0.31),
    ("I", -1, 6, 2.20), ("I", 5, 6, 0.95), ("I", 7, 6, 0.53),
    // 硫族阴离子
    ("S", -2, 6, 1.84), ("S", 6, 4, 0.12), ("S", 6, 6, 0.29),
    ("Se", -2, 6, 1.98), ("Se", 4, 6, 0.50), ("Se", 6, 6, 0.42),
    ("Te", -2, 6, 2.21), ("Te", 4, 6, 0.97), ("Te", 6, 6, 0.56),
    // 类金属
    ("Si", 4, 4, 0.26), ("Si", 4, 6, 0.40),
    ("Ge", 4, 4, 0.39), ("Ge", 4, 6, 0.53),
    ("As", 3, 6, 0.58), ("As", 5, 4, 0.335), ("As", 5, 6, 0.46),
    ("P", 3, 6, 0.44), ("P", 5, 4, 0.17), ("P", 5, 6, 0.38),
    ("B", 3, 4, 0.11), ("B", 3, 6, 0.27),
    ("N", -3, 4, 1.46), ("N", 3, 6, 0.16), ("N", 5, 6, 0.13),
    ("C", 4, 6, 0.16),
];

/// 精确查表，不做任何回退
pub fn exact_radius(element: &str, oxi_state: i32, coord_number: u32) -> Option<f64> {
    SHANNON_RADII
        .iter()
        .find(|(el, ox, cn, _)| *el == element && *ox == oxi_state && *cn == coord_number)
        .map(|(_, _, _, r)| *r)
}

/// 查 Shannon 半径：精确命中 → 同价态最近配位数 → 同元素最近价态
///
/// 返回 (半径, 来源)；完全查不到返回 None。
pub fn shannon_radius(element: &str, oxi_state: i32, coord_number: u32) -> Option<(f64, RadiusSource)> {
    // 精确命中
    if let Some((_, _, _, r)) = SHANNON_RADII
        .iter()
        .find(|(el, ox, cn, _)| *el == element && *ox == oxi_state && *cn == coord_number)
    {
        return Some((*r, RadiusSource::TableExact));
    }

    // 同 (元素, 价态) 下最近的配位数
    let same_state: Vec<(u32, f64)> = SHANNON_RADII
        .iter()
        .filter(|(el, ox, _, _)| *el == element && *ox == oxi_state)
        .map(|(_, _, cn, r)| (*cn, *r))
        .collect();
    if let Some((_, r)) = same_state
        .iter()
        .min_by_key(|(cn, _)| (*cn as i64 - coord_number as i64).abs())
    {
        return Some((*r, RadiusSource::TableNearestCn));
    }

    // 同元素下最近的价态（原实现回退到外部数据库的通用离子半径，
    // 这里回退到表内最接近的价态并如实标注来源）
    let same_element: Vec<(i32, u32, f64)> = SHANNON_RADII
        .iter()
        .filter(|(el, _, _, _)| *el == element)
        .map(|(_, ox, cn, r)| (*ox, *cn, *r))
        .collect();
    same_element
        .iter()
        .min_by_key(|(ox, cn, _)| {
            (
                (*ox as i64 - oxi_state as i64).abs(),
                (*cn as i64 - coord_number as i64).abs(),
            )
        })
        .map(|(_, _, r)| (*r, RadiusSource::TableNearestState))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        let (r, src) = shannon_radius("Ti", 4, 6).unwrap();
        assert!((r - 0.605).abs() < 1e-9);
        assert_eq!(src, RadiusSource::TableExact);
    }

    #[test]
    fn test_nearest_cn_fallback() {
        // Ti4+ 没有 CN=5 的条目，应回退到最近配位数
        let (r, src) = shannon_radius("Ti", 4, 5).unwrap();
        assert_eq!(src, RadiusSource::TableNearestCn);
        assert!(r > 0.0);
    }

    #[test]
    fn test_nearest_state_fallback() {
        // Fe4+ 不在表内，回退到同元素最近价态
        let (_, src) = shannon_radius("Fe", 4, 6).unwrap();
        assert_eq!(src, RadiusSource::TableNearestState);
    }

    #[test]
    fn test_missing_element() {
        assert!(shannon_radius("Xx", 2, 6).is_none());
    }

    #[test]
    fn test_oxygen_anion() {
        let (r, src) = shannon_radius("O", -2, 6).unwrap();
        assert!((r - 1.40).abs() < 1e-9);
        assert_eq!(src, RadiusSource::TableExact);
    }
}
