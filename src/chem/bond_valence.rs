//! # 键价参数表 (Brown–Altermatt)
//!
//! 阳离子–阴离子对的经验键价参数 R0（Å），统一取 B = 0.37 Å。
//! 来源：Brown & Altermatt (1985), Acta Cryst. B41, 244-247（ICSD 拟合）。
//!
//! 单根键的键价 s = exp((R0 - d) / B)；一个位点的键价和（BVS）
//! 是其与异号近邻各键键价之和，理想情况下等于该位点氧化态的绝对值。
//!
//! ## 依赖关系
//! - 被 `oxi/bond_geometry.rs`, `validators/bond_valence_sum.rs` 使用
//! - 无外部模块依赖

/// 键价公式的普适衰减常数 B（Å）
pub const BV_B: f64 = 0.37;

/// (阳离子, 阳离子价态, 阴离子, R0)
static BV_PARAMS: &[(&str, i32, &str, f64)] = &[
    // 一价
    ("H", 1, "O", 0.907),
    ("Li", 1, "O", 1.466),
    ("Na", 1, "O", 1.803),
    ("K", 1, "O", 2.132),
    ("Rb", 1, "O", 2.263),
    ("Cs", 1, "O", 2.417),
    ("Cu", 1, "O", 1.593),
    ("Ag", 1, "O", 1.842),
    ("Tl", 1, "O", 2.124),
    // 二价
    ("Be", 2, "O", 1.381),
    ("Mg", 2, "O", 1.693),
    ("Ca", 2, "O", 1.967),
    ("Sr", 2, "O", 2.118),
    ("Ba", 2, "O", 2.285),
    ("Mn", 2, "O", 1.790),
    ("Fe", 2, "O", 1.734),
    ("Co", 2, "O", 1.692),
    ("Ni", 2, "O", 1.654),
    ("Cu", 2, "O", 1.679),
    ("Zn", 2, "O", 1.704),
    ("Cd", 2, "O", 1.904),
    ("Sn", 2, "O", 1.984),
    ("Pb", 2, "O", 2.112),
    ("Eu", 2, "O", 2.147),
    ("Pd", 2, "O", 1.792),
    ("Pt", 2, "O", 1.768),
    ("Hg", 2, "O", 1.972),
    // 三价
    ("B", 3, "O", 1.371),
    ("Al", 3, "O", 1.651),
    ("Sc", 3, "O", 1.849),
    ("Ti", 3, "O", 1.791),
    ("V", 3, "O", 1.743),
    ("Cr", 3, "O", 1.724),
    ("Mn", 3, "O", 1.760),
    ("Fe", 3, "O", 1.759),
    ("Co", 3, "O", 1.700),
    ("Ni", 3, "O", 1.686),
    ("Ga", 3, "O", 1.730),
    ("In", 3, "O", 1.902),
    ("Y", 3, "O", 2.014),
    ("Rh", 3, "O", 1.791),
    ("Ru", 3, "O", 1.770),
    ("Sb", 3, "O", 1.973),
    ("Bi", 3, "O", 2.094),
    ("La", 3, "O", 2.172),
    ("Ce", 3, "O", 2.151),
    ("Pr", 3, "O", 2.138),
    ("Nd", 3, "O", 2.117),
    ("Sm", 3, "O", 2.088),
    ("Eu", 3, "O", 2.074),
    ("Gd", 3, "O", 2.065),
    ("Tb", 3, "O", 2.049),
    ("Dy", 3, "O", 2.036),
    ("Ho", 3, "O", 2.023),
    ("Er", 3, "O", 2.010),
    ("Tm", 3, "O", 2.000),
    ("Yb", 3, "O", 1.985),
    ("Lu", 3, "O", 1.971),
    ("Ir", 3, "O", 1.870),
    ("Au", 3, "O", 1.890),
    ("Tl", 3, "O", 2.003),
    ("As", 3, "O", 1.789),
    ("Ac", 3, "O", 2.240),
    // 四价
    ("C", 4, "O", 1.390),
    ("Si", 4, "O", 1.624),
    ("Ti", 4, "O", 1.815),
    ("Mn", 4, "O", 1.753),
    ("V", 4, "O", 1.784),
    ("Ge", 4, "O", 1.748),
    ("Zr", 4, "O", 1.937),
    ("Nb", 4, "O", 1.880),
    ("Mo", 4, "O", 1.886),
    ("Ru", 4, "O", 1.834),
    ("Rh", 4, "O", 1.820),
    ("Pd", 4, "O", 1.810),
    ("Sn", 4, "O", 1.905),
    ("Te", 4, "O", 1.977),
    ("Se", 4, "O", 1.811),
    ("Ce", 4, "O", 2.028),
    ("Pr", 4, "O", 2.020),
    ("Tb", 4, "O", 1.936),
    ("Hf", 4, "O", 1.923),
    ("W", 4, "O", 1.880),
    ("Re", 4, "O", 1.860),
    ("Os", 4, "O", 1.811),
    ("Ir", 4, "O", 1.870),
    ("Pt", 4, "O", 1.879),
    ("Pb", 4, "O", 2.042),
    ("Th", 4, "O", 2.167),
    ("U", 4, "O", 2.112),
    ("Tc", 4, "O", 1.870),
    // 五价
    ("P", 5, "O", 1.617),
    ("V", 5, "O", 1.803),
    ("As", 5, "O", 1.767),
    ("Nb", 5, "O", 1.911),
    ("Sb", 5, "O", 1.942),
    ("Ta", 5, "O", 1.920),
    ("Ru", 5, "O", 1.900),
    ("Ir", 5, "O", 1.916),
    ("Br", 5, "O", 1.840),
    ("I", 5, "O", 2.003),
    // 六价及以上
    ("S", 6, "O", 1.624),
    ("Cr", 6, "O", 1.794),
    ("Se", 6, "O", 1.788),
    ("Mo", 6, "O", 1.907),
    ("W", 6, "O", 1.921),
    ("Te", 6, "O", 1.917),
    ("U", 6, "O", 2.075),
    ("Os", 6, "O", 1.925),
    ("Mn", 7, "O", 1.790),
    ("Re", 7, "O", 1.970),
    ("Tc", 7, "O", 1.909),
    ("Cl", 7, "O", 1.632),
    ("I", 7, "O", 1.930),
    ("N", 5, "O", 1.361),
    ("N", 3, "O", 1.361),
    ("Cl", 5, "O", 1.632),
    ("P", 3, "O", 1.617),
    // 氟化物
    ("Li", 1, "F", 1.360),
    ("Na", 1, "F", 1.677),
    ("K", 1, "F", 1.992),
    ("Mg", 2, "F", 1.578),
    ("Ca", 2, "F", 1.842),
    ("Sr", 2, "F", 2.019),
    ("Ba", 2, "F", 2.188),
    ("Al", 3, "F", 1.545),
    ("Fe", 3, "F", 1.679),
    ("Ti", 4, "F", 1.723),
    ("Mn", 2, "F", 1.698),
    ("Zn", 2, "F", 1.594),
    // 氯化物
    ("Na", 1, "Cl", 2.150),
    ("K", 1, "Cl", 2.519),
    ("Ca", 2, "Cl", 2.370),
    ("Mn", 2, "Cl", 2.133),
    ("Fe", 2, "Cl", 2.060),
    ("Cd", 2, "Cl", 2.230),
    ("Pb", 2, "Cl", 2.530),
    ("Cu", 2, "Cl", 2.000),
    // 溴化物 / 碘化物
    ("Na", 1, "Br", 2.330),
    ("K", 1, "Br", 2.660),
    ("Mn", 2, "Br", 2.340),
    ("Na", 1, "I", 2.560),
    ("K", 1, "I", 2.880),
    // 硫化物
    ("Ca", 2, "S", 2.450),
    ("Mn", 2, "S", 2.200),
    ("Fe", 2, "S", 2.125),
    ("Cu", 2, "S", 2.054),
    ("Zn", 2, "S", 2.090),
    ("Cd", 2, "S", 2.304),
    ("La", 3, "S", 2.643),
    // 硒化物 / 碲化物
    ("Zn", 2, "Se", 2.220),
    ("Cd", 2, "Se", 2.400),
    ("Zn", 2, "Te", 2.450),
    // 氮化物
    ("Si", 4, "N", 1.770),
    ("Al", 3, "N", 1.790),
    ("Ti", 4, "N", 1.930),
    ("Ta", 5, "N", 2.010),
];

/// 查 (阳离子, 价态, 阴离子) 的键价参数 R0
pub fn r0(cation: &str, cation_state: i32, anion: &str) -> Option<f64> {
    BV_PARAMS
        .iter()
        .find(|(c, s, a, _)| *c == cation && *s == cation_state && *a == anion)
        .map(|(_, _, _, r)| *r)
}

/// 单根键的键价贡献 s = exp((R0 - d) / B)
pub fn bond_valence(r0: f64, distance: f64) -> f64 {
    ((r0 - distance) / BV_B).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_r0_lookup() {
        assert!((r0("Ti", 4, "O").unwrap() - 1.815).abs() < 1e-9);
        assert!((r0("Ca", 2, "O").unwrap() - 1.967).abs() < 1e-9);
        assert!(r0("Ti", 4, "Xx").is_none());
        assert!(r0("Xx", 2, "O").is_none());
    }

    #[test]
    fn test_bond_valence_decays_with_distance() {
        let r = r0("Ti", 4, "O").unwrap();
        let near = bond_valence(r, 1.90);
        let far = bond_valence(r, 2.20);
        assert!(near > far);
        assert!(far > 0.0);
    }

    #[test]
    fn test_bond_valence_at_r0_is_unity() {
        assert!((bond_valence(1.815, 1.815) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_octahedral_ti_bvs_near_four() {
        // 立方钙钛矿 CaTiO3 (a=3.905 Å) 中 Ti-O 距离 a/2，六配位
        let r = r0("Ti", 4, "O").unwrap();
        let s = bond_valence(r, 3.905 / 2.0);
        let bvs = 6.0 * s;
        assert!((bvs - 4.0).abs() < 0.5, "bvs = {}", bvs);
    }
}
