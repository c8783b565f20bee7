//! # 晶体结构数据模型
//!
//! 定义被所有校验器共享的晶体结构表示：晶格 + 有序原子位点列表。
//! 结构由外部加载器提供（见 `parsers/`），进入核心后只读不变。
//!
//! 与一般的结构转换工具不同，这里的几何检验需要周期性边界条件下的
//! 原子间距，因此 `Lattice` 额外提供分数坐标 → 笛卡尔坐标变换与
//! 晶胞垂直高度，供 `neighbors.rs` 的周期镜像搜索使用。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `neighbors.rs`, `oxi/`, `validators/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 晶格参数表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let alpha_rad = alpha.to_radians();
        let beta_rad = beta.to_radians();
        let gamma_rad = gamma.to_radians();

        let cos_alpha = alpha_rad.cos();
        let cos_beta = beta_rad.cos();
        let cos_gamma = gamma_rad.cos();
        let sin_gamma = gamma_rad.sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();
        let c_vec = [c1, c2, c3];

        Lattice {
            matrix: [a_vec, b_vec, c_vec],
        }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let a_vec = self.matrix[0];
        let b_vec = self.matrix[1];
        let c_vec = self.matrix[2];

        let a = norm(a_vec);
        let b = norm(b_vec);
        let c = norm(c_vec);

        let alpha = (dot(b_vec, c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(a_vec, c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(a_vec, b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 分数坐标 → 笛卡尔坐标
    pub fn cartesian(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = &self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 三个晶格方向上的晶胞垂直高度，用于确定周期镜像搜索范围
    pub fn heights(&self) -> [f64; 3] {
        let v = self.volume().abs();
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];
        [
            v / norm(cross(b, c)),
            v / norm(cross(a, c)),
            v / norm(cross(a, b)),
        ]
    }

}

fn dot(x: [f64; 3], y: [f64; 3]) -> f64 {
    x[0] * y[0] + x[1] * y[1] + x[2] * y[2]
}

fn cross(x: [f64; 3], y: [f64; 3]) -> [f64; 3] {
    [
        x[1] * y[2] - x[2] * y[1],
        x[2] * y[0] - x[0] * y[2],
        x[0] * y[1] - x[1] * y[0],
    ]
}

fn norm(x: [f64; 3]) -> f64 {
    dot(x, x).sqrt()
}

/// 原子位点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Site {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Site {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称（通常为材料 ID）
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子位点列表（有序）
    pub sites: Vec<Site>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, sites: Vec<Site>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            sites,
        }
    }

    /// 位点数
    pub fn n_sites(&self) -> usize {
        self.sites.len()
    }

    /// 元素 → 位点计数
    pub fn composition(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for site in &self.sites {
            *counts.entry(site.element.clone()).or_insert(0) += 1;
        }
        counts
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_from_parameters_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let (a, b, c, alpha, beta, gamma) = lattice.parameters();

        assert!((a - 5.0).abs() < 1e-6);
        assert!((b - 5.0).abs() < 1e-6);
        assert!((c - 5.0).abs() < 1e-6);
        assert!((alpha - 90.0).abs() < 1e-6);
        assert!((beta - 90.0).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_volume_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let vol = lattice.volume().abs();

        // 5^3 = 125
        assert!((vol - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_cartesian_conversion() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let cart = lattice.cartesian([0.5, 0.5, 0.5]);

        assert!((cart[0] - 2.0).abs() < 1e-6);
        assert!((cart[1] - 2.0).abs() < 1e-6);
        assert!((cart[2] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_heights_cubic() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let h = lattice.heights();
        for k in 0..3 {
            assert!((h[k] - 4.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_crystal_composition() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new("Ca", [0.0, 0.0, 0.0]),
            Site::new("Ti", [0.5, 0.5, 0.5]),
            Site::new("O", [0.5, 0.5, 0.0]),
            Site::new("O", [0.5, 0.0, 0.5]),
            Site::new("O", [0.0, 0.5, 0.5]),
        ];
        let crystal = Crystal::new("CaTiO3", lattice, sites);

        let comp = crystal.composition();
        assert_eq!(comp.get("Ca"), Some(&1));
        assert_eq!(comp.get("Ti"), Some(&1));
        assert_eq!(comp.get("O"), Some(&3));
        assert_eq!(crystal.n_sites(), 5);
    }
}
