//! # 配位环境缓存 (NeighborCache)
//!
//! 每个结构只计算一次的局域配位环境（逐位点最近邻列表），供
//! Shannon 半径与 Pauling 第二规则检验共享，避免重复的近邻搜索。
//!
//! 配位检测采用距离窗口规则：以位点最近邻距离 d_min 为基准，
//! 计入 d <= d_min * (1 + window) 的全部周期近邻。个别位点失败
//! （搜索半径内无近邻）则从映射中省略，由校验器按
//! "无法检验该位点" 处理，绝不致命。
//!
//! 缓存是结构专属的瞬态数据：构造后只读，随材料校验结束丢弃，
//! 不持久化、不跨结构共享。
//!
//! ## 依赖关系
//! - 被 `validators/shannon_radii.rs`, `validators/pauling_rule2.rs`,
//!   `oxi/bond_geometry.rs`, `pipeline.rs` 使用
//! - 使用 `models/structure.rs`, `config.rs`

use crate::config::Thresholds;
use crate::models::Crystal;

use std::collections::HashMap;

/// 单个近邻记录
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// 近邻位点在结构中的索引（同一位点的不同周期镜像各记一条）
    pub site_index: usize,
    /// 近邻元素符号
    pub element: String,
    /// 键长（Å）
    pub distance: f64,
}

/// 位点索引 → 配位壳层近邻列表
#[derive(Debug, Default)]
pub struct NeighborCache {
    map: HashMap<usize, Vec<Neighbor>>,
}

impl NeighborCache {
    /// 为一个结构构建配位缓存
    pub fn build(crystal: &Crystal, thresholds: &Thresholds) -> Self {
        let mut map = HashMap::new();

        for i in 0..crystal.n_sites() {
            let mut all = neighbors_within(crystal, i, thresholds.neighbor_search_radius);
            if all.is_empty() {
                // 孤立位点：省略，校验器将跳过该位点
                continue;
            }
            all.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let d_min = all[0].distance;
            let cutoff = d_min * (1.0 + thresholds.neighbor_window);
            let shell: Vec<Neighbor> = all.into_iter().filter(|n| n.distance <= cutoff).collect();
            map.insert(i, shell);
        }

        NeighborCache { map }
    }

    /// 某位点的配位壳层；缓存中没有该位点时返回 None
    pub fn get(&self, site_index: usize) -> Option<&[Neighbor]> {
        self.map.get(&site_index).map(|v| v.as_slice())
    }

    /// 某位点的配位数
    pub fn coordination(&self, site_index: usize) -> Option<usize> {
        self.map.get(&site_index).map(|v| v.len())
    }

    /// 缓存覆盖的位点数
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// 搜索半径内的全部周期近邻（不做窗口筛选）
///
/// 周期镜像范围由晶胞垂直高度决定，保证覆盖整个搜索球。
pub fn neighbors_within(crystal: &Crystal, site_index: usize, radius: f64) -> Vec<Neighbor> {
    let heights = crystal.lattice.heights();
    let bounds: Vec<i32> = heights
        .iter()
        .map(|h| (radius / h).ceil() as i32)
        .collect();

    let frac_i = crystal.sites[site_index].position;
    let mut neighbors = Vec::new();

    for (j, site_j) in crystal.sites.iter().enumerate() {
        for sa in -bounds[0]..=bounds[0] {
            for sb in -bounds[1]..=bounds[1] {
                for sc in -bounds[2]..=bounds[2] {
                    if j == site_index && sa == 0 && sb == 0 && sc == 0 {
                        continue;
                    }
                    let df = [
                        site_j.position[0] + sa as f64 - frac_i[0],
                        site_j.position[1] + sb as f64 - frac_i[1],
                        site_j.position[2] + sc as f64 - frac_i[2],
                    ];
                    let cart = crystal.lattice.cartesian(df);
                    let d = (cart[0] * cart[0] + cart[1] * cart[1] + cart[2] * cart[2]).sqrt();
                    if d <= radius && d > 1e-8 {
                        neighbors.push(Neighbor {
                            site_index: j,
                            element: site_j.element.clone(),
                            distance: d,
                        });
                    }
                }
            }
        }
    }

    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lattice, Site};

    /// 岩盐结构 NaCl 常规晶胞
    fn rocksalt() -> Crystal {
        let lattice = Lattice::from_parameters(5.64, 5.64, 5.64, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new("Na", [0.0, 0.0, 0.0]),
            Site::new("Na", [0.5, 0.5, 0.0]),
            Site::new("Na", [0.5, 0.0, 0.5]),
            Site::new("Na", [0.0, 0.5, 0.5]),
            Site::new("Cl", [0.5, 0.0, 0.0]),
            Site::new("Cl", [0.0, 0.5, 0.0]),
            Site::new("Cl", [0.0, 0.0, 0.5]),
            Site::new("Cl", [0.5, 0.5, 0.5]),
        ];
        Crystal::new("NaCl", lattice, sites)
    }

    #[test]
    fn test_rocksalt_coordination_six() {
        let crystal = rocksalt();
        let cache = NeighborCache::build(&crystal, &Thresholds::default());

        // 每个 Na 位点有 6 个 Cl 最近邻，键长 a/2 = 2.82 Å
        let shell = cache.get(0).unwrap();
        assert_eq!(shell.len(), 6);
        for n in shell {
            assert_eq!(n.element, "Cl");
            assert!((n.distance - 2.82).abs() < 1e-6);
        }
        assert_eq!(cache.coordination(0), Some(6));
    }

    #[test]
    fn test_all_sites_covered() {
        let crystal = rocksalt();
        let cache = NeighborCache::build(&crystal, &Thresholds::default());
        assert_eq!(cache.len(), 8);
    }

    #[test]
    fn test_isolated_site_omitted() {
        // 巨大晶胞中的单原子：搜索半径内无近邻
        let lattice = Lattice::from_parameters(50.0, 50.0, 50.0, 90.0, 90.0, 90.0);
        let crystal = Crystal::new(
            "lone",
            lattice,
            vec![Site::new("Fe", [0.0, 0.0, 0.0])],
        );
        let cache = NeighborCache::build(&crystal, &Thresholds::default());
        assert!(cache.get(0).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_neighbors_within_counts_periodic_images() {
        // 简单立方单原子晶胞：第一壳层 6 个镜像
        let lattice = Lattice::from_parameters(3.0, 3.0, 3.0, 90.0, 90.0, 90.0);
        let crystal = Crystal::new("sc", lattice, vec![Site::new("Po", [0.0, 0.0, 0.0])]);
        let shell = neighbors_within(&crystal, 0, 3.1);
        assert_eq!(shell.len(), 6);
    }
}
