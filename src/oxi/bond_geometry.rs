//! # 键几何法（structure-aware）
//!
//! 利用实际键长估计氧化态：阴离子形成元素取标准阴离子价态；
//! 每个阳离子位点对其各候选已知价态计算经验键价和（BVS），
//! 选 BVS 最接近的候选态。同一元素在不同位点得到不同价态时
//! 即为混合价，结果以多值列表（升序）记录。
//!
//! 与成分法相比该方法失败率更高：缺少键价参数、阳离子在截断
//! 半径内没有阴离子近邻、候选态全部不可算，任何一个位点无法
//! 赋值都导致整体失败（返回 None）。失败是正常结果，不是错误。
//!
//! ## 依赖关系
//! - 被 `oxi/mod.rs` 使用
//! - 使用 `chem/{elements,bond_valence}.rs`, `neighbors.rs`

use crate::chem::{bond_valence, elements};
use crate::config::Thresholds;
use crate::models::Crystal;
use crate::neighbors;
use crate::oxi::RawStates;

/// 估计每元素氧化态（可能多值）；失败返回 None
pub fn estimate(crystal: &Crystal, thresholds: &Thresholds) -> Option<RawStates> {
    let mut result = RawStates::new();

    for (i, site) in crystal.sites.iter().enumerate() {
        let el = site.element.as_str();

        let state = if let Some(anion) = elements::anion_state(el) {
            anion
        } else {
            estimate_cation_site(crystal, i, thresholds)?
        };

        let entry = result.entry(el.to_string()).or_default();
        if !entry.contains(&state) {
            entry.push(state);
        }
    }

    if result.is_empty() {
        return None;
    }
    for states in result.values_mut() {
        states.sort();
    }
    Some(result)
}

/// 单个阳离子位点：候选态中取 BVS 最接近者
fn estimate_cation_site(crystal: &Crystal, site_index: usize, thresholds: &Thresholds) -> Option<i32> {
    let el = crystal.sites[site_index].element.as_str();
    let candidates: Vec<i32> = elements::known_oxidation_states(el)
        .iter()
        .copied()
        .filter(|s| *s > 0)
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let anion_neighbors: Vec<neighbors::Neighbor> =
        neighbors::neighbors_within(crystal, site_index, thresholds.bvs_cutoff)
            .into_iter()
            .filter(|n| elements::is_anion_former(&n.element))
            .collect();
    if anion_neighbors.is_empty() {
        return None;
    }

    let mut best: Option<(i32, f64)> = None;
    for candidate in candidates {
        let mut bvs = 0.0;
        let mut computable = true;
        for n in &anion_neighbors {
            match bond_valence::r0(el, candidate, &n.element) {
                Some(r0) => bvs += bond_valence::bond_valence(r0, n.distance),
                None => {
                    computable = false;
                    break;
                }
            }
        }
        if !computable {
            continue;
        }

        let deviation = (bvs - candidate as f64).abs();
        if best.map(|(_, d)| deviation < d).unwrap_or(true) {
            best = Some((candidate, deviation));
        }
    }

    best.map(|(state, _)| state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lattice, Site};

    fn perovskite_catio3() -> Crystal {
        let lattice = Lattice::from_parameters(3.905, 3.905, 3.905, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new("Ca", [0.0, 0.0, 0.0]),
            Site::new("Ti", [0.5, 0.5, 0.5]),
            Site::new("O", [0.5, 0.5, 0.0]),
            Site::new("O", [0.5, 0.0, 0.5]),
            Site::new("O", [0.0, 0.5, 0.5]),
        ];
        Crystal::new("CaTiO3", lattice, sites)
    }

    #[test]
    fn test_perovskite_assignment() {
        let states = estimate(&perovskite_catio3(), &Thresholds::default()).unwrap();
        assert_eq!(states.get("Ca"), Some(&vec![2]));
        assert_eq!(states.get("Ti"), Some(&vec![4]));
        assert_eq!(states.get("O"), Some(&vec![-2]));
    }

    #[test]
    fn test_unknown_cation_fails() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new("Xx", [0.0, 0.0, 0.0]),
            Site::new("O", [0.5, 0.5, 0.5]),
        ];
        let crystal = Crystal::new("XxO", lattice, sites);
        assert!(estimate(&crystal, &Thresholds::default()).is_none());
    }

    #[test]
    fn test_cation_without_anion_neighbors_fails() {
        // 纯金属：没有阴离子近邻，方法应失败
        let lattice = Lattice::from_parameters(2.87, 2.87, 2.87, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new("Fe", [0.0, 0.0, 0.0]),
            Site::new("Fe", [0.5, 0.5, 0.5]),
        ];
        let crystal = Crystal::new("Fe", lattice, sites);
        assert!(estimate(&crystal, &Thresholds::default()).is_none());
    }

    #[test]
    fn test_deterministic() {
        let crystal = perovskite_catio3();
        let th = Thresholds::default();
        assert_eq!(estimate(&crystal, &th), estimate(&crystal, &th));
    }
}
