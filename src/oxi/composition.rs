//! # 成分电荷平衡法（composition-only）
//!
//! 不看几何，只用成分：在各元素的已知氧化态组合中枚举，
//! 返回第一个使化学计量加权电荷和为零的组合。元素按字典序、
//! 候选态按经验常见度排列，因此结果确定且偏向常见价态组合。
//!
//! 任一元素没有已知氧化态、或枚举预算耗尽仍无中性组合时，
//! 方法失败（返回 None），不抛出任何错误。
//!
//! ## 依赖关系
//! - 被 `oxi/mod.rs` 使用
//! - 使用 `chem/elements.rs`

use crate::chem::elements;
use crate::oxi::FlatStates;

use std::collections::BTreeMap;

/// 枚举组合数上限（防止高元多态成分的组合爆炸）
const MAX_COMBINATIONS: usize = 100_000;

/// 估计每元素氧化态；失败返回 None
pub fn estimate(composition: &BTreeMap<String, usize>) -> Option<FlatStates> {
    if composition.is_empty() {
        return None;
    }

    let mut entries: Vec<(&str, i64, &'static [i32])> = Vec::new();
    for (el, count) in composition {
        let states = elements::known_oxidation_states(el);
        if states.is_empty() {
            return None;
        }
        entries.push((el.as_str(), *count as i64, states));
    }

    // 里程计式枚举：indices[k] 指向第 k 个元素的候选态
    let mut indices = vec![0usize; entries.len()];
    let mut examined = 0usize;

    loop {
        examined += 1;
        if examined > MAX_COMBINATIONS {
            return None;
        }

        let total: i64 = entries
            .iter()
            .zip(&indices)
            .map(|((_, count, states), &idx)| states[idx] as i64 * count)
            .sum();

        if total == 0 {
            let mut result = FlatStates::new();
            for ((el, _, states), &idx) in entries.iter().zip(&indices) {
                result.insert(el.to_string(), states[idx]);
            }
            return Some(result);
        }

        // 进位
        let mut k = entries.len();
        loop {
            if k == 0 {
                return None;
            }
            k -= 1;
            indices[k] += 1;
            if indices[k] < entries[k].2.len() {
                break;
            }
            indices[k] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
        pairs
            .iter()
            .map(|(el, n)| (el.to_string(), *n))
            .collect()
    }

    #[test]
    fn test_perovskite() {
        let states = estimate(&comp(&[("Ca", 1), ("Ti", 1), ("O", 3)])).unwrap();
        assert_eq!(states.get("Ca"), Some(&2));
        assert_eq!(states.get("Ti"), Some(&4));
        assert_eq!(states.get("O"), Some(&-2));
    }

    #[test]
    fn test_spinel() {
        let states = estimate(&comp(&[("Mg", 1), ("Al", 2), ("O", 4)])).unwrap();
        assert_eq!(states.get("Mg"), Some(&2));
        assert_eq!(states.get("Al"), Some(&3));
    }

    #[test]
    fn test_prefers_common_states() {
        // Fe2O3：Fe 最常见态 +3 直接平衡
        let states = estimate(&comp(&[("Fe", 2), ("O", 3)])).unwrap();
        assert_eq!(states.get("Fe"), Some(&3));
    }

    #[test]
    fn test_unknown_element_fails() {
        assert!(estimate(&comp(&[("Xx", 1), ("O", 1)])).is_none());
    }

    #[test]
    fn test_unbalanceable_fails() {
        // 纯 Na 无法电荷中性（Na 只有 +1）
        assert!(estimate(&comp(&[("Na", 1)])).is_none());
    }

    #[test]
    fn test_deterministic() {
        let c = comp(&[("Ca", 1), ("Ti", 1), ("O", 3)]);
        assert_eq!(estimate(&c), estimate(&c));
    }
}
