//! # 校验阈值配置
//!
//! 集中定义各规则校验器的阈值常数，以及氧化态共识引擎的
//! 分歧仲裁策略。所有校验均输出连续信号，阈值只用于
//! `passed` 参考布尔值与 details 中的标注，从不作为硬性判据。
//!
//! ## 依赖关系
//! - 被 `oxi/`, `neighbors.rs`, `validators/`, `pipeline.rs` 使用
//! - 无外部模块依赖

/// 两种氧化态估计方法结果不一致时的仲裁策略
///
/// 化学上两种选择都说得通：成分法基于更广的经验数据，
/// 键几何法利用了实际原子间距。默认偏向成分法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisagreementPolicy {
    /// 取成分电荷平衡法的结果（默认）
    #[default]
    PreferChargeBalance,
    /// 取键几何法的结果
    PreferBondGeometry,
}

/// 校验阈值集合
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Shannon 半径检验：键长偏差容限（相对期望键长的分数）
    pub shannon_tolerance: f64,

    /// 键价和检验：单个位点 |BVS - 期望| / |期望| 容限
    pub bvs_tolerance: f64,

    /// GII 参考阈值（v.u.），仅用于 passed 参考值
    pub gii_threshold: f64,

    /// Pauling 第二规则：静电键强和偏差容限
    pub pauling_r2_tolerance: f64,

    /// Goldschmidt 容忍因子的稳定区间下界
    pub goldschmidt_min: f64,
    /// Goldschmidt 容忍因子的稳定区间上界
    pub goldschmidt_max: f64,

    /// 空间群合理性：实验条目占比低于此值视为可疑
    pub spacegroup_min_fraction: f64,

    /// 近邻搜索半径（Å）
    pub neighbor_search_radius: f64,

    /// 配位壳层窗口：计入 d <= d_min * (1 + window) 的近邻
    pub neighbor_window: f64,

    /// 键价和的距离截断（Å）
    pub bvs_cutoff: f64,

    /// 逐位点扫描的位点数上限（大晶胞性能保护）
    pub max_sites_scanned: usize,

    /// 氧化态方法分歧时的仲裁策略
    pub disagreement_policy: DisagreementPolicy,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            shannon_tolerance: 0.25,
            bvs_tolerance: 0.35,
            gii_threshold: 0.2,
            pauling_r2_tolerance: 0.25,
            goldschmidt_min: 0.71,
            goldschmidt_max: 1.05,
            spacegroup_min_fraction: 0.01,
            neighbor_search_radius: 5.0,
            neighbor_window: 0.30,
            bvs_cutoff: 4.0,
            max_sites_scanned: 50,
            disagreement_policy: DisagreementPolicy::default(),
        }
    }
}
