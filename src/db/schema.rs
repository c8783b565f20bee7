//! # SQLite 表结构定义
//!
//! 审计数据库的全部 DDL：表、视图、索引。
//! `validation_results` 以 (material_id, check_name) 为主键，
//! 重跑同一检验时覆盖旧行，这是断点续跑幂等性的基础。
//!
//! ## 依赖关系
//! - 被 `db/store.rs` 使用
//! - 使用 `rusqlite`

use crate::error::Result;

use rusqlite::Connection;

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS materials (
        material_id TEXT PRIMARY KEY,
        composition TEXT NOT NULL,
        reduced_formula TEXT NOT NULL,
        elements TEXT NOT NULL,          -- JSON 数组
        n_sites INTEGER NOT NULL,
        volume REAL NOT NULL,
        density REAL NOT NULL,
        space_group TEXT,
        space_group_number INTEGER,
        crystal_system TEXT,
        oxide_type TEXT NOT NULL,        -- ABO3, AB2O4, ... 或 'other'
        compound_class TEXT NOT NULL     -- pure_oxide, oxyhalide, ...
    )",
    "CREATE TABLE IF NOT EXISTS oxidation_state_assignments (
        material_id TEXT PRIMARY KEY REFERENCES materials(material_id),
        method_used TEXT NOT NULL,       -- bond_geometry | charge_balance | both_agree | both_disagree | none
        oxi_states TEXT,                 -- JSON: 最终采用的赋值
        bond_geometry_result TEXT,       -- JSON: 键几何法原始结果
        charge_balance_result TEXT,      -- JSON: 成分法原始结果
        confidence TEXT NOT NULL,        -- both_agree | single_method | methods_disagree | no_assignment
        has_mixed_valence INTEGER NOT NULL DEFAULT 0,
        mixed_valence_elements TEXT      -- JSON
    )",
    "CREATE TABLE IF NOT EXISTS validation_results (
        material_id TEXT NOT NULL REFERENCES materials(material_id),
        check_name TEXT NOT NULL,
        tier INTEGER NOT NULL,
        independence TEXT NOT NULL,
        status TEXT NOT NULL,            -- completed | skipped_no_params | skipped_not_applicable | error
        passed INTEGER,                  -- 0/1，仅 status=completed 时有意义
        confidence REAL,
        score REAL,
        details TEXT,                    -- JSON
        error_message TEXT,
        run_timestamp TEXT NOT NULL,
        PRIMARY KEY (material_id, check_name)
    )",
    "CREATE TABLE IF NOT EXISTS spacegroup_stats (
        chemsys TEXT NOT NULL,
        space_group_number INTEGER NOT NULL,
        space_group TEXT,
        count INTEGER NOT NULL,
        fraction REAL NOT NULL,
        PRIMARY KEY (chemsys, space_group_number)
    )",
];

const VIEWS: &[&str] = &["CREATE VIEW IF NOT EXISTS v_audit_summary AS
    SELECT
        vr.check_name,
        vr.tier,
        vr.independence,
        COUNT(*) AS total,
        SUM(CASE WHEN vr.status = 'completed' THEN 1 ELSE 0 END) AS computed,
        SUM(CASE WHEN vr.status = 'completed' AND vr.passed = 1 THEN 1 ELSE 0 END) AS passed,
        SUM(CASE WHEN vr.status = 'completed' AND vr.passed = 0 THEN 1 ELSE 0 END) AS failed,
        SUM(CASE WHEN vr.status = 'skipped_no_params' THEN 1 ELSE 0 END) AS skipped_no_params,
        SUM(CASE WHEN vr.status = 'skipped_not_applicable' THEN 1 ELSE 0 END) AS skipped_na,
        SUM(CASE WHEN vr.status = 'error' THEN 1 ELSE 0 END) AS errors
    FROM validation_results vr
    GROUP BY vr.check_name, vr.tier, vr.independence"];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_vr_check ON validation_results(check_name)",
    "CREATE INDEX IF NOT EXISTS idx_vr_status ON validation_results(status)",
    "CREATE INDEX IF NOT EXISTS idx_materials_formula ON materials(reduced_formula)",
    "CREATE INDEX IF NOT EXISTS idx_materials_oxide_type ON materials(oxide_type)",
];

/// 建表、建视图、建索引（全部幂等）
pub fn init_db(conn: &Connection) -> Result<()> {
    for ddl in TABLES.iter().chain(VIEWS).chain(INDEXES) {
        conn.execute_batch(ddl)?;
    }
    Ok(())
}
