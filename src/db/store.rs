//! # 审计数据库读写 (AuditStore)
//!
//! 所有 SQLite 读写都经过这里。写入全部 INSERT OR REPLACE，
//! 配合主键约束天然幂等。`begin`/`commit` 暴露显式事务边界，
//! 管线以"每材料一个事务"的粒度提交，任何时刻中断后重跑
//! 都能从断点继续。
//!
//! ## 依赖关系
//! - 被 `pipeline.rs`, `commands/` 使用
//! - 使用 `db/schema.rs`, `models/`, `oxi/`, `validators/`
//! - 使用 `rusqlite`（bundled）, `serde_json`, `chrono`

use crate::db::schema;
use crate::error::{AuditError, Result};
use crate::models::Material;
use crate::oxi::{Confidence, OxidationAssignment};
use crate::validators::ValidationResult;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 某化学体系下一个空间群的实验分布统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceGroupStat {
    pub chemsys: String,
    pub space_group_number: i64,
    pub space_group: Option<String>,
    pub count: i64,
    pub fraction: f64,
}

/// 从数据库读出的校验结果行
#[derive(Debug, Clone, Serialize)]
pub struct StoredValidation {
    pub material_id: String,
    pub check_name: String,
    pub tier: i64,
    pub independence: String,
    pub status: String,
    pub passed: Option<bool>,
    pub confidence: f64,
    pub score: Option<f64>,
    pub details: serde_json::Value,
    pub error_message: Option<String>,
    pub run_timestamp: String,
}

/// v_audit_summary 视图的一行
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub check_name: String,
    pub tier: i64,
    pub independence: String,
    pub total: i64,
    pub computed: i64,
    pub passed: i64,
    pub failed: i64,
    pub skipped_no_params: i64,
    pub skipped_na: i64,
    pub errors: i64,
}

/// 数据库整体统计
#[derive(Debug, Clone, Default)]
pub struct StoreStatistics {
    pub total_materials: i64,
    pub oxi_confidence_counts: BTreeMap<String, i64>,
    pub compound_class_counts: BTreeMap<String, i64>,
}

/// 审计数据库句柄
pub struct AuditStore {
    conn: Connection,
}

impl AuditStore {
    /// 打开（必要时初始化）数据库文件
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// 内存数据库，测试用
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=30000;",
        )?;
        schema::init_db(&conn)?;
        Ok(AuditStore { conn })
    }

    // ─────────────────────────────────────────────────────────────
    // 事务边界
    // ─────────────────────────────────────────────────────────────

    pub fn begin(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // 材料
    // ─────────────────────────────────────────────────────────────

    pub fn insert_material(&self, mat: &Material) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO materials
             (material_id, composition, reduced_formula, elements, n_sites, volume,
              density, space_group, space_group_number, crystal_system, oxide_type,
              compound_class)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                mat.material_id,
                mat.composition,
                mat.reduced_formula,
                serde_json::to_string(&mat.elements)?,
                mat.n_sites as i64,
                mat.volume,
                mat.density,
                mat.space_group,
                mat.space_group_number,
                mat.crystal_system,
                mat.oxide_type,
                mat.compound_class,
            ],
        )?;
        Ok(())
    }

    pub fn get_material(&self, material_id: &str) -> Result<Option<Material>> {
        self.conn
            .query_row(
                "SELECT material_id, composition, reduced_formula, elements, n_sites,
                        volume, density, space_group, space_group_number, crystal_system,
                        oxide_type, compound_class
                 FROM materials WHERE material_id = ?1",
                params![material_id],
                row_to_material,
            )
            .optional()
            .map_err(AuditError::from)
    }

    /// 全部材料 ID，按字典序（固定的批处理顺序）
    pub fn material_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT material_id FROM materials ORDER BY material_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    // ─────────────────────────────────────────────────────────────
    // 氧化态赋值
    // ─────────────────────────────────────────────────────────────

    pub fn insert_oxi_assignment(
        &self,
        material_id: &str,
        assignment: &OxidationAssignment,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO oxidation_state_assignments
             (material_id, method_used, oxi_states, bond_geometry_result,
              charge_balance_result, confidence, has_mixed_valence,
              mixed_valence_elements)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                material_id,
                assignment.method_used,
                opt_json(&assignment.states)?,
                opt_json(&assignment.bond_geometry_result)?,
                opt_json(&assignment.charge_balance_result)?,
                assignment.confidence.as_str(),
                assignment.has_mixed_valence,
                if assignment.mixed_valence_elements.is_empty() {
                    None
                } else {
                    Some(serde_json::to_string(&assignment.mixed_valence_elements)?)
                },
            ],
        )?;
        Ok(())
    }

    pub fn get_oxi_assignment(&self, material_id: &str) -> Result<Option<OxidationAssignment>> {
        let row = self
            .conn
            .query_row(
                "SELECT method_used, oxi_states, bond_geometry_result,
                        charge_balance_result, confidence, has_mixed_valence,
                        mixed_valence_elements
                 FROM oxidation_state_assignments WHERE material_id = ?1",
                params![material_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, bool>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()?;

        let (method, states, bg, cb, confidence, has_mixed, mixed) = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let confidence = Confidence::from_str(&confidence).ok_or_else(|| {
            AuditError::Other(format!("Unknown oxidation confidence in database: {confidence}"))
        })?;

        Ok(Some(OxidationAssignment {
            method_used: method,
            states: parse_opt_json(states)?,
            bond_geometry_result: parse_opt_json(bg)?,
            charge_balance_result: parse_opt_json(cb)?,
            confidence,
            has_mixed_valence: has_mixed,
            mixed_valence_elements: parse_opt_json(mixed)?.unwrap_or_default(),
        }))
    }

    // ─────────────────────────────────────────────────────────────
    // 校验结果
    // ─────────────────────────────────────────────────────────────

    pub fn insert_validation_result(
        &self,
        material_id: &str,
        result: &ValidationResult,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO validation_results
             (material_id, check_name, tier, independence, status, passed,
              confidence, score, details, error_message, run_timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                material_id,
                result.check_name,
                result.tier as i64,
                result.independence.as_str(),
                result.status.as_str(),
                result.passed,
                result.confidence,
                result.score,
                serde_json::to_string(&result.details)?,
                result.error_message,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 某材料的全部校验结果，按 (tier, check_name) 排序
    pub fn get_validation_results(&self, material_id: &str) -> Result<Vec<StoredValidation>> {
        let mut stmt = self.conn.prepare(
            "SELECT material_id, check_name, tier, independence, status, passed,
                    confidence, score, details, error_message, run_timestamp
             FROM validation_results WHERE material_id = ?1
             ORDER BY tier, check_name",
        )?;
        let rows = stmt
            .query_map(params![material_id], row_to_stored_validation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 断点续跑的核心查询：该 (材料, 检验) 是否已有结果
    pub fn has_validation_result(&self, material_id: &str, check_name: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM validation_results
                 WHERE material_id = ?1 AND check_name = ?2",
                params![material_id, check_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ─────────────────────────────────────────────────────────────
    // 空间群统计
    // ─────────────────────────────────────────────────────────────

    pub fn insert_spacegroup_stats(&self, stats: &[SpaceGroupStat]) -> Result<()> {
        for s in stats {
            self.conn.execute(
                "INSERT OR REPLACE INTO spacegroup_stats
                 (chemsys, space_group_number, space_group, count, fraction)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![s.chemsys, s.space_group_number, s.space_group, s.count, s.fraction],
            )?;
        }
        Ok(())
    }

    /// 某化学体系的空间群分布，按计数降序
    pub fn get_spacegroup_stats(&self, chemsys: &str) -> Result<Vec<SpaceGroupStat>> {
        let mut stmt = self.conn.prepare(
            "SELECT chemsys, space_group_number, space_group, count, fraction
             FROM spacegroup_stats WHERE chemsys = ?1 ORDER BY count DESC",
        )?;
        let rows = stmt
            .query_map(params![chemsys], |row| {
                Ok(SpaceGroupStat {
                    chemsys: row.get(0)?,
                    space_group_number: row.get(1)?,
                    space_group: row.get(2)?,
                    count: row.get(3)?,
                    fraction: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ─────────────────────────────────────────────────────────────
    // 汇总
    // ─────────────────────────────────────────────────────────────

    pub fn audit_summary(&self) -> Result<Vec<SummaryRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT check_name, tier, independence, total, computed, passed, failed,
                    skipped_no_params, skipped_na, errors
             FROM v_audit_summary ORDER BY tier, check_name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SummaryRow {
                    check_name: row.get(0)?,
                    tier: row.get(1)?,
                    independence: row.get(2)?,
                    total: row.get(3)?,
                    computed: row.get(4)?,
                    passed: row.get(5)?,
                    failed: row.get(6)?,
                    skipped_no_params: row.get(7)?,
                    skipped_na: row.get(8)?,
                    errors: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn statistics(&self) -> Result<StoreStatistics> {
        let total_materials: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM materials", [], |row| row.get(0))?;

        let mut stats = StoreStatistics {
            total_materials,
            ..Default::default()
        };

        let mut stmt = self.conn.prepare(
            "SELECT confidence, COUNT(*) FROM oxidation_state_assignments GROUP BY confidence",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (confidence, count) = row?;
            stats.oxi_confidence_counts.insert(confidence, count);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT compound_class, COUNT(*) FROM materials GROUP BY compound_class")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (class, count) = row?;
            stats.compound_class_counts.insert(class, count);
        }

        Ok(stats)
    }
}

fn row_to_material(row: &Row) -> rusqlite::Result<Material> {
    let elements_json: String = row.get(3)?;
    let elements: Vec<String> = serde_json::from_str(&elements_json).unwrap_or_default();
    Ok(Material {
        material_id: row.get(0)?,
        composition: row.get(1)?,
        reduced_formula: row.get(2)?,
        elements,
        n_sites: row.get::<_, i64>(4)? as usize,
        volume: row.get(5)?,
        density: row.get(6)?,
        space_group: row.get(7)?,
        space_group_number: row.get(8)?,
        crystal_system: row.get(9)?,
        oxide_type: row.get(10)?,
        compound_class: row.get(11)?,
    })
}

fn row_to_stored_validation(row: &Row) -> rusqlite::Result<StoredValidation> {
    let details_json: Option<String> = row.get(8)?;
    let details = details_json
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::Value::Null);
    Ok(StoredValidation {
        material_id: row.get(0)?,
        check_name: row.get(1)?,
        tier: row.get(2)?,
        independence: row.get(3)?,
        status: row.get(4)?,
        passed: row.get(5)?,
        confidence: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
        score: row.get(7)?,
        details,
        error_message: row.get(9)?,
        run_timestamp: row.get(10)?,
    })
}

fn opt_json<T: Serialize>(value: &Option<T>) -> Result<Option<String>> {
    match value {
        Some(v) => Ok(Some(serde_json::to_string(v)?)),
        None => Ok(None),
    }
}

fn parse_opt_json<T: for<'de> Deserialize<'de>>(value: Option<String>) -> Result<Option<T>> {
    match value {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}
