//! # ingest 命令实现
//!
//! 读取材料元数据 CSV，只保留结构目录中存在 .res 文件的行，
//! 分类氧化物类型与化合物类别后批量入库（单事务）。
//! 可选加载各化学体系的实验空间群统计 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/ingest.rs` 定义的参数
//! - 使用 `models/material.rs`, `db/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`
//! - 使用 `csv`, `walkdir`

use crate::cli::ingest::IngestArgs;
use crate::db::{AuditStore, SpaceGroupStat};
use crate::error::{AuditError, Result};
use crate::models::material::{classify_compound_class, classify_oxide_type};
use crate::models::Material;
use crate::utils::{output, progress};

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// 材料元数据 CSV 的行格式
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "MaterialId")]
    material_id: String,
    #[serde(rename = "Composition")]
    composition: String,
    #[serde(rename = "Reduced Formula")]
    reduced_formula: String,
    #[serde(rename = "Elements")]
    elements: String,
    #[serde(rename = "NSites")]
    n_sites: usize,
    #[serde(rename = "Volume")]
    volume: f64,
    #[serde(rename = "Density")]
    density: f64,
    #[serde(rename = "Space Group")]
    space_group: Option<String>,
    #[serde(rename = "Space Group Number")]
    space_group_number: Option<i64>,
    #[serde(rename = "Crystal System")]
    crystal_system: Option<String>,
}

/// 空间群统计 CSV 的行格式
#[derive(Debug, Deserialize)]
struct SgStatRow {
    chemsys: String,
    space_group_number: i64,
    space_group: Option<String>,
    count: i64,
    fraction: f64,
}

/// 执行 ingest 命令
pub fn execute(args: IngestArgs) -> Result<()> {
    output::print_header("Ingesting Materials");

    if !args.structures.exists() {
        return Err(AuditError::DirectoryNotFound {
            path: args.structures.display().to_string(),
        });
    }

    let available = scan_structure_ids(&args.structures);
    output::print_info(&format!(
        "Found {} structure files in '{}'",
        available.len(),
        args.structures.display()
    ));

    let mut reader = csv::Reader::from_path(&args.csv)?;
    let rows: Vec<CsvRow> = reader
        .deserialize()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    output::print_info(&format!("CSV rows: {}", rows.len()));

    let store = AuditStore::open(&args.db)?;

    let pb = progress::create_progress_bar(rows.len() as u64, "Ingesting");
    let mut n_inserted = 0usize;
    let mut n_missing = 0usize;

    store.begin()?;
    for row in &rows {
        if !available.contains(&row.material_id) {
            n_missing += 1;
            pb.inc(1);
            continue;
        }

        let mut elements = parse_elements_list(&row.elements);
        elements.sort();
        let material = Material {
            material_id: row.material_id.clone(),
            composition: row.composition.clone(),
            reduced_formula: row.reduced_formula.clone(),
            oxide_type: classify_oxide_type(&row.reduced_formula),
            compound_class: classify_compound_class(&elements),
            elements,
            n_sites: row.n_sites,
            volume: row.volume,
            density: row.density,
            space_group: row.space_group.clone(),
            space_group_number: row.space_group_number,
            crystal_system: row.crystal_system.clone(),
        };
        if let Err(e) = store.insert_material(&material) {
            let _ = store.rollback();
            pb.finish_and_clear();
            return Err(e);
        }
        n_inserted += 1;
        pb.inc(1);
    }
    store.commit()?;
    pb.finish_and_clear();

    output::print_success(&format!("Inserted {n_inserted} materials"));
    if n_missing > 0 {
        output::print_skip(&format!("{n_missing} rows without a structure file"));
    }

    if let Some(sg_csv) = &args.sg_stats {
        ingest_sg_stats(&store, sg_csv)?;
    }

    output::print_done("Ingestion complete");
    Ok(())
}

/// 结构目录中全部 .res 文件的主干名（即材料 ID）
fn scan_structure_ids(dir: &Path) -> HashSet<String> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("res"))
                .unwrap_or(false)
        })
        .filter_map(|e| {
            e.path()
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
        .collect()
}

/// 解析 `['Ca', 'O', 'Ti']` 风格的元素列表字符串
fn parse_elements_list(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|s| s.trim().trim_matches('\'').trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn ingest_sg_stats(store: &AuditStore, csv_path: &Path) -> Result<()> {
    let spinner = progress::create_spinner("Loading space group statistics");
    let mut reader = csv::Reader::from_path(csv_path)?;
    let stats: Vec<SpaceGroupStat> = reader
        .deserialize::<SgStatRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|r| SpaceGroupStat {
            chemsys: r.chemsys,
            space_group_number: r.space_group_number,
            space_group: r.space_group,
            count: r.count,
            fraction: r.fraction,
        })
        .collect();

    store.insert_spacegroup_stats(&stats)?;
    spinner.finish_and_clear();
    output::print_success(&format!("Loaded {} space group statistics rows", stats.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elements_list() {
        assert_eq!(
            parse_elements_list("['Ca', 'O', 'Ti']"),
            vec!["Ca", "O", "Ti"]
        );
        assert_eq!(parse_elements_list("[\"Na\", \"Cl\"]"), vec!["Na", "Cl"]);
        assert!(parse_elements_list("[]").is_empty());
    }

    #[test]
    fn test_scan_structure_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("m-1.res"), "TITL m-1").unwrap();
        std::fs::write(dir.path().join("m-2.RES"), "TITL m-2").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let ids = scan_structure_ids(dir.path());
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("m-1"));
        assert!(ids.contains("m-2"));
    }
}
