//! # AIRSS .res 结构文件解析器
//!
//! 结构输入约定：每个材料对应 `<structures_dir>/<material_id>.res`，
//! 记录晶格参数与分数坐标位点。审计核心只消费几何信息，
//! TITL 行中的压力 / 焓等搜索元数据被忽略。
//!
//! ## .res 格式说明
//! ```text
//! TITL name ...
//! CELL 1.0 a b c alpha beta gamma
//! LATT -1
//! SFAC Element1 Element2 ...
//! Element1 1 x1 y1 z1 1.0
//! Element2 2 x2 y2 z2 1.0
//! ...
//! END
//! ```
//!
//! ## 依赖关系
//! - 被 `pipeline.rs`, `commands/ingest.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{AuditError, Result};
use crate::models::{Crystal, Lattice, Site};
use std::fs;
use std::path::Path;

/// 解析 .res 文件
pub fn parse_res_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| AuditError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_res_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
    .map_err(|e| match e {
        AuditError::ParseError { format, reason, .. } => AuditError::ParseError {
            format,
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 从字符串内容解析 .res 格式
pub fn parse_res_content(content: &str, default_name: &str) -> Result<Crystal> {
    let mut name = default_name.to_string();
    let mut lattice: Option<Lattice> = None;
    let mut sites: Vec<Site> = Vec::new();
    let mut in_atoms = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0].to_uppercase().as_str() {
            "TITL" => {
                if parts.len() >= 2 {
                    name = parts[1].to_string();
                }
            }
            "CELL" => {
                // CELL scale a b c alpha beta gamma
                if parts.len() < 8 {
                    return Err(parse_error("CELL line requires 7 values"));
                }
                let vals: Vec<f64> = parts[1..8]
                    .iter()
                    .filter_map(|s| s.parse().ok())
                    .collect();
                if vals.len() != 7 {
                    return Err(parse_error("CELL line contains non-numeric values"));
                }
                lattice = Some(Lattice::from_parameters(
                    vals[1], vals[2], vals[3], vals[4], vals[5], vals[6],
                ));
            }
            "LATT" => {}
            "SFAC" => {
                in_atoms = true;
            }
            "END" => {
                in_atoms = false;
            }
            _ => {
                // SFAC 之后直到 END 的行是原子行: Element sfac_idx x y z occupancy
                if in_atoms && parts.len() >= 5 {
                    let element = parts[0].to_string();
                    let x: Option<f64> = parts[2].parse().ok();
                    let y: Option<f64> = parts[3].parse().ok();
                    let z: Option<f64> = parts[4].parse().ok();
                    match (x, y, z) {
                        (Some(x), Some(y), Some(z)) => {
                            sites.push(Site::new(element, [x, y, z]));
                        }
                        _ => {
                            return Err(parse_error(&format!(
                                "Invalid atom line: {}",
                                line
                            )));
                        }
                    }
                }
            }
        }
    }

    let lattice = lattice.ok_or_else(|| parse_error("Missing CELL line"))?;
    if sites.is_empty() {
        return Err(parse_error("No atom positions found"));
    }

    Ok(Crystal::new(name, lattice, sites))
}

fn parse_error(reason: &str) -> AuditError {
    AuditError::ParseError {
        format: "res".to_string(),
        path: String::new(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_res_basic() {
        let content = r#"
TITL CaTiO3-00001 0.0 59.5 0.0 0.0 0 0 5 (Pm-3m)
CELL 1.0 3.905 3.905 3.905 90.0 90.0 90.0
LATT -1
SFAC Ca Ti O
Ca 1 0.0 0.0 0.0 1.0
Ti 2 0.5 0.5 0.5 1.0
O 3 0.5 0.5 0.0 1.0
O 3 0.5 0.0 0.5 1.0
O 3 0.0 0.5 0.5 1.0
END
"#;
        let crystal = parse_res_content(content, "fallback").unwrap();
        assert_eq!(crystal.name, "CaTiO3-00001");
        assert_eq!(crystal.n_sites(), 5);

        let (a, _, _, _, _, gamma) = crystal.lattice.parameters();
        assert!((a - 3.905).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);

        let comp = crystal.composition();
        assert_eq!(comp.get("O"), Some(&3));
    }

    #[test]
    fn test_parse_res_missing_cell() {
        let content = "TITL x\nSFAC O\nO 1 0.0 0.0 0.0 1.0\nEND\n";
        assert!(parse_res_content(content, "x").is_err());
    }

    #[test]
    fn test_parse_res_no_atoms() {
        let content = "TITL x\nCELL 1.0 4 4 4 90 90 90\nSFAC O\nEND\n";
        assert!(parse_res_content(content, "x").is_err());
    }

    #[test]
    fn test_parse_res_uses_default_name() {
        let content = "CELL 1.0 4 4 4 90 90 90\nSFAC O\nO 1 0.1 0.2 0.3 1.0\nEND\n";
        let crystal = parse_res_content(content, "mat-42").unwrap();
        assert_eq!(crystal.name, "mat-42");
    }
}
