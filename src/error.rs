//! # 统一错误处理模块
//!
//! 定义 crysaudit 的所有错误类型，使用 `thiserror` 派生。
//!
//! 注意：校验器内部的计算失败不是这里的错误 —— 它们被转换为
//! `status = error` 的 ValidationResult 记录并继续批处理。这里的错误类型
//! 只覆盖材料级与进程级失败（I/O、数据库、解析、参数）。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// crysaudit 统一错误类型
#[derive(Error, Debug)]
pub enum AuditError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 结构与解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("No structure file for material {material_id}: {path}")]
    StructureNotFound { material_id: String, path: String },

    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid chemical formula: {0}")]
    InvalidFormula(String),

    // ─────────────────────────────────────────────────────────────
    // 数据库错误
    // ─────────────────────────────────────────────────────────────
    #[error("Material not found in database: {0}")]
    MaterialNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, AuditError>;
