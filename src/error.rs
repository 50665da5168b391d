//! # 统一错误处理模块
//!
//! 定义 Potkit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// Potkit 统一错误类型
#[derive(Error, Debug)]
pub enum PotkitError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 模型错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid model file: {path}\nReason: {reason}")]
    ModelError { path: String, reason: String },

    #[error("Species '{0}' is not covered by the model")]
    UnsupportedSpecies(String),

    #[error("Unknown element symbol: {0}")]
    UnknownElement(String),

    #[error("Unknown molecule name: {0}")]
    UnknownMolecule(String),

    // ─────────────────────────────────────────────────────────────
    // 数据一致性错误
    // ─────────────────────────────────────────────────────────────
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Frame {frame} has no attached energy")]
    MissingEnergy { frame: usize },

    #[error("Invalid index split: {0}")]
    InvalidSplit(String),

    // ─────────────────────────────────────────────────────────────
    // 数值错误
    // ─────────────────────────────────────────────────────────────
    #[error("Linear algebra failure: {0}")]
    LinearAlgebra(String),

    #[error("Periodic cutoff {cutoff} exceeds half the shortest cell extent {limit}")]
    CutoffTooLarge { cutoff: f64, limit: f64 },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, PotkitError>;
