//! # 统一错误处理模块
//!
//! 定义 phonomat 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// phonomat 统一错误类型
#[derive(Error, Debug)]
pub enum PhonomatError {
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

    // ─────────────────────────────────────────────────────────────
    // 结构错误
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed structure: {0}")]
    MalformedStructure(String),

    #[error("Unknown element with atomic number {0}")]
    UnknownElement(i64),

    #[error("Lattice vectors have to follow the right-hand rule (det = {det})")]
    LeftHandedLattice { det: f64 },

    // ─────────────────────────────────────────────────────────────
    // 力与力常数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Parsing \"{path}\" failed: expected forces for {expected} atoms, found {found}")]
    ForceCountMismatch {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("Shape mismatch: expected {expected}, got {found}")]
    ShapeMismatch { expected: String, found: String },

    // ─────────────────────────────────────────────────────────────
    // 计算报告解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse calculation report: {0}")]
    StreamParseFailure(String),

    #[error("'{what}' could not be found in {path}")]
    MissingData { what: String, path: String },

    // ─────────────────────────────────────────────────────────────
    // 对称性错误
    // ─────────────────────────────────────────────────────────────
    #[error("No image atom found for atom {atom} under symmetry operation {operation} (tolerance {tolerance})")]
    NoImageAtomFound {
        atom: usize,
        operation: usize,
        tolerance: f64,
    },

    #[error("Number of Born charges ({borns}) does not match number of atoms ({atoms})")]
    SiteCountMismatch { borns: usize, atoms: usize },

    #[error("Cell mapping is incomplete: {0}")]
    MappingIncomplete(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, PhonomatError>;
