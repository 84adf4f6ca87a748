//! # 统一错误处理模块
//!
//! 定义 eckit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// eckit 统一错误类型
#[derive(Error, Debug)]
pub enum EckitError {
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

    /// 计算目录缺少必需的输出文件（聚合循环会跳过该步骤）
    #[error("Missing calculation output: {path}")]
    MissingOutput { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Dataset format version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u16, supported: u16 },

    // ─────────────────────────────────────────────────────────────
    // 分析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Grid shape mismatch: {left} vs {right}")]
    ShapeMismatch { left: String, right: String },

    #[error("No vacuum plateau found within one grid period (threshold = {threshold:e})")]
    NoVacuumFound { threshold: f64 },

    #[error("No step with NELECT == {ne_zc} (zero-charge reference) in dataset")]
    ReferenceStepNotFound { ne_zc: f64 },

    #[error("Species '{symbol}' not found in the valence table")]
    UnknownSpecies { symbol: String },

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
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, EckitError>;
