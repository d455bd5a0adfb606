use std::path::PathBuf;
use thiserror::Error;

/// The main error type for hubdata operations.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hub_dir not found: {0}")]
    HubDirNotFound(PathBuf),

    #[error("required config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse JSON config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid hub config {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Failed to read CSV file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFileFormat(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to write JSON report: {0}")]
    Json(#[from] serde_json::Error),
}
