//! Error handling for HF radar processing operations.
//!
//! Provides error types with context for file reading, grid construction,
//! quality control and report writing failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HfrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid instrument file format: {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Insufficient metadata to build grid: missing {field}")]
    InsufficientMetadata { field: &'static str },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Column not found in measurement table: {column}")]
    ColumnNotFound { column: String },

    #[error("Quality control error: {message}")]
    QualityControl { message: String },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },
}

impl HfrError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a quality control error
    pub fn quality_control(message: impl Into<String>) -> Self {
        Self::QualityControl {
            message: message.into(),
        }
    }

    /// Create an invalid format error for a file
    pub fn invalid_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HfrError>;
