//! Report errors.

use thiserror::Error;

/// Errors raised while rendering or writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested format is not one of json, csv, md or markdown.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Writing the report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
