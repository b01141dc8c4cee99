//! Error types for ingestion operations.

use thiserror::Error;

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Errors that can occur while loading, validating, or transforming a dataset.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Mandatory columns are absent from the dataset
    #[error("Missing required columns: {missing:?}")]
    Schema {
        /// Missing column names, in mandatory-set order
        missing: Vec<String>,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Value parsing error
    #[error("Parse error: {0}")]
    Parse(String),
}
