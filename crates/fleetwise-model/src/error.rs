//! Error types for the model pipeline.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Model pipeline errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Predict or inspect called before fit
    #[error("Model not fitted")]
    NotFitted,

    /// Requested columns absent from the frame
    #[error("Missing columns: {0:?}")]
    MissingColumns(Vec<String>),

    /// Row or feature counts disagree
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Configuration value out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Too few rows to fit
    #[error("Insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData {
        /// Minimum number of rows
        required: usize,
        /// Rows supplied
        actual: usize,
    },

    /// A column holds values of the wrong type
    #[error("Invalid input: {0}")]
    InputShape(String),

    /// Polars DataFrame error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
