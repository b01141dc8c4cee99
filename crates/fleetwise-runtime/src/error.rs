//! Error types for training and serving.

use fleetwise_features::FeatureError;
use fleetwise_model::ModelError;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Training and prediction errors
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Too few usable rows to train
    #[error("Insufficient data: need at least {required} rows with a valid target, got {actual}")]
    InsufficientData {
        /// Minimum number of usable rows
        required: usize,
        /// Usable rows found
        actual: usize,
    },

    /// No model artifact at the expected location
    #[error("Model not available at '{}'", path.display())]
    ModelUnavailable {
        /// Where the artifact was looked for
        path: PathBuf,
    },

    /// Prediction input does not fit the model
    #[error("Invalid input: {0}")]
    InputShape(String),

    /// Target or feature columns absent from the training data
    #[error("Missing columns: {0:?}")]
    MissingColumns(Vec<String>),

    /// Artifact could not be encoded or decoded
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model pipeline error
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Feature engineering error
    #[error("Feature error: {0}")]
    Features(#[from] FeatureError),

    /// Polars DataFrame error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
