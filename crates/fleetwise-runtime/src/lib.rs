#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod artifact;
pub mod error;
pub mod predictor;
pub mod report;
pub mod service;
pub mod trainer;

pub use artifact::{DEFAULT_MODEL_PATH, FORMAT_VERSION, ModelArtifact};
pub use error::{Result, RuntimeError};
pub use predictor::{Predictor, predict, records_to_frame};
pub use report::EvaluationReport;
pub use service::{
    ModelHandle, PredictRequest, PredictResponse, PredictionService, ServiceError, ServiceStatus,
};
pub use trainer::{TrainConfig, TrainOutcome, Trainer, default_target, train_test_split};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
