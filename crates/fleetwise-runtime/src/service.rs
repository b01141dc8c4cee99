//! Prediction service
//!
//! Transport-agnostic request handling for an HTTP shell: a status probe and
//! a batch predict call over a hot-swappable model.

use crate::error::RuntimeError;
use crate::predictor::Predictor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{info, warn};

/// Shared slot holding the currently served model.
///
/// Readers clone the inner `Arc` and keep scoring with it even while a
/// reload swaps in a newer model.
#[derive(Debug)]
pub struct ModelHandle {
    path: PathBuf,
    current: RwLock<Option<Arc<Predictor>>>,
}

impl ModelHandle {
    /// Create an empty handle for the artifact at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
        }
    }

    /// Create a handle and try to load the artifact immediately.
    ///
    /// A missing or unreadable artifact leaves the handle empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let handle = Self::new(path);
        if let Err(e) = handle.reload() {
            warn!(path = %handle.path.display(), error = %e, "no model loaded");
        }
        handle
    }

    /// Artifact location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Currently served model, if any
    pub fn get(&self) -> Option<Arc<Predictor>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True when a model is being served
    pub fn is_loaded(&self) -> bool {
        self.get().is_some()
    }

    /// Load the artifact again and swap it in.
    ///
    /// The new model is fully loaded before the swap. When the artifact is
    /// gone the handle is emptied; any other failure keeps the previous model.
    pub fn reload(&self) -> Result<(), RuntimeError> {
        match Predictor::load(&self.path) {
            Ok(predictor) => {
                self.replace(Some(Arc::new(predictor)));
                info!(path = %self.path.display(), "model swapped in");
                Ok(())
            }
            Err(e @ RuntimeError::ModelUnavailable { .. }) => {
                self.replace(None);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn replace(&self, next: Option<Arc<Predictor>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

/// Response body of the status probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Whether a model is being served
    pub model_loaded: bool,
    /// Configured artifact location
    pub model_path: String,
}

/// Request body of a predict call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    /// One JSON object per row
    pub features: Vec<Value>,
}

/// Response body of a predict call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// One prediction per request row
    pub predictions: Vec<f64>,
}

/// Errors surfaced to service callers
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No model is loaded
    #[error("Model not available. Train and place model at '{path}'.")]
    Unavailable {
        /// Configured artifact location
        path: String,
    },

    /// The request could not be scored
    #[error("{0}")]
    BadInput(String),
}

impl ServiceError {
    /// HTTP status an HTTP shell should answer with
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unavailable { .. } => 503,
            Self::BadInput(_) => 400,
        }
    }
}

/// Status and predict operations over a [`ModelHandle`]
#[derive(Debug, Clone)]
pub struct PredictionService {
    handle: Arc<ModelHandle>,
}

impl PredictionService {
    /// Serve whatever model `handle` holds
    pub const fn new(handle: Arc<ModelHandle>) -> Self {
        Self { handle }
    }

    /// Underlying model handle
    pub const fn handle(&self) -> &Arc<ModelHandle> {
        &self.handle
    }

    /// Report whether a model is loaded and where it is expected
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            model_loaded: self.handle.is_loaded(),
            model_path: self.handle.path().display().to_string(),
        }
    }

    /// Score the request rows with the current model.
    pub fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ServiceError> {
        let predictor = self.handle.get().ok_or_else(|| ServiceError::Unavailable {
            path: self.handle.path().display().to_string(),
        })?;

        let predictions = predictor
            .predict_records(&request.features)
            .map_err(|e| ServiceError::BadInput(e.to_string()))?;
        Ok(PredictResponse { predictions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest_model.json");
        let service = PredictionService::new(Arc::new(ModelHandle::open(&path)));

        let status = service.status();
        assert!(!status.model_loaded);
        assert_eq!(status.model_path, path.display().to_string());
    }

    #[test]
    fn test_predict_without_model_is_unavailable() {
        let service = PredictionService::new(Arc::new(ModelHandle::new("missing.json")));
        let request = PredictRequest {
            features: vec![json!({"Mileage (km)": 10.0})],
        };
        let err = service.predict(&request).unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_bad_input_status_code() {
        assert_eq!(ServiceError::BadInput("x".to_string()).status_code(), 400);
    }

    #[test]
    fn test_request_json_shape() {
        let request: PredictRequest =
            serde_json::from_value(json!({"features": [{"Brand": "Volvo"}]})).unwrap();
        assert_eq!(request.features.len(), 1);

        let response = PredictResponse {
            predictions: vec![1.5],
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"predictions": [1.5]})
        );
    }
}
