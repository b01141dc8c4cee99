//! Persisted model artifact
//!
//! One JSON document holding the fitted pipeline, the target it predicts,
//! the feature columns it reads and the evaluation of the run that produced
//! it.

use crate::error::{Result, RuntimeError};
use crate::report::EvaluationReport;
use chrono::{DateTime, Utc};
use fleetwise_model::Pipeline;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Artifact layout version written by this crate
pub const FORMAT_VERSION: u32 = 1;

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "saved_models/latest_model.json";

/// A fitted pipeline plus the metadata needed to use it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Layout version
    pub format_version: u32,
    /// Target column the pipeline predicts
    pub target: String,
    /// Feature columns the pipeline reads
    pub features: Vec<String>,
    /// When training finished
    pub trained_at: DateTime<Utc>,
    /// Fitted pipeline
    pub pipeline: Pipeline,
    /// Held-out evaluation
    pub report: EvaluationReport,
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `bytes` to a sibling temp file and rename it over `path`.
///
/// The temp file is removed again when any step fails.
fn persist(bytes: &[u8], path: &Path) -> io::Result<()> {
    let tmp = temp_path(path);
    let written = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if written.is_err() {
        // the write error is the one reported
        let _ = fs::remove_file(&tmp);
    }
    written
}

impl ModelArtifact {
    /// Write the artifact to `path`, creating parent directories.
    ///
    /// The document goes to a sibling temp file that is then renamed over
    /// `path`, so readers see either the previous artifact or the new one.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| RuntimeError::Artifact(format!("cannot encode artifact: {e}")))?;

        persist(&json, path)?;
        debug!(path = %path.display(), bytes = json.len(), "artifact written");
        Ok(())
    }

    /// Read an artifact from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RuntimeError::ModelUnavailable {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let artifact: Self = serde_json::from_slice(&bytes).map_err(|e| {
            RuntimeError::Artifact(format!("cannot decode '{}': {e}", path.display()))
        })?;

        if artifact.format_version > FORMAT_VERSION {
            return Err(RuntimeError::Artifact(format!(
                "'{}' has format version {}, newest supported is {FORMAT_VERSION}",
                path.display(),
                artifact.format_version
            )));
        }
        if !artifact.pipeline.is_fitted() {
            return Err(RuntimeError::Artifact(format!(
                "'{}' holds an unfitted pipeline",
                path.display()
            )));
        }
        Ok(artifact)
    }
}
