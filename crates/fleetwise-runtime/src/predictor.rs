//! Predictor
//!
//! Loads a persisted artifact and scores feature rows against it. A loaded
//! predictor never changes, so it can be shared between threads behind an
//! `Arc`.

use crate::artifact::ModelArtifact;
use crate::error::{Result, RuntimeError};
use fleetwise_features::FeatureEngineer;
use fleetwise_model::ModelError;
use polars::prelude::*;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// A loaded, read-only model
#[derive(Debug, Clone)]
pub struct Predictor {
    path: PathBuf,
    artifact: ModelArtifact,
}

impl Predictor {
    /// Load the artifact stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let artifact = ModelArtifact::load(path)?;
        info!(
            path = %path.display(),
            target = %artifact.target,
            trained_at = %artifact.trained_at,
            "model loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            artifact,
        })
    }

    /// Wrap an artifact already in memory
    pub fn from_artifact(path: impl Into<PathBuf>, artifact: ModelArtifact) -> Self {
        Self {
            path: path.into(),
            artifact,
        }
    }

    /// Where the artifact was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The loaded artifact
    pub const fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Target column the model predicts
    pub fn target(&self) -> &str {
        &self.artifact.target
    }

    /// Feature columns the model reads
    pub fn features(&self) -> &[String] {
        &self.artifact.features
    }

    /// Score every row of `df`.
    ///
    /// Extra columns are ignored. Categories unseen during training score
    /// with an all-zero indicator block.
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<f64>> {
        self.artifact.pipeline.predict(df).map_err(|e| match e {
            ModelError::MissingColumns(missing) => {
                RuntimeError::InputShape(format!("missing feature columns: {missing:?}"))
            }
            ModelError::InputShape(msg) => RuntimeError::InputShape(msg),
            ModelError::Polars(e) => RuntimeError::InputShape(e.to_string()),
            other => RuntimeError::Model(other),
        })
    }

    /// Score JSON records, one object per row.
    ///
    /// Records may carry raw dashboard fields; derived features absent from
    /// the records are computed with the training-time feature set first.
    pub fn predict_records(&self, records: &[Value]) -> Result<Vec<f64>> {
        let raw = records_to_frame(records)?;
        let df = FeatureEngineer::default().complete(&raw)?;
        self.predict(&df)
    }
}

/// Load the artifact at `path` and score `df` with it.
pub fn predict(path: impl AsRef<Path>, df: &DataFrame) -> Result<Vec<f64>> {
    Predictor::load(path)?.predict(df)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Unknown,
    Number,
    Text,
    Bool,
}

fn cell_kind(value: &Value) -> Option<CellKind> {
    match value {
        Value::Null => Some(CellKind::Unknown),
        Value::Number(_) => Some(CellKind::Number),
        Value::String(_) => Some(CellKind::Text),
        Value::Bool(_) => Some(CellKind::Bool),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Build a frame from JSON objects.
///
/// Columns appear in first-seen order; a key absent from a record is null in
/// that row. Each column must hold a single JSON scalar type; an all-null
/// column is numeric.
pub fn records_to_frame(records: &[Value]) -> Result<DataFrame> {
    let rows: Vec<&Map<String, Value>> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            record
                .as_object()
                .ok_or_else(|| RuntimeError::InputShape(format!("record {i} is not an object")))
        })
        .collect::<Result<_>>()?;

    let mut names: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !names.contains(&key.as_str()) {
                names.push(key);
            }
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let cells: Vec<&Value> = rows
            .iter()
            .map(|row| row.get(name).unwrap_or(&Value::Null))
            .collect();

        let mut kind = CellKind::Unknown;
        for cell in &cells {
            let cell_kind = cell_kind(cell).ok_or_else(|| {
                RuntimeError::InputShape(format!("field '{name}' must be a scalar"))
            })?;
            match (kind, cell_kind) {
                (_, CellKind::Unknown) => {}
                (CellKind::Unknown, k) => kind = k,
                (a, b) if a == b => {}
                _ => {
                    return Err(RuntimeError::InputShape(format!(
                        "field '{name}' mixes value types"
                    )));
                }
            }
        }

        let series = match kind {
            CellKind::Number | CellKind::Unknown => Series::new(
                name.into(),
                cells.iter().map(|v| v.as_f64()).collect::<Vec<_>>(),
            ),
            CellKind::Bool => Series::new(
                name.into(),
                cells.iter().map(|v| v.as_bool()).collect::<Vec<_>>(),
            ),
            CellKind::Text => Series::new(
                name.into(),
                cells.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            ),
        };
        columns.push(Column::from(series));
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_to_frame_types_and_gaps() {
        let records = vec![
            json!({"Mileage (km)": 100, "Brand": "Volvo"}),
            json!({"Brand": "MAN", "Total Trips": 4}),
        ];
        let df = records_to_frame(&records).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(
            df.get_column_names()
                .into_iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>(),
            vec!["Mileage (km)", "Brand", "Total Trips"]
        );
        let mileage = df.column("Mileage (km)").unwrap();
        assert_eq!(mileage.dtype(), &DataType::Float64);
        assert_eq!(mileage.null_count(), 1);
        assert_eq!(df.column("Brand").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_records_to_frame_rejects_bad_shapes() {
        assert!(matches!(
            records_to_frame(&[json!([1, 2])]),
            Err(RuntimeError::InputShape(_))
        ));
        assert!(matches!(
            records_to_frame(&[json!({"a": 1}), json!({"a": "x"})]),
            Err(RuntimeError::InputShape(_))
        ));
        assert!(matches!(
            records_to_frame(&[json!({"a": {"b": 1}})]),
            Err(RuntimeError::InputShape(_))
        ));
    }

    #[test]
    fn test_load_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = Predictor::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, RuntimeError::ModelUnavailable { .. }));
    }
}
