//! Trainer
//!
//! Fits a pipeline on a seeded train split, scores it on the held-out rows
//! and persists the result as a [`ModelArtifact`].

use crate::artifact::{FORMAT_VERSION, ModelArtifact};
use crate::error::{Result, RuntimeError};
use crate::report::{EvaluationReport, r2, rmse};
use chrono::Utc;
use fleetwise_features::columns::MILEAGE;
use fleetwise_model::{ModelError, PipelineBuilder, PipelineConfig, Unavailable, route};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Target used when a `Failure` column is present
pub const FAILURE_TARGET: &str = "Failure";

/// Pick `Failure` when the frame has it, otherwise `Mileage (km)`.
pub fn default_target(df: &DataFrame) -> &'static str {
    if df.column(FAILURE_TARGET).is_ok() {
        FAILURE_TARGET
    } else {
        MILEAGE
    }
}

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Share of usable rows held out for evaluation
    pub test_ratio: f64,
    /// Seed of the train/test shuffle
    pub seed: u64,
    /// Fewest usable rows accepted
    pub min_rows: usize,
    /// Feature columns; every non-target column when `None`
    pub features: Option<Vec<String>>,
    /// Pipeline settings
    pub pipeline: PipelineConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            min_rows: 10,
            features: None,
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Result of a successful training run
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// Where the artifact was written
    pub path: PathBuf,
    /// Held-out evaluation
    pub report: EvaluationReport,
}

/// Fits, evaluates and persists pipelines
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainConfig,
}

/// Shuffled `(train, test)` row indices.
///
/// The test share is rounded up, and both sides keep at least one row when
/// there are two or more rows.
pub fn train_test_split(n_rows: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = ((n_rows as f64) * test_ratio).ceil() as usize;
    let n_test = if n_rows >= 2 {
        n_test.clamp(1, n_rows - 1)
    } else {
        0
    };
    let train = indices.split_off(n_test);
    (train, indices)
}

fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = rows.iter().map(|&i| i as IdxSize).collect();
    Ok(df.take(&IdxCa::from_vec("idx".into(), idx))?)
}

impl Trainer {
    /// Create a trainer with the given configuration
    pub const fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Trainer configuration
    pub const fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Columns used as features for `target`
    pub fn feature_columns(&self, df: &DataFrame, target: &str) -> Vec<String> {
        match &self.config.features {
            Some(features) => features.clone(),
            None => df
                .get_column_names()
                .into_iter()
                .map(|name| name.to_string())
                .filter(|name| name != target)
                .collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.config.test_ratio > 0.0 && self.config.test_ratio < 1.0) {
            return Err(RuntimeError::Model(ModelError::InvalidParameter(
                format!("test_ratio must lie in (0, 1), got {}", self.config.test_ratio),
            )));
        }
        Ok(())
    }

    /// Rows of `df` whose target is present and finite, with those targets.
    fn usable_rows(&self, df: &DataFrame, target: &str) -> Result<(DataFrame, Vec<f64>)> {
        let series = df.column(target)?.as_materialized_series();
        if !(series.dtype().is_integer() || series.dtype().is_float() || series.dtype().is_bool())
        {
            return Err(RuntimeError::InputShape(format!(
                "target '{target}' must be numeric, found {}",
                series.dtype()
            )));
        }

        let values = series.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = values.f64()?.into_iter().collect();
        let keep: Vec<bool> = values
            .iter()
            .map(|v| v.is_some_and(f64::is_finite))
            .collect();

        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            warn!(dropped, target, "dropping rows without a usable target");
        }

        let filtered = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        let targets = values.into_iter().flatten().filter(|v| v.is_finite()).collect();
        Ok((filtered, targets))
    }

    /// Train a pipeline predicting `target` and persist it at `output`.
    pub fn train(&self, df: &DataFrame, target: &str, output: &Path) -> Result<TrainOutcome> {
        self.validate()?;

        let features = self.feature_columns(df, target);
        let mut missing: Vec<String> = std::iter::once(target.to_string())
            .chain(features.iter().cloned())
            .filter(|name| df.column(name).is_err())
            .collect();
        missing.dedup();
        if !missing.is_empty() {
            return Err(RuntimeError::MissingColumns(missing));
        }

        let (data, targets) = self.usable_rows(df, target)?;
        if targets.len() < self.config.min_rows {
            return Err(RuntimeError::InsufficientData {
                required: self.config.min_rows,
                actual: targets.len(),
            });
        }

        let (train_rows, test_rows) =
            train_test_split(targets.len(), self.config.test_ratio, self.config.seed);
        let train_df = take_rows(&data, &train_rows)?;
        let test_df = take_rows(&data, &test_rows)?;
        let y_train: Vec<f64> = train_rows.iter().map(|&i| targets[i]).collect();
        let y_test: Vec<f64> = test_rows.iter().map(|&i| targets[i]).collect();
        info!(
            train = train_rows.len(),
            test = test_rows.len(),
            features = features.len(),
            target,
            "training split"
        );

        let routing = route(&train_df, &features)?;
        let mut pipeline = PipelineBuilder::new(self.config.pipeline.clone()).from_routing(routing);
        pipeline.fit(&train_df, &y_train)?;

        let predictions = pipeline.predict(&test_df)?;
        let not_fitted = |_: Unavailable| RuntimeError::Model(ModelError::NotFitted);
        let selected = pipeline.selected().map_err(not_fitted)?;
        let report = EvaluationReport {
            target: target.to_string(),
            rmse: rmse(&y_test, &predictions),
            r2: r2(&y_test, &predictions),
            n_train: train_rows.len(),
            n_test: test_rows.len(),
            best_alpha: selected.alpha,
            best_l1_ratio: selected.l1_ratio,
            intercept: pipeline.intercept().map_err(not_fitted)?,
            coefficients: pipeline.coefficients().map_err(not_fitted)?,
        };
        info!(rmse = report.rmse, r2 = report.r2, "held-out evaluation");

        let artifact = ModelArtifact {
            format_version: FORMAT_VERSION,
            target: target.to_string(),
            features,
            trained_at: Utc::now(),
            pipeline,
            report: report.clone(),
        };
        artifact.save(output)?;
        info!(path = %output.display(), "model saved");

        Ok(TrainOutcome {
            path: output.to_path_buf(),
            report,
        })
    }
}
