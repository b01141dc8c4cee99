//! Pipeline Builder
//!
//! Composes the numeric branch (standard scaling), the categorical branch
//! (one-hot encoding) and the cross-validated elastic net into one fitted,
//! serializable unit.
//!
//! The design matrix lays out the scaled numeric columns first, then each
//! categorical column's indicator block, both in routing order.

use crate::elastic_net::{CvConfig, CvScore, ElasticNet, ElasticNetCv};
use crate::encoder::OneHotEncoder;
use crate::error::{ModelError, Result};
use crate::frame::missing_columns;
use crate::router::ColumnRouting;
use crate::scaler::StandardScaler;
use ndarray::{Array1, Array2, Axis, concatenate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Regularization grid and solver settings
    pub regression: CvConfig,
}

/// Reason a fitted-only quantity cannot be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unavailable {
    /// The pipeline has not been fitted yet
    #[error("pipeline has not been fitted")]
    NotFitted,
}

/// One regression weight on the design matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// Scaled numeric column name, or `column_category` for indicators
    pub feature: String,
    /// Weight in scaled units
    pub value: f64,
}

/// Builds unfitted pipelines from a column routing
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a builder with the given configuration
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Build a pipeline over explicit numeric and categorical columns
    pub fn build(&self, numeric: Vec<String>, categorical: Vec<String>) -> Pipeline {
        self.from_routing(ColumnRouting {
            numeric,
            categorical,
        })
    }

    /// Build a pipeline over a routing produced by [`route`](crate::route)
    pub fn from_routing(&self, routing: ColumnRouting) -> Pipeline {
        Pipeline {
            routing,
            scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(),
            regressor: ElasticNetCv::new(self.config.regression.clone()),
            fitted: false,
        }
    }
}

/// Scaling + encoding + elastic net
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    routing: ColumnRouting,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    regressor: ElasticNetCv,
    fitted: bool,
}

impl Pipeline {
    /// Column routing this pipeline reads
    pub const fn routing(&self) -> &ColumnRouting {
        &self.routing
    }

    /// True once [`fit`](Self::fit) has succeeded
    pub const fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fit every stage on `df` against `target`.
    pub fn fit(&mut self, df: &DataFrame, target: &[f64]) -> Result<&mut Self> {
        if df.height() != target.len() {
            return Err(ModelError::DimensionMismatch(format!(
                "{} rows but {} target values",
                df.height(),
                target.len()
            )));
        }
        if let Some(bad) = target.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::InputShape(format!(
                "target value at row {bad} is not finite"
            )));
        }
        self.check_columns(df)?;

        // self is only updated once every stage has fitted
        let mut scaler = StandardScaler::new();
        scaler.fit(df, &self.routing.numeric)?;
        let mut encoder = OneHotEncoder::new();
        encoder.fit(df, &self.routing.categorical)?;
        let x = design_matrix(&scaler, &encoder, df)?;
        debug!(rows = x.nrows(), width = x.ncols(), "design matrix built");

        let mut regressor = ElasticNetCv::new(self.regressor.config().clone());
        regressor.fit(&x, &Array1::from(target.to_vec()))?;

        self.scaler = scaler;
        self.encoder = encoder;
        self.regressor = regressor;
        self.fitted = true;
        Ok(self)
    }

    /// Predict one value per row of `df`.
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ModelError::NotFitted);
        }
        self.check_columns(df)?;
        let x = design_matrix(&self.scaler, &self.encoder, df)?;
        Ok(self.regressor.predict(&x)?.to_vec())
    }

    fn check_columns(&self, df: &DataFrame) -> Result<()> {
        let wanted: Vec<&str> = self.routing.columns().collect();
        let missing = missing_columns(df, &wanted);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::MissingColumns(missing))
        }
    }

    /// Design matrix column names, in coefficient order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.routing.numeric.clone();
        names.extend(self.encoder.feature_names());
        names
    }

    /// Fitted weights, one per design matrix column
    pub fn coefficients(&self) -> std::result::Result<Vec<Coefficient>, Unavailable> {
        let model = self.fitted_model()?;
        let weights = model.coefficients().ok_or(Unavailable::NotFitted)?;
        Ok(self
            .feature_names()
            .into_iter()
            .zip(weights.iter())
            .map(|(feature, value)| Coefficient {
                feature,
                value: *value,
            })
            .collect())
    }

    /// Fitted intercept
    pub fn intercept(&self) -> std::result::Result<f64, Unavailable> {
        self.fitted_model()?
            .intercept()
            .ok_or(Unavailable::NotFitted)
    }

    /// Regularization chosen by cross-validation
    pub fn selected(&self) -> std::result::Result<CvScore, Unavailable> {
        self.fitted_model()?;
        self.regressor.best().ok_or(Unavailable::NotFitted)
    }

    fn fitted_model(&self) -> std::result::Result<&ElasticNet, Unavailable> {
        if !self.fitted {
            return Err(Unavailable::NotFitted);
        }
        self.regressor.model().ok_or(Unavailable::NotFitted)
    }
}

fn design_matrix(
    scaler: &StandardScaler,
    encoder: &OneHotEncoder,
    df: &DataFrame,
) -> Result<Array2<f64>> {
    let numeric = scaler.transform(df)?;
    let indicators = encoder.transform(df)?;
    concatenate(Axis(1), &[numeric.view(), indicators.view()])
        .map_err(|e| ModelError::DimensionMismatch(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::route;
    use approx::assert_relative_eq;

    fn fleet(n: usize) -> (DataFrame, Vec<f64>) {
        let mileage: Vec<f64> = (0..n).map(|i| 100.0 + 10.0 * i as f64).collect();
        let brand: Vec<&str> = (0..n).map(|i| ["volvo", "man", "daf"][i % 3]).collect();
        let target: Vec<f64> = mileage
            .iter()
            .zip(&brand)
            .map(|(m, b)| 0.5 * m + if *b == "man" { 20.0 } else { 0.0 })
            .collect();
        let df = df!("mileage" => mileage, "brand" => brand).unwrap();
        (df, target)
    }

    fn fitted(n: usize) -> Pipeline {
        let (df, target) = fleet(n);
        let routing = route(&df, &["mileage", "brand"]).unwrap();
        let mut pipeline = PipelineBuilder::default().from_routing(routing);
        pipeline.fit(&df, &target).unwrap();
        pipeline
    }

    #[test]
    fn test_unfitted_reports_unavailable() {
        let pipeline = PipelineBuilder::default().build(vec!["a".into()], vec![]);
        assert_eq!(pipeline.coefficients().unwrap_err(), Unavailable::NotFitted);
        assert_eq!(pipeline.intercept().unwrap_err(), Unavailable::NotFitted);

        let df = df!("a" => [1.0]).unwrap();
        assert!(matches!(pipeline.predict(&df), Err(ModelError::NotFitted)));
    }

    #[test]
    fn test_fit_predict_tracks_target() {
        let (df, target) = fleet(30);
        let pipeline = fitted(30);
        let predictions = pipeline.predict(&df).unwrap();

        let mse = predictions
            .iter()
            .zip(&target)
            .map(|(p, y)| (p - y).powi(2))
            .sum::<f64>()
            / target.len() as f64;
        assert!(mse < 10.0, "mse = {mse}");
    }

    #[test]
    fn test_coefficients_follow_design_layout() {
        let pipeline = fitted(30);
        let names: Vec<String> = pipeline
            .coefficients()
            .unwrap()
            .into_iter()
            .map(|c| c.feature)
            .collect();
        assert_eq!(names, vec!["mileage", "brand_daf", "brand_man", "brand_volvo"]);
    }

    #[test]
    fn test_unseen_category_predicts_finite() {
        let pipeline = fitted(30);
        let df = df!("mileage" => [150.0], "brand" => ["scania"]).unwrap();
        let p = pipeline.predict(&df).unwrap();
        assert_eq!(p.len(), 1);
        assert!(p[0].is_finite());
    }

    #[test]
    fn test_missing_numeric_cell_scores_at_mean() {
        let pipeline = fitted(30);
        let mean = pipeline.scaler.scales().unwrap()[0].mean;
        let at_mean = df!("mileage" => [mean], "brand" => ["volvo"]).unwrap();
        let absent = df!("mileage" => [None::<f64>], "brand" => ["volvo"]).unwrap();

        let a = pipeline.predict(&at_mean).unwrap();
        let b = pipeline.predict(&absent).unwrap();
        assert_relative_eq!(a[0], b[0], epsilon = 1e-9);
    }

    #[test]
    fn test_predict_missing_column() {
        let pipeline = fitted(30);
        let df = df!("mileage" => [1.0]).unwrap();
        match pipeline.predict(&df) {
            Err(ModelError::MissingColumns(missing)) => assert_eq!(missing, vec!["brand"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_fit_rejects_length_mismatch() {
        let (df, _) = fleet(6);
        let mut pipeline = PipelineBuilder::default().build(vec!["mileage".into()], vec![]);
        assert!(matches!(
            pipeline.fit(&df, &[1.0, 2.0]),
            Err(ModelError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_failed_refit_keeps_previous_fit() {
        let (df, _) = fleet(30);
        let mut pipeline = fitted(30);
        let before = pipeline.predict(&df).unwrap();

        // two rows, one brand: fewer rows than folds and a narrower vocabulary
        let small = df!("mileage" => [100.0, 110.0], "brand" => ["volvo", "volvo"]).unwrap();
        assert!(matches!(
            pipeline.fit(&small, &[50.0, 55.0]),
            Err(ModelError::InsufficientData { required: 3, actual: 2 })
        ));

        assert!(pipeline.is_fitted());
        assert_eq!(pipeline.feature_names().len(), 4);
        let after = pipeline.predict(&df).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_serde_preserves_predictions() {
        let (df, _) = fleet(30);
        let pipeline = fitted(30);
        let json = serde_json::to_string(&pipeline).unwrap();
        let restored: Pipeline = serde_json::from_str(&json).unwrap();
        assert!(restored.is_fitted());

        let before = pipeline.predict(&df).unwrap();
        let after = restored.predict(&df).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }
}
