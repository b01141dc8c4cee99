//! Standard scaling for the numeric branch.

use crate::error::{ModelError, Result};
use crate::frame::numeric_values;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted location and scale of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    /// Column name
    pub column: String,
    /// Population mean of the valid training values
    pub mean: f64,
    /// Population standard deviation; 1.0 for constant columns
    pub std: f64,
}

impl ColumnScale {
    fn fit(column: &str, values: &[Option<f64>]) -> Self {
        let valid: Vec<f64> = values.iter().flatten().copied().collect();
        if valid.is_empty() {
            return Self {
                column: column.to_string(),
                mean: 0.0,
                std: 1.0,
            };
        }

        let n = valid.len() as f64;
        let mean = valid.iter().sum::<f64>() / n;
        let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Self {
            column: column.to_string(),
            mean,
            std: if std > f64::EPSILON { std } else { 1.0 },
        }
    }

    /// Scale one value; missing values map to the mean, i.e. 0.
    pub fn apply(&self, value: Option<f64>) -> f64 {
        value.map_or(0.0, |v| (v - self.mean) / self.std)
    }
}

/// Zero-mean, unit-variance scaling of numeric columns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    scales: Option<Vec<ColumnScale>>,
}

impl StandardScaler {
    /// Create an unfitted scaler
    pub const fn new() -> Self {
        Self { scales: None }
    }

    /// Learn mean and standard deviation of each column.
    pub fn fit<S: AsRef<str>>(&mut self, df: &DataFrame, columns: &[S]) -> Result<&mut Self> {
        let scales = columns
            .iter()
            .map(|name| {
                let name = name.as_ref();
                numeric_values(df, name).map(|values| ColumnScale::fit(name, &values))
            })
            .collect::<Result<Vec<_>>>()?;
        self.scales = Some(scales);
        Ok(self)
    }

    /// Fitted parameters, if any
    pub fn scales(&self) -> Option<&[ColumnScale]> {
        self.scales.as_deref()
    }

    /// Number of output columns
    pub fn width(&self) -> usize {
        self.scales.as_ref().map_or(0, Vec::len)
    }

    /// Scale the fitted columns of `df` into an `(rows, columns)` matrix.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let scales = self.scales.as_ref().ok_or(ModelError::NotFitted)?;
        let mut out = Array2::zeros((df.height(), scales.len()));

        for (j, scale) in scales.iter().enumerate() {
            let values = numeric_values(df, &scale.column)?;
            for (i, value) in values.into_iter().enumerate() {
                out[[i, j]] = scale.apply(value);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_transform_population_std() {
        let df = df!("a" => [1.0, 2.0, 3.0, 4.0], "b" => [5.0, 5.0, 5.0, 5.0]).unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&df, &["a", "b"]).unwrap();

        let scales = scaler.scales().unwrap();
        assert_relative_eq!(scales[0].mean, 2.5);
        assert_relative_eq!(scales[0].std, 1.25_f64.sqrt());
        // constant column keeps unit scale
        assert_eq!(scales[1].std, 1.0);

        let x = scaler.transform(&df).unwrap();
        assert_eq!(x.dim(), (4, 2));
        assert_relative_eq!(x.column(0).sum(), 0.0, epsilon = 1e-12);
        assert!(x.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_missing_values_scale_to_zero() {
        let train = df!("a" => [Some(2.0), None, Some(4.0)]).unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&train, &["a"]).unwrap();
        assert_relative_eq!(scaler.scales().unwrap()[0].mean, 3.0);

        let x = scaler.transform(&train).unwrap();
        assert_eq!(x[[1, 0]], 0.0);
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df!("a" => [1.0]).unwrap();
        assert!(matches!(
            StandardScaler::new().transform(&df),
            Err(ModelError::NotFitted)
        ));
    }
}
