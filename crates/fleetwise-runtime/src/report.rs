//! Evaluation of a trained pipeline on its held-out rows.

use fleetwise_model::Coefficient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    (sse / actual.len() as f64).sqrt()
}

/// Coefficient of determination.
///
/// A constant `actual` scores 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Held-out performance and fitted parameters of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Target column
    pub target: String,
    /// Root mean squared error on the test rows
    pub rmse: f64,
    /// R² on the test rows
    pub r2: f64,
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows held out for evaluation
    pub n_test: usize,
    /// Regularization strength chosen by cross-validation
    pub best_alpha: f64,
    /// L1 share chosen by cross-validation
    pub best_l1_ratio: f64,
    /// Model intercept
    pub intercept: f64,
    /// Weights on the design matrix
    pub coefficients: Vec<Coefficient>,
}

impl EvaluationReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as a plain-text table for terminal display.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nEvaluation: {}\n", self.target));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("  RMSE:            {:.4}\n", self.rmse));
        output.push_str(&format!("  R²:              {:.4}\n", self.r2));
        output.push_str(&format!(
            "  Rows:            {} train / {} test\n",
            self.n_train, self.n_test
        ));
        output.push_str(&format!("  Alpha:           {:.6}\n", self.best_alpha));
        output.push_str(&format!("  L1 ratio:        {:.2}\n", self.best_l1_ratio));
        output.push_str(&format!("  Intercept:       {:.4}\n", self.intercept));

        if !self.coefficients.is_empty() {
            output.push_str("\nCoefficients:\n");
            output.push_str(&"-".repeat(60));
            output.push('\n');
            for coefficient in &self.coefficients {
                output.push_str(&format!(
                    "{:<44} {:>15.6}\n",
                    coefficient.feature, coefficient.value
                ));
            }
        }

        output.push_str(&"=".repeat(60));
        output.push('\n');
        output
    }

    /// Coefficients sorted by absolute weight, largest first
    pub fn top_coefficients(&self, n: usize) -> Vec<&Coefficient> {
        let mut sorted: Vec<&Coefficient> = self.coefficients.iter().collect();
        sorted.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
        sorted.truncate(n);
        sorted
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
