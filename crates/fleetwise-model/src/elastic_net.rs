//! Elastic net regression
//!
//! Minimizes
//!
//! ```text
//! 1/(2n) * ||y - Xw - b||^2 + alpha * l1_ratio * ||w||_1
//!     + alpha * (1 - l1_ratio) / 2 * ||w||^2
//! ```
//!
//! by cyclic coordinate descent on centred data. [`ElasticNetCv`] picks
//! `(alpha, l1_ratio)` by K-fold cross-validated mean squared error and refits
//! on every row.

use crate::error::{ModelError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Soft-threshold operator for the L1 proximal step
fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

fn check_shapes(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(ModelError::DimensionMismatch(format!(
            "design matrix has {} rows but target has {}",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 {
        return Err(ModelError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    Ok(())
}

/// Single elastic net fit for a fixed `(alpha, l1_ratio)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticNet {
    /// Overall regularization strength
    pub alpha: f64,
    /// Share of the L1 penalty (1.0 = lasso, 0.0 = ridge)
    pub l1_ratio: f64,
    /// Maximum coordinate descent sweeps
    pub max_iter: usize,
    /// Stop when the largest coefficient update falls below this
    pub tol: f64,
    coefficients: Option<Array1<f64>>,
    intercept: Option<f64>,
}

impl ElasticNet {
    /// Create an unfitted model
    pub fn new(alpha: f64, l1_ratio: f64) -> Self {
        Self {
            alpha,
            l1_ratio: l1_ratio.clamp(0.0, 1.0),
            max_iter: 1000,
            tol: 1e-4,
            coefficients: None,
            intercept: None,
        }
    }

    /// Set the sweep limit
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Fit on `x` (rows x features) and `y`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_shapes(x, y)?;
        if self.alpha < 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "alpha must be non-negative, got {}",
                self.alpha
            )));
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let x_mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(n_features));
        let y_mean = y.mean().unwrap_or(0.0);
        let x_c = x - &x_mean.view().insert_axis(Axis(0));
        let y_c = y - y_mean;

        let col_norms: Vec<f64> = x_c
            .columns()
            .into_iter()
            .map(|column| column.dot(&column))
            .collect();

        let n = n_samples as f64;
        let l1_penalty = self.alpha * self.l1_ratio * n;
        let l2_penalty = self.alpha * (1.0 - self.l1_ratio) * n;

        let mut w = Array1::<f64>::zeros(n_features);
        let mut residual = y_c.clone();
        let mut sweeps = 0;

        for _ in 0..self.max_iter {
            sweeps += 1;
            let mut max_update = 0.0_f64;
            let mut max_weight = 0.0_f64;

            for j in 0..n_features {
                let denom = col_norms[j] + l2_penalty;
                if denom < 1e-15 {
                    w[j] = 0.0;
                    continue;
                }
                let column = x_c.column(j);
                let rho = column.dot(&residual) + col_norms[j] * w[j];
                let old = w[j];
                w[j] = soft_threshold(rho, l1_penalty) / denom;

                let delta = old - w[j];
                if delta != 0.0 {
                    residual.scaled_add(delta, &column);
                }
                max_update = max_update.max(delta.abs());
                max_weight = max_weight.max(w[j].abs());
            }

            if max_weight == 0.0 || max_update / max_weight < self.tol {
                break;
            }
        }
        debug!(alpha = self.alpha, l1_ratio = self.l1_ratio, sweeps, "elastic net converged");

        self.intercept = Some(y_mean - w.dot(&x_mean));
        self.coefficients = Some(w);
        Ok(self)
    }

    /// Fitted coefficients
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    /// Fitted intercept
    pub const fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    /// Predict for each row of `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (Some(w), Some(b)) = (&self.coefficients, self.intercept) else {
            return Err(ModelError::NotFitted);
        };
        if x.ncols() != w.len() {
            return Err(ModelError::DimensionMismatch(format!(
                "model expects {} features, got {}",
                w.len(),
                x.ncols()
            )));
        }
        Ok(x.dot(w) + b)
    }
}

/// Contiguous K-fold split: the first `n % k` folds take one extra row.
///
/// Returns `(train, test)` index pairs; zero folds yields no pairs.
pub fn kfold_indices(n_samples: usize, n_folds: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    if n_folds == 0 {
        return Vec::new();
    }
    let base = n_samples / n_folds;
    let extra = n_samples % n_folds;

    let mut start = 0;
    (0..n_folds)
        .map(|fold| {
            let size = base + usize::from(fold < extra);
            let test: Vec<usize> = (start..start + size).collect();
            let train: Vec<usize> = (0..start).chain(start + size..n_samples).collect();
            start += size;
            (train, test)
        })
        .collect()
}

/// Log-spaced alpha path from the smallest alpha that zeroes every
/// coefficient down to `eps` times that value.
pub fn alpha_grid(
    x: &Array2<f64>,
    y: &Array1<f64>,
    l1_ratio: f64,
    n_alphas: usize,
    eps: f64,
) -> Vec<f64> {
    let n = x.nrows() as f64;
    let x_mean = x
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(x.ncols()));
    let y_mean = y.mean().unwrap_or(0.0);
    let x_c = x - &x_mean.view().insert_axis(Axis(0));
    let y_c = y - y_mean;

    let max_corr = x_c
        .t()
        .dot(&y_c)
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let alpha_max = max_corr / (n * l1_ratio.max(1e-3));

    if alpha_max <= f64::EPSILON || n_alphas == 0 {
        return vec![eps.max(f64::EPSILON)];
    }
    if n_alphas == 1 {
        return vec![alpha_max];
    }

    let (hi, lo) = (alpha_max.log10(), (alpha_max * eps).log10());
    let step = (hi - lo) / (n_alphas - 1) as f64;
    (0..n_alphas)
        .map(|i| 10f64.powf(hi - step * i as f64))
        .collect()
}

/// Cross-validation settings for [`ElasticNetCv`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvConfig {
    /// Candidate L1 shares
    pub l1_ratios: Vec<f64>,
    /// Alphas per L1 share
    pub n_alphas: usize,
    /// Ratio of the smallest to the largest alpha
    pub eps: f64,
    /// Number of contiguous folds
    pub n_folds: usize,
    /// Maximum coordinate descent sweeps per fit
    pub max_iter: usize,
    /// Coordinate descent tolerance
    pub tol: f64,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self {
            l1_ratios: vec![0.1, 0.5, 0.9],
            n_alphas: 10,
            eps: 1e-3,
            n_folds: 3,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

impl CvConfig {
    /// Reject grids that cannot be searched.
    pub fn validate(&self) -> Result<()> {
        if self.l1_ratios.is_empty() {
            return Err(ModelError::InvalidParameter("l1_ratios is empty".to_string()));
        }
        if let Some(bad) = self.l1_ratios.iter().find(|r| !(0.0..=1.0).contains(*r)) {
            return Err(ModelError::InvalidParameter(format!(
                "l1_ratio must lie in [0, 1], got {bad}"
            )));
        }
        if self.n_folds < 2 {
            return Err(ModelError::InvalidParameter(format!(
                "n_folds must be at least 2, got {}",
                self.n_folds
            )));
        }
        if self.n_alphas == 0 {
            return Err(ModelError::InvalidParameter("n_alphas must be positive".to_string()));
        }
        if !(self.eps > 0.0 && self.eps < 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "eps must lie in (0, 1), got {}",
                self.eps
            )));
        }
        Ok(())
    }
}

/// Mean validation error of one grid point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CvScore {
    /// L1 share
    pub l1_ratio: f64,
    /// Regularization strength
    pub alpha: f64,
    /// Mean squared error averaged over folds
    pub mean_mse: f64,
}

/// Elastic net with `(alpha, l1_ratio)` chosen by cross-validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElasticNetCv {
    config: CvConfig,
    scores: Vec<CvScore>,
    best: Option<CvScore>,
    model: Option<ElasticNet>,
}

fn select_rows(x: &Array2<f64>, y: &Array1<f64>, rows: &[usize]) -> (Array2<f64>, Array1<f64>) {
    (x.select(Axis(0), rows), y.select(Axis(0), rows))
}

impl ElasticNetCv {
    /// Create an unfitted model
    pub const fn new(config: CvConfig) -> Self {
        Self {
            config,
            scores: Vec::new(),
            best: None,
            model: None,
        }
    }

    /// Search the grid, then refit the winner on every row.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        self.config.validate()?;
        check_shapes(x, y)?;
        if x.nrows() < self.config.n_folds {
            return Err(ModelError::InsufficientData {
                required: self.config.n_folds,
                actual: x.nrows(),
            });
        }

        let folds = kfold_indices(x.nrows(), self.config.n_folds);
        let fold_data: Vec<_> = folds
            .iter()
            .map(|(train, test)| (select_rows(x, y, train), select_rows(x, y, test)))
            .collect();

        let mut scores = Vec::new();
        for &l1_ratio in &self.config.l1_ratios {
            for alpha in alpha_grid(x, y, l1_ratio, self.config.n_alphas, self.config.eps) {
                let mut total = 0.0;
                for ((x_train, y_train), (x_test, y_test)) in &fold_data {
                    let mut model = self.candidate(alpha, l1_ratio);
                    model.fit(x_train, y_train)?;
                    let residual = model.predict(x_test)? - y_test;
                    total += residual.dot(&residual) / y_test.len() as f64;
                }
                scores.push(CvScore {
                    l1_ratio,
                    alpha,
                    mean_mse: total / fold_data.len() as f64,
                });
            }
        }

        let best = scores
            .iter()
            .copied()
            .filter(|s| s.mean_mse.is_finite())
            .min_by(|a, b| a.mean_mse.total_cmp(&b.mean_mse))
            .ok_or_else(|| {
                ModelError::InvalidParameter("no grid point produced a finite error".to_string())
            })?;
        info!(
            alpha = best.alpha,
            l1_ratio = best.l1_ratio,
            mse = best.mean_mse,
            "cross-validation selected"
        );

        let mut model = self.candidate(best.alpha, best.l1_ratio);
        model.fit(x, y)?;

        self.scores = scores;
        self.best = Some(best);
        self.model = Some(model);
        Ok(self)
    }

    fn candidate(&self, alpha: f64, l1_ratio: f64) -> ElasticNet {
        ElasticNet::new(alpha, l1_ratio)
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tol)
    }

    /// Grid and solver settings
    pub const fn config(&self) -> &CvConfig {
        &self.config
    }

    /// Every evaluated grid point
    pub fn scores(&self) -> &[CvScore] {
        &self.scores
    }

    /// Winning grid point
    pub const fn best(&self) -> Option<CvScore> {
        self.best
    }

    /// Refitted model
    pub const fn model(&self) -> Option<&ElasticNet> {
        self.model.as_ref()
    }

    /// Predict with the refitted model.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.model.as_ref().ok_or(ModelError::NotFitted)?.predict(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    fn linear_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        // y = 2*x1 - 3*x2 + 5
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let t = i as f64;
            if j == 0 { t } else { (t * 0.7).sin() * 4.0 }
        });
        let y = x.column(0).mapv(|v| 2.0 * v) - x.column(1).mapv(|v| 3.0 * v) + 5.0;
        (x, y)
    }

    #[test]
    fn test_soft_threshold() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
    }

    #[test]
    fn test_small_alpha_recovers_linear_relation() {
        let (x, y) = linear_data(30);
        let mut model = ElasticNet::new(1e-6, 0.5).with_tol(1e-10).with_max_iter(10_000);
        model.fit(&x, &y).unwrap();

        let w = model.coefficients().unwrap();
        assert_relative_eq!(w[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(w[1], -3.0, epsilon = 1e-3);
        assert_relative_eq!(model.intercept().unwrap(), 5.0, epsilon = 1e-2);
    }

    #[test]
    fn test_alpha_max_zeroes_coefficients() {
        let (x, y) = linear_data(20);
        let grid = alpha_grid(&x, &y, 0.9, 10, 1e-3);
        assert_eq!(grid.len(), 10);
        assert_relative_eq!(grid[9] / grid[0], 1e-3, epsilon = 1e-9);

        let mut model = ElasticNet::new(grid[0] * 1.0001, 0.9);
        model.fit(&x, &y).unwrap();
        assert!(model.coefficients().unwrap().iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_constant_target_gives_flat_prediction() {
        let x = array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0], [4.0, 1.0]];
        let y = array![7.0, 7.0, 7.0, 7.0];
        let mut cv = ElasticNetCv::new(CvConfig::default());
        cv.fit(&x, &y).unwrap();
        let p = cv.predict(&x).unwrap();
        assert!(p.iter().all(|v| (v - 7.0).abs() < 1e-9));
    }

    #[rstest]
    #[case(10, 3, vec![4, 3, 3])]
    #[case(9, 3, vec![3, 3, 3])]
    #[case(5, 2, vec![3, 2])]
    fn test_kfold_sizes(#[case] n: usize, #[case] k: usize, #[case] sizes: Vec<usize>) {
        let folds = kfold_indices(n, k);
        let got: Vec<usize> = folds.iter().map(|(_, test)| test.len()).collect();
        assert_eq!(got, sizes);
        for (train, test) in &folds {
            assert_eq!(train.len() + test.len(), n);
            assert!(test.windows(2).all(|w| w[1] == w[0] + 1));
        }
    }

    #[test]
    fn test_kfold_zero_folds_is_empty() {
        assert!(kfold_indices(10, 0).is_empty());
    }

    #[test]
    fn test_cv_selects_from_grid_and_predicts_well() {
        let (x, y) = linear_data(60);
        let mut cv = ElasticNetCv::new(CvConfig::default());
        cv.fit(&x, &y).unwrap();

        assert_eq!(cv.scores().len(), 30);
        let best = cv.best().unwrap();
        assert!([0.1, 0.5, 0.9].contains(&best.l1_ratio));

        let p = cv.predict(&x).unwrap();
        let mse = (&p - &y).mapv(|v| v * v).mean().unwrap();
        let var = y.var(0.0);
        assert!(mse < 0.1 * var, "mse {mse} vs variance {var}");
    }

    #[test]
    fn test_cv_needs_a_row_per_fold() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let err = ElasticNetCv::new(CvConfig::default()).fit(&x, &y).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData { required: 3, actual: 2 }));
    }

    #[test]
    fn test_predict_before_fit() {
        let x = array![[1.0]];
        assert!(matches!(ElasticNet::new(0.1, 0.5).predict(&x), Err(ModelError::NotFitted)));
        assert!(matches!(
            ElasticNetCv::default().predict(&x),
            Err(ModelError::NotFitted)
        ));
    }

    #[test]
    fn test_invalid_grid() {
        let config = CvConfig {
            l1_ratios: vec![1.5],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ModelError::InvalidParameter(_))));
    }
}
