//! Shared machinery for ratio features.
//!
//! A ratio is null whenever its denominator is zero or absent, or when either
//! source column is missing from the dataset. Residual nulls are filled
//! according to a [`FillPolicy`].

use crate::traits::FeatureError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// How residual nulls in a ratio column are filled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FillPolicy {
    /// Median of the column's valid values (0 when there are none)
    Median,
    /// A fixed value
    Constant(f64),
}

/// Column wiring for one ratio.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RatioColumns<'a> {
    pub(crate) numerator: &'a str,
    pub(crate) denominator: &'a str,
    pub(crate) output: &'a str,
    pub(crate) fill: FillPolicy,
}

/// `numerator / denominator`, null for zero or absent denominators.
fn raw_ratio(df: &DataFrame, ratio: &RatioColumns<'_>) -> Expr {
    if df.column(ratio.numerator).is_err() || df.column(ratio.denominator).is_err() {
        return lit(NULL).cast(DataType::Float64);
    }

    let denominator = col(ratio.denominator).cast(DataType::Float64);
    when(denominator.clone().neq(lit(0.0)))
        .then(col(ratio.numerator).cast(DataType::Float64) / denominator)
        .otherwise(lit(NULL).cast(DataType::Float64))
}

fn fill(raw: Expr, policy: FillPolicy) -> Expr {
    match policy {
        FillPolicy::Median => raw.clone().fill_null(raw.median()).fill_null(lit(0.0)),
        FillPolicy::Constant(value) => raw.fill_null(lit(value)),
    }
}

/// Add the ratio column, applying the fill policy when `apply_fill` is set.
pub(crate) fn derive_ratio(
    df: &DataFrame,
    ratio: &RatioColumns<'_>,
    apply_fill: bool,
) -> Result<DataFrame, FeatureError> {
    let raw = raw_ratio(df, ratio);
    let expr = if apply_fill { fill(raw, ratio.fill) } else { raw };

    Ok(df
        .clone()
        .lazy()
        .with_column(expr.cast(DataType::Float64).alias(ratio.output))
        .collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A_PER_B: RatioColumns<'static> = RatioColumns {
        numerator: "a",
        denominator: "b",
        output: "a_per_b",
        fill: FillPolicy::Median,
    };

    fn column(df: &DataFrame) -> Vec<Option<f64>> {
        df.column("a_per_b")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_zero_and_absent_denominators_are_null() {
        let df = df!(
            "a" => [10.0, 10.0, 10.0, 9.0],
            "b" => [Some(2.0), Some(0.0), None, Some(3.0)],
        )
        .unwrap();

        let raw = derive_ratio(&df, &A_PER_B, false).unwrap();
        assert_eq!(column(&raw), vec![Some(5.0), None, None, Some(3.0)]);

        let filled = derive_ratio(&df, &A_PER_B, true).unwrap();
        assert_eq!(column(&filled), vec![Some(5.0), Some(4.0), Some(4.0), Some(3.0)]);
    }

    #[test]
    fn test_constant_fill() {
        let df = df!("a" => [1.0, 4.0], "b" => [0.0, 2.0]).unwrap();
        let ratio = RatioColumns {
            fill: FillPolicy::Constant(0.0),
            ..A_PER_B
        };
        let out = derive_ratio(&df, &ratio, true).unwrap();
        assert_eq!(column(&out), vec![Some(0.0), Some(2.0)]);
    }

    #[test]
    fn test_missing_source_column_yields_present_output() {
        let df = df!("a" => [1.0, 2.0]).unwrap();

        let raw = derive_ratio(&df, &A_PER_B, false).unwrap();
        assert_eq!(column(&raw), vec![None, None]);

        let filled = derive_ratio(&df, &A_PER_B, true).unwrap();
        assert_eq!(column(&filled), vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_integer_sources() {
        let df = df!("a" => [7i64, 9], "b" => [2i64, 3]).unwrap();
        let out = derive_ratio(&df, &A_PER_B, true).unwrap();
        assert_eq!(column(&out), vec![Some(3.5), Some(3.0)]);
    }
}
