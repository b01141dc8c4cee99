//! Normalization
//!
//! Adds inspectable scaled views of every numeric column. The source column
//! is never overwritten; the scaled copy is written next to it under a
//! method-specific suffix. This is an ETL output, not a fitted transform:
//! statistics are computed over the dataset being normalized.

use crate::error::{EtlError, Result};
use crate::schema::numeric_columns;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Suffix for z-score columns.
pub const ZSCORE_SUFFIX: &str = "_z";

/// Suffix for min-max columns.
pub const MINMAX_SUFFIX: &str = "_scaled";

/// Normalization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMethod {
    /// `(c - mean) / std`, sample standard deviation
    #[default]
    Zscore,
    /// `(c - min) / (max - min)`
    MinMax,
}

impl NormalizeMethod {
    /// Suffix appended to the source column name.
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Zscore => ZSCORE_SUFFIX,
            Self::MinMax => MINMAX_SUFFIX,
        }
    }

    /// Name of the scaled column derived from `column`.
    pub fn output_column(&self, column: &str) -> String {
        format!("{}{}", column, self.suffix())
    }
}

impl fmt::Display for NormalizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zscore => write!(f, "zscore"),
            Self::MinMax => write!(f, "minmax"),
        }
    }
}

impl FromStr for NormalizeMethod {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zscore" | "z" => Ok(Self::Zscore),
            "minmax" | "min-max" => Ok(Self::MinMax),
            other => Err(EtlError::Parse(format!(
                "unknown normalization method '{}' (expected zscore or minmax)",
                other
            ))),
        }
    }
}

/// Center and scale used for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnScale {
    center: f64,
    denominator: f64,
}

impl ColumnScale {
    fn zscore(values: &Float64Chunked) -> Self {
        let center = values.mean().unwrap_or(0.0);
        let std = values.std(1).unwrap_or(f64::NAN);
        Self {
            center,
            denominator: guard_denominator(std),
        }
    }

    fn min_max(values: &Float64Chunked) -> Self {
        let min = values.min().unwrap_or(0.0);
        let max = values.max().unwrap_or(min);
        Self {
            center: min,
            denominator: guard_denominator(max - min),
        }
    }
}

/// Zero, NaN or infinite spreads fall back to 1.
fn guard_denominator(spread: f64) -> f64 {
    if spread == 0.0 || !spread.is_finite() {
        1.0
    } else {
        spread
    }
}

/// True when `name` is a scaled view of another column present in `df`.
fn is_scaled_view(df: &DataFrame, name: &str) -> bool {
    [ZSCORE_SUFFIX, MINMAX_SUFFIX].iter().any(|suffix| {
        name.strip_suffix(suffix).is_some_and(|source| df.column(source).is_ok())
    })
}

/// Add a normalized copy of every numeric column.
///
/// Scaled views written by an earlier pass (a suffixed column whose source
/// is also present) are skipped so suffixes do not compound.
pub fn normalize(df: &DataFrame, method: NormalizeMethod) -> Result<DataFrame> {
    let sources: Vec<String> = numeric_columns(df)
        .into_iter()
        .filter(|name| !is_scaled_view(df, name))
        .collect();

    let mut scaled = Vec::with_capacity(sources.len());
    for name in &sources {
        let values = df.column(name)?.as_materialized_series().cast(&DataType::Float64)?;
        let values = values.f64()?;
        let scale = match method {
            NormalizeMethod::Zscore => ColumnScale::zscore(values),
            NormalizeMethod::MinMax => ColumnScale::min_max(values),
        };
        scaled.push(
            ((col(name.as_str()).cast(DataType::Float64) - lit(scale.center))
                / lit(scale.denominator))
            .alias(method.output_column(name)),
        );
    }

    if scaled.is_empty() {
        return Ok(df.clone());
    }
    Ok(df.clone().lazy().with_columns(scaled).collect()?)
}
