//! Core feature abstraction.

use polars::prelude::*;
use std::fmt;
use thiserror::Error;

/// Errors raised while deriving features
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Polars DataFrame error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Source columns absent while strict derivation was requested
    #[error("Missing source columns: {0:?}")]
    MissingColumns(Vec<String>),
}

/// Broad family a derived feature belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Quotient of two base columns
    Ratio,
    /// Encoding of a date-like column
    Calendar,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ratio => write!(f, "ratio"),
            Self::Calendar => write!(f, "calendar"),
        }
    }
}

/// A column (or group of columns) computed purely from base columns.
///
/// Implementations must read only their [`required_columns`](Self::required_columns)
/// and always emit every [`output_columns`](Self::output_columns) entry, even
/// when sources are missing, so that derivation is total and idempotent.
pub trait DerivedFeature: fmt::Debug + Send + Sync {
    /// Unique feature name
    fn name(&self) -> &str;

    /// Feature family
    fn kind(&self) -> FeatureKind;

    /// Return a copy of `df` with the output columns added or replaced.
    fn derive(&self, df: &DataFrame) -> Result<DataFrame, FeatureError>;

    /// Base columns read by this feature
    fn required_columns(&self) -> Vec<&str>;

    /// Columns written by this feature
    fn output_columns(&self) -> Vec<&str>;

    /// Required columns absent from `df`.
    fn missing_columns(&self, df: &DataFrame) -> Vec<String> {
        self.required_columns()
            .into_iter()
            .filter(|name| df.column(name).is_err())
            .map(str::to_string)
            .collect()
    }
}
