//! Column routing
//!
//! Splits the requested feature columns into the numeric branch (scaled) and
//! the categorical branch (one-hot encoded) based on their dtype.

use crate::error::{ModelError, Result};
use crate::frame::missing_columns;
use fleetwise_etl::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Partition of feature columns by pipeline branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRouting {
    /// Integer or float columns, in request order
    pub numeric: Vec<String>,
    /// Every other column, in request order
    pub categorical: Vec<String>,
}

impl ColumnRouting {
    /// Total number of routed columns
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    /// True when no column was routed
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    /// All routed columns, numeric first
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .map(String::as_str)
    }
}

/// Route `features` of `df` into numeric and categorical columns.
///
/// Every requested name lands in exactly one branch. Names absent from the
/// frame are reported together as [`ModelError::MissingColumns`].
pub fn route<S: AsRef<str>>(df: &DataFrame, features: &[S]) -> Result<ColumnRouting> {
    let missing = missing_columns(df, features);
    if !missing.is_empty() {
        return Err(ModelError::MissingColumns(missing));
    }

    let mut routing = ColumnRouting::default();
    for name in features.iter().map(AsRef::as_ref) {
        let column = df.column(name)?;
        if is_numeric_dtype(column.dtype()) {
            routing.numeric.push(name.to_string());
        } else {
            routing.categorical.push(name.to_string());
        }
    }
    Ok(routing)
}
