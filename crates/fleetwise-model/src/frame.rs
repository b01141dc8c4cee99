//! Column extraction from polars frames into plain vectors.

use crate::error::{ModelError, Result};
use fleetwise_etl::is_numeric_dtype;
use polars::prelude::*;

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| ModelError::MissingColumns(vec![name.to_string()]))
}

/// Names from `names` that `df` does not carry.
pub(crate) fn missing_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| df.column(name).is_err())
        .map(str::to_string)
        .collect()
}

/// Numeric cells of `name` as `f64`; nulls and non-finite values are `None`.
///
/// A column holding text is rejected rather than silently coerced.
pub(crate) fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = column(df, name)?.as_materialized_series();
    let dtype = series.dtype();
    if !is_numeric_dtype(dtype) && !matches!(dtype, DataType::Null | DataType::Boolean) {
        return Err(ModelError::InputShape(format!(
            "column '{name}' must be numeric, found {dtype}"
        )));
    }

    let values = series.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Cells of `name` rendered as category labels; nulls stay `None`.
pub(crate) fn category_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = column(df, name)?.as_materialized_series();
    let values = series.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
