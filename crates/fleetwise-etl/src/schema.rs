//! Schema validation and column typing.
//!
//! Validation is a reportable result rather than an error: callers decide
//! whether a [`SchemaReport`] with missing columns aborts ingestion.

use crate::error::{EtlError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Identifier column on the telemetry (cleaning) path.
pub const VEHICLE_ID: &str = "vehicle_id";

/// Event time column on the telemetry (cleaning) path.
pub const TIMESTAMP: &str = "timestamp";

/// Columns every ingested dataset must carry.
pub const MANDATORY_COLUMNS: [&str; 2] = [VEHICLE_ID, TIMESTAMP];

/// Columns whose kind is fixed as [`ColumnKind::Identifier`] regardless of values.
pub const IDENTIFIER_COLUMNS: [&str; 2] = [VEHICLE_ID, "Vehicle ID"];

/// Columns whose kind is fixed as [`ColumnKind::Timestamp`] regardless of values.
pub const TIMESTAMP_COLUMNS: [&str; 1] = [TIMESTAMP];

/// Outcome of a schema check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    /// True when every required column is present.
    pub ok: bool,
    /// Required columns that were not found, in required-set order.
    pub missing_columns: Vec<String>,
}

impl SchemaReport {
    /// Turn a failed report into [`EtlError::Schema`].
    pub fn into_result(self) -> Result<()> {
        if self.ok {
            Ok(())
        } else {
            Err(EtlError::Schema {
                missing: self.missing_columns,
            })
        }
    }
}

/// Check that the dataset carries the mandatory identity/time columns.
pub fn validate_schema(df: &DataFrame) -> SchemaReport {
    validate_columns(df, &MANDATORY_COLUMNS)
}

/// Check that the dataset carries every column in `required`.
pub fn validate_columns(df: &DataFrame, required: &[&str]) -> SchemaReport {
    let missing_columns: Vec<String> = required
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| name.to_string())
        .collect();

    SchemaReport {
        ok: missing_columns.is_empty(),
        missing_columns,
    }
}

/// Semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Every value is a number
    Numeric,
    /// Text or any other non-numeric value
    Categorical,
    /// Schema-fixed event time column
    Timestamp,
    /// Schema-fixed identity column
    Identifier,
}

impl ColumnKind {
    /// Infer the kind of a column from its name and physical type.
    pub fn infer(name: &str, dtype: &DataType) -> Self {
        if IDENTIFIER_COLUMNS.contains(&name) {
            Self::Identifier
        } else if TIMESTAMP_COLUMNS.contains(&name) {
            Self::Timestamp
        } else if is_numeric_dtype(dtype) {
            Self::Numeric
        } else {
            Self::Categorical
        }
    }
}

/// Name, kind and physical type of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Semantic kind
    pub kind: ColumnKind,
    /// Physical polars type
    pub dtype: DataType,
}

impl ColumnDescriptor {
    /// True when every present value in the column is a number.
    pub fn has_numeric_values(&self) -> bool {
        is_numeric_dtype(&self.dtype)
    }
}

/// Describe every column of a dataset, in column order.
pub fn describe_columns(df: &DataFrame) -> Vec<ColumnDescriptor> {
    df.get_columns()
        .iter()
        .map(|column| {
            let name = column.name().to_string();
            let dtype = column.dtype().clone();
            ColumnDescriptor {
                kind: ColumnKind::infer(&name, &dtype),
                name,
                dtype,
            }
        })
        .collect()
}

/// Names of the numeric-valued columns, in column order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| is_numeric_dtype(column.dtype()))
        .map(|column| column.name().to_string())
        .collect()
}

/// True for integer and floating point types.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}
