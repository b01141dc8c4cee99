//! Data Cleaning
//!
//! Turns raw telemetry into a dataset downstream stages can trust. The steps
//! run in a fixed order so repeated runs over the same input are
//! reproducible:
//!
//! 1. parse the timestamp column (unparsable values become null)
//! 2. drop records without an identifier or timestamp
//! 3. drop exact duplicate records, keeping the first occurrence
//! 4. null out negative numeric values and fill every numeric gap with the
//!    column median over the remaining valid values (0 when none remain)
//!
//! Malformed rows are filtered or repaired, never escalated as errors.

use crate::error::Result;
use crate::schema::{TIMESTAMP, VEHICLE_ID, numeric_columns};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Datetime layouts accepted for timestamp cells, tried in order.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only layouts accepted for timestamp cells (midnight is assumed).
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Configuration for the DataCleaner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Identifier column (default: `vehicle_id`)
    pub id_column: String,
    /// Timestamp column (default: `timestamp`)
    pub timestamp_column: String,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            id_column: VEHICLE_ID.to_string(),
            timestamp_column: TIMESTAMP.to_string(),
        }
    }
}

/// Cleans telemetry datasets according to a [`CleanConfig`].
#[derive(Debug, Default)]
pub struct DataCleaner {
    config: CleanConfig,
}

impl DataCleaner {
    /// Create a cleaner with the given configuration
    pub const fn new(config: CleanConfig) -> Self {
        Self { config }
    }

    /// Run every cleaning step and return the cleaned dataset.
    pub fn clean(&self, df: &DataFrame) -> Result<DataFrame> {
        let input_rows = df.height();

        let parsed = self.parse_timestamps(df)?;
        let identified = self.drop_unidentified(&parsed)?;
        let unique = drop_duplicates(&identified)?;
        let repaired = repair_numeric(&unique)?;

        info!(
            input_rows,
            missing_id_or_time = parsed.height() - identified.height(),
            duplicates = identified.height() - unique.height(),
            output_rows = repaired.height(),
            "cleaned dataset"
        );

        Ok(repaired)
    }

    /// Replace the timestamp column with a canonical millisecond datetime.
    fn parse_timestamps(&self, df: &DataFrame) -> Result<DataFrame> {
        let name = self.config.timestamp_column.as_str();
        let Ok(column) = df.column(name) else {
            return Ok(df.clone());
        };
        if matches!(column.dtype(), DataType::Datetime(_, _)) {
            return Ok(df.clone());
        }

        let text = column.as_materialized_series().cast(&DataType::String)?;
        let millis: Int64Chunked = text
            .str()?
            .into_iter()
            .map(|cell| {
                cell.and_then(parse_timestamp)
                    .map(|ts| ts.and_utc().timestamp_millis())
            })
            .collect();
        let parsed = millis
            .with_name(name.into())
            .into_datetime(TimeUnit::Milliseconds, None)
            .into_series();

        let unparsable = parsed.null_count() - column.null_count();
        if unparsable > 0 {
            debug!(column = name, unparsable, "timestamps could not be parsed");
        }

        let mut out = df.clone();
        out.with_column(parsed)?;
        Ok(out)
    }

    /// Drop records missing the identifier or the parsed timestamp.
    fn drop_unidentified(&self, df: &DataFrame) -> Result<DataFrame> {
        let present = [
            self.config.id_column.as_str(),
            self.config.timestamp_column.as_str(),
        ]
        .into_iter()
        .filter(|name| df.column(name).is_ok())
        .map(|name| col(name).is_not_null())
        .reduce(|acc, expr| acc.and(expr));

        match present {
            Some(predicate) => Ok(df.clone().lazy().filter(predicate).collect()?),
            None => Ok(df.clone()),
        }
    }
}

/// Clean a dataset with the default configuration.
pub fn clean(df: &DataFrame) -> Result<DataFrame> {
    DataCleaner::default().clean(df)
}

/// Parse a single timestamp cell.
///
/// Accepts RFC 3339 plus the common `date time` and date-only layouts.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Drop rows that are equal to an earlier row across every column.
pub fn drop_duplicates(df: &DataFrame) -> Result<DataFrame> {
    Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
}

/// Null out negative numeric values and fill numeric gaps with the median.
///
/// The median is taken after invalidation, over the remaining valid values;
/// a column with no valid values is filled with 0. Repaired columns are
/// `Float64`.
pub fn repair_numeric(df: &DataFrame) -> Result<DataFrame> {
    let numeric = numeric_columns(df);
    if numeric.is_empty() {
        return Ok(df.clone());
    }

    for name in &numeric {
        let values = df.column(name)?.as_materialized_series().cast(&DataType::Float64)?;
        let negatives = values.f64()?.into_iter().flatten().filter(|v| *v < 0.0).count();
        if negatives > 0 || values.null_count() > 0 {
            debug!(
                column = name.as_str(),
                negatives,
                missing = values.null_count(),
                "imputing numeric column with median"
            );
        }
    }

    let repairs: Vec<Expr> = numeric
        .iter()
        .map(|name| {
            let valid = when(col(name.as_str()).lt(lit(0)))
                .then(lit(NULL))
                .otherwise(col(name.as_str()))
                .cast(DataType::Float64);
            valid
                .clone()
                .fill_null(valid.median())
                .fill_null(lit(0.0))
                .alias(name.as_str())
        })
        .collect();

    Ok(df.clone().lazy().with_columns(repairs).collect()?)
}
