//! Month cycle feature
//!
//! Parses the reporting month into a number 1 to 12 and encodes it on the
//! unit circle so December and January end up next to each other. Records
//! whose month cannot be read get `Month_Num = null`, sine and cosine of 0,
//! and `Month_Unknown = 1`.

use crate::columns::{MONTH, MONTH_COS, MONTH_NUM, MONTH_SIN, MONTH_UNKNOWN};
use crate::traits::{DerivedFeature, FeatureError, FeatureKind};
use chrono::Datelike;
use fleetwise_etl::parse_timestamp;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parse a month from free text.
///
/// Accepts integers 1 to 12, English month names and their three-letter
/// abbreviations (`"Sept"` included), `YYYY-MM`, `"March 2021"`, and any
/// date or datetime understood by [`parse_timestamp`].
pub fn parse_month(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(value) = raw.parse::<f64>() {
        return month_from_number(value);
    }

    if let Some(month) = raw.split_whitespace().next().and_then(month_from_name) {
        return Some(month);
    }

    if let Some((year, month)) = raw.split_once('-') {
        if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) && !month.contains('-') {
            return month.parse::<u32>().ok().filter(|m| (1..=12).contains(m));
        }
    }

    parse_timestamp(raw).map(|ts| ts.month())
}

fn month_from_number(value: f64) -> Option<u32> {
    if value.fract() == 0.0 && (1.0..=12.0).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

fn month_from_name(token: &str) -> Option<u32> {
    let token = token.trim_end_matches([',', '.']).to_lowercase();
    if token.len() < 3 {
        return None;
    }
    if token == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|name| *name == token || (token.len() == 3 && name.starts_with(&token)))
        .map(|idx| idx as u32 + 1)
}

/// Configuration for the MonthCycle feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthCycleConfig {
    /// Month source column (default: `Month`)
    pub month_column: String,
}

impl Default for MonthCycleConfig {
    fn default() -> Self {
        Self {
            month_column: MONTH.to_string(),
        }
    }
}

/// MonthCycle derives `Month_Num`, `Month_sin`, `Month_cos` and `Month_Unknown`
#[derive(Debug, Default)]
pub struct MonthCycleFeature {
    config: MonthCycleConfig,
}

impl MonthCycleFeature {
    /// Create the feature with the given configuration
    pub const fn new(config: MonthCycleConfig) -> Self {
        Self { config }
    }

    fn month_numbers(&self, df: &DataFrame) -> Result<Vec<Option<f64>>, FeatureError> {
        let Ok(column) = df.column(&self.config.month_column) else {
            return Ok(vec![None; df.height()]);
        };
        let series = column.as_materialized_series();

        if series.dtype().is_integer() || series.dtype().is_float() {
            let values = series.cast(&DataType::Float64)?;
            return Ok(values
                .f64()?
                .into_iter()
                .map(|v| v.and_then(month_from_number).map(f64::from))
                .collect());
        }

        let text = series.cast(&DataType::String)?;
        Ok(text
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_month).map(f64::from))
            .collect())
    }
}

impl DerivedFeature for MonthCycleFeature {
    fn name(&self) -> &str {
        "month_cycle"
    }

    fn kind(&self) -> FeatureKind {
        FeatureKind::Calendar
    }

    fn derive(&self, df: &DataFrame) -> Result<DataFrame, FeatureError> {
        let months = self.month_numbers(df)?;
        let mut out = df.clone();
        out.with_column(Series::new(MONTH_NUM.into(), months))?;

        let angle = col(MONTH_NUM).fill_null(lit(0.0)) * lit(TAU / 12.0);
        Ok(out
            .lazy()
            .with_columns([
                angle.clone().sin().alias(MONTH_SIN),
                angle.cos().alias(MONTH_COS),
                col(MONTH_NUM)
                    .is_null()
                    .cast(DataType::Float64)
                    .alias(MONTH_UNKNOWN),
            ])
            .collect()?)
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![&self.config.month_column]
    }

    fn output_columns(&self) -> Vec<&str> {
        vec![MONTH_NUM, MONTH_SIN, MONTH_COS, MONTH_UNKNOWN]
    }
}
