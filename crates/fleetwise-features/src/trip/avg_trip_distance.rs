//! Average Trip Distance Feature
//!
//! Mileage divided by the number of trips for the record.

use crate::columns::{AVG_TRIP_DISTANCE, MILEAGE, TOTAL_TRIPS};
use crate::ratio::{FillPolicy, RatioColumns, derive_ratio};
use crate::traits::{DerivedFeature, FeatureError, FeatureKind};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the AvgTripDistance feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvgTripDistanceConfig {
    /// Distance column (default: `Mileage (km)`)
    pub mileage_column: String,
    /// Trip count column (default: `Total Trips`)
    pub trips_column: String,
}

impl Default for AvgTripDistanceConfig {
    fn default() -> Self {
        Self {
            mileage_column: MILEAGE.to_string(),
            trips_column: TOTAL_TRIPS.to_string(),
        }
    }
}

/// AvgTripDistance computes kilometres per trip
#[derive(Debug, Default)]
pub struct AvgTripDistanceFeature {
    config: AvgTripDistanceConfig,
}

impl AvgTripDistanceFeature {
    /// Create the feature with the given configuration
    pub const fn new(config: AvgTripDistanceConfig) -> Self {
        Self { config }
    }

    fn ratio(&self) -> RatioColumns<'_> {
        RatioColumns {
            numerator: &self.config.mileage_column,
            denominator: &self.config.trips_column,
            output: AVG_TRIP_DISTANCE,
            fill: FillPolicy::Median,
        }
    }

    /// Derive the ratio without filling undefined values.
    pub fn derive_unfilled(&self, df: &DataFrame) -> Result<DataFrame, FeatureError> {
        derive_ratio(df, &self.ratio(), false)
    }
}

impl DerivedFeature for AvgTripDistanceFeature {
    fn name(&self) -> &str {
        "avg_trip_distance"
    }

    fn kind(&self) -> FeatureKind {
        FeatureKind::Ratio
    }

    fn derive(&self, df: &DataFrame) -> Result<DataFrame, FeatureError> {
        derive_ratio(df, &self.ratio(), true)
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![&self.config.mileage_column, &self.config.trips_column]
    }

    fn output_columns(&self) -> Vec<&str> {
        vec![AVG_TRIP_DISTANCE]
    }
}
