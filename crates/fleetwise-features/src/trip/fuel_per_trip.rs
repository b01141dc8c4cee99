//! Fuel per Trip Feature
//!
//! Litres of fuel divided by the number of trips for the record.

use crate::columns::{FUEL_PER_TRIP, FUEL_USED, TOTAL_TRIPS};
use crate::ratio::{FillPolicy, RatioColumns, derive_ratio};
use crate::traits::{DerivedFeature, FeatureError, FeatureKind};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the FuelPerTrip feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelPerTripConfig {
    /// Fuel column (default: `Fuel Used (L)`)
    pub fuel_column: String,
    /// Trip count column (default: `Total Trips`)
    pub trips_column: String,
}

impl Default for FuelPerTripConfig {
    fn default() -> Self {
        Self {
            fuel_column: FUEL_USED.to_string(),
            trips_column: TOTAL_TRIPS.to_string(),
        }
    }
}

/// FuelPerTrip computes litres per trip
#[derive(Debug, Default)]
pub struct FuelPerTripFeature {
    config: FuelPerTripConfig,
}

impl FuelPerTripFeature {
    /// Create the feature with the given configuration
    pub const fn new(config: FuelPerTripConfig) -> Self {
        Self { config }
    }
}

impl DerivedFeature for FuelPerTripFeature {
    fn name(&self) -> &str {
        "fuel_per_trip"
    }

    fn kind(&self) -> FeatureKind {
        FeatureKind::Ratio
    }

    fn derive(&self, df: &DataFrame) -> Result<DataFrame, FeatureError> {
        let ratio = RatioColumns {
            numerator: &self.config.fuel_column,
            denominator: &self.config.trips_column,
            output: FUEL_PER_TRIP,
            fill: FillPolicy::Median,
        };
        derive_ratio(df, &ratio, true)
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![&self.config.fuel_column, &self.config.trips_column]
    }

    fn output_columns(&self) -> Vec<&str> {
        vec![FUEL_PER_TRIP]
    }
}
