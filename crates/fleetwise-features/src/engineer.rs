//! Feature engineering over a cleaned fleet dataset.

use crate::calendar::month::{MonthCycleConfig, MonthCycleFeature};
use crate::cost::maintenance_per_km::{MaintenancePerKmConfig, MaintenancePerKmFeature};
use crate::traits::{DerivedFeature, FeatureError};
use crate::trip::avg_trip_distance::{AvgTripDistanceConfig, AvgTripDistanceFeature};
use crate::trip::fuel_per_trip::{FuelPerTripConfig, FuelPerTripFeature};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for the FeatureEngineer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Average trip distance sources
    pub avg_trip_distance: AvgTripDistanceConfig,
    /// Fuel per trip sources
    pub fuel_per_trip: FuelPerTripConfig,
    /// Maintenance per km sources and fill value
    pub maintenance_per_km: MaintenancePerKmConfig,
    /// Month source
    pub month: MonthCycleConfig,
    /// Fail with [`FeatureError::MissingColumns`] instead of deriving
    /// placeholder columns when a source column is absent
    pub strict: bool,
}

/// Derives every configured feature, in order, on top of a dataset.
#[derive(Debug)]
pub struct FeatureEngineer {
    features: Vec<Box<dyn DerivedFeature>>,
    strict: bool,
}

impl FeatureEngineer {
    /// Create an engineer for the default fleet feature set
    pub fn new(config: FeatureConfig) -> Self {
        let features: Vec<Box<dyn DerivedFeature>> = vec![
            Box::new(AvgTripDistanceFeature::new(config.avg_trip_distance)),
            Box::new(FuelPerTripFeature::new(config.fuel_per_trip)),
            Box::new(MaintenancePerKmFeature::new(config.maintenance_per_km)),
            Box::new(MonthCycleFeature::new(config.month)),
        ];
        Self {
            features,
            strict: config.strict,
        }
    }

    /// Append an extra feature, derived after the built-in ones
    pub fn with_feature(mut self, feature: Box<dyn DerivedFeature>) -> Self {
        self.features.push(feature);
        self
    }

    /// Features in derivation order
    pub fn features(&self) -> &[Box<dyn DerivedFeature>] {
        &self.features
    }

    /// Names of every column this engineer writes
    pub fn output_columns(&self) -> Vec<&str> {
        self.features
            .iter()
            .flat_map(|feature| feature.output_columns())
            .collect()
    }

    /// Return a copy of `df` with every derived column added.
    ///
    /// Each feature reads only base columns, so engineering an already
    /// engineered frame reproduces the same derived values.
    pub fn engineer(&self, df: &DataFrame) -> Result<DataFrame, FeatureError> {
        let mut out = df.clone();

        for feature in &self.features {
            let missing = feature.missing_columns(df);
            if !missing.is_empty() {
                if self.strict {
                    return Err(FeatureError::MissingColumns(missing));
                }
                warn!(
                    feature = feature.name(),
                    ?missing,
                    "source columns missing, deriving placeholder values"
                );
            }
            out = feature.derive(&out)?;
            debug!(feature = feature.name(), "derived");
        }

        Ok(out)
    }

    /// Add the derived columns `df` does not already carry.
    ///
    /// Derived columns supplied in `df` are kept as given; only absent ones
    /// are computed. Scoring input may hold raw source fields, precomputed
    /// derived fields, or a mix of both.
    pub fn complete(&self, df: &DataFrame) -> Result<DataFrame, FeatureError> {
        let mut out = df.clone();

        for feature in &self.features {
            let (supplied, absent): (Vec<&str>, Vec<&str>) = feature
                .output_columns()
                .into_iter()
                .partition(|name| df.column(name).is_ok());
            if absent.is_empty() {
                continue;
            }
            let missing = feature.missing_columns(df);
            if !missing.is_empty() && self.strict {
                return Err(FeatureError::MissingColumns(missing));
            }

            out = feature.derive(&out)?;
            for name in supplied {
                out.with_column(df.column(name)?.clone())?;
            }
            debug!(feature = feature.name(), ?absent, ?missing, "completed");
        }

        Ok(out)
    }
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

/// Engineer the default feature set.
pub fn engineer(df: &DataFrame) -> Result<DataFrame, FeatureError> {
    FeatureEngineer::default().engineer(df)
}
