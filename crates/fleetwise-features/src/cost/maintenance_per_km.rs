//! Maintenance per km Feature
//!
//! Maintenance cost divided by mileage. Records without mileage have no
//! defined cost per km; those are filled with 0 rather than a median.

use crate::columns::{MAINTENANCE_COST, MAINTENANCE_PER_KM, MILEAGE};
use crate::ratio::{FillPolicy, RatioColumns, derive_ratio};
use crate::traits::{DerivedFeature, FeatureError, FeatureKind};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the MaintenancePerKm feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenancePerKmConfig {
    /// Cost column (default: `Maintenance Cost (€)`)
    pub cost_column: String,
    /// Distance column (default: `Mileage (km)`)
    pub mileage_column: String,
    /// Value used where the ratio is undefined (default: 0.0)
    pub fill_value: f64,
}

impl Default for MaintenancePerKmConfig {
    fn default() -> Self {
        Self {
            cost_column: MAINTENANCE_COST.to_string(),
            mileage_column: MILEAGE.to_string(),
            fill_value: 0.0,
        }
    }
}

/// MaintenancePerKm computes maintenance spend per kilometre
#[derive(Debug, Default)]
pub struct MaintenancePerKmFeature {
    config: MaintenancePerKmConfig,
}

impl MaintenancePerKmFeature {
    /// Create the feature with the given configuration
    pub const fn new(config: MaintenancePerKmConfig) -> Self {
        Self { config }
    }
}

impl DerivedFeature for MaintenancePerKmFeature {
    fn name(&self) -> &str {
        "maintenance_per_km"
    }

    fn kind(&self) -> FeatureKind {
        FeatureKind::Ratio
    }

    fn derive(&self, df: &DataFrame) -> Result<DataFrame, FeatureError> {
        let ratio = RatioColumns {
            numerator: &self.config.cost_column,
            denominator: &self.config.mileage_column,
            output: MAINTENANCE_PER_KM,
            fill: FillPolicy::Constant(self.config.fill_value),
        };
        derive_ratio(df, &ratio, true)
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![&self.config.cost_column, &self.config.mileage_column]
    }

    fn output_columns(&self) -> Vec<&str> {
        vec![MAINTENANCE_PER_KM]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_mileage_is_zero_not_infinite() {
        let df = df!(
            "Maintenance Cost (€)" => [5.0, 10.0, 7.5, 3.0],
            "Mileage (km)" => [100.0, 200.0, 150.0, 0.0],
        )
        .unwrap();

        let out = MaintenancePerKmFeature::default().derive(&df).unwrap();
        let values: Vec<f64> = out
            .column(MAINTENANCE_PER_KM)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(values.len(), 4);
        assert_relative_eq!(values[0], 0.05);
        assert_relative_eq!(values[1], 0.05);
        assert_relative_eq!(values[2], 0.05);
        assert_eq!(values[3], 0.0);
    }
}
