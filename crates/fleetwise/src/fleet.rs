//! Fleet dashboard table
//!
//! One row per vehicle and month, with usage, cost and descriptive columns.

use fleetwise_etl::{EtlError, SchemaReport, read_csv, validate_columns};
use fleetwise_features::columns::{FUEL_USED, MAINTENANCE_COST, MILEAGE, MONTH, TOTAL_TRIPS};
use fleetwise_features::{FeatureEngineer, FeatureError};
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Vehicle identifier column of the dashboard table
pub const FLEET_VEHICLE_ID: &str = "Vehicle ID";
/// Manufacturer column
pub const BRAND: &str = "Brand";
/// Vehicle model column
pub const MODEL: &str = "Model";
/// Vehicle category column
pub const VEHICLE_TYPE: &str = "Vehicle_Type";
/// Assigned driver column
pub const DRIVER_NAME: &str = "Driver_Name";

/// Columns the dashboard table is expected to carry
pub const FLEET_COLUMNS: [&str; 10] = [
    FLEET_VEHICLE_ID,
    BRAND,
    MODEL,
    VEHICLE_TYPE,
    DRIVER_NAME,
    MONTH,
    MILEAGE,
    FUEL_USED,
    MAINTENANCE_COST,
    TOTAL_TRIPS,
];

/// Errors raised while loading a fleet table
#[derive(Debug, Error)]
pub enum FleetError {
    /// Reading or validating failed
    #[error("ETL error: {0}")]
    Etl(#[from] EtlError),

    /// Feature engineering failed
    #[error("Feature error: {0}")]
    Features(#[from] FeatureError),
}

/// Check `df` against [`FLEET_COLUMNS`]; missing columns are listed in
/// that order.
pub fn validate_fleet_schema(df: &DataFrame) -> SchemaReport {
    validate_columns(df, &FLEET_COLUMNS)
}

/// Read a fleet CSV and add the derived feature columns.
///
/// Missing dashboard columns are logged, not rejected: features whose sources
/// are absent are still emitted with placeholder values.
pub fn load_fleet(path: impl AsRef<Path>) -> Result<DataFrame, FleetError> {
    let path = path.as_ref();
    let raw = read_csv(path)?;

    let report = validate_fleet_schema(&raw);
    if !report.ok {
        warn!(
            path = %path.display(),
            missing = ?report.missing_columns,
            "fleet table is missing dashboard columns"
        );
    }

    let engineered = FeatureEngineer::default().engineer(&raw)?;
    debug!(rows = engineered.height(), columns = engineered.width(), "fleet table loaded");
    Ok(engineered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetwise_features::columns::DERIVED_COLUMNS;
    use rstest::rstest;

    #[rstest]
    #[case(&FLEET_COLUMNS, &[])]
    #[case(
        &[FLEET_VEHICLE_ID, BRAND, MILEAGE],
        &[MODEL, VEHICLE_TYPE, DRIVER_NAME, MONTH, FUEL_USED, MAINTENANCE_COST, TOTAL_TRIPS]
    )]
    #[case(&[TOTAL_TRIPS, "Failure", BRAND, MONTH], &[
        FLEET_VEHICLE_ID, MODEL, VEHICLE_TYPE, DRIVER_NAME, MILEAGE, FUEL_USED, MAINTENANCE_COST,
    ])]
    fn test_validate_fleet_schema_lists_missing_in_order(
        #[case] present: &[&str],
        #[case] missing: &[&str],
    ) {
        let columns: Vec<Column> = present
            .iter()
            .map(|name| Column::new((*name).into(), [1.0]))
            .collect();
        let df = DataFrame::new(columns).unwrap();

        let report = validate_fleet_schema(&df);
        assert_eq!(report.ok, missing.is_empty());
        assert_eq!(report.missing_columns, missing);
    }

    #[test]
    fn test_load_fleet_engineers_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.csv");
        std::fs::write(
            &path,
            concat!(
                "Vehicle ID,Brand,Model,Vehicle_Type,Driver_Name,Month,",
                "Mileage (km),Fuel Used (L),Maintenance Cost (€),Total Trips\n",
                "V1,Volvo,FH,Truck,Ana,2023-01,1200,300,150,12\n",
                "V2,MAN,TGX,Truck,Ben,2023-02,900,250,90,0\n",
            ),
        )
        .unwrap();

        let df = load_fleet(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert!(validate_fleet_schema(&df).ok);
        for name in DERIVED_COLUMNS {
            assert!(df.column(name).is_ok(), "missing {name}");
        }
    }
}
