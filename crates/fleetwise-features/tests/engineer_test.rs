//! Integration tests for feature engineering on fleet-shaped tables.

use fleetwise_features::columns::{
    AVG_TRIP_DISTANCE, DERIVED_COLUMNS, FUEL_PER_TRIP, MAINTENANCE_PER_KM, MONTH_NUM,
    MONTH_UNKNOWN,
};
use fleetwise_features::{FeatureEngineer, engineer};
use polars::prelude::*;

fn fleet() -> DataFrame {
    df!(
        "Vehicle ID" => ["V1", "V2", "V3", "V4"],
        "Brand" => ["Volvo", "MAN", "Volvo", "Scania"],
        "Mileage (km)" => [Some(1200.0), Some(800.0), Some(0.0), None],
        "Fuel Used (L)" => [120.0, 90.0, 10.0, 40.0],
        "Maintenance Cost (€)" => [300.0, 160.0, 50.0, 20.0],
        "Total Trips" => [Some(12i64), Some(8), Some(0), None],
        "Month" => [Some("2023-01"), Some("Feb"), Some("13"), None],
    )
    .unwrap()
}

fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn test_engineer_fills_every_gap() {
    let out = engineer(&fleet()).unwrap();

    for name in [AVG_TRIP_DISTANCE, FUEL_PER_TRIP, MAINTENANCE_PER_KM] {
        let column = values(&out, name);
        assert!(column.iter().all(|v| v.is_some_and(f64::is_finite)), "{name}: {column:?}");
    }

    // 1200/12 and 800/8 are both 100, so the median fill is 100 too
    assert_eq!(
        values(&out, AVG_TRIP_DISTANCE),
        vec![Some(100.0), Some(100.0), Some(100.0), Some(100.0)]
    );
    assert_eq!(
        values(&out, MAINTENANCE_PER_KM),
        vec![Some(0.25), Some(0.2), Some(0.0), Some(0.0)]
    );
    assert_eq!(values(&out, MONTH_NUM), vec![Some(1.0), Some(2.0), None, None]);
    assert_eq!(
        values(&out, MONTH_UNKNOWN),
        vec![Some(0.0), Some(0.0), Some(1.0), Some(1.0)]
    );
}

#[test]
fn test_engineer_is_idempotent() {
    let once = engineer(&fleet()).unwrap();
    let twice = engineer(&once).unwrap();

    assert_eq!(once.width(), twice.width());
    for name in DERIVED_COLUMNS {
        assert_eq!(values(&once, name), values(&twice, name), "{name} changed");
    }
}

#[test]
fn test_engineer_keeps_base_columns_untouched() {
    let input = fleet();
    let out = FeatureEngineer::default().engineer(&input).unwrap();

    assert_eq!(out.width(), input.width() + DERIVED_COLUMNS.len());
    let brand = |df: &DataFrame| df.column("Brand").unwrap().as_materialized_series().clone();
    assert!(brand(&out).equals_missing(&brand(&input)));
    assert_eq!(input.width(), 7);
}
