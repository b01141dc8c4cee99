//! Integration tests: engineer, train, persist, load and serve.

use fleetwise_features::engineer;
use fleetwise_runtime::{
    ModelArtifact, ModelHandle, PredictRequest, PredictionService, Predictor, RuntimeError,
    TrainConfig, Trainer, predict, records_to_frame,
};
use polars::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

const BRANDS: [&str; 3] = ["Volvo", "MAN", "Scania"];
const MONTHS: [&str; 4] = ["2023-01", "2023-04", "2023-07", "2023-10"];

fn fleet(n: usize) -> DataFrame {
    let trips: Vec<i64> = (0..n).map(|i| 10 + (i % 7) as i64).collect();
    let mileage: Vec<f64> = (0..n)
        .map(|i| 40.0 * trips[i] as f64 + 15.0 * (i % 5) as f64)
        .collect();
    let fuel: Vec<f64> = mileage.iter().map(|m| m * 0.08).collect();
    let cost: Vec<f64> = (0..n).map(|i| 200.0 + 30.0 * (i % 4) as f64).collect();
    let brand: Vec<&str> = (0..n).map(|i| BRANDS[i % 3]).collect();
    let month: Vec<&str> = (0..n).map(|i| MONTHS[i % 4]).collect();

    df!(
        "Brand" => brand,
        "Mileage (km)" => mileage,
        "Fuel Used (L)" => fuel,
        "Maintenance Cost (€)" => cost,
        "Total Trips" => trips,
        "Month" => month,
    )
    .unwrap()
}

fn numeric_config() -> TrainConfig {
    TrainConfig {
        features: Some(vec![
            "Total Trips".to_string(),
            "Fuel Used (L)".to_string(),
            "Brand".to_string(),
            "Month_sin".to_string(),
            "Month_cos".to_string(),
        ]),
        ..Default::default()
    }
}

#[test]
fn test_train_persist_and_predict() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("models").join("latest_model.json");
    let data = engineer(&fleet(40)).unwrap();

    let outcome = Trainer::new(numeric_config())
        .train(&data, "Mileage (km)", &path)
        .unwrap();

    assert_eq!(outcome.path, path);
    assert!(path.exists());
    assert!(!dir.path().join("models").join("latest_model.json.tmp").exists());
    assert_eq!(outcome.report.n_train, 32);
    assert_eq!(outcome.report.n_test, 8);
    assert!(outcome.report.rmse.is_finite());
    assert!(outcome.report.r2 > 0.9, "r2 = {}", outcome.report.r2);

    let artifact = ModelArtifact::load(&path).unwrap();
    assert_eq!(artifact.target, "Mileage (km)");
    assert_eq!(artifact.report.n_train, outcome.report.n_train);
    assert_eq!(artifact.report.coefficients.len(), outcome.report.coefficients.len());
    assert!((artifact.report.rmse - outcome.report.rmse).abs() < 1e-9);

    let predictions = predict(&path, &data).unwrap();
    assert_eq!(predictions.len(), 40);
    assert!(predictions.iter().all(|p| p.is_finite()));
}

#[test]
fn test_five_rows_is_insufficient() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let data = engineer(&fleet(5)).unwrap();

    let err = Trainer::default()
        .train(&data, "Mileage (km)", &path)
        .unwrap_err();
    match err {
        RuntimeError::InsufficientData { required, actual } => {
            assert_eq!(required, 10);
            assert_eq!(actual, 5);
        }
        other => panic!("expected insufficient data, got {other:?}"),
    }
    assert!(!path.exists());
}

#[test]
fn test_rows_without_target_are_dropped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let mut data = engineer(&fleet(12)).unwrap();
    let target: Vec<Option<f64>> = (0..12)
        .map(|i| if i < 3 { None } else { Some(i as f64) })
        .collect();
    data.with_column(Series::new("Failure".into(), target)).unwrap();

    let err = Trainer::new(numeric_config())
        .train(&data, "Failure", &path)
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::InsufficientData {
            required: 10,
            actual: 9
        }
    ));
}

#[test]
fn test_missing_target_column() {
    let dir = tempdir().unwrap();
    let data = fleet(20);
    let err = Trainer::default()
        .train(&data, "Failure", &dir.path().join("m.json"))
        .unwrap_err();
    assert!(matches!(err, RuntimeError::MissingColumns(cols) if cols == vec!["Failure"]));
}

#[test]
fn test_unseen_category_and_bad_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let data = engineer(&fleet(30)).unwrap();
    Trainer::new(numeric_config())
        .train(&data, "Mileage (km)", &path)
        .unwrap();

    let predictor = Predictor::load(&path).unwrap();
    let scored = predictor
        .predict_records(&[json!({
            "Total Trips": 12,
            "Fuel Used (L)": 40.0,
            "Brand": "Tesla",
            "Month_sin": 0.0,
            "Month_cos": 1.0,
        })])
        .unwrap();
    assert_eq!(scored.len(), 1);
    assert!(scored[0].is_finite());

    let err = predictor
        .predict_records(&[json!({"Total Trips": 12})])
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InputShape(_)));

    let err = predictor
        .predict_records(&[json!({
            "Total Trips": "many",
            "Fuel Used (L)": 40.0,
            "Brand": "MAN",
            "Month_sin": 0.0,
            "Month_cos": 1.0,
        })])
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InputShape(_)));
}

#[test]
fn test_service_reload_swaps_model() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("latest_model.json");
    let handle = Arc::new(ModelHandle::open(&path));
    let service = PredictionService::new(Arc::clone(&handle));
    assert!(!service.status().model_loaded);

    let request = PredictRequest {
        features: vec![json!({
            "Total Trips": 12,
            "Fuel Used (L)": 40.0,
            "Brand": "Volvo",
            "Month_sin": 0.0,
            "Month_cos": 1.0,
        })],
    };
    assert_eq!(service.predict(&request).unwrap_err().status_code(), 503);

    let data = engineer(&fleet(30)).unwrap();
    Trainer::new(numeric_config())
        .train(&data, "Mileage (km)", &path)
        .unwrap();
    let before = handle.get();
    handle.reload().unwrap();

    assert!(before.is_none());
    assert!(service.status().model_loaded);
    let response = service.predict(&request).unwrap();
    assert_eq!(response.predictions.len(), 1);

    let bad = PredictRequest {
        features: vec![json!({"Brand": "Volvo"})],
    };
    assert_eq!(service.predict(&bad).unwrap_err().status_code(), 400);
}

#[test]
fn test_service_engineers_raw_dashboard_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("latest_model.json");
    let data = engineer(&fleet(30)).unwrap();
    Trainer::new(TrainConfig::default())
        .train(&data, "Mileage (km)", &path)
        .unwrap();

    let handle = Arc::new(ModelHandle::open(&path));
    let service = PredictionService::new(Arc::clone(&handle));
    let raw = json!({
        "Brand": "Volvo",
        "Fuel Used (L)": 40.0,
        "Maintenance Cost (€)": 230.0,
        "Total Trips": 12,
        "Month": "2023-04",
    });
    let response = service
        .predict(&PredictRequest {
            features: vec![raw.clone()],
        })
        .unwrap();
    assert_eq!(response.predictions.len(), 1);
    assert!(response.predictions[0].is_finite());

    let engineered = engineer(&records_to_frame(&[raw]).unwrap()).unwrap();
    let expected = handle.get().unwrap().predict(&engineered).unwrap();
    assert!((response.predictions[0] - expected[0]).abs() < 1e-9);
}
