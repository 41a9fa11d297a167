use crate::helpers::{
    filter_rows, get_request, in_memory_dataset, measurement, seed_stations, spawn_app,
    MockClimateAccess,
};
use archive::{build_app_state, db};
use axum::body::to_bytes;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn temperature_rows() -> Vec<db::MeasurementRow> {
    vec![
        measurement("2016-01-01", "USC00511918", None, 50.0),
        measurement("2017-01-01", "USC00511918", None, 60.0),
        measurement("2017-01-02", "USC00511918", None, 70.0),
        measurement("2017-01-03", "USC00511918", None, 80.0),
    ]
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn from_start_summarizes_everything_on_or_after_the_date() {
    let mock = in_memory_dataset(temperature_rows(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/2017-01-01"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(
        body_json(response).await,
        json!({ "TMAX": 80.0, "TAVG": 70.0, "TMIN": 60.0 })
    );
}

#[tokio::test]
async fn range_bounds_are_inclusive_on_both_sides() {
    let mock = in_memory_dataset(temperature_rows(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/2017-01-01/2017-01-02"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(
        body_json(response).await,
        json!({ "TMAX": 70.0, "TAVG": 65.0, "TMIN": 60.0 })
    );
}

#[tokio::test]
async fn single_date_range_matches_that_dates_rows() {
    let mock = in_memory_dataset(temperature_rows(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/2017-01-02/2017-01-02"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(
        body_json(response).await,
        json!({ "TMAX": 70.0, "TAVG": 70.0, "TMIN": 70.0 })
    );
}

#[tokio::test]
async fn start_beyond_all_data_returns_null_fields_not_an_error() {
    let mock = in_memory_dataset(temperature_rows(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/9999-01-01"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(
        body_json(response).await,
        json!({ "TMAX": null, "TAVG": null, "TMIN": null })
    );
}

#[tokio::test]
async fn malformed_start_degrades_to_null_fields() {
    let mock = in_memory_dataset(temperature_rows(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/not-a-date"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(
        body_json(response).await,
        json!({ "TMAX": null, "TAVG": null, "TMIN": null })
    );
}

#[tokio::test]
async fn data_access_failure_surfaces_as_500() {
    let mut mock = MockClimateAccess::new();
    mock.expect_latest_date()
        .returning(|| Ok("2017-01-03".to_string()));

    // Startup issues exactly three measurement queries (window rows, all
    // rows, tobs rows); everything after that is request traffic
    let dataset = temperature_rows();
    mock.expect_measurements()
        .times(3)
        .returning(move |filter| Ok(filter_rows(&dataset, filter)));
    mock.expect_measurements()
        .returning(|_| Err(db::Error::Query(sqlx::Error::PoolTimedOut)));

    mock.expect_stations().returning(|| Ok(seed_stations()));
    mock.expect_station_count().returning(|| Ok(2));

    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/2017-01-01"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn empty_dataset_aborts_startup() {
    let mut mock = MockClimateAccess::new();
    mock.expect_latest_date()
        .returning(|| Err(db::Error::EmptyDataset));

    let result = build_app_state("http://localhost:9600".to_string(), Arc::new(mock)).await;

    let err = result.err().expect("startup should fail with no data");
    assert!(err.to_string().contains("latest measurement date"));
}
