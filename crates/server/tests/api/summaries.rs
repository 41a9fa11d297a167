use crate::helpers::{
    get_request, in_memory_dataset, measurement, seed_measurements, seed_stations, spawn_app,
};
use axum::body::to_bytes;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn index_lists_available_routes() {
    let mock = in_memory_dataset(seed_measurements(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("api/v1.0/precipitation"));
    assert!(html.contains("api/v1.0/stations"));
    assert!(html.contains("api/v1.0/tobs"));
}

#[tokio::test]
async fn stations_route_returns_the_exact_directory() {
    let mock = in_memory_dataset(seed_measurements(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/stations"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let directory: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        directory,
        json!({
            "USC00511918": {
                "name": "HONOLULU OBSERVATORY 702.2, HI US",
                "latitude": 21.3152,
                "longitude": -157.9992,
                "elevation": 0.9,
            },
            "USC00519281": {
                "name": "WAIHEE 837.5, HI US",
                "latitude": 21.45167,
                "longitude": -157.84889,
                "elevation": 32.9,
            },
        })
    );
}

#[tokio::test]
async fn precipitation_route_contains_no_date_outside_the_trailing_year() {
    let mock = in_memory_dataset(seed_measurements(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/precipitation"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let summary: Value = serde_json::from_slice(&body).unwrap();
    let summary = summary.as_object().unwrap();

    // latest seeded date is 2017-08-23, so the window opens 2016-08-23
    assert!(!summary.is_empty());
    assert!(summary.keys().all(|date| date.as_str() >= "2016-08-23"));
    assert!(summary.contains_key("2016-08-23"));
    assert!(summary.contains_key("2017-08-23"));

    let stats = summary.get("2017-08-23").unwrap();
    assert_eq!(stats.get("Max").unwrap().as_f64(), Some(0.3));
    assert_eq!(stats.get("Min").unwrap().as_f64(), Some(0.1));
    assert_eq!(stats.get("Count").unwrap().as_u64(), Some(2));
}

#[tokio::test]
async fn tobs_route_serves_the_most_active_station_in_window() {
    let mock = in_memory_dataset(seed_measurements(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/tobs"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let series: Value = serde_json::from_slice(&body).unwrap();
    let series = series.as_object().unwrap();

    assert!(series.keys().all(|date| date.as_str() >= "2016-08-23"));
    // USC00511918 reports every day, so it is the most active; its readings
    // are all 70.0
    assert_eq!(
        series.get("2017-08-23").unwrap(),
        &json!({ "tobs": 70.0 })
    );
}

#[tokio::test]
async fn tobs_route_keeps_the_last_reading_for_a_duplicated_date() {
    let rows = vec![
        measurement("2017-01-01", "A", None, 70.0),
        measurement("2017-01-01", "A", None, 74.0),
        measurement("2017-01-02", "A", None, 71.0),
        measurement("2017-01-02", "B", None, 60.0),
    ];
    let mock = in_memory_dataset(rows, seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v1.0/tobs"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let series: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        series,
        json!({
            "2017-01-01": { "tobs": 74.0 },
            "2017-01-02": { "tobs": 71.0 },
        })
    );
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let mock = in_memory_dataset(seed_measurements(), seed_stations());
    let test_app = spawn_app(Arc::new(mock)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get_request("/api/v2.0/precipitation/extra/segments"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), 404);
}
