use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::error;
use std::sync::Arc;

use crate::{
    analysis::{self, TemperatureStats},
    db::MeasurementFilter,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
         ("start" = String, Path, description = "Inclusive start date, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature summary over all measurements on or after the start date; fields are null when nothing matches", body = TemperatureStats),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query measurements")
    ))]
pub async fn temperature_from_start(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStats>, (StatusCode, String)> {
    summarize(&state, MeasurementFilter::since(start)).await
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
         ("start" = String, Path, description = "Inclusive start date, YYYY-MM-DD"),
         ("end" = String, Path, description = "Inclusive end date, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature summary over all measurements between the two dates; fields are null when nothing matches", body = TemperatureStats),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query measurements")
    ))]
pub async fn temperature_for_range(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStats>, (StatusCode, String)> {
    summarize(&state, MeasurementFilter::between(start, end)).await
}

/// Runs a fresh query per request; the pool scopes the connection so nothing
/// is held across requests.
async fn summarize(
    state: &AppState,
    filter: MeasurementFilter,
) -> Result<Json<TemperatureStats>, (StatusCode, String)> {
    let rows = state.climate_db.measurements(&filter).await.map_err(|err| {
        error!("error querying measurements: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to query measurements: {}", err),
        )
    })?;

    Ok(Json(analysis::temperature_stats(&rows)))
}
