use axum::{extract::State, Json};
use std::{collections::BTreeMap, sync::Arc};

use crate::{analysis::TobsReading, AppState};

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Trailing-year temperature observations for the most active station, keyed by date", body = BTreeMap<String, TobsReading>),
    ))]
pub async fn tobs(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, TobsReading>> {
    Json(state.annual.tobs.clone())
}
