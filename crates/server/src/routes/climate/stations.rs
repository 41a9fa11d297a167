use axum::{extract::State, Json};
use std::{collections::BTreeMap, sync::Arc};

use crate::{analysis::StationRecord, AppState};

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Every station's attributes, keyed by station id", body = BTreeMap<String, StationRecord>),
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, StationRecord>> {
    Json(state.annual.station_directory.clone())
}
