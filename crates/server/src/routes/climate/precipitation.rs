use axum::{extract::State, Json};
use std::{collections::BTreeMap, sync::Arc};

use crate::{analysis::PrecipitationStats, AppState};

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Daily precipitation summary for the trailing year, keyed by date", body = BTreeMap<String, PrecipitationStats>),
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, PrecipitationStats>> {
    Json(state.annual.precipitation.clone())
}
