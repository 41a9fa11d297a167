use crate::{
    analysis::{self, PrecipitationStats, StationRecord, TobsReading},
    db::{ClimateData, MeasurementFilter},
    routes::{
        self, index_handler, precipitation, stations, temperature_for_range,
        temperature_from_start, tobs,
    },
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::{debug, info};
use std::{collections::BTreeMap, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Fixed-window aggregates computed once at startup and shared read-only by
/// every request.
///
/// They reflect the dataset as it was when the process started; picking up
/// new measurements requires a restart.
pub struct AnnualSummary {
    pub latest_date: String,
    pub window_start: String,
    pub precipitation: BTreeMap<String, PrecipitationStats>,
    pub station_directory: BTreeMap<String, StationRecord>,
    pub most_active_station: String,
    pub tobs: BTreeMap<String, TobsReading>,
}

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub climate_db: Arc<dyn ClimateData>,
    pub annual: Arc<AnnualSummary>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::climate::precipitation::precipitation,
        routes::climate::stations::stations,
        routes::climate::tobs::tobs,
        routes::climate::temperature::temperature_from_start,
        routes::climate::temperature::temperature_for_range,
    ),
    components(
        schemas(
            analysis::PrecipitationStats,
            analysis::StationRecord,
            analysis::TobsReading,
            analysis::TemperatureStats,
        )
    ),
    tags(
        (name = "climate archive api", description = "a RESTful api serving summary statistics over historical weather-station measurements")
    )
)]
struct ApiDoc;

pub async fn build_app_state(
    remote_url: String,
    climate_db: Arc<dyn ClimateData>,
) -> Result<AppState, anyhow::Error> {
    let latest_date = climate_db
        .latest_date()
        .await
        .map_err(|e| anyhow!("error resolving latest measurement date: {}", e))?;
    let window_start = analysis::annual_window_start(&latest_date)
        .map_err(|e| anyhow!("error resolving analysis window: {}", e))?;
    info!(
        "analysis window: {} through {}",
        window_start, latest_date
    );

    let window_rows = climate_db
        .measurements(&MeasurementFilter::since(window_start.as_str()))
        .await?;
    let precipitation = analysis::precipitation_summary(&window_rows, &window_start);

    let all_rows = climate_db.measurements(&MeasurementFilter::default()).await?;
    let ranking = analysis::rank_stations_by_activity(&all_rows);
    let most_active = ranking
        .first()
        .ok_or_else(|| anyhow!("no measurement rows to rank stations by"))?;

    let station_count = climate_db.station_count().await?;
    info!(
        "{} stations in the directory, {} reporting measurements",
        station_count,
        ranking.len()
    );
    for entry in &ranking {
        debug!("  {}: {} rows", entry.station, entry.rows);
    }

    let most_active_rows: Vec<_> = all_rows
        .iter()
        .filter(|row| row.station == most_active.station)
        .cloned()
        .collect();
    let all_time = analysis::temperature_stats(&most_active_rows);
    info!(
        "most active station {} ({} rows), all-time temperatures: min {:?} avg {:?} max {:?}",
        most_active.station, most_active.rows, all_time.tmin, all_time.tavg, all_time.tmax
    );

    let tobs_rows = climate_db
        .measurements(
            &MeasurementFilter::since(window_start.as_str())
                .for_station(most_active.station.as_str()),
        )
        .await?;
    let tobs = analysis::tobs_series(&tobs_rows, &window_start);

    let station_rows = climate_db.stations().await?;
    let station_directory = analysis::station_directory(&station_rows);

    let annual = AnnualSummary {
        most_active_station: most_active.station.clone(),
        latest_date,
        window_start,
        precipitation,
        station_directory,
        tobs,
    };

    Ok(AppState {
        remote_url,
        climate_db,
        annual: Arc::new(annual),
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/{start}", get(temperature_from_start))
        .route("/api/v1.0/{start}/{end}", get(temperature_for_range))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
