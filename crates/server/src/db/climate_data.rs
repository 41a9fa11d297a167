use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    FromRow, QueryBuilder, Sqlite,
};
use std::{str::FromStr, time::Duration};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("measurement table has no rows, cannot derive an analysis window")]
    EmptyDataset,
    #[error("database integrity check failed: {0}")]
    Integrity(String),
    #[error("failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
}

/// One recorded observation at a station on a date.
///
/// Dates are stored as ISO `YYYY-MM-DD` text, so lexicographic order on the
/// stored strings is calendar order and all range filters compare text.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub date: String,
    pub station: String,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

/// A fixed physical sensor location with geographic attributes.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct StationRow {
    pub station: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// Date bounds and station filter for a measurement query.
///
/// `None` leaves that side unbounded. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementFilter {
    pub start: Option<String>,
    pub end: Option<String>,
    pub station: Option<String>,
}

impl MeasurementFilter {
    pub fn since(start: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            ..Self::default()
        }
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            station: None,
        }
    }

    pub fn for_station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Most recent measurement date in the dataset
    async fn latest_date(&self) -> Result<String, Error>;
    /// Measurement rows matching the filter, ordered by date ascending
    async fn measurements(&self, filter: &MeasurementFilter)
        -> Result<Vec<MeasurementRow>, Error>;
    /// Every station record, ordered by station id
    async fn stations(&self) -> Result<Vec<StationRow>, Error>;
    /// Cardinality of the station table
    async fn station_count(&self) -> Result<u64, Error>;
}

pub struct ClimateAccess {
    pool: SqlitePool,
}

impl ClimateAccess {
    /// Opens a read-only pool on an existing dataset file.
    ///
    /// The dataset is never written; `query_only` guards against accidental
    /// mutation even through handler bugs.
    pub async fn open(database_path: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", database_path))?
            .read_only(true)
            .pragma("query_only", "ON")
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Check database connectivity and integrity.
    pub async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await?;
        if result != "ok" {
            return Err(Error::Integrity(result));
        }

        Ok(())
    }
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn latest_date(&self) -> Result<String, Error> {
        let latest: Option<String> = sqlx::query_scalar("SELECT MAX(date) FROM measurement")
            .fetch_one(&self.pool)
            .await?;

        latest.ok_or(Error::EmptyDataset)
    }

    async fn measurements(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<MeasurementRow>, Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT date, station, prcp, tobs FROM measurement");

        let mut clause = " WHERE ";
        if let Some(start) = &filter.start {
            query.push(clause).push("date >= ").push_bind(start.as_str());
            clause = " AND ";
        }
        if let Some(end) = &filter.end {
            query.push(clause).push("date <= ").push_bind(end.as_str());
            clause = " AND ";
        }
        if let Some(station) = &filter.station {
            query
                .push(clause)
                .push("station = ")
                .push_bind(station.as_str());
        }
        query.push(" ORDER BY date");

        let rows = query
            .build_query_as::<MeasurementRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn stations(&self) -> Result<Vec<StationRow>, Error> {
        let rows = sqlx::query_as::<_, StationRow>(
            "SELECT station, name, latitude, longitude, elevation FROM station ORDER BY station",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn station_count(&self) -> Result<u64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM station")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
