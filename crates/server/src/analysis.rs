//! Aggregation engine for the archive's summary endpoints.
//!
//! Everything here is a pure reduction over measurement rows the data layer
//! already fetched. The window filter is applied again here even though the
//! SQL layer also bounds its queries, so the no-out-of-window-key invariant
//! does not depend on the data source behaving.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use time::{format_description::BorrowedFormatItem, macros::format_description, Date, Month};
use utoipa::ToSchema;

use crate::db::{MeasurementRow, StationRow};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to parse measurement date: {0}")]
    DateParse(#[from] time::error::Parse),
    #[error("failed to format date: {0}")]
    DateFormat(#[from] time::error::Format),
    #[error("no calendar date exists one year before {0}")]
    WindowShift(String),
}

/// Per-date precipitation summary across all stations reporting that date.
///
/// Only non-null readings contribute; a date whose readings are all null is
/// never emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrecipitationStats {
    #[serde(rename = "Max")]
    pub max: f64,
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "Sum")]
    pub sum: f64,
    #[serde(rename = "Count")]
    pub count: u64,
}

/// Min/avg/max temperature over a filtered row set.
///
/// All three fields are null when the row set is empty, which callers
/// serialize as-is rather than turning into an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemperatureStats {
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
}

/// One temperature observation, keyed by date in the serialized map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TobsReading {
    pub tobs: f64,
}

/// A station's directory attributes, keyed by station id in the serialized map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// All-time measurement row count for one station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationActivity {
    pub station: String,
    pub rows: u64,
}

/// Start of the trailing-year analysis window: same month and day one year
/// before the given date, inclusive.
///
/// A Feb 29 reference has no counterpart in an ordinary year and clamps to
/// Feb 28.
pub fn annual_window_start(latest_date: &str) -> Result<String, Error> {
    let latest = Date::parse(latest_date, DATE_FORMAT)?;
    let year = latest.year() - 1;

    let start = match Date::from_calendar_date(year, latest.month(), latest.day()) {
        Ok(date) => date,
        Err(_) if latest.month() == Month::February && latest.day() == 29 => {
            Date::from_calendar_date(year, Month::February, 28)
                .map_err(|_| Error::WindowShift(latest_date.to_owned()))?
        }
        Err(_) => return Err(Error::WindowShift(latest_date.to_owned())),
    };

    Ok(start.format(DATE_FORMAT)?)
}

/// Max/min/sum/count of non-null precipitation readings per date, restricted
/// to dates on or after `window_start`, ordered by date ascending.
pub fn precipitation_summary(
    rows: &[MeasurementRow],
    window_start: &str,
) -> BTreeMap<String, PrecipitationStats> {
    let mut summary: BTreeMap<String, PrecipitationStats> = BTreeMap::new();

    for row in rows {
        if row.date.as_str() < window_start {
            continue;
        }
        let Some(prcp) = row.prcp else { continue };

        summary
            .entry(row.date.clone())
            .and_modify(|stats| {
                stats.max = stats.max.max(prcp);
                stats.min = stats.min.min(prcp);
                stats.sum += prcp;
                stats.count += 1;
            })
            .or_insert(PrecipitationStats {
                max: prcp,
                min: prcp,
                sum: prcp,
                count: 1,
            });
    }

    summary
}

/// All stations ranked by total measurement row count, descending.
///
/// The sort is stable and counting preserves first appearance, so stations
/// with equal counts keep the order the data source returned them in.
pub fn rank_stations_by_activity(rows: &[MeasurementRow]) -> Vec<StationActivity> {
    let mut first_seen: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();

    for row in rows {
        match counts.get_mut(&row.station) {
            Some(count) => *count += 1,
            None => {
                first_seen.push(row.station.clone());
                counts.insert(row.station.clone(), 1);
            }
        }
    }

    let mut ranking: Vec<StationActivity> = first_seen
        .into_iter()
        .map(|station| {
            let rows = counts[&station];
            StationActivity { station, rows }
        })
        .collect();
    ranking.sort_by(|a, b| b.rows.cmp(&a.rows));
    ranking
}

/// Min/avg/max temperature over the given rows; all-null on an empty set.
pub fn temperature_stats(rows: &[MeasurementRow]) -> TemperatureStats {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0u64;

    for row in rows {
        min = min.min(row.tobs);
        max = max.max(row.tobs);
        sum += row.tobs;
        count += 1;
    }

    if count == 0 {
        TemperatureStats {
            tmax: None,
            tavg: None,
            tmin: None,
        }
    } else {
        TemperatureStats {
            tmax: Some(max),
            tavg: Some(sum / count as f64),
            tmin: Some(min),
        }
    }
}

/// Per-date temperature series restricted to dates on or after
/// `window_start`.
///
/// Rows arrive date-ascending; when two rows share a date the later row
/// replaces the earlier one (last write wins).
pub fn tobs_series(
    rows: &[MeasurementRow],
    window_start: &str,
) -> BTreeMap<String, TobsReading> {
    let mut series = BTreeMap::new();

    for row in rows {
        if row.date.as_str() < window_start {
            continue;
        }
        series.insert(row.date.clone(), TobsReading { tobs: row.tobs });
    }

    series
}

/// Every station's attribute record keyed by station id, ascending.
pub fn station_directory(stations: &[StationRow]) -> BTreeMap<String, StationRecord> {
    stations
        .iter()
        .map(|row| {
            (
                row.station.clone(),
                StationRecord {
                    name: row.name.clone(),
                    latitude: row.latitude,
                    longitude: row.longitude,
                    elevation: row.elevation,
                },
            )
        })
        .collect()
}
