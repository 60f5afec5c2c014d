//! Forecast aggregation: hourly slice and daily min/max rollup.
//!
//! Both views derive from the same flat 3-hour forecast feed. The hourly
//! slice is a lossy 1:1 projection of the first entries, not a resampling;
//! the daily rollup groups entries by UTC calendar day in first-seen order.

use chrono::{DateTime, NaiveDate};

use crate::client::WeatherClient;
use crate::types::{ConditionSummary, ForecastEntry, ForecastResponse};

/// Number of near-term entries projected into the hourly view.
pub const HOURLY_SLICE_LEN: usize = 8;
/// Maximum number of calendar-day groups in the daily view.
pub const DAILY_ROLLUP_CAP: usize = 8;

/// One near-term forecast point, projected 1:1 from a feed entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyPoint {
    /// Epoch seconds.
    pub timestamp: i64,
    pub temp: f64,
    pub conditions: Vec<ConditionSummary>,
    pub wind_speed: f64,
    /// Precipitation probability, 0..1.
    pub precipitation_probability: f64,
}

/// One calendar-day aggregate.
///
/// Icon, description and precipitation come from the first entry seen for
/// the day; only the temperature bounds fold across all entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    /// Timestamp of the first entry in the group, epoch seconds.
    pub timestamp: i64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub conditions: Vec<ConditionSummary>,
    pub precipitation_probability: f64,
}

/// Derived forecast views plus per-view loading flags.
///
/// Both views derive from one fetch, but the flags are tracked separately so
/// a rendering layer can treat them independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastView {
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
    pub loading_hourly: bool,
    pub loading_daily: bool,
}

impl ForecastView {
    fn empty() -> Self {
        Self::default()
    }
}

/// Project the first [`HOURLY_SLICE_LEN`] feed entries into hourly points.
///
/// Missing fields on a source entry fall back to zero / empty rather than
/// dropping the entry.
pub fn hourly_slice(list: &[ForecastEntry]) -> Vec<HourlyPoint> {
    list.iter()
        .take(HOURLY_SLICE_LEN)
        .map(|entry| HourlyPoint {
            timestamp: entry.dt,
            temp: entry.main.map(|m| m.temp).unwrap_or(0.0),
            conditions: entry.weather.clone(),
            wind_speed: entry.wind.map(|w| w.speed).unwrap_or(0.0),
            precipitation_probability: entry.pop.unwrap_or(0.0),
        })
        .collect()
}

/// Group feed entries by UTC calendar day, folding running min/max temps.
///
/// Entries without a temperature or condition list are skipped; groups keep
/// first-seen order and are capped at [`DAILY_ROLLUP_CAP`].
pub fn daily_rollup(list: &[ForecastEntry]) -> Vec<DailyPoint> {
    let mut days: Vec<(NaiveDate, DailyPoint)> = Vec::new();

    for entry in list {
        let Some(main) = entry.main else { continue };
        if entry.weather.is_empty() {
            continue;
        }
        let Some(date) = DateTime::from_timestamp(entry.dt, 0).map(|dt| dt.date_naive()) else {
            continue;
        };

        if let Some((_, day)) = days.iter_mut().find(|(d, _)| *d == date) {
            day.temp_min = day.temp_min.min(main.temp);
            day.temp_max = day.temp_max.max(main.temp);
        } else {
            days.push((
                date,
                DailyPoint {
                    timestamp: entry.dt,
                    temp_min: main.temp,
                    temp_max: main.temp,
                    conditions: entry.weather.clone(),
                    precipitation_probability: entry.pop.unwrap_or(0.0),
                },
            ));
        }
    }

    days.into_iter()
        .take(DAILY_ROLLUP_CAP)
        .map(|(_, day)| day)
        .collect()
}

/// Build both forecast views for a city.
///
/// A pre-supplied `initial` feed short-circuits the fetch. Without a city
/// name this performs no I/O and yields empty views. Fetch failures and
/// missing data both resolve to empty views with loading flags cleared;
/// city-not-found is logged distinctly from transport errors.
pub async fn load_forecast(
    client: &WeatherClient,
    city: Option<&str>,
    initial: Option<ForecastResponse>,
) -> ForecastView {
    let Some(city) = city else {
        return ForecastView::empty();
    };

    let mut view = ForecastView {
        loading_hourly: true,
        loading_daily: true,
        ..ForecastView::default()
    };

    let list = match initial {
        Some(response) => Some(response.list),
        None => match client.forecast(city).await {
            Ok(Some(response)) => Some(response.list),
            Ok(None) => {
                tracing::warn!("Forecast not available for {}: city not found", city);
                None
            }
            Err(e) => {
                tracing::error!("Failed to fetch forecast for {}: {}", city, e);
                None
            }
        },
    };

    match list {
        Some(list) if !list.is_empty() => {
            view.hourly = hourly_slice(&list);
            view.loading_hourly = false;
            view.daily = daily_rollup(&list);
            view.loading_daily = false;
        }
        Some(_) => {
            tracing::warn!("Forecast list is empty for {}", city);
            view = ForecastView::empty();
        }
        None => {
            view = ForecastView::empty();
        }
    }

    view
}
