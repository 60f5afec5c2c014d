//! Domain and wire types for the weather provider.
//!
//! Wire types mirror the OpenWeather response shapes; `WeatherSnapshot` is the
//! flattened domain form the rest of the application works with. A snapshot is
//! built wholesale from one provider response and replaced wholesale on the
//! next successful fetch.

use serde::{Deserialize, Serialize};

/// One `{icon, description}` pair from the provider's `weather` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub icon: String,
    pub description: String,
}

/// Geographic coordinates of a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Point-in-time weather reading for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub current_temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: Option<f64>,
    pub wind_speed: f64,
    pub wind_deg: Option<f64>,
    pub cloudiness: u8,
    pub condition_icon: String,
    pub condition_description: String,
    /// Observation time, epoch seconds.
    pub observed_at: i64,
    pub timezone_offset_seconds: i32,
    /// Epoch seconds.
    pub sunrise: i64,
    /// Epoch seconds.
    pub sunset: i64,
}

/// One 3-hour-resolution entry from the provider's forecast feed.
///
/// Provider payloads occasionally omit fields, so everything except the
/// timestamp is optional here; the aggregator applies lossy defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Entry time, epoch seconds.
    pub dt: i64,
    #[serde(default)]
    pub main: Option<ForecastMain>,
    #[serde(default)]
    pub weather: Vec<ConditionSummary>,
    #[serde(default)]
    pub wind: Option<ForecastWind>,
    /// Precipitation probability, 0..1.
    #[serde(default)]
    pub pop: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastWind {
    pub speed: f64,
}

/// Provider forecast response: a flat chronological list of entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

// --- provider wire shapes for the current-weather endpoint ---

#[derive(Debug, Deserialize)]
pub(crate) struct ApiWeatherResponse {
    pub name: String,
    #[serde(default)]
    pub sys: ApiSys,
    #[serde(default)]
    pub weather: Vec<ConditionSummary>,
    pub main: ApiMain,
    #[serde(default)]
    pub wind: ApiWind,
    pub coord: Coordinates,
    #[serde(default)]
    pub clouds: ApiClouds,
    pub dt: i64,
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiSys {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    #[serde(default)]
    pub pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiWind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiClouds {
    #[serde(default)]
    pub all: u8,
}

/// One match from the geocoding endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct GeoMatch {
    pub name: String,
    pub country: String,
}

impl From<ApiWeatherResponse> for WeatherSnapshot {
    fn from(api: ApiWeatherResponse) -> Self {
        let condition = api.weather.into_iter().next();
        Self {
            name: api.name,
            country: api.sys.country,
            coordinates: api.coord,
            current_temp: api.main.temp,
            feels_like: api.main.feels_like,
            humidity: api.main.humidity,
            pressure: api.main.pressure,
            wind_speed: api.wind.speed,
            wind_deg: api.wind.deg,
            cloudiness: api.clouds.all,
            condition_icon: condition.as_ref().map(|c| c.icon.clone()).unwrap_or_default(),
            condition_description: condition.map(|c| c.description).unwrap_or_default(),
            observed_at: api.dt,
            timezone_offset_seconds: api.timezone,
            sunrise: api.sys.sunrise,
            sunset: api.sys.sunset,
        }
    }
}
