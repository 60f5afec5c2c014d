//! Weather data access for Skycast.
//!
//! Provider client, concurrent batch fetches, debounced city search, and
//! forecast aggregation (hourly slice + daily min/max rollup).

pub mod batch;
pub mod client;
pub mod error;
pub mod forecast;
pub mod search;
pub mod types;

pub use batch::{fetch_weather_batch, CityFetchResult};
pub use client::WeatherClient;
pub use error::WeatherError;
pub use forecast::{daily_rollup, hourly_slice, load_forecast, DailyPoint, ForecastView, HourlyPoint};
pub use search::{QueryDebouncer, QueryState};
pub use types::{ConditionSummary, Coordinates, ForecastEntry, ForecastResponse, WeatherSnapshot};
