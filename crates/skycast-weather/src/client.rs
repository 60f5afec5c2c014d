//! Weather provider HTTP client (OpenWeather-compatible API).

use std::time::Duration;

use tracing::instrument;

use crate::error::WeatherError;
use crate::types::{ApiWeatherResponse, ForecastResponse, GeoMatch, WeatherSnapshot};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UNITS: &str = "metric";
const DEFAULT_MIN_QUERY_LEN: usize = 3;
const DEFAULT_MAX_SUGGESTIONS: u32 = 5;

pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    units: String,
    min_query_len: usize,
    max_suggestions: u32,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            units: DEFAULT_UNITS.to_string(),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        })
    }

    /// Point the client at a different endpoint (mock servers, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Measurement units passed to the provider ("metric" or "imperial").
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Tune the suggestion lookup (minimum query length, result cap).
    pub fn with_search_limits(mut self, min_query_len: usize, max_suggestions: u32) -> Self {
        self.min_query_len = min_query_len;
        self.max_suggestions = max_suggestions;
        self
    }

    /// Fetch current conditions for one city.
    #[instrument(skip(self), level = "info")]
    pub async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.require_api_key()?;

        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("units", self.units.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let api: ApiWeatherResponse = self.handle_response(response, city).await?;
        Ok(WeatherSnapshot::from(api))
    }

    /// Look up city suggestions as "Name, CountryCode" strings.
    ///
    /// Queries shorter than the configured minimum return an empty list
    /// without any network I/O.
    #[instrument(skip(self), level = "debug")]
    pub async fn city_suggestions(&self, query: &str) -> Result<Vec<String>, WeatherError> {
        let query = query.trim();
        if query.len() < self.min_query_len {
            return Ok(Vec::new());
        }
        self.require_api_key()?;

        let url = format!("{}/geo/1.0/direct", self.base_url);
        let limit = self.max_suggestions.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let matches: Vec<GeoMatch> = self.handle_response(response, query).await?;
        Ok(matches
            .into_iter()
            .map(|m| format!("{}, {}", m.name, m.country))
            .collect())
    }

    /// Fetch the multi-day forecast feed for one city.
    ///
    /// Returns `Ok(None)` when the provider has no data for the city (404);
    /// callers must branch on that distinctly from transport errors.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(&self, city: &str) -> Result<Option<ForecastResponse>, WeatherError> {
        self.require_api_key()?;

        let url = format!("{}/data/2.5/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("units", self.units.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            tracing::warn!("City not found in provider database: {}", city);
            return Ok(None);
        }

        let forecast: ForecastResponse = self.handle_response(response, city).await?;
        Ok(Some(forecast))
    }

    fn require_api_key(&self) -> Result<(), WeatherError> {
        if self.api_key.is_empty() {
            return Err(WeatherError::MissingApiKey);
        }
        Ok(())
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        city: &str,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 404 {
            Err(WeatherError::CityNotFound(city.to_string()))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(WeatherError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}
