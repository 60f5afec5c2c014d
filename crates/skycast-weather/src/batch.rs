//! Concurrent per-city weather fetches with failure isolation.
//!
//! One fetch is issued per city; each is caught independently so a single
//! city's failure never aborts its siblings. Results come back in input
//! order regardless of completion order.

use std::future::Future;

use futures::future::join_all;

use crate::client::WeatherClient;
use crate::error::WeatherError;
use crate::types::WeatherSnapshot;

/// Outcome of one city's fetch within a batch.
///
/// Exactly one of `snapshot` / `error` is populated.
#[derive(Debug, Clone, PartialEq)]
pub struct CityFetchResult {
    pub city: String,
    pub snapshot: Option<WeatherSnapshot>,
    pub error: Option<String>,
}

impl CityFetchResult {
    pub fn ok(city: impl Into<String>, snapshot: WeatherSnapshot) -> Self {
        Self {
            city: city.into(),
            snapshot: Some(snapshot),
            error: None,
        }
    }

    pub fn failed(city: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            snapshot: None,
            error: Some(error.into()),
        }
    }
}

/// Fetch weather for every city concurrently through `fetch`.
///
/// The returned vector matches the input order. Per-city errors are captured
/// into the result entries; this function itself never fails.
pub async fn fetch_weather_batch<F, Fut>(cities: &[String], fetch: F) -> Vec<CityFetchResult>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<WeatherSnapshot, WeatherError>>,
{
    let tasks = cities.iter().map(|city| {
        let fut = fetch(city.clone());
        let city = city.clone();
        async move {
            match fut.await {
                Ok(snapshot) => CityFetchResult::ok(city, snapshot),
                Err(e) => {
                    tracing::warn!("Batch fetch failed for {}: {}", city, e);
                    CityFetchResult::failed(city, e.user_message())
                }
            }
        }
    });

    join_all(tasks).await
}

impl WeatherClient {
    /// Fetch current weather for every city in one concurrent batch.
    pub async fn batch_weather(&self, cities: &[String]) -> Vec<CityFetchResult> {
        fetch_weather_batch(cities, |city| async move {
            self.current_weather(&city).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::Coordinates;
    use std::time::Duration;

    fn snapshot(name: &str, temp: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            name: name.to_string(),
            country: "UA".to_string(),
            coordinates: Coordinates { lat: 0.0, lon: 0.0 },
            current_temp: temp,
            feels_like: temp,
            humidity: 50,
            pressure: None,
            wind_speed: 1.0,
            wind_deg: None,
            cloudiness: 10,
            condition_icon: "01d".to_string(),
            condition_description: "clear sky".to_string(),
            observed_at: 0,
            timezone_offset_seconds: 0,
            sunrise: 0,
            sunset: 0,
        }
    }

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order_under_skewed_timing() {
        // First city resolves last; order must still follow the input.
        let input = cities(&["Kyiv", "Lviv", "Odesa"]);

        let results = fetch_weather_batch(&input, |city| async move {
            let delay = match city.as_str() {
                "Kyiv" => 50,
                "Lviv" => 5,
                _ => 1,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(snapshot(&city, 10.0))
        })
        .await;

        let order: Vec<&str> = results.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(order, vec!["Kyiv", "Lviv", "Odesa"]);
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let input = cities(&["Kyiv", "Lviv", "Odesa"]);

        let results = fetch_weather_batch(&input, |city| async move {
            if city == "Lviv" {
                Err(WeatherError::Api {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(snapshot(&city, 12.5))
            }
        })
        .await;

        assert_eq!(results.len(), 3);

        assert_eq!(results[0].city, "Kyiv");
        assert_eq!(results[0].snapshot.as_ref().unwrap().current_temp, 12.5);
        assert!(results[0].error.is_none());

        assert_eq!(results[1].city, "Lviv");
        assert!(results[1].snapshot.is_none());
        assert!(results[1].error.is_some());

        assert_eq!(results[2].city, "Odesa");
        assert_eq!(results[2].snapshot.as_ref().unwrap().current_temp, 12.5);
    }

    #[tokio::test]
    async fn test_not_found_maps_to_friendly_message() {
        let input = cities(&["Atlantis"]);

        let results = fetch_weather_batch(&input, |city| async move {
            Err::<WeatherSnapshot, _>(WeatherError::CityNotFound(city))
        })
        .await;

        assert_eq!(results[0].error.as_deref(), Some("City not found"));
    }

    #[tokio::test]
    async fn test_empty_batch_resolves_empty() {
        let results =
            fetch_weather_batch(&[], |city| async move { Ok(snapshot(&city, 0.0)) }).await;
        assert!(results.is_empty());
    }
}
