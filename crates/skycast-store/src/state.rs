//! The city registry: normalized favorites state and its transition fold.
//!
//! `WeatherState` is mutated only through [`WeatherState::apply`], a total
//! fold over [`WeatherAction`] — no transition ever fails or panics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use skycast_weather::{CityFetchResult, WeatherSnapshot};

/// Default message when a failed fetch carries no cause.
pub const GENERIC_FETCH_ERROR: &str = "Failed to load";

/// Per-city fetch lifecycle. Absence from the status map implies `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Normalized favorites state.
///
/// `cities` is the user's ordered favorite list (unique, insertion order).
/// The maps are keyed by city name; `data` holds an entry only for cities
/// that have succeeded at least once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherState {
    pub cities: Vec<String>,
    pub data: HashMap<String, WeatherSnapshot>,
    pub status: HashMap<String, FetchStatus>,
    pub error: HashMap<String, Option<String>>,
    /// True once a city has loaded successfully at least once; survives
    /// later failures and is used to skip redundant refetches.
    pub loaded_cities: HashMap<String, bool>,
}

/// Closed set of registry transitions.
#[derive(Debug, Clone)]
pub enum WeatherAction {
    AddCity(String),
    RemoveCity(String),
    ClearAll,
    FetchStarted(String),
    FetchSucceeded {
        city: String,
        snapshot: WeatherSnapshot,
    },
    FetchFailed {
        city: String,
        message: Option<String>,
    },
    BatchStarted(Vec<String>),
    BatchCompleted(Vec<CityFetchResult>),
    BatchFailed {
        cities: Vec<String>,
        message: String,
    },
}

impl WeatherState {
    /// Apply one transition. Total: every action on every state is a no-op
    /// at worst, never an error.
    pub fn apply(&mut self, action: WeatherAction) {
        match action {
            WeatherAction::AddCity(name) => {
                let city = name.trim();
                if city.is_empty() || self.cities.iter().any(|c| c == city) {
                    return;
                }
                self.cities.push(city.to_string());
            }
            WeatherAction::RemoveCity(name) => {
                self.cities.retain(|c| c != &name);
                self.data.remove(&name);
                self.status.remove(&name);
                self.error.remove(&name);
            }
            WeatherAction::ClearAll => {
                self.cities.clear();
                self.data.clear();
                self.status.clear();
                self.error.clear();
                // Cleared too: a re-added city is treated as never loaded.
                self.loaded_cities.clear();
            }
            WeatherAction::FetchStarted(city) => self.mark_loading(city),
            WeatherAction::FetchSucceeded { city, snapshot } => {
                self.mark_succeeded(city, snapshot);
            }
            WeatherAction::FetchFailed { city, message } => {
                self.mark_failed(city, message.unwrap_or_else(|| GENERIC_FETCH_ERROR.to_string()));
            }
            WeatherAction::BatchStarted(cities) => {
                for city in cities {
                    self.mark_loading(city);
                }
            }
            WeatherAction::BatchCompleted(results) => {
                for result in results {
                    match (result.snapshot, result.error) {
                        (Some(snapshot), None) => self.mark_succeeded(result.city, snapshot),
                        (_, error) => self.mark_failed(
                            result.city,
                            error.unwrap_or_else(|| GENERIC_FETCH_ERROR.to_string()),
                        ),
                    }
                }
            }
            WeatherAction::BatchFailed { cities, message } => {
                for city in cities {
                    self.mark_failed(city, message.clone());
                }
            }
        }
    }

    fn mark_loading(&mut self, city: String) {
        self.status.insert(city.clone(), FetchStatus::Loading);
        self.error.insert(city, None);
    }

    fn mark_succeeded(&mut self, city: String, snapshot: WeatherSnapshot) {
        self.status.insert(city.clone(), FetchStatus::Succeeded);
        self.data.insert(city.clone(), snapshot);
        self.error.insert(city.clone(), None);
        self.loaded_cities.insert(city, true);
    }

    fn mark_failed(&mut self, city: String, message: String) {
        self.status.insert(city.clone(), FetchStatus::Failed);
        self.error.insert(city, Some(message));
    }

    // --- read accessors ---

    /// Fetch status for a city; absent means never fetched.
    pub fn status_of(&self, city: &str) -> FetchStatus {
        self.status.get(city).copied().unwrap_or_default()
    }

    /// Last error message for a city, if its latest fetch failed.
    pub fn error_of(&self, city: &str) -> Option<&str> {
        self.error.get(city).and_then(|e| e.as_deref())
    }

    /// Last successful snapshot for a city.
    pub fn weather_of(&self, city: &str) -> Option<&WeatherSnapshot> {
        self.data.get(city)
    }

    /// True if the city has ever loaded successfully.
    pub fn is_loaded(&self, city: &str) -> bool {
        self.loaded_cities.get(city).copied().unwrap_or(false)
    }

    /// True when a fresh fetch is warranted (never loaded so far).
    pub fn needs_fetch(&self, city: &str) -> bool {
        !self.is_loaded(city)
    }

    /// True when every favorite has a successful fetch.
    pub fn all_loaded(&self) -> bool {
        self.cities.iter().all(|c| self.status_of(c) == FetchStatus::Succeeded)
    }

    /// Aggregate fetch-status counts across all favorites.
    pub fn stats(&self) -> WeatherStats {
        let count = |wanted: FetchStatus| {
            self.status.values().filter(|s| **s == wanted).count()
        };
        WeatherStats {
            total_cities: self.cities.len(),
            loading_cities: count(FetchStatus::Loading),
            successful_cities: count(FetchStatus::Succeeded),
            failed_cities: count(FetchStatus::Failed),
        }
    }
}

/// Aggregate status counts exposed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherStats {
    pub total_cities: usize,
    pub loading_cities: usize,
    pub successful_cities: usize,
    pub failed_cities: usize,
}
