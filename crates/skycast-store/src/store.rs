//! Owned store handle: the single mutable registry instance.
//!
//! All mutation flows through [`WeatherStore::dispatch`], which applies the
//! transition and then writes a filtered snapshot through the persister.
//! Consumers receive the handle by reference; there is no ambient global.

use parking_lot::Mutex;

use skycast_weather::{WeatherClient, WeatherSnapshot};

use crate::persist::{MemorySlot, PersistError, Persister};
use crate::state::{WeatherAction, WeatherState, WeatherStats};

pub struct WeatherStore {
    state: Mutex<WeatherState>,
    persister: Persister,
}

impl WeatherStore {
    /// Create a store seeded from the persister's storage slot.
    pub fn new(persister: Persister) -> Self {
        let state = persister.load();
        if !state.cities.is_empty() {
            tracing::info!("Restored {} favorite cities from storage", state.cities.len());
        }
        Self {
            state: Mutex::new(state),
            persister,
        }
    }

    /// Store backed by an in-memory slot (tests, ephemeral sessions).
    pub fn in_memory() -> Self {
        Self::new(Persister::new(Box::new(MemorySlot::new())))
    }

    /// Apply one transition and persist the result.
    ///
    /// The transition always takes effect; only the follow-up storage write
    /// can fail, and that failure is surfaced rather than swallowed.
    pub fn dispatch(&self, action: WeatherAction) -> Result<(), PersistError> {
        tracing::debug!("Dispatching {:?}", action);
        let snapshot = {
            let mut state = self.state.lock();
            state.apply(action);
            state.clone()
        };
        self.persister.save(&snapshot)
    }

    /// Snapshot of the full registry state.
    pub fn state(&self) -> WeatherState {
        self.state.lock().clone()
    }

    /// Ordered favorites list.
    pub fn cities(&self) -> Vec<String> {
        self.state.lock().cities.clone()
    }

    /// Last successful snapshot for a city.
    pub fn weather_of(&self, city: &str) -> Option<WeatherSnapshot> {
        self.state.lock().weather_of(city).cloned()
    }

    /// True when a city has never loaded successfully.
    pub fn needs_fetch(&self, city: &str) -> bool {
        self.state.lock().needs_fetch(city)
    }

    /// Aggregate fetch-status counts.
    pub fn stats(&self) -> WeatherStats {
        self.state.lock().stats()
    }

    /// Fetch one city's weather and fold the outcome into the registry.
    pub async fn fetch_city(
        &self,
        client: &WeatherClient,
        city: &str,
    ) -> Result<(), PersistError> {
        self.dispatch(WeatherAction::FetchStarted(city.to_string()))?;

        match client.current_weather(city).await {
            Ok(snapshot) => self.dispatch(WeatherAction::FetchSucceeded {
                city: city.to_string(),
                snapshot,
            }),
            Err(e) => {
                tracing::warn!("Weather fetch failed for {}: {}", city, e);
                self.dispatch(WeatherAction::FetchFailed {
                    city: city.to_string(),
                    message: Some(e.user_message()),
                })
            }
        }
    }

    /// Fetch weather for every given city concurrently and fold the combined
    /// result into the registry. Per-city failures land as per-city errors.
    pub async fn fetch_batch(
        &self,
        client: &WeatherClient,
        cities: &[String],
    ) -> Result<(), PersistError> {
        if cities.is_empty() {
            return Ok(());
        }

        self.dispatch(WeatherAction::BatchStarted(cities.to_vec()))?;
        let results = client.batch_weather(cities).await;
        self.dispatch(WeatherAction::BatchCompleted(results))
    }

    /// Refresh only the favorites that have never loaded.
    pub async fn fetch_missing(&self, client: &WeatherClient) -> Result<(), PersistError> {
        let pending: Vec<String> = {
            let state = self.state.lock();
            state.cities.iter().filter(|c| state.needs_fetch(c)).cloned().collect()
        };
        self.fetch_batch(client, &pending).await
    }
}
