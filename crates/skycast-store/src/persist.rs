//! Persistence codec for the city registry.
//!
//! The persisted blob keeps the full favorites list but strips weather
//! payloads down to cities whose latest fetch succeeded; everything else is
//! refetched after a reload. Reads degrade to the default empty state on any
//! corruption; writes surface their failure to the dispatcher.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{FetchStatus, WeatherState};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Storage read failed: {0}")]
    Read(String),

    #[error("Storage write failed: {0}")]
    Write(String),

    #[error("State serialization failed: {0}")]
    Serialize(String),
}

/// A durable string slot, the local-storage analogue.
pub trait StorageSlot: Send + Sync {
    /// Read the stored blob; `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<String>, PersistError>;

    /// Replace the stored blob (last writer wins).
    fn save(&self, blob: &str) -> Result<(), PersistError>;
}

/// File-backed storage slot.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StorageSlot for FileSlot {
    fn load(&self) -> Result<Option<String>, PersistError> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| PersistError::Read(e.to_string()))
    }

    fn save(&self, blob: &str) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PersistError::Write(e.to_string()))?;
        }
        std::fs::write(&self.path, blob).map_err(|e| PersistError::Write(e.to_string()))
    }
}

/// In-memory storage slot for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySlot {
    cell: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>, PersistError> {
        Ok(self.cell.lock().clone())
    }

    fn save(&self, blob: &str) -> Result<(), PersistError> {
        *self.cell.lock() = Some(blob.to_string());
        Ok(())
    }
}

/// Top-level persisted record, matching the original storage layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedRoot {
    #[serde(default)]
    weather: WeatherState,
}

/// Serialize a filtered view of the state.
///
/// The favorites list is kept in full; `data`/`status`/`error`/`loadedCities`
/// entries are emitted only for cities that currently hold a successful
/// snapshot.
pub fn serialize_state(state: &WeatherState) -> Result<String, PersistError> {
    let mut filtered = WeatherState {
        cities: state.cities.clone(),
        ..WeatherState::default()
    };

    for city in &state.cities {
        if state.status_of(city) != FetchStatus::Succeeded {
            continue;
        }
        let Some(snapshot) = state.data.get(city) else { continue };

        filtered.data.insert(city.clone(), snapshot.clone());
        filtered.status.insert(city.clone(), FetchStatus::Succeeded);
        filtered.error.insert(city.clone(), state.error.get(city).cloned().unwrap_or(None));
        filtered.loaded_cities.insert(city.clone(), true);
    }

    serde_json::to_string(&PersistedRoot { weather: filtered })
        .map_err(|e| PersistError::Serialize(e.to_string()))
}

/// Decode a stored blob back into registry state.
///
/// Missing or malformed blobs yield the default empty state, never partially
/// parsed garbage. Cities present in the list without a status entry are
/// back-filled as `Idle` with a `None` error.
pub fn deserialize_state(blob: Option<&str>) -> WeatherState {
    let Some(raw) = blob else {
        return WeatherState::default();
    };

    let parsed: PersistedRoot = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Discarding unreadable persisted state: {}", e);
            return WeatherState::default();
        }
    };

    let mut state = parsed.weather;
    for city in state.cities.clone() {
        state.status.entry(city.clone()).or_insert(FetchStatus::Idle);
        state.error.entry(city).or_insert(None);
    }
    state
}

/// Couples a storage slot with the codec.
pub struct Persister {
    slot: Box<dyn StorageSlot>,
}

impl Persister {
    pub fn new(slot: Box<dyn StorageSlot>) -> Self {
        Self { slot }
    }

    /// Load the persisted state; read failures degrade to the default state.
    pub fn load(&self) -> WeatherState {
        match self.slot.load() {
            Ok(blob) => deserialize_state(blob.as_deref()),
            Err(e) => {
                tracing::warn!("Failed to read persisted state, starting empty: {}", e);
                WeatherState::default()
            }
        }
    }

    /// Write a filtered snapshot of the state.
    pub fn save(&self, state: &WeatherState) -> Result<(), PersistError> {
        let blob = serialize_state(state)?;
        self.slot.save(&blob)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::state::WeatherAction;
    use skycast_weather::{Coordinates, WeatherSnapshot};

    fn snapshot(name: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            name: name.to_string(),
            country: "UA".to_string(),
            coordinates: Coordinates { lat: 50.45, lon: 30.52 },
            current_temp: 7.0,
            feels_like: 5.0,
            humidity: 70,
            pressure: None,
            wind_speed: 4.0,
            wind_deg: None,
            cloudiness: 40,
            condition_icon: "03d".to_string(),
            condition_description: "scattered clouds".to_string(),
            observed_at: 1_700_010_000,
            timezone_offset_seconds: 7200,
            sunrise: 1_700_000_000,
            sunset: 1_700_030_000,
        }
    }

    fn mixed_state() -> WeatherState {
        let mut state = WeatherState::default();
        state.apply(WeatherAction::AddCity("Kyiv".into()));
        state.apply(WeatherAction::AddCity("Lviv".into()));
        state.apply(WeatherAction::FetchSucceeded {
            city: "Kyiv".into(),
            snapshot: snapshot("Kyiv"),
        });
        state.apply(WeatherAction::FetchFailed {
            city: "Lviv".into(),
            message: Some("Network error".into()),
        });
        state
    }

    #[test]
    fn test_round_trip_keeps_favorites_drops_failed_data() {
        let blob = serialize_state(&mixed_state()).unwrap();
        let restored = deserialize_state(Some(&blob));

        // favorites list is authoritative and survives in full
        assert_eq!(restored.cities, vec!["Kyiv", "Lviv"]);

        // only the succeeded city keeps its payload
        assert!(restored.data.contains_key("Kyiv"));
        assert!(!restored.data.contains_key("Lviv"));
        assert_eq!(restored.status_of("Kyiv"), FetchStatus::Succeeded);

        // the failed city is back-filled to idle with no error
        assert_eq!(restored.status_of("Lviv"), FetchStatus::Idle);
        assert_eq!(restored.error_of("Lviv"), None);
        assert!(restored.needs_fetch("Lviv"));
    }

    #[test]
    fn test_persisted_layout_matches_storage_format() {
        let blob = serialize_state(&mixed_state()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();

        let weather = value.get("weather").expect("wrapped under \"weather\"");
        assert!(weather.get("cities").is_some());
        assert!(weather.get("data").is_some());
        assert!(weather.get("status").is_some());
        assert!(weather.get("error").is_some());
        assert!(weather.get("loadedCities").is_some(), "camelCase key");

        assert_eq!(weather["status"]["Kyiv"], "succeeded");
        assert_eq!(weather["loadedCities"]["Kyiv"], true);
    }

    #[test]
    fn test_missing_blob_yields_default() {
        assert_eq!(deserialize_state(None), WeatherState::default());
    }

    #[test]
    fn test_corrupt_blob_yields_default() {
        assert_eq!(deserialize_state(Some("not json {{{")), WeatherState::default());
        assert_eq!(deserialize_state(Some("")), WeatherState::default());
        assert_eq!(deserialize_state(Some("[1,2,3]")), WeatherState::default());
    }

    #[test]
    fn test_deserialize_backfills_status_and_error() {
        let blob = r#"{ "weather": { "cities": ["Kyiv", "Lviv"] } }"#;
        let state = deserialize_state(Some(blob));

        assert_eq!(state.cities, vec!["Kyiv", "Lviv"]);
        assert_eq!(state.status_of("Kyiv"), FetchStatus::Idle);
        assert!(state.error.contains_key("Kyiv"));
        assert!(state.error.contains_key("Lviv"));
    }

    #[test]
    fn test_file_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("nested").join("state.json"));

        assert!(slot.load().unwrap().is_none());

        slot.save("{\"weather\":{}}").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("{\"weather\":{}}"));
    }

    #[test]
    fn test_persister_read_failure_degrades_to_default() {
        struct BrokenSlot;
        impl StorageSlot for BrokenSlot {
            fn load(&self) -> Result<Option<String>, PersistError> {
                Err(PersistError::Read("disk on fire".into()))
            }
            fn save(&self, _blob: &str) -> Result<(), PersistError> {
                Ok(())
            }
        }

        let persister = Persister::new(Box::new(BrokenSlot));
        assert_eq!(persister.load(), WeatherState::default());
    }

    #[test]
    fn test_persister_write_failure_is_reported() {
        struct ReadOnlySlot;
        impl StorageSlot for ReadOnlySlot {
            fn load(&self) -> Result<Option<String>, PersistError> {
                Ok(None)
            }
            fn save(&self, _blob: &str) -> Result<(), PersistError> {
                Err(PersistError::Write("quota exceeded".into()))
            }
        }

        let persister = Persister::new(Box::new(ReadOnlySlot));
        let result = persister.save(&WeatherState::default());
        assert!(matches!(result, Err(PersistError::Write(_))));
    }
}
