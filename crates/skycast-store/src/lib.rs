//! City registry state machine with write-through persistence.
//!
//! [`state`] holds the pure transition logic, [`persist`] the storage codec,
//! and [`store`] the owned handle that ties the two to a weather client.

pub mod persist;
pub mod state;
pub mod store;

pub use persist::{FileSlot, MemorySlot, PersistError, Persister, StorageSlot};
pub use state::{FetchStatus, WeatherAction, WeatherState, WeatherStats};
pub use store::WeatherStore;
