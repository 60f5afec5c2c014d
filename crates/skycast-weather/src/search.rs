//! Debounced async lookups for the city search box.
//!
//! Each input edit restarts a delay timer; only the most recent value
//! schedules a lookup. Supersession works through a generation counter: a
//! timer that wakes under a stale generation exits without fetching, while a
//! lookup whose timer already fired runs to completion and still writes its
//! result, matching the behavior of a cleared-but-resolved browser timeout.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Observable state of a debounced query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub result: Option<T>,
    pub loading: bool,
    pub has_searched: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            result: None,
            loading: false,
            has_searched: false,
        }
    }
}

struct Shared<T> {
    state: Mutex<QueryState<T>>,
    generation: AtomicU64,
}

/// Debounce executor for one logical input stream.
///
/// At most one timer is pending at a time; dropping the executor cancels it.
pub struct QueryDebouncer<T> {
    delay: Duration,
    shared: Arc<Shared<T>>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> QueryDebouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            shared: Arc::new(Shared {
                state: Mutex::new(QueryState::default()),
                generation: AtomicU64::new(0),
            }),
            pending: None,
        }
    }

    /// Snapshot of the current query state.
    pub fn state(&self) -> QueryState<T>
    where
        T: Clone,
    {
        self.shared.state.lock().clone()
    }

    /// Feed a new input value.
    ///
    /// A blank value resets the state immediately and schedules nothing.
    /// Otherwise the previous pending timer is superseded and `lookup` is
    /// scheduled to run with the trimmed input after the delay.
    pub fn on_input<F, Fut, E>(&mut self, input: &str, lookup: F)
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        // Every edit invalidates whatever timer is still pending.
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let trimmed = input.trim();
        if trimmed.is_empty() {
            *self.shared.state.lock() = QueryState::default();
            self.pending = None;
            return;
        }

        let query = trimmed.to_string();
        let shared = Arc::clone(&self.shared);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Timer superseded by a later edit: never start the lookup.
            if shared.generation.load(Ordering::SeqCst) != generation {
                return;
            }

            {
                let mut state = shared.state.lock();
                state.loading = true;
                state.has_searched = false;
            }

            match lookup(query.clone()).await {
                Ok(value) => {
                    let mut state = shared.state.lock();
                    state.result = Some(value);
                    state.has_searched = true;
                    state.loading = false;
                }
                Err(e) => {
                    tracing::warn!("Lookup failed for {:?}: {}", query, e);
                    let mut state = shared.state.lock();
                    state.result = None;
                    state.has_searched = true;
                    state.loading = false;
                }
            }
        });

        // Dropping the old handle only detaches it; a fired timer keeps
        // running, an unfired one bails on the generation check above.
        self.pending = Some(handle);
    }

    /// Cancel any pending timer without touching the settled state.
    pub fn cancel(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T> Drop for QueryDebouncer<T> {
    fn drop(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
