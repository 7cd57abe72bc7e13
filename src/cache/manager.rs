//! A named, TTL-bounded cache around one expensive async fetch.
//!
//! Callers that miss the cache at the same time collapse into a single fetch.
//! The first one starts the fetch on a spawned task and publishes a shared
//! future; later callers await that same future. The task stores the entry and
//! clears the pending slot before any waiter is woken.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::entry::CacheEntry;
use super::{CacheError, CacheOptions, CacheStatus};
use crate::utils::{as_millis_u64, fmt_duration, log_if_slow};

const SLOW_FETCH_THRESHOLD: Duration = Duration::from_secs(1);

pub type FetchResult<T> = Result<Arc<T>, CacheError>;

type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

struct PendingFetch<T> {
    id: u64,
    fetch: SharedFetch<T>,
}

struct State<T> {
    entry: Option<CacheEntry<T>>,
    pending: Option<PendingFetch<T>>,
    next_fetch_id: u64,
    /// Id of the most recent fetch whose value was written; survives `invalidate()`.
    stored_fetch_id: Option<u64>,
}

fn lock_state<T>(state: &Mutex<State<T>>) -> MutexGuard<'_, State<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Memoizes one named fetch for a fixed TTL, with at most one fetch in flight.
pub struct CacheManager<T> {
    name: Arc<str>,
    options: CacheOptions,
    state: Arc<Mutex<State<T>>>,
}

impl<T> fmt::Debug for CacheManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> CacheManager<T> {
    /// Create an empty cache. Fails if `name` is blank or `options` are out of range.
    pub fn new(name: &str, options: CacheOptions) -> Result<Self, CacheError> {
        options.validate(name)?;
        Ok(Self {
            name: Arc::from(name),
            options,
            state: Arc::new(Mutex::new(State {
                entry: None,
                pending: None,
                next_fetch_id: 0,
                stored_fetch_id: None,
            })),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.options.ttl
    }

    pub fn options(&self) -> CacheOptions {
        self.options
    }

    /// True iff an entry exists and is younger than the TTL.
    pub fn is_valid(&self) -> bool {
        lock_state(&self.state)
            .entry
            .as_ref()
            .is_some_and(|e| e.is_fresh(self.options.ttl))
    }

    /// Return the cached value, fetching it if missing or expired.
    ///
    /// With `force_refresh` a valid entry is ignored, but an in-flight fetch is
    /// still joined rather than duplicated. `fetch` is only called when this
    /// call starts a new fetch. The fetch runs on its own task and still lands
    /// in the cache if every caller stops waiting.
    pub async fn get_data<F, Fut>(&self, fetch: F, force_refresh: bool) -> FetchResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let (shared, task) = {
            let mut state = lock_state(&self.state);

            if !force_refresh {
                if let Some(entry) = state
                    .entry
                    .as_ref()
                    .filter(|e| e.is_fresh(self.options.ttl))
                {
                    trace!(cache = %self.name, "cache hit");
                    return Ok(Arc::clone(&entry.value));
                }
            }

            let in_flight = state
                .pending
                .as_ref()
                .map(|p| (p.id, p.fetch.clone()));
            match in_flight {
                Some((fetch_id, shared)) => {
                    debug!(cache = %self.name, fetch_id, "joining in-flight fetch");
                    (shared, None)
                }
                None => {
                    let (shared, task) = self.claim_fetch(&mut state);
                    (shared, Some(task))
                }
            }
        };

        // Spawned outside the lock: a runtime that is shutting down drops the
        // task on the spot, and its slot guard needs the lock to clear `pending`.
        if let Some(task) = task {
            tokio::spawn(task.run(fetch));
        }

        shared.await
    }

    /// Mark a new fetch as pending and build the task that will settle it.
    fn claim_fetch(&self, state: &mut State<T>) -> (SharedFetch<T>, FetchTask<T>) {
        let id = state.next_fetch_id;
        state.next_fetch_id += 1;

        let (tx, rx) = oneshot::channel();
        let name = Arc::clone(&self.name);
        let shared = rx
            .map(move |received| {
                received.unwrap_or_else(|_| {
                    Err(CacheError::Abandoned {
                        name: name.to_string(),
                    })
                })
            })
            .boxed()
            .shared();

        state.pending = Some(PendingFetch {
            id,
            fetch: shared.clone(),
        });
        debug!(cache = %self.name, fetch_id = id, "starting fetch");

        let task = FetchTask {
            name: Arc::clone(&self.name),
            slot: PendingSlot {
                state: Arc::clone(&self.state),
                id,
            },
            timeout: self.options.fetch_timeout,
            tx,
        };
        (shared, task)
    }

    /// Install `value` as a fresh entry without fetching.
    pub fn set_cache(&self, value: T) {
        lock_state(&self.state).entry = Some(CacheEntry::new(Arc::new(value)));
        debug!(cache = %self.name, "cache seeded");
    }

    /// The current entry regardless of age.
    pub fn get_stale(&self) -> Option<Arc<T>> {
        lock_state(&self.state)
            .entry
            .as_ref()
            .map(|e| Arc::clone(&e.value))
    }

    /// Drop the entry and forget any in-flight fetch.
    ///
    /// A running fetch is not cancelled: its waiters still get its result, and
    /// a successful result is still written here when it lands, unless a fetch
    /// started after it has already stored a value.
    pub fn invalidate(&self) {
        let mut state = lock_state(&self.state);
        let had_entry = state.entry.take().is_some();
        let forgotten_fetch = state.pending.take().map(|p| p.id);
        debug!(
            cache = %self.name,
            had_entry,
            forgotten_fetch = ?forgotten_fetch,
            "cache invalidated"
        );
    }

    pub fn status(&self) -> CacheStatus {
        let state = lock_state(&self.state);
        let entry = state.entry.as_ref();
        CacheStatus {
            name: self.name.to_string(),
            has_entry: entry.is_some(),
            age_ms: entry.map(|e| as_millis_u64(e.age())),
            written_at: entry.map(|e| e.written_at_utc),
            is_valid: entry.is_some_and(|e| e.is_fresh(self.options.ttl)),
            is_pending: state.pending.is_some(),
            ttl_ms: as_millis_u64(self.options.ttl),
        }
    }
}

/// Everything the spawned fetch needs to publish its outcome.
///
/// Owns the pending-slot guard, so dropping the task unpolled (a runtime
/// shutting down, a failed spawn) still releases `pending`.
struct FetchTask<T> {
    name: Arc<str>,
    slot: PendingSlot<T>,
    timeout: Option<Duration>,
    tx: oneshot::Sender<FetchResult<T>>,
}

impl<T: Send + Sync + 'static> FetchTask<T> {
    async fn run<F, Fut>(self, fetch: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let FetchTask {
            name,
            slot,
            timeout,
            tx,
        } = self;
        let id = slot.id;
        let start = Instant::now();

        let outcome = match timeout {
            Some(limit) => match tokio::time::timeout(limit, fetch()).await {
                Ok(result) => result.map_err(CacheError::fetch),
                Err(_) => Err(CacheError::Timeout {
                    name: name.to_string(),
                    after: limit,
                }),
            },
            None => fetch().await.map_err(CacheError::fetch),
        };
        log_if_slow(
            start,
            SLOW_FETCH_THRESHOLD,
            &format!("fetch for cache `{name}`"),
        );

        let result = match outcome {
            Ok(value) => {
                let value = Arc::new(value);
                if slot.store(Arc::clone(&value)) {
                    debug!(
                        cache = %name,
                        fetch_id = id,
                        elapsed = fmt_duration(start.elapsed()),
                        "fetch stored"
                    );
                } else {
                    debug!(
                        cache = %name,
                        fetch_id = id,
                        "newer fetch already stored, keeping it"
                    );
                }
                Ok(value)
            }
            Err(e) => {
                warn!(cache = %name, fetch_id = id, error = %e, "fetch failed");
                Err(e)
            }
        };

        drop(slot);
        // Every waiter may have gone away; the entry is already written.
        let _ = tx.send(result);
    }
}

/// Clears the pending slot when the fetch settles, including by panic or by
/// the task being dropped before it ever ran.
///
/// Only clears it if it still belongs to this fetch, so a fetch started after
/// `invalidate()` is not forgotten by an older one.
struct PendingSlot<T> {
    state: Arc<Mutex<State<T>>>,
    id: u64,
}

impl<T> PendingSlot<T> {
    /// Write a fetched value unless a later fetch has already stored one.
    fn store(&self, value: Arc<T>) -> bool {
        let mut state = lock_state(&self.state);
        if state.stored_fetch_id.is_some_and(|newest| newest > self.id) {
            return false;
        }
        state.entry = Some(CacheEntry::new(value));
        state.stored_fetch_id = Some(self.id);
        true
    }
}

impl<T> Drop for PendingSlot<T> {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        if state.pending.as_ref().is_some_and(|p| p.id == self.id) {
            state.pending = None;
        }
    }
}
