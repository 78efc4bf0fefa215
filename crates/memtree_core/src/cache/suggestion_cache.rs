//! TTL cache with single-flight fetching for key suggestions.
//!
//! # Responsibility
//! - Hold the last fetched suggestion list with its fetch time.
//! - Collapse concurrent fetches for a stale value into one call.
//!
//! # Invariants
//! - A value is served from cache only while `now - fetched_at < ttl`.
//! - At most one fetch runs per cache at a time; waiters share its result.
//! - Failed fetches are shared with waiters but never cached.
//! - Only the flight current at completion may store its result, so an
//!   `invalidate` during a fetch is never undone.

use crate::config::MemtreeConfig;
use log::{debug, warn};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Errors surfaced by cache lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Underlying fetch failed; message comes from the fetcher.
    FetchFailed { cache: &'static str, message: String },
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed { cache, message } => {
                write!(f, "{cache} suggestions fetch failed: {message}")
            }
        }
    }
}

impl Error for CacheError {}

type Flight<T> = Arc<OnceCell<Result<T, String>>>;

struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
}

struct CacheState<T> {
    entry: Option<CacheEntry<T>>,
    in_flight: Option<Flight<T>>,
}

/// Explicit, shareable suggestion cache.
pub struct SuggestionCache<T> {
    name: &'static str,
    ttl: Duration,
    state: Mutex<CacheState<T>>,
}

impl<T: Clone> SuggestionCache<T> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            state: Mutex::new(CacheState {
                entry: None,
                in_flight: None,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a fresh cached value or fetches one.
    pub fn get_or_fetch<F>(&self, fetch: F) -> Result<T, CacheError>
    where
        F: FnOnce() -> Result<T, String>,
    {
        self.get_or_fetch_at(Instant::now(), fetch)
    }

    /// Same as [`get_or_fetch`](Self::get_or_fetch) with an explicit clock.
    pub fn get_or_fetch_at<F>(&self, now: Instant, fetch: F) -> Result<T, CacheError>
    where
        F: FnOnce() -> Result<T, String>,
    {
        let flight = {
            let mut state = self.state.lock();
            if let Some(entry) = &state.entry {
                if now.saturating_duration_since(entry.fetched_at) < self.ttl {
                    return Ok(entry.value.clone());
                }
            }
            match &state.in_flight {
                // A finished failed flight is not joined; its owner just has not cleared it yet.
                Some(current) if !matches!(current.get(), Some(Err(_))) => Arc::clone(current),
                _ => {
                    let fresh: Flight<T> = Arc::new(OnceCell::new());
                    state.in_flight = Some(Arc::clone(&fresh));
                    fresh
                }
            }
        };

        // Blocks while another caller runs the fetch for this flight.
        let result = flight
            .get_or_init(|| {
                debug!("event=suggestion_fetch module=cache status=start cache={}", self.name);
                fetch()
            })
            .clone();

        let mut state = self.state.lock();
        let owns_flight = state
            .in_flight
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &flight));
        if owns_flight {
            state.in_flight = None;
            match &result {
                Ok(value) => {
                    state.entry = Some(CacheEntry {
                        value: value.clone(),
                        fetched_at: now,
                    });
                }
                Err(message) => warn!(
                    "event=suggestion_fetch module=cache status=error cache={} error={}",
                    self.name, message
                ),
            }
        }

        result.map_err(|message| CacheError::FetchFailed {
            cache: self.name,
            message,
        })
    }

    /// Returns the cached value if still fresh at `now`, without fetching.
    pub fn peek_at(&self, now: Instant) -> Option<T> {
        let state = self.state.lock();
        state
            .entry
            .as_ref()
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.state.lock().entry.as_ref().map(|entry| entry.fetched_at)
    }

    /// Drops the cached value; the next lookup fetches again.
    ///
    /// A fetch already in flight still answers its waiters but is not cached.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        state.entry = None;
        state.in_flight = None;
    }
}

/// Suggestion caches used by config editors, built once per process.
pub struct SuggestionCaches {
    pub secret_keys: SuggestionCache<Vec<String>>,
    pub variable_keys: SuggestionCache<Vec<String>>,
}

impl SuggestionCaches {
    pub fn from_config(config: &MemtreeConfig) -> Self {
        let ttl = config.suggestion_ttl();
        Self {
            secret_keys: SuggestionCache::new("secret_keys", ttl),
            variable_keys: SuggestionCache::new("variable_keys", ttl),
        }
    }

    pub fn invalidate_all(&self) {
        self.secret_keys.invalidate();
        self.variable_keys.invalidate();
    }
}
