//! In-process memoization for network feeds.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A single memoized value with an optional time-to-live.
///
/// Only successful loads are stored, so a failed fetch is attempted again
/// on the next call.
pub struct FeedCache<T> {
    slot: Mutex<Option<(T, DateTime<Utc>)>>,
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> FeedCache<T> {
    /// Cache that never expires.
    pub fn new() -> Self {
        Self::with_ttl(None, Arc::new(SystemClock))
    }

    /// Cache with an explicit TTL (`None` = forever) and clock.
    pub fn with_ttl(ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
            clock,
        }
    }

    /// Return the cached value, or load and store it.
    ///
    /// The lock is held while loading so concurrent callers fetch once.
    pub fn get_or_try_load<E>(&self, load: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = self.clock.now();

        if let Some((value, stored_at)) = slot.as_ref() {
            let fresh = self.ttl.is_none_or(|ttl| now - *stored_at < ttl);
            if fresh {
                return Ok(value.clone());
            }
            tracing::debug!("Feed cache entry expired");
        }

        let value = load()?;
        *slot = Some((value.clone(), now));
        Ok(value)
    }

    /// Whether a value is stored (fresh or not).
    pub fn is_populated(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Drop the stored value.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

impl<T: Clone> Default for FeedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
