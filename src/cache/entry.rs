use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value plus the moment it was written.
#[derive(Debug)]
pub(crate) struct CacheEntry<T> {
    pub(crate) value: Arc<T>,
    /// Monotonic write time; all age/TTL math uses this.
    written_at: Instant,
    /// Wall-clock write time, for diagnostics only.
    pub(crate) written_at_utc: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub(crate) fn new(value: Arc<T>) -> Self {
        Self {
            value,
            written_at: Instant::now(),
            written_at_utc: Utc::now(),
        }
    }

    pub(crate) fn age(&self) -> Duration {
        self.written_at.elapsed()
    }

    pub(crate) fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}
