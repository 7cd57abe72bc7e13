//! Error types for the dashboard cache.

use std::sync::Arc;
use std::time::Duration;

use crate::utils::fmt_duration;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The caller-supplied fetch failed. Shared by every waiter on the same fetch.
    #[error(transparent)]
    Fetch(Arc<anyhow::Error>),
    #[error("Fetch for cache `{name}` timed out after {}", fmt_duration(*.after))]
    Timeout { name: String, after: Duration },
    #[error("Fetch for cache `{name}` ended without producing a result")]
    Abandoned { name: String },
    #[error("Invalid cache options: {0}")]
    InvalidOptions(String),
    #[error("Cache `{name}` is registered with a different value type")]
    TypeMismatch { name: String },
}

impl CacheError {
    pub(crate) fn fetch(error: anyhow::Error) -> Self {
        Self::Fetch(Arc::new(error))
    }

    /// The underlying fetch error, if this is a fetch failure.
    pub fn fetch_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Fetch(e) => Some(&**e),
            _ => None,
        }
    }
}
