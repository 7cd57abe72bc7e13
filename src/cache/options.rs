//! Construction options for a single named cache.

use std::time::Duration;

use super::CacheError;

/// Default validity window when the caller has no better idea.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Options applied when a cache is first created.
///
/// The registry only honours the options of the first registration for a
/// given name; later lookups with different options get the original cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// How long a fetched value stays valid.
    pub ttl: Duration,
    /// Upper bound on a single fetch. `None` waits forever.
    pub fetch_timeout: Option<Duration>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            fetch_timeout: None,
        }
    }
}

impl CacheOptions {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub(crate) fn validate(&self, name: &str) -> Result<(), CacheError> {
        if name.trim().is_empty() {
            return Err(CacheError::InvalidOptions(
                "cache name must not be empty".to_owned(),
            ));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidOptions(format!(
                "ttl for cache `{name}` must be greater than zero"
            )));
        }
        if self.fetch_timeout.is_some_and(|t| t.is_zero()) {
            return Err(CacheError::InvalidOptions(format!(
                "fetch timeout for cache `{name}` must be greater than zero"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        let options = CacheOptions::default();
        assert_eq!(options.ttl, DEFAULT_TTL);
        assert_eq!(options.fetch_timeout, None);
        assert!(options.validate("courses").is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        let err = CacheOptions::default().validate("  ").unwrap_err();
        assert!(matches!(err, CacheError::InvalidOptions(_)));
    }

    #[test]
    fn rejects_zero_ttl() {
        let err = CacheOptions::with_ttl(Duration::ZERO)
            .validate("courses")
            .unwrap_err();
        assert!(err.to_string().contains("ttl"));
    }

    #[test]
    fn rejects_zero_fetch_timeout() {
        let err = CacheOptions::default()
            .fetch_timeout(Duration::ZERO)
            .validate("courses")
            .unwrap_err();
        assert!(err.to_string().contains("fetch timeout"));
    }
}
