//! Runtime configuration, read from the environment (and `.env`).

use figment::Figment;
use figment::providers::Env;
use fundu::{DurationParser, TimeUnit};
use serde::{Deserialize, Deserializer, de};
use std::time::Duration;

use crate::cache::{CacheOptions, DEFAULT_TTL};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base level for this crate's log events, e.g. `info` or `debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// TTL applied to caches created by this process.
    #[serde(default = "default_cache_ttl", deserialize_with = "deserialize_duration")]
    pub cache_ttl: Duration,
    /// Upper bound on one fetch; unset means no timeout.
    #[serde(default, deserialize_with = "deserialize_optional_duration")]
    pub cache_fetch_timeout: Option<Duration>,
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_cache_ttl() -> Duration {
    DEFAULT_TTL
}

impl Config {
    pub fn figment() -> Figment {
        Figment::new().merge(Env::raw())
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            ttl: self.cache_ttl,
            fetch_timeout: self.cache_fetch_timeout,
        }
    }
}

/// Env values arrive either as bare numbers (seconds) or as strings like `90s`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    let parser = DurationParser::with_time_units(&[
        TimeUnit::MilliSecond,
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
    ]);
    let parsed = parser
        .parse(raw.trim())
        .map_err(|e| format!("invalid duration `{raw}`: {e}"))?;
    Duration::try_from(parsed).map_err(|e| format!("invalid duration `{raw}`: {e}"))
}

impl RawDuration {
    fn into_duration<E: de::Error>(self) -> Result<Duration, E> {
        match self {
            RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
            RawDuration::Text(text) => parse_duration(&text).map_err(E::custom),
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    RawDuration::deserialize(deserializer)?.into_duration()
}

fn deserialize_optional_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawDuration>::deserialize(deserializer)?
        .map(RawDuration::into_duration)
        .transpose()
}
