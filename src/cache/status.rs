//! Diagnostic snapshots of cache state, surfaced on the admin dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

/// Point-in-time view of a single cache.
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CacheStatus {
    pub name: String,
    pub has_entry: bool,
    /// Milliseconds since the entry was written, if there is one.
    #[ts(type = "number | null")]
    pub age_ms: Option<u64>,
    pub written_at: Option<DateTime<Utc>>,
    pub is_valid: bool,
    pub is_pending: bool,
    #[ts(type = "number")]
    pub ttl_ms: u64,
}
