use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Cached record of a handle's last known name and failure state.
///
/// The serialized form keeps the field names of the existing storage
/// layout (`name`, `timestamp` in epoch milliseconds, `failures`) so that
/// snapshots written by earlier releases load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Last known display name, absent on failure-only entries
    #[serde(default)]
    pub name: Option<String>,

    /// Time of the last successful resolution or failure
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,

    /// Consecutive failures since the last success
    #[serde(rename = "failures", default)]
    pub failure_count: u32,
}

impl CacheEntry {
    /// Entry for a successful resolution.
    pub fn resolved(name: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            name: Some(name.into()),
            last_updated: at,
            failure_count: 0,
        }
    }

    /// Entry for a first failed resolution.
    pub const fn failed(at: DateTime<Utc>) -> Self {
        Self {
            name: None,
            last_updated: at,
            failure_count: 1,
        }
    }

    /// Whether the entry carries a failure streak.
    pub const fn is_failing(&self) -> bool {
        self.failure_count > 0
    }
}

/// Ordered copy of the whole cache, least recently used first.
pub type Snapshot = IndexMap<String, CacheEntry>;

/// Summary of the cache contents for administration output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total number of entries
    pub entries: usize,
    /// Entries carrying a display name
    pub named: usize,
    /// Entries with a non-zero failure count
    pub failing: usize,
    /// Size of the serialized snapshot in bytes
    pub snapshot_bytes: usize,
}
