//! Bounded, TTL-aware cache of resolution results and failure counters.
//!
//! Entries are kept in recency order: every write moves the entry to the
//! most recently used end and capacity eviction pops from the other end.
//! Reads never reorder. Expiry is checked on read; expired entries are only
//! physically removed by [`NameCache::sweep_expired`], which runs at flush
//! time.

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use std::sync::Arc;
use tracing::debug;

use crate::domain::models::{CacheConfig, CacheEntry, CacheStats, Snapshot};
use crate::domain::ports::Clock;

fn to_chrono(duration: std::time::Duration) -> Duration {
    Duration::from_std(duration).unwrap_or_else(|_| Duration::days(365 * 100))
}

/// Recency-ordered name cache.
pub struct NameCache {
    entries: LruCache<String, CacheEntry>,
    max_size: usize,
    ttl: Duration,
    max_failures: u32,
    failure_cooldown: Duration,
    clock: Arc<dyn Clock>,
    dirty: bool,
}

impl NameCache {
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: LruCache::unbounded(),
            max_size: config.max_size,
            ttl: to_chrono(config.ttl()),
            max_failures: config.max_failures,
            failure_cooldown: to_chrono(config.failure_cooldown()),
            clock,
            dirty: false,
        }
    }

    /// Cached display name, if present and within TTL.
    pub fn get(&self, handle: &str) -> Option<String> {
        let entry = self.entries.peek(handle)?;
        if self.is_expired(entry, self.clock.now()) {
            return None;
        }
        entry.name.clone()
    }

    /// Record a successful resolution.
    pub fn put(&mut self, handle: &str, name: impl Into<String>) {
        let entry = CacheEntry::resolved(name, self.clock.now());
        self.touch(handle, entry);
    }

    /// Record a failed resolution attempt, creating the entry if needed.
    pub fn record_failure(&mut self, handle: &str) {
        let now = self.clock.now();
        let entry = match self.entries.pop(handle) {
            Some(mut existing) => {
                existing.failure_count = existing.failure_count.saturating_add(1);
                existing.last_updated = now;
                existing
            }
            None => CacheEntry::failed(now),
        };
        debug!(handle, failures = entry.failure_count, "recorded resolution failure");
        self.touch(handle, entry);
    }

    /// Backoff gate consulted before every new resolution attempt.
    pub fn should_attempt(&self, handle: &str) -> bool {
        let Some(entry) = self.entries.peek(handle) else {
            return true;
        };
        if entry.failure_count < self.max_failures {
            return true;
        }
        self.clock.now() - entry.last_updated > self.failure_cooldown
    }

    /// Evict least recently touched entries until the cache fits.
    ///
    /// Returns the number of entries removed, which equals the overflow.
    pub fn evict_if_over_capacity(&mut self) -> usize {
        let mut removed = 0;
        while self.entries.len() > self.max_size {
            if self.entries.pop_lru().is_none() {
                break;
            }
            removed += 1;
        }
        if removed > 0 {
            debug!(removed, size = self.entries.len(), "evicted least recently used entries");
        }
        removed
    }

    /// Remove successful entries older than the TTL.
    ///
    /// Entries with a failure streak are kept regardless of age.
    pub fn sweep_expired(&mut self) -> usize {
        // A TTL reaching past the earliest representable time never expires.
        let Some(cutoff) = self.clock.now().checked_sub_signed(self.ttl) else {
            return 0;
        };
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_failing() && entry.last_updated < cutoff)
            .map(|(handle, _)| handle.clone())
            .collect();

        for handle in &expired {
            self.entries.pop(handle);
        }
        if !expired.is_empty() {
            debug!(removed = expired.len(), "swept expired entries");
        }
        expired.len()
    }

    /// Entry for `handle` without touching recency.
    pub fn entry(&self, handle: &str) -> Option<&CacheEntry> {
        self.entries.peek(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordered copy of every entry, least recently used first.
    pub fn snapshot(&self) -> Snapshot {
        self.entries
            .iter()
            .rev()
            .map(|(handle, entry)| (handle.clone(), entry.clone()))
            .collect()
    }

    /// Replace the contents with a loaded snapshot, keeping its order.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.entries.clear();
        for (handle, entry) in snapshot {
            self.entries.put(handle, entry);
        }
        self.evict_if_over_capacity();
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.dirty = true;
    }

    pub fn stats(&self) -> CacheStats {
        let snapshot = self.snapshot();
        let snapshot_bytes = serde_json::to_vec(&snapshot).map_or(0, |bytes| bytes.len());
        CacheStats {
            entries: snapshot.len(),
            named: snapshot.values().filter(|e| e.name.is_some()).count(),
            failing: snapshot.values().filter(|e| e.is_failing()).count(),
            snapshot_bytes,
        }
    }

    /// Whether the cache changed since the last call; resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn touch(&mut self, handle: &str, entry: CacheEntry) {
        // `put` on an existing key only updates the value; pop first so the
        // entry always lands at the most recently used end.
        self.entries.pop(handle);
        self.entries.put(handle.to_string(), entry);
        self.evict_if_over_capacity();
        self.dirty = true;
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.last_updated > self.ttl
    }
}
