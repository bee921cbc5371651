//! Cache Statistics Module
//!
//! Tracks lookup counters and produces point-in-time snapshots of them.

use serde::{Deserialize, Serialize};

// == Counters ==
/// Cumulative counters kept by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Lookups that returned a value
    pub hits: u64,
    /// Lookups that found nothing (absent or expired)
    pub misses: u64,
    /// Entries dropped because their TTL elapsed
    pub expired: u64,
    /// Writes that replaced a live entry
    pub overwrites: u64,
}

impl Counters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self, count: u64) {
        self.expired += count;
    }

    pub fn record_overwrite(&mut self) {
        self.overwrites += 1;
    }

    /// Total number of lookups (hits + misses).
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    // == Hit Rate ==
    /// Returns hits / lookups, or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Cache Stats ==
/// Immutable snapshot of the store counters, serialized under `Cache` in
/// the stats response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheStats {
    /// Mean last-access Unix timestamp of live entries
    pub average_access_time: i64,
    pub entry_count: u64,
    pub expired_count: u64,
    pub hit_count: u64,
    pub hit_rate: f64,
    pub lookup_count: u64,
    pub miss_count: u64,
    pub overwrite_count: u64,
}

impl CacheStats {
    /// Builds a snapshot from the counters and the live entry summary.
    pub fn snapshot(counters: &Counters, entry_count: u64, average_access_time: i64) -> Self {
        Self {
            average_access_time,
            entry_count,
            expired_count: counters.expired,
            hit_count: counters.hits,
            hit_rate: counters.hit_rate(),
            lookup_count: counters.lookups(),
            miss_count: counters.misses,
            overwrite_count: counters.overwrites,
        }
    }
}
