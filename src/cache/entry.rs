//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Bytes,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
    /// Last access time (Unix seconds)
    pub last_access: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// A TTL too far in the future to represent never expires.
    pub fn new(value: Bytes, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.and_then(|ttl| Instant::now().checked_add(ttl)),
            last_access: current_timestamp(),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration
    /// instant, so a fully elapsed TTL never yields the value.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Instant::now() >= expires,
            None => false,
        }
    }

    // == Touch ==
    /// Records an access at the current time.
    pub fn touch(&mut self) {
        self.last_access = current_timestamp();
    }

    /// Bytes charged against the store budget for this entry under `key`.
    pub fn footprint(&self, key: &[u8]) -> usize {
        key.len() + self.value.len()
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
