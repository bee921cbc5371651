//! Cache Module
//!
//! The storage contract the gateway consumes, and the in-memory backend that
//! implements it with TTL expiration and LRU eviction by byte budget.

use std::time::Duration;

use bytes::Bytes;

use crate::error::StoreError;

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, Counters};
pub use store::MemoryStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 65_535;

/// A single entry may use at most this fraction (1/n) of the budget
pub const ENTRY_SIZE_DIVISOR: usize = 1024;

/// Smallest byte budget a store accepts
pub const MIN_CAPACITY_BYTES: usize = 512 * 1024;

pub const BYTES_PER_MIB: usize = 1024 * 1024;

// == Cache Backend ==
/// Operations the gateway needs from a cache engine.
///
/// Implementations must be safe to call from many tasks at once; the
/// gateway adds no locking of its own.
pub trait CacheBackend: Send + Sync {
    /// Returns the live value for `key`, or `StoreError::NotFound`.
    fn get(&self, key: &[u8]) -> Result<Bytes, StoreError>;

    /// Stores `value` under `key`. `None` means no expiration.
    fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Removes `key`; returns whether a live entry existed.
    fn delete(&self, key: &[u8]) -> bool;

    /// Removes every entry. Counters are kept.
    fn clear(&self);

    /// Point-in-time copy of the counters.
    fn stats(&self) -> CacheStats;

    /// Zeroes the counters without touching entries.
    fn reset_stats(&self);

    /// Drops expired entries and returns how many were removed.
    fn purge_expired(&self) -> usize;
}
