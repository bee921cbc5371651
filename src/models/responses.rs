//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::models::MemStats;

/// Response body for GET /stats
///
/// Serialized as `{"Cache": {...}, "Mem": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatsResponse {
    /// Store counters
    pub cache: CacheStats,
    /// Process and host memory
    pub mem: MemStats,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a store snapshot and memory figures
    pub fn new(cache: CacheStats, mem: MemStats) -> Self {
        Self { cache, mem }
    }
}
