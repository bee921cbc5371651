//! Response models for the gateway API
//!
//! Item bodies travel as raw bytes; only the stats endpoint has a structured
//! body.

pub mod memory;
pub mod responses;

// Re-export commonly used types
pub use memory::{MemStats, MemoryProbe};
pub use responses::StatsResponse;
