//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the gateway serves.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
