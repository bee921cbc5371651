//! Cachegate - an authenticated HTTP gateway in front of an in-memory cache
//!
//! Byte values under byte keys, with optional per-entry expiration, LRU
//! eviction within a fixed memory budget, optional TLS (static or ACME) and
//! a matching async client.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod tasks;
pub mod tls;

pub use api::{create_router, AppState};
pub use cache::{CacheBackend, MemoryStore};
pub use client::{CacheClient, ClientError};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
