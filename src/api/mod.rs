//! API Module
//!
//! HTTP handlers and routing for the cache gateway.
//!
//! # Endpoints
//! - `GET /items/{key}` - Retrieve a value
//! - `PUT /items/{key}` - Store the request body, optional `X-Cache-Expire` TTL
//! - `DELETE /items/{key}` - Delete a key
//! - `DELETE /items` - Clear the store
//! - `GET /stats` - Cache and memory statistics
//! - `DELETE /stats` - Reset cache counters

pub mod auth;
pub mod handlers;
pub mod path;
pub mod routes;

pub use auth::AuthConfig;
pub use handlers::*;
pub use path::ItemKey;
pub use routes::create_router;

/// Request header carrying the TTL in seconds on PUT
pub const EXPIRE_HEADER: &str = "x-cache-expire";

/// Path prefix of a single item
pub const ITEMS_PREFIX: &str = "/items/";

/// Path prefix answered by the certificate provisioner
pub const ACME_CHALLENGE_PREFIX: &str = "/.well-known/acme-challenge/";
