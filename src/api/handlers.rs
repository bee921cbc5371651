//! API Handlers
//!
//! HTTP request handlers for the item and stats endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{debug, error};

use super::{AuthConfig, ItemKey, EXPIRE_HEADER};
use crate::cache::{CacheBackend, MemoryStore};
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::models::{MemoryProbe, StatsResponse};

/// Application state shared across all handlers.
///
/// Built once per process and handed to the router; there is no global state.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache backend
    pub cache: Arc<dyn CacheBackend>,
    /// Bearer-token settings
    pub auth: AuthConfig,
    /// Source of the `Mem` section of the stats response
    pub memory: Arc<MemoryProbe>,
}

impl AppState {
    /// Creates a new AppState around the given backend and secret.
    pub fn new(cache: impl CacheBackend + 'static, api_key: &str) -> Self {
        Self {
            cache: Arc::new(cache),
            auth: AuthConfig::new(api_key),
            memory: Arc::new(MemoryProbe::new()),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Initializes a `MemoryStore` with the configured byte budget.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MemoryStore::with_capacity_mib(config.cache_size_mib),
            &config.api_key,
        )
    }
}

/// Reads the TTL header; only a positive integer yields an expiration.
pub fn expiry_from_headers(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(EXPIRE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|seconds| *seconds > 0)
        .map(|seconds| Duration::from_secs(seconds.unsigned_abs()))
}

/// Handler for GET /items/{key}
///
/// Returns the raw value as the body.
pub async fn get_item_handler(State(state): State<AppState>, key: ItemKey) -> Result<Bytes> {
    Ok(state.cache.get(key.as_bytes())?)
}

/// Handler for PUT /items/{key}
///
/// The whole request body becomes the value. A store rejection is returned
/// as a 400 whose body is the error text.
pub async fn put_item_handler(
    State(state): State<AppState>,
    key: ItemKey,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let ttl = expiry_from_headers(&headers);

    state.cache.set(key.as_bytes(), body, ttl).map_err(|err| {
        debug!("Store rejected write: {}", err);
        GatewayError::BadRequest(err.to_string())
    })?;

    Ok(StatusCode::OK)
}

/// Handler for DELETE /items/{key}
pub async fn delete_item_handler(
    State(state): State<AppState>,
    key: ItemKey,
) -> Result<StatusCode> {
    if state.cache.delete(key.as_bytes()) {
        Ok(StatusCode::OK)
    } else {
        Err(GatewayError::NotFound)
    }
}

/// Handler for DELETE /items
///
/// Clearing an empty store still succeeds.
pub async fn clear_handler(State(state): State<AppState>) -> StatusCode {
    state.cache.clear();
    StatusCode::OK
}

/// Handler for GET /stats
///
/// Store counters under `Cache`, memory figures under `Mem`.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Response> {
    let stats = StatsResponse::new(state.cache.stats(), state.memory.snapshot());

    let body = serde_json::to_vec(&stats).map_err(|err| {
        error!("Failed to encode stats: {}", err);
        GatewayError::from(err)
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Handler for DELETE /stats
///
/// Zeroes the counters; entries are left alone.
pub async fn reset_stats_handler(State(state): State<AppState>) -> StatusCode {
    state.cache.reset_stats();
    StatusCode::OK
}

/// Fallback for unsupported verbs on a known path.
pub async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}

/// Fallback for unknown paths.
pub async fn not_found() -> GatewayError {
    GatewayError::NotFoundRoute
}
