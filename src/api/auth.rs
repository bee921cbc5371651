//! Bearer-token authorization
//!
//! Every request must carry `Authorization: Bearer <secret>` unless the
//! secret is empty. ACME challenge requests are always let through so
//! certificate validation keeps working while authorization is enabled.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{AppState, ACME_CHALLENGE_PREFIX};
use crate::error::GatewayError;

/// Shared-secret configuration.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Full expected header value, `None` in open mode
    expected: Option<Arc<str>>,
}

impl AuthConfig {
    /// An empty secret disables authorization.
    pub fn new(secret: &str) -> Self {
        let expected = (!secret.is_empty()).then(|| Arc::from(format!("Bearer {secret}")));
        Self { expected }
    }

    /// True when no secret is configured.
    pub fn is_open(&self) -> bool {
        self.expected.is_none()
    }

    /// Exact, case-sensitive comparison against `Bearer <secret>`.
    pub fn admits(&self, header: Option<&HeaderValue>) -> bool {
        match &self.expected {
            None => true,
            Some(expected) => header.is_some_and(|value| value.as_bytes() == expected.as_bytes()),
        }
    }
}

/// Middleware rejecting unauthorized requests with an empty 401.
pub async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if path.starts_with(ACME_CHALLENGE_PREFIX)
        || state.auth.admits(request.headers().get(AUTHORIZATION))
    {
        return next.run(request).await;
    }

    debug!(method = %request.method(), path, "Rejected request without valid bearer token");
    GatewayError::Unauthorized.into_response()
}
