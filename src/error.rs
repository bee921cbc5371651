//! Error types for the cache gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Store Error Enum ==
/// Errors reported by a cache backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Key absent or expired
    #[error("cache: entry not found")]
    NotFound,

    /// Key longer than the backend accepts
    #[error("cache: key of {len} bytes exceeds the limit of {max} bytes")]
    KeyTooLarge { len: usize, max: usize },

    /// Key and value together exceed the per-entry ceiling
    #[error("cache: entry of {size} bytes exceeds the limit of {max} bytes")]
    EntryTooLarge { size: usize, max: usize },
}

// == Gateway Error Enum ==
/// Terminal outcomes of a gateway request.
///
/// Every variant except `BadRequest` renders with an empty body.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or wrong bearer token
    #[error("unauthorized")]
    Unauthorized,

    /// Item absent from the store
    #[error("item not found")]
    NotFound,

    /// Store rejected a write; the detail is returned to the caller
    #[error("{0}")]
    BadRequest(String),

    /// Verb not supported on a known path
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Unknown path
    #[error("route not found")]
    NotFoundRoute,

    /// Stats snapshot could not be encoded
    #[error("failed to encode stats: {0}")]
    InternalSerialization(#[from] serde_json::Error),
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => GatewayError::NotFound,
            other => GatewayError::BadRequest(other.to_string()),
        }
    }
}

impl GatewayError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound | GatewayError::NotFoundRoute => StatusCode::NOT_FOUND,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::InternalSerialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            GatewayError::BadRequest(message) => (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                message,
            )
                .into_response(),
            _ => status.into_response(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for gateway handlers.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_404() {
        let err: GatewayError = StoreError::NotFound.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_rejection_surfaces_detail() {
        let err: GatewayError = StoreError::EntryTooLarge { size: 10, max: 4 }.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("10 bytes"));
    }

    #[tokio::test]
    async fn test_bad_request_body_is_error_text() {
        let response = GatewayError::BadRequest("too big".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"too big");
    }

    #[tokio::test]
    async fn test_other_errors_have_empty_body() {
        for err in [
            GatewayError::Unauthorized,
            GatewayError::NotFound,
            GatewayError::MethodNotAllowed,
            GatewayError::NotFoundRoute,
        ] {
            let response = err.into_response();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            assert!(bytes.is_empty());
        }
    }
}
