//! Item key extraction
//!
//! The key is everything after `/items/` in the request path, percent-decoded
//! to raw bytes. Keys are opaque, so they need not be valid UTF-8.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::ITEMS_PREFIX;
use crate::error::GatewayError;

/// Key of the item addressed by the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKey(pub Vec<u8>);

impl ItemKey {
    /// Returns the key for `/items/<key>` paths and `None` for anything else,
    /// including `/items/` with nothing after it.
    pub fn from_path(path: &str) -> Option<Self> {
        let raw = path.strip_prefix(ITEMS_PREFIX)?;
        if raw.is_empty() {
            return None;
        }
        Some(Self(urlencoding::decode_binary(raw.as_bytes()).into_owned()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ItemKey
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_path(parts.uri.path()).ok_or(GatewayError::NotFoundRoute)
    }
}
