//! Cache Client
//!
//! Remote access to a gateway over the same HTTP contract it serves. Each
//! call is one request; the status code decides the outcome:
//!
//! | Status | get | set / delete | clear |
//! |---|---|---|---|
//! | 200 | value | `Ok` | `Ok` |
//! | 404 | `NotFound` | `NotFound` | `Status(404)` |
//! | 401 | `Unauthorized` | `Unauthorized` | `Unauthorized` |
//! | other | `Status(code)` | `Status(code)` | `Status(code)` |
//!
//! Nothing is retried.

mod error;

pub use error::{ClientError, ClientResult};

use bytes::Bytes;
use reqwest::{header::AUTHORIZATION, Method, RequestBuilder, Response, StatusCode};

use crate::api::EXPIRE_HEADER;
use crate::models::StatsResponse;

/// Client bound to one gateway and credential.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct CacheClient {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl CacheClient {
    /// Creates a client for `base_url`. An empty `api_key` sends no
    /// `Authorization` header.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Same as [`CacheClient::new`] with a caller-configured HTTP client
    /// (timeouts, proxies, root certificates).
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let api_key = api_key.into();
        let bearer = (!api_key.is_empty()).then(|| format!("Bearer {api_key}"));

        Self {
            http,
            base_url,
            bearer,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the value stored under `key`.
    pub async fn get(&self, key: impl AsRef<[u8]>) -> ClientResult<Bytes> {
        let response = self.send(self.item_request(Method::GET, key.as_ref())).await?;

        match response.status() {
            StatusCode::OK => Ok(response.bytes().await?),
            status => Err(item_error(status)),
        }
    }

    /// Stores `value` under `key`. A `ttl` of 0 means no expiration.
    pub async fn set(
        &self,
        key: impl AsRef<[u8]>,
        value: impl Into<Bytes>,
        ttl_secs: u64,
    ) -> ClientResult<()> {
        let mut request = self
            .item_request(Method::PUT, key.as_ref())
            .body(value.into());
        if ttl_secs > 0 {
            request = request.header(EXPIRE_HEADER, ttl_secs.to_string());
        }

        let response = self.send(request).await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(item_error(status)),
        }
    }

    /// Removes `key`.
    pub async fn delete(&self, key: impl AsRef<[u8]>) -> ClientResult<()> {
        let response = self
            .send(self.item_request(Method::DELETE, key.as_ref()))
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(item_error(status)),
        }
    }

    /// Removes every entry.
    pub async fn clear(&self) -> ClientResult<()> {
        let url = format!("{}/items", self.base_url);
        let response = self.send(self.http.request(Method::DELETE, url)).await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(collection_error(status)),
        }
    }

    /// Fetches the gateway's statistics.
    pub async fn stats(&self) -> ClientResult<StatsResponse> {
        let url = format!("{}/stats", self.base_url);
        let response = self.send(self.http.request(Method::GET, url)).await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(collection_error(status)),
        }
    }

    /// Zeroes the gateway's counters.
    pub async fn reset_stats(&self) -> ClientResult<()> {
        let url = format!("{}/stats", self.base_url);
        let response = self.send(self.http.request(Method::DELETE, url)).await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(collection_error(status)),
        }
    }

    fn item_request(&self, method: Method, key: &[u8]) -> RequestBuilder {
        self.http.request(method, self.item_url(key))
    }

    fn item_url(&self, key: &[u8]) -> String {
        format!(
            "{}/items/{}",
            self.base_url,
            urlencoding::encode_binary(key)
        )
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let request = match &self.bearer {
            Some(bearer) => request.header(AUTHORIZATION, bearer),
            None => request,
        };
        Ok(request.send().await?)
    }
}

fn item_error(status: StatusCode) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound,
        other => collection_error(other),
    }
}

fn collection_error(status: StatusCode) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        other => ClientError::Status(other),
    }
}
