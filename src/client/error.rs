//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Outcome of a failed client call.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("cache: key not found")]
    NotFound,

    #[error("cache: unauthorized")]
    Unauthorized,

    /// Any other status the gateway answered with
    #[error("cache: unexpected status code {0}")]
    Status(StatusCode),

    /// Request could not be built or sent, or the body not read
    #[error("cache: transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Status code carried by protocol-level errors, `None` for transport ones.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::NotFound => Some(StatusCode::NOT_FOUND),
            ClientError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ClientError::Status(status) => Some(*status),
            ClientError::Transport(err) => err.status(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
