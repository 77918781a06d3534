//! Client error types

use cloudhost_application::{AuthError, HttpClientError};
use cloudhost_domain::{ApiError, DomainError};
use thiserror::Error;

/// Errors returned by [`Client`](crate::Client) and
/// [`ClientBuilder`](crate::ClientBuilder).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configuration is incomplete or invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The private key could not be read.
    #[error("could not read private key: {0}")]
    Io(#[from] std::io::Error),

    /// No valid token could be obtained.
    #[error("could not get token from authenticator: {0}")]
    Auth(#[from] AuthError),

    /// The request could not be built.
    #[error("error during request creation: {0}")]
    Request(DomainError),

    /// The request did not reach the API.
    #[error("request error: {0}")]
    Transport(#[from] HttpClientError),

    /// The API answered with an error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response body did not match the expected type.
    #[error("could not decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// Returns the API error, if the API rejected the call.
    ///
    /// Login rejections are included.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) | Self::Auth(AuthError::Api(error)) => Some(error),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
