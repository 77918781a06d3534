//! HTTP Client port

use std::future::Future;
use std::pin::Pin;

use cloudhost_domain::{HttpRequest, response::ApiResponse};
use thiserror::Error;

/// Transport-level failures.
///
/// A response with a non-2xx status is not a transport failure; it is
/// returned as an [`ApiResponse`] and decoded by the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request did not complete within the timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body exceeded the size limit.
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge {
        /// Maximum accepted body size.
        limit: usize,
    },

    /// Any other transport error.
    #[error("{0}")]
    Other(String),
}

/// Boxed future returned by [`HttpClient::execute`].
pub type HttpFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ApiResponse, HttpClientError>> + Send + 'a>>;

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation so the
/// authentication core can be driven by any transport, including
/// in-memory fakes in tests. It is object safe and is injected as
/// `Arc<dyn HttpClient>`.
pub trait HttpClient: Send + Sync {
    /// Executes a prepared request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received.
    fn execute<'a>(&'a self, request: &'a HttpRequest) -> HttpFuture<'a>;
}
