//! API responses.
//!
//! Contains the raw response handed back by the transport and the
//! structured error decoded from the API's error envelope.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Status of an API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Wraps a numeric status.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Numeric value.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// True for 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.0, 200..=299)
    }

    /// Reason phrase for the statuses the API is documented to return.
    #[must_use]
    pub const fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            409 => "Conflict",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            503 => "Service Unavailable",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Error returned by the API for a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status_code})")]
pub struct ApiError {
    /// Message from the `error` field of the envelope.
    pub message: String,
    /// HTTP status code of the response.
    pub status_code: u16,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// HTTP response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers; names lower-cased by the transport.
    pub headers: HashMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// Time taken by the round trip.
    pub duration: Duration,
}

impl ApiResponse {
    /// Creates a new response.
    #[must_use]
    pub fn new(
        status: impl Into<StatusCode>,
        headers: HashMap<String, String>,
        body: Vec<u8>,
        duration: Duration,
    ) -> Self {
        Self {
            status: status.into().as_u16(),
            headers,
            body,
            duration,
        }
    }

    /// Returns the status as a `StatusCode` struct.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::new(self.status)
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code().is_success()
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the `Content-Location` header, set by the API on creation.
    #[must_use]
    pub fn content_location(&self) -> Option<&str> {
        self.header("content-location")
    }

    /// Returns the body as a lossy UTF-8 string.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Decodes the error envelope of a non-2xx response.
    ///
    /// Returns `None` for successful responses. Bodies that are not an
    /// `{"error": ...}` envelope fall back to the body text, or to the
    /// status reason phrase when the body is empty.
    #[must_use]
    pub fn api_error(&self) -> Option<ApiError> {
        if self.is_success() {
            return None;
        }

        let message = match self.json::<ErrorEnvelope>() {
            Ok(envelope) => envelope.error,
            Err(_) => {
                let text = self.body_text();
                let text = text.trim();
                if text.is_empty() {
                    self.status_code().reason_phrase().to_string()
                } else {
                    text.to_string()
                }
            }
        };

        Some(ApiError::new(message, self.status))
    }

    /// Returns the response unchanged if successful, otherwise its [`ApiError`].
    ///
    /// # Errors
    ///
    /// Returns the decoded [`ApiError`] for any non-2xx status.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        match self.api_error() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}
