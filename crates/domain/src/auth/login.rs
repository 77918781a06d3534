//! Login request sent to the authentication endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Endpoint that exchanges a signed login request for a token.
pub const AUTH_ENDPOINT: &str = "/auth";

/// Header carrying the base64 signature of the login body.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Token validity requested when none is configured.
pub const DEFAULT_TOKEN_EXPIRATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Per-account settings that shape every login request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenOptions {
    /// Request a token limited to non-mutating calls.
    pub read_only: bool,
    /// Requested token lifetime.
    pub expiration: Duration,
    /// Bind the token to the IP address that requests it.
    pub whitelisted: bool,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            expiration: DEFAULT_TOKEN_EXPIRATION,
            whitelisted: false,
        }
    }
}

impl TokenOptions {
    /// Renders the requested lifetime the way the API expects it.
    #[must_use]
    pub fn expiration_time(&self) -> String {
        format!("{} seconds", self.expiration.as_secs())
    }
}

/// Body of a login request.
///
/// Field order is the canonical order: the bytes produced by
/// [`LoginRequest::canonical_bytes`] are what gets signed and sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Account login name.
    pub login: String,
    /// Single-use value; regenerated for every login attempt.
    pub nonce: String,
    /// Request a read-only token.
    pub read_only: bool,
    /// Requested lifetime, e.g. `"86400 seconds"`.
    pub expiration_time: String,
    /// Identifies the requesting application.
    pub label: String,
    /// True when the token may be used from any IP.
    pub global_key: bool,
}

impl LoginRequest {
    /// Builds a login request for `login` with the given nonce and label.
    #[must_use]
    pub fn new(
        login: impl Into<String>,
        nonce: impl Into<String>,
        label: impl Into<String>,
        options: &TokenOptions,
    ) -> Self {
        Self {
            login: login.into(),
            nonce: nonce.into(),
            read_only: options.read_only,
            expiration_time: options.expiration_time(),
            label: label.into(),
            global_key: !options.whitelisted,
        }
    }

    /// Serializes the request to its canonical compact JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidBody`] if serialization fails.
    pub fn canonical_bytes(&self) -> DomainResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| DomainError::InvalidBody(e.to_string()))
    }
}

/// Success body of the authentication endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The issued bearer token.
    pub token: String,
}
