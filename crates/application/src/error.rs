//! Authentication error types

use chrono::{DateTime, Utc};
use cloudhost_domain::{ApiError, DomainError};
use thiserror::Error;

use crate::ports::{HttpClientError, KeyManagerError, TokenCacheError};

/// Errors returned while obtaining a token.
///
/// None of these are retried internally; a failed call leaves any
/// previously obtained token in place.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The private key is not valid PEM.
    #[error("could not decode private key: {0}")]
    Decode(String),

    /// The PEM payload is not a PKCS#8 private key.
    #[error("could not parse private key: {0}")]
    Parse(String),

    /// The private key is not an RSA key.
    #[error("private key was no RSA key: {0}")]
    UnsupportedKeyType(String),

    /// External signing was requested but no signer is configured.
    #[error("no key manager is available to sign the login request")]
    NoSignerAvailable,

    /// No static token, private key or key manager was configured.
    #[error("a token, private key or key manager is required")]
    NoCredential,

    /// The RSA signing primitive failed.
    #[error("could not sign login request: {0}")]
    Signing(String),

    /// The external signer failed.
    #[error("key manager failed to sign login request: {0}")]
    ExternalSigner(#[source] KeyManagerError),

    /// A token could not be parsed.
    #[error(transparent)]
    MalformedToken(DomainError),

    /// The statically configured token has expired and cannot be renewed.
    #[error("static token expired at {expired_at}")]
    TokenExpired {
        /// Expiry of the static token.
        expired_at: DateTime<Utc>,
    },

    /// The login request could not be built.
    #[error("could not build login request: {0}")]
    Request(DomainError),

    /// The API rejected the login.
    #[error("authentication failed: {0}")]
    Api(#[from] ApiError),

    /// The login request did not reach the API.
    #[error("could not reach authentication endpoint: {0}")]
    Transport(#[from] HttpClientError),

    /// The API answered 2xx with a body that is not a login response.
    #[error("unexpected authentication response: {0}")]
    MalformedResponse(String),

    /// The token cache failed.
    #[error("token cache error: {0}")]
    TokenCache(#[from] TokenCacheError),
}

impl From<DomainError> for AuthError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::MalformedToken(_) => Self::MalformedToken(error),
            other => Self::Request(other),
        }
    }
}

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
