//! Token cache port
//!
//! Persists the last issued token per account so that separate process
//! runs can reuse it instead of logging in again.

use async_trait::async_trait;
use cloudhost_domain::Token;

/// Errors that can occur while reading or writing a token cache.
#[derive(Debug, thiserror::Error)]
pub enum TokenCacheError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend-specific failure.
    #[error("Token cache backend error: {0}")]
    Backend(String),
}

/// Key-value store of tokens, keyed by account login.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Loads the token stored for `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored. Expired tokens may be
    /// returned; callers check expiry themselves.
    async fn load(&self, key: &str) -> Result<Option<Token>, TokenCacheError>;

    /// Stores `token` for `key`, replacing any previous entry.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    async fn store(&self, key: &str, token: &Token) -> Result<(), TokenCacheError>;
}
