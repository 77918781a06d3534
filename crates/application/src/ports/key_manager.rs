//! External signer port

use async_trait::async_trait;

/// Error reported by an external signer.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct KeyManagerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl KeyManagerError {
    /// Creates an error with a message only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying cause.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Holds the private key elsewhere (HSM, KMS, agent) and signs login
/// requests on the client's behalf.
///
/// Implementations must return the base64 encoded RSASSA-PKCS1-v1_5
/// SHA-512 signature of `body`.
#[async_trait]
pub trait KeyManager: Send + Sync {
    /// Signs `body` and returns the base64 signature.
    async fn sign(&self, body: &[u8]) -> Result<String, KeyManagerError>;
}
