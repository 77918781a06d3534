//! Client configuration
//!
//! Every field has a default so the configuration can be deserialized
//! from a partial document in any serde format.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::{DEFAULT_TOKEN_EXPIRATION, TokenOptions};
use crate::error::{DomainError, DomainResult};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudhost.example/v6";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Access level requested for new tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiMode {
    /// Full access (default).
    #[default]
    ReadWrite,
    /// Only non-mutating calls are allowed.
    ReadOnly,
}

/// Configuration for an API client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfiguration {
    /// Account login; required unless a static token is given.
    pub account_name: String,
    /// Pre-issued bearer token; takes precedence over key-based login.
    pub token: Option<String>,
    /// Path to a PEM encoded PKCS#8 private key.
    pub private_key_path: Option<PathBuf>,
    /// PEM encoded PKCS#8 private key.
    pub private_key: Option<String>,
    /// Access level of requested tokens.
    pub mode: ApiMode,
    /// Requested token lifetime in seconds.
    pub token_expiration_secs: u64,
    /// Bind requested tokens to the requesting IP.
    pub token_whitelisted: bool,
    /// API base URL including the version path.
    pub base_url: String,
    /// Send every request in test mode.
    pub test_mode: bool,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfiguration {
    fn default() -> Self {
        Self {
            account_name: String::new(),
            token: None,
            private_key_path: None,
            private_key: None,
            mode: ApiMode::default(),
            token_expiration_secs: DEFAULT_TOKEN_EXPIRATION.as_secs(),
            token_whitelisted: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            test_mode: false,
            user_agent: default_user_agent(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

fn default_user_agent() -> String {
    format!("cloudhost-rust/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfiguration {
    /// Creates a key-based configuration for `account_name`.
    #[must_use]
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            ..Self::default()
        }
    }

    /// Creates a configuration that only uses a pre-issued token.
    #[must_use]
    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Returns the configured static token, ignoring empty strings.
    #[must_use]
    pub fn static_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Returns true if a private key is configured inline or by path.
    #[must_use]
    pub fn has_private_key(&self) -> bool {
        self.private_key.as_deref().is_some_and(|k| !k.trim().is_empty())
            || self.private_key_path.is_some()
    }

    /// Token options derived from mode, lifetime and whitelisting.
    #[must_use]
    pub const fn token_options(&self) -> TokenOptions {
        TokenOptions {
            read_only: matches!(self.mode, ApiMode::ReadOnly),
            expiration: Duration::from_secs(self.token_expiration_secs),
            whitelisted: self.token_whitelisted,
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validates the configuration.
    ///
    /// `has_external_credential` tells whether a key or signer is supplied
    /// outside the configuration, which satisfies the credential requirement.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfiguration`] if the account name is
    /// missing without a static token, no credential source is available,
    /// the token lifetime is zero, or the base URL does not parse.
    pub fn validate(&self, has_external_credential: bool) -> DomainResult<()> {
        if self.account_name.trim().is_empty() && self.static_token().is_none() {
            return Err(DomainError::InvalidConfiguration(
                "account name is required".to_string(),
            ));
        }

        if self.static_token().is_none() && !self.has_private_key() && !has_external_credential {
            return Err(DomainError::InvalidConfiguration(
                "a private key, private key path, token or key manager is required".to_string(),
            ));
        }

        if self.token_expiration_secs == 0 {
            return Err(DomainError::InvalidConfiguration(
                "token expiration must be greater than zero".to_string(),
            ));
        }

        Url::parse(&self.base_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.base_url)))?;

        Ok(())
    }
}

impl std::fmt::Debug for ClientConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfiguration")
            .field("account_name", &self.account_name)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("private_key_path", &self.private_key_path)
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .field("mode", &self.mode)
            .field("token_expiration_secs", &self.token_expiration_secs)
            .field("token_whitelisted", &self.token_whitelisted)
            .field("base_url", &self.base_url)
            .field("test_mode", &self.test_mode)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
