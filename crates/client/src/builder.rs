//! Client construction.

use std::io::Read;
use std::sync::Arc;

use cloudhost_application::auth::{AuthSettings, Authenticator, Credential, PrivateKeyPem};
use cloudhost_application::{AuthError, Clock, HttpClient, KeyManager, TokenCache};
use cloudhost_domain::{ClientConfiguration, Token};
use cloudhost_infrastructure::{ReqwestHttpClient, SystemClock};
use tracing::info;

use crate::client::Client;
use crate::error::{ClientError, ClientResult};

/// Builder for [`Client`].
///
/// The configuration covers everything that can be written down; the
/// `with_*` methods supply collaborators that cannot, such as a custom
/// transport or an external signer.
///
/// # Example
///
/// ```no_run
/// use cloudhost::{ClientBuilder, ClientConfiguration};
///
/// # async fn run() -> cloudhost::ClientResult<()> {
/// let mut config = ClientConfiguration::new("example-user");
/// config.private_key_path = Some("/etc/cloudhost/key.pem".into());
///
/// let client = ClientBuilder::new(config).build().await?;
/// let domains: serde_json::Value = client.get(cloudhost::ApiRequest::get("/domains")).await?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct ClientBuilder {
    config: ClientConfiguration,
    http_client: Option<Arc<dyn HttpClient>>,
    token_cache: Option<Arc<dyn TokenCache>>,
    key_manager: Option<Arc<dyn KeyManager>>,
    clock: Option<Arc<dyn Clock>>,
    private_key: Option<Vec<u8>>,
}

impl ClientBuilder {
    /// Starts a builder from `config`.
    pub fn new(config: ClientConfiguration) -> Self {
        Self {
            config,
            http_client: None,
            token_cache: None,
            key_manager: None,
            clock: None,
            private_key: None,
        }
    }

    /// Uses `http_client` instead of the default reqwest transport.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Persists tokens through `cache`.
    pub fn with_token_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
        self.token_cache = Some(cache);
        self
    }

    /// Signs login requests with an external key manager.
    pub fn with_key_manager(mut self, key_manager: Arc<dyn KeyManager>) -> Self {
        self.key_manager = Some(key_manager);
        self
    }

    /// Uses `clock` for token expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Uses PEM bytes as the private key, overriding the configuration.
    pub fn with_private_key_bytes(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.private_key = Some(pem.into());
        self
    }

    /// Reads the private key from `reader`, overriding the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if reading fails.
    pub fn with_private_key_reader(mut self, mut reader: impl Read) -> ClientResult<Self> {
        let mut pem = Vec::new();
        reader.read_to_end(&mut pem)?;
        self.private_key = Some(pem);
        Ok(self)
    }

    /// Validates the configuration and builds the client.
    ///
    /// The private key is read here, from the first of: bytes or reader
    /// given to the builder, the inline key, the key path.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Configuration`] if the configuration is invalid
    /// - [`ClientError::Io`] if the key file cannot be read
    /// - [`ClientError::Auth`] if the static token is malformed
    /// - [`ClientError::Transport`] if the default transport cannot start
    pub async fn build(self) -> ClientResult<Client> {
        let config = self.config;
        config
            .validate(self.key_manager.is_some() || self.private_key.is_some())
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let static_token = config
            .static_token()
            .map(Token::parse)
            .transpose()
            .map_err(AuthError::from)?;

        let private_key = match (self.private_key, &config.private_key, &config.private_key_path) {
            (Some(pem), _, _) => Some(pem),
            (None, Some(pem), _) if !pem.trim().is_empty() => Some(pem.clone().into_bytes()),
            (None, _, Some(path)) if static_token.is_none() => Some(tokio::fs::read(path).await?),
            _ => None,
        };

        let credential = Credential::select(
            static_token,
            private_key.map(PrivateKeyPem::new),
            self.key_manager,
        )?;

        let http_client: Arc<dyn HttpClient> = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestHttpClient::new(
                config.request_timeout(),
                &config.user_agent,
            )?),
        };
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));

        let settings = AuthSettings::new(&config.account_name, &config.base_url)
            .with_token_options(config.token_options());
        let mut authenticator =
            Authenticator::new(settings, credential, Arc::clone(&http_client), clock);
        if let Some(cache) = self.token_cache {
            authenticator = authenticator.with_token_cache(cache);
        }

        info!(
            account = %config.account_name,
            credential = authenticator.credential().kind(),
            base_url = %config.base_url,
            test_mode = config.test_mode,
            "client configured"
        );

        Ok(Client::from_parts(config, authenticator, http_client))
    }
}
