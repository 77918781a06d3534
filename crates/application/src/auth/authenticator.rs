//! Token lifecycle: cache lookup, login and single-flight refresh.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cloudhost_domain::auth::{AUTH_ENDPOINT, SIGNATURE_HEADER};
use cloudhost_domain::{ApiRequest, LoginRequest, LoginResponse, Token, TokenOptions};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::credential::Credential;
use super::signer::{sign_externally, sign_with_key};
use crate::error::{AuthError, AuthResult};
use crate::ports::{Clock, HttpClient, TokenCache};

/// Prefix of the label sent with every login.
pub const DEFAULT_LABEL_PREFIX: &str = "cloudhost-client";

/// Random bytes per nonce, hex encoded on the wire.
const NONCE_BYTES: usize = 16;

/// Per-account login settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// Account login name, also the token cache key.
    pub login: String,
    /// API base URL, e.g. `https://api.cloudhost.example/v6`.
    pub base_url: String,
    /// Options carried by each login request.
    pub token_options: TokenOptions,
    /// Label prefix; the login time in unix seconds is appended.
    pub label_prefix: String,
}

impl AuthSettings {
    /// Settings for `login` against `base_url` with default token options.
    #[must_use]
    pub fn new(login: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            base_url: base_url.into(),
            token_options: TokenOptions::default(),
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
        }
    }

    /// Replaces the token options.
    #[must_use]
    pub const fn with_token_options(mut self, options: TokenOptions) -> Self {
        self.token_options = options;
        self
    }

    /// Replaces the label prefix.
    #[must_use]
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }
}

/// Observable state of the authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token has been obtained yet.
    NoToken,
    /// A token is held and has not expired.
    CachedValid,
    /// A token is held but has expired; the next call refreshes it.
    CachedExpired,
    /// A cache lookup or login is in flight.
    Authenticating,
}

/// Obtains and caches bearer tokens for one account.
///
/// Concurrent callers share a single login: the first caller to find no
/// usable token performs it while the others wait on the refresh lock
/// and then pick up its result.
pub struct Authenticator {
    settings: AuthSettings,
    credential: Credential,
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    token_cache: Option<Arc<dyn TokenCache>>,
    current: RwLock<Option<Token>>,
    refresh_lock: Mutex<()>,
}

impl Authenticator {
    /// Creates an authenticator without a token cache.
    #[must_use]
    pub fn new(
        settings: AuthSettings,
        credential: Credential,
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let current = match &credential {
            Credential::StaticToken(token) => Some(token.clone()),
            _ => None,
        };

        Self {
            settings,
            credential,
            http_client,
            clock,
            token_cache: None,
            current: RwLock::new(current),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Persists tokens across processes through `cache`.
    #[must_use]
    pub fn with_token_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
        self.token_cache = Some(cache);
        self
    }

    /// Returns the login settings.
    #[must_use]
    pub const fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Returns the active credential.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Returns the token currently held, expired or not.
    #[must_use]
    pub fn current_token(&self) -> Option<Token> {
        self.current.read().clone()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        if self.refresh_lock.try_lock().is_err() {
            return AuthState::Authenticating;
        }

        let now = self.clock.now();
        match &*self.current.read() {
            None => AuthState::NoToken,
            Some(token) if token.is_expired(now) => AuthState::CachedExpired,
            Some(_) => AuthState::CachedValid,
        }
    }

    /// Returns a token that is valid now, logging in if needed.
    ///
    /// Order of preference: an unexpired static token, the token held in
    /// memory, the token cache, then a fresh login whose result is written
    /// to the cache before it is adopted. A static credential cannot sign,
    /// so once it has expired only the cache can stand in for it.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenExpired`] if the static token has expired and
    ///   the cache holds no valid token
    /// - [`AuthError::TokenCache`] if the cache cannot be read or written
    /// - signing, transport, API and response errors from the login
    ///
    /// On error the previously held token is left untouched.
    pub async fn get_token(&self) -> AuthResult<Token> {
        if let Credential::StaticToken(token) = &self.credential
            && !token.is_expired(self.clock.now())
        {
            return Ok(token.clone());
        }

        if let Some(token) = self.valid_current() {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(token) = self.valid_current() {
            debug!(login = %self.settings.login, "using token obtained by concurrent caller");
            return Ok(token);
        }

        if let Some(token) = self.load_cached().await? {
            *self.current.write() = Some(token.clone());
            return Ok(token);
        }

        if let Credential::StaticToken(token) = &self.credential {
            warn!(
                expired_at = %token.expires_at(),
                "configured token has expired"
            );
            return Err(AuthError::TokenExpired {
                expired_at: token.expires_at(),
            });
        }

        let token = match self.login().await {
            Ok(token) => token,
            Err(e) => {
                warn!(login = %self.settings.login, error = %e, "login failed");
                return Err(e);
            }
        };

        if let Some(cache) = &self.token_cache {
            if let Err(e) = cache.store(&self.settings.login, &token).await {
                warn!(login = %self.settings.login, error = %e, "could not store token");
                return Err(e.into());
            }
        }

        *self.current.write() = Some(token.clone());
        Ok(token)
    }

    fn valid_current(&self) -> Option<Token> {
        let now = self.clock.now();
        self.current
            .read()
            .as_ref()
            .filter(|token| !token.is_expired(now))
            .cloned()
    }

    async fn load_cached(&self) -> AuthResult<Option<Token>> {
        let Some(cache) = &self.token_cache else {
            return Ok(None);
        };

        let cached = cache.load(&self.settings.login).await.map_err(|e| {
            warn!(login = %self.settings.login, error = %e, "could not read token cache");
            AuthError::from(e)
        })?;

        match cached {
            Some(token) if !token.is_expired(self.clock.now()) => {
                debug!(
                    login = %self.settings.login,
                    expires_at = %token.expires_at(),
                    "using cached token"
                );
                Ok(Some(token))
            }
            Some(token) => {
                debug!(
                    login = %self.settings.login,
                    expired_at = %token.expires_at(),
                    "cached token has expired"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn login(&self) -> AuthResult<Token> {
        let now = self.clock.now();
        let request = LoginRequest::new(
            &self.settings.login,
            generate_nonce(),
            login_label(&self.settings.label_prefix, now),
            &self.settings.token_options,
        );
        let body = request.canonical_bytes()?;
        let signature = self.sign(&body).await?;

        let http_request = ApiRequest::post(AUTH_ENDPOINT)
            .with_header(SIGNATURE_HEADER, signature)
            .with_raw_json_body(body)
            .prepare(&self.settings.base_url)?;

        debug!(
            login = %self.settings.login,
            url = %http_request.url,
            credential = self.credential.kind(),
            "requesting access token"
        );

        let response = self
            .http_client
            .execute(&http_request)
            .await?
            .error_for_status()?;

        let body: LoginResponse = response
            .json()
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        let token = Token::parse(&body.token)?;

        info!(
            login = %self.settings.login,
            expires_at = %token.expires_at(),
            read_only = token.is_read_only(),
            "obtained access token"
        );

        Ok(token)
    }

    async fn sign(&self, body: &[u8]) -> AuthResult<String> {
        match &self.credential {
            Credential::PrivateKey(key) => sign_with_key(body, key.as_bytes()),
            Credential::KeyManager(manager) => sign_externally(body, Some(manager.as_ref())).await,
            Credential::StaticToken(_) => Err(AuthError::NoSignerAvailable),
        }
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("settings", &self.settings)
            .field("credential", &self.credential)
            .field("token_cache", &self.token_cache.is_some())
            .field("current", &*self.current.read())
            .finish_non_exhaustive()
    }
}

/// Returns a fresh hex nonce.
#[must_use]
pub fn generate_nonce() -> String {
    let bytes: [u8; NONCE_BYTES] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn login_label(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}", now.timestamp())
}
