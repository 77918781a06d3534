//! Cloudhost - authenticated REST client for the Cloudhost API
//!
//! Build a [`Client`] from a [`ClientConfiguration`] and send
//! [`ApiRequest`]s; tokens are requested, cached and renewed by the
//! [`Authenticator`] behind it.
//!
//! Credentials, in order of precedence:
//! - a pre-issued token (`ClientConfiguration::token`)
//! - a PKCS#8 RSA private key, inline, by path, or from the builder
//! - an external [`KeyManager`] supplied to the builder

mod builder;
mod client;
mod error;

pub use builder::ClientBuilder;
pub use client::Client;
pub use error::{ClientError, ClientResult};

pub use cloudhost_application::auth::{AuthSettings, AuthState, Credential, PrivateKeyPem};
pub use cloudhost_application::{
    AuthError, Authenticator, Clock, HttpClient, HttpClientError, HttpFuture, KeyManager,
    KeyManagerError, TokenCache, TokenCacheError,
};
pub use cloudhost_domain::{
    ApiError, ApiMode, ApiRequest, ApiResponse, ClientConfiguration, HttpMethod, HttpRequest,
    Token, TokenClaims, TokenOptions,
};
pub use cloudhost_infrastructure::{FileTokenCache, InMemoryTokenCache, ReqwestHttpClient, SystemClock};
