//! Cloudhost Application - Authentication core and ports
//!
//! This crate defines the application layer with:
//! - Port traits (transport, clock, token cache, key manager)
//! - Login signing and the token lifecycle
//! - Authentication error handling

pub mod auth;
pub mod error;
pub mod ports;

pub use auth::{AuthSettings, AuthState, Authenticator, Credential, PrivateKeyPem};
pub use error::{AuthError, AuthResult};
pub use ports::{
    Clock, HttpClient, HttpClientError, HttpFuture, KeyManager, KeyManagerError, TokenCache,
    TokenCacheError,
};
