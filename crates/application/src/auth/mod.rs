//! Authentication for the Cloudhost API.
//!
//! This module provides:
//! - Credential selection (static token, private key or key manager)
//! - Login request signing
//! - The [`Authenticator`], which owns the token lifecycle

mod authenticator;
mod credential;
mod signer;

#[cfg(test)]
mod test_support;

pub use authenticator::{
    AuthSettings, AuthState, Authenticator, DEFAULT_LABEL_PREFIX, generate_nonce,
};
pub use credential::{Credential, PrivateKeyPem};
pub use signer::{parse_private_key, sign_externally, sign_with_key};
