//! Authentication domain types

mod login;
mod token;

pub use login::{
    AUTH_ENDPOINT, DEFAULT_TOKEN_EXPIRATION, LoginRequest, LoginResponse, SIGNATURE_HEADER,
    TokenOptions,
};
pub use token::{BEARER_SCHEME, Token, TokenClaims};
