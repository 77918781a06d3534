//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the authentication core and its
//! collaborators. Each port is a trait implemented by adapters in the
//! infrastructure layer, or by the caller.

mod clock;
mod http_client;
mod key_manager;
mod token_cache;

pub use clock::Clock;
pub use http_client::{HttpClient, HttpClientError, HttpFuture};
pub use key_manager::{KeyManager, KeyManagerError};
pub use token_cache::{TokenCache, TokenCacheError};
