//! Cloudhost Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: a reqwest transport, the system
//! clock, and in-memory and file token caches.

pub mod adapters;
pub mod cache;
pub mod serialization;

pub use adapters::{MAX_RESPONSE_BODY_BYTES, ReqwestHttpClient, SystemClock};
pub use cache::{FileTokenCache, InMemoryTokenCache};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
