//! Cloudhost Domain - Core types
//!
//! This crate defines the domain model for the Cloudhost API client:
//! access tokens, login requests, request/response shapes and the client
//! configuration. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{LoginRequest, LoginResponse, Token, TokenClaims, TokenOptions};
pub use config::{ApiMode, ClientConfiguration};
pub use error::{DomainError, DomainResult};
pub use request::{ApiRequest, HttpMethod, HttpRequest};
pub use response::{ApiError, ApiResponse, StatusCode};
