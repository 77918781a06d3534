//! Deterministic JSON serialization for on-disk files.
//!
//! Output uses 2-space indentation and a trailing newline, so files
//! written twice from the same data are byte-identical.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
