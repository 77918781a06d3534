//! JSON helpers for files the client writes.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// Output was not valid UTF-8.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to pretty JSON with a trailing newline.
///
/// Key order follows the source type; use `BTreeMap` for sorted keys.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Same as [`to_json_stable`], as bytes for writing to disk.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    to_json_stable(value).map(String::into_bytes)
}

/// Deserializes JSON from bytes.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match `T`.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_output_is_indented_with_trailing_newline() {
        let map = BTreeMap::from([("key", "value")]);

        let json = to_json_stable(&map).unwrap();

        assert_eq!(json, "{\n  \"key\": \"value\"\n}\n");
    }

    #[test]
    fn test_btreemap_keys_are_sorted() {
        let map = BTreeMap::from([("zebra", 1), ("apple", 2), ("mango", 3)]);

        let json = to_json_stable(&map).unwrap();
        let apple = json.find("apple").unwrap();
        let mango = json.find("mango").unwrap();
        let zebra = json.find("zebra").unwrap();

        assert!(apple < mango && mango < zebra);
    }

    #[test]
    fn test_same_data_same_bytes() {
        let map = BTreeMap::from([("b".to_string(), 2), ("a".to_string(), 1)]);
        assert_eq!(
            to_json_stable_bytes(&map).unwrap(),
            to_json_stable_bytes(&map.clone()).unwrap()
        );
    }

    #[test]
    fn test_from_json_bytes_rejects_invalid_input() {
        let result: Result<BTreeMap<String, String>, _> = from_json_bytes(b"{\"a\": }");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
