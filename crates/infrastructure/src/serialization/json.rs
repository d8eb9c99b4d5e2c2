//! JSON serialization helpers for deterministic output.

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

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to deterministic JSON.
///
/// Output format:
/// - 2-space indentation
/// - Trailing newline
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

/// Serializes a value to deterministic JSON bytes.
///
/// Same as `to_json_stable` but returns bytes for direct file writing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let json = to_json_stable(value)?;
    Ok(json.into_bytes())
}

/// Serializes a value either pretty printed (stable form) or compact.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, SerializationError> {
    if pretty {
        to_json_stable(value)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

/// Deserializes JSON from bytes.
///
/// Handles both pretty-printed and minified JSON.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_stable_serialization_has_trailing_newline() {
        let mut map = BTreeMap::new();
        map.insert("z_key", "value1");
        map.insert("a_key", "value2");

        let json = to_json_stable(&map).expect("serialization should work");
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn test_stable_serialization_uses_two_space_indent() {
        let mut map = BTreeMap::new();
        map.insert("key", "value");

        let json = to_json_stable(&map).expect("serialization should work");
        assert!(json.contains("  \"key\""));
    }

    #[test]
    fn test_compact_serialization() {
        let mut map = BTreeMap::new();
        map.insert("b", 2);
        map.insert("a", 1);

        let json = to_json(&map, false).expect("serialization should work");
        assert_eq!(json, r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_from_json_bytes() {
        let json = r#"{"name": "test"}"#;
        let result: serde_json::Value =
            from_json_bytes(json.as_bytes()).expect("deserialization should work");
        assert_eq!(result["name"], "test");
    }

    #[test]
    fn test_from_json_bytes_invalid() {
        let result: Result<serde_json::Value, _> = from_json_bytes(br#"{"invalid": }"#);
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
