//! Field accessors for validating JSON input at the boundary.

use crate::{MetaError, MetaResult};
use serde_json::{Map, Value};

/// Returns `json` as an object, or `InvalidType` naming `what`.
pub fn as_object<'a>(json: &'a Value, what: &str) -> MetaResult<&'a Map<String, Value>> {
    json.as_object().ok_or_else(|| MetaError::InvalidType {
        field: what.to_string(),
        expected: "object",
    })
}

/// Returns the string stored under `key`.
///
/// Fails with `MissingField` if the key is absent (or `null`) and with
/// `InvalidType` if it holds anything other than a string.
pub fn required_str<'a>(json: &'a Value, key: &str) -> MetaResult<&'a str> {
    optional_str(json, key)?.ok_or_else(|| MetaError::MissingField(key.to_string()))
}

/// Returns the string stored under `key`, `None` if absent or `null`.
pub fn optional_str<'a>(json: &'a Value, key: &str) -> MetaResult<Option<&'a str>> {
    match json.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(MetaError::InvalidType {
            field: key.to_string(),
            expected: "string",
        }),
    }
}

/// Returns the array stored under `key`.
pub fn required_array<'a>(json: &'a Value, key: &str) -> MetaResult<&'a Vec<Value>> {
    match json.get(key) {
        None | Some(Value::Null) => Err(MetaError::MissingField(key.to_string())),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(MetaError::InvalidType {
            field: key.to_string(),
            expected: "array",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_counts_as_missing() {
        let j = json!({"collection": null});
        assert!(matches!(
            required_str(&j, "collection"),
            Err(MetaError::MissingField(_))
        ));
        assert_eq!(optional_str(&j, "collection").unwrap(), None);
    }

    #[test]
    fn wrong_type_is_reported() {
        let j = json!({"avus": "nope", "collection": 3});
        assert!(matches!(
            required_array(&j, "avus"),
            Err(MetaError::InvalidType { expected: "array", .. })
        ));
        assert!(matches!(
            required_str(&j, "collection"),
            Err(MetaError::InvalidType { expected: "string", .. })
        ));
    }
}
