//! Schema validation helpers shared by every analysis kind.
//!
//! Two policies live here: strict field checks (`require_*`), where any
//! deviation fails the whole payload, and lenient bucket filling
//! (`bucket_list`), where anything unusable becomes an empty list.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation: {0}")]
pub struct SchemaViolation(pub String);

/// The payload must be a JSON object.
pub fn require_object(value: &Value) -> Result<&Map<String, Value>, SchemaViolation> {
    value
        .as_object()
        .ok_or_else(|| SchemaViolation(format!("expected a JSON object, got {}", kind_of(value))))
}

/// Reads an integer field constrained to `[min, max]`. Fractional numbers
/// such as `80.5` are rejected.
pub fn require_int_in_range(
    obj: &Map<String, Value>,
    field: &str,
    min: i64,
    max: i64,
) -> Result<i64, SchemaViolation> {
    let value = obj
        .get(field)
        .ok_or_else(|| SchemaViolation(format!("missing required field '{field}'")))?;

    // Whole-valued floats like `80.0` count as integers
    let n = value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        })
        .ok_or_else(|| SchemaViolation(format!("'{field}' must be an integer, got {value}")))?;

    if !(min..=max).contains(&n) {
        return Err(SchemaViolation(format!(
            "'{field}' must be within [{min}, {max}], got {n}"
        )));
    }
    Ok(n)
}

/// Reads a required list whose every element is a string.
pub fn require_string_list(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Vec<String>, SchemaViolation> {
    let value = obj
        .get(field)
        .ok_or_else(|| SchemaViolation(format!("missing required field '{field}'")))?;

    let items = value.as_array().ok_or_else(|| {
        SchemaViolation(format!("'{field}' must be a list, got {}", kind_of(value)))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(String::from).ok_or_else(|| {
                SchemaViolation(format!("'{field}[{i}]' must be a string, got {}", kind_of(item)))
            })
        })
        .collect()
}

/// Reads an advisory bucket. A list keeps its string items; anything else
/// (absent, null, wrong type) becomes an empty list.
pub fn bucket_list(container: Option<&Map<String, Value>>, bucket: &str) -> Vec<String> {
    container
        .and_then(|c| c.get(bucket))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_require_object_rejects_array() {
        let err = require_object(&json!([1, 2])).unwrap_err();
        assert!(err.0.contains("array"));
    }

    #[test]
    fn test_int_in_range_accepts_bounds() {
        let o = obj(json!({"lo": 0, "hi": 100}));
        assert_eq!(require_int_in_range(&o, "lo", 0, 100).unwrap(), 0);
        assert_eq!(require_int_in_range(&o, "hi", 0, 100).unwrap(), 100);
    }

    #[test]
    fn test_int_in_range_rejects_out_of_range_float_string_and_missing() {
        let o = obj(json!({"over": 101, "neg": -1, "float": 80.5, "big_float": 1e300, "text": "80"}));
        for field in ["over", "neg", "float", "big_float", "text", "absent"] {
            assert!(
                require_int_in_range(&o, field, 0, 100).is_err(),
                "expected '{field}' to be rejected"
            );
        }
    }

    #[test]
    fn test_int_in_range_accepts_whole_valued_float() {
        let o = obj(json!({"score": 80.0, "top": 100.0}));
        assert_eq!(require_int_in_range(&o, "score", 0, 100).unwrap(), 80);
        assert_eq!(require_int_in_range(&o, "top", 0, 100).unwrap(), 100);
    }

    #[test]
    fn test_string_list_rejects_non_string_item() {
        let o = obj(json!({"kw": ["rust", 3]}));
        let err = require_string_list(&o, "kw").unwrap_err();
        assert!(err.0.contains("kw[1]"));
    }

    #[test]
    fn test_string_list_rejects_wrong_type_and_missing() {
        let o = obj(json!({"kw": "rust"}));
        assert!(require_string_list(&o, "kw").is_err());
        assert!(require_string_list(&o, "other").is_err());
    }

    #[test]
    fn test_bucket_list_defaults_and_filters() {
        let o = obj(json!({"ok": ["a", 1, "b"], "bad": "a", "null": null}));
        assert_eq!(bucket_list(Some(&o), "ok"), vec!["a", "b"]);
        assert!(bucket_list(Some(&o), "bad").is_empty());
        assert!(bucket_list(Some(&o), "null").is_empty());
        assert!(bucket_list(Some(&o), "missing").is_empty());
        assert!(bucket_list(None, "ok").is_empty());
    }
}
