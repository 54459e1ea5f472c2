//! Data mapping produced by a window's loader
//!
//! Widgets read from a flat JSON object. Truthiness follows the usual
//! scripting rules: null, false, zero, "" and empty collections are falsy.

use serde_json::{Map, Value};

/// Data available to predicates and text templates during one render pass
pub type Data = Map<String, Value>;

/// Whether a value counts as "set" for visibility checks
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Truthiness of a key; a missing key is falsy
pub fn field_is_truthy(data: &Data, key: &str) -> bool {
    data.get(key).is_some_and(is_truthy)
}

/// Render a value the way it appears inside message text
///
/// Strings are inserted without quotes; null renders as nothing.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values() {
        let falsy = [
            json!(null),
            json!(false),
            json!(0),
            json!(0.0),
            json!(""),
            json!([]),
            json!({}),
        ];
        for v in falsy {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
    }

    #[test]
    fn test_truthy_values() {
        for v in [json!(true), json!(1), json!(-2.5), json!("x"), json!([0]), json!({"a": 0})] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn test_missing_field_is_falsy() {
        let data = Data::new();
        assert!(!field_is_truthy(&data, "nope"));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("hi")), "hi");
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!(null)), "");
    }
}
