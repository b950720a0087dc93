//! JavaScript-style truthiness over JSON values.

use serde_json::Value;

/// Evaluate a JSON value the way JavaScript boolean coercion would.
///
/// `null`, `false`, `0`, and `""` are falsy; every other value, including
/// empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
