//! Tolerant field lookups over untrusted upstream JSON.
//!
//! Upstream payloads are semi-structured: fields go missing, arrive as `null`,
//! or switch between strings and numbers. Every lookup the normalizer does
//! goes through these helpers with an ordered list of candidate keys.

use serde_json::Value;

/// Returns the first candidate key holding a usable value, rendered as text.
///
/// `null` and empty strings count as absent. Numbers and booleans are
/// rendered as their JSON text; arrays and objects are skipped.
pub fn first_of(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| raw.get(key))
        .find_map(as_text)
}

/// Like [`first_of`] with a fallback.
pub fn text_or(raw: &Value, keys: &[&str], default: &str) -> String {
    first_of(raw, keys).unwrap_or_else(|| default.to_string())
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
