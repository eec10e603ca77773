//! Stage A: turn per-image annotations into ads/aes QA items and copy a
//! class-balanced subset of their images into `<root>/<type>/<grade>/`.

pub mod qa;
pub mod subset;

use serde_json::Value;

/// Text form of a JSON scalar: strings bare, the rest as JSON.
pub fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Python-style truthiness: null, "", 0, false and empty containers are false.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
