use serde_json::Value;

/// Conventional key collections are wrapped under.
pub const MEMBER_KEY: &str = "member";

/// Unwrap a collection response.
///
/// The service wraps members in an envelope (`{"member": [...]}`); some
/// endpoints return the bare array instead, in which case the whole body
/// is the member list. Anything else yields an empty list — snapshots
/// degrade, they do not fail a screen.
pub fn members(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(MEMBER_KEY) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Pull the canonical identifier out of a write response, when present.
/// Servers answer creates with the stored entity; `id` may be a string or
/// a number.
pub fn canonical_id(body: &Value) -> Option<String> {
    match body.get("id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    }
}
