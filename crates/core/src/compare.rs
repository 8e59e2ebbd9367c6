//! Loose structural equality for JSON-like values.
//!
//! "No meaningful content" (null, absent, empty string, empty array, empty
//! object, or containers holding only such values) is treated as equivalent
//! regardless of shape. Absent values (a missing object key) are modelled
//! as `None`.

use serde_json::Value;

/// Returns true if the value carries any meaningful content.
///
/// Booleans and numbers always count, including `false` and `0`.
///
/// ```
/// use replay_core::compare::has_any_value;
/// use serde_json::json;
///
/// assert!(!has_any_value(&json!(null)));
/// assert!(!has_any_value(&json!([null, ""])));
/// assert!(!has_any_value(&json!({ "key": { "other": null } })));
/// assert!(has_any_value(&json!({ "key": false })));
/// assert!(has_any_value(&json!([0])));
/// ```
pub fn has_any_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(_) | Value::Number(_) => true,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => items.iter().any(has_any_value),
        Value::Object(map) => !map.is_empty() && map.values().any(has_any_value),
    }
}

fn has_any(value: Option<&Value>) -> bool {
    value.is_some_and(has_any_value)
}

/// Loose equality between two values.
///
/// Object comparison only walks the keys of `a`: keys present only in `b`
/// are never inspected, so `{b: "x"}` equals `{a: "", b: "x"}` in both
/// directions but `{b: "x"}` also equals `{b: "x", c: "y"}` while the
/// reverse does not hold. Use [`are_symmetrically_equal`] when both
/// directions must agree.
pub fn are_basically_equal(a: &Value, b: &Value) -> bool {
    loosely_equal(Some(a), Some(b))
}

/// Loose equality checked in both directions.
pub fn are_symmetrically_equal(a: &Value, b: &Value) -> bool {
    are_basically_equal(a, b) && are_basically_equal(b, a)
}

fn loosely_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    let a_has = has_any(a);
    let b_has = has_any(b);
    if !a_has && !b_has {
        return true;
    }
    if a_has != b_has {
        return false;
    }

    // both sides are meaningful, so neither is absent or null here
    match (a, b) {
        (Some(Value::Array(left)), Some(Value::Array(right))) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| loosely_equal(Some(l), Some(r)))
        }
        (Some(Value::Object(left)), Some(Value::Object(right))) => {
            left.iter().all(|(key, l)| loosely_equal(Some(l), right.get(key)))
        }
        (Some(left), Some(right)) => primitive_identity(left, right),
        _ => false,
    }
}

fn primitive_identity(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(l), Value::Number(r)) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) => l == r,
            _ => l == r,
        },
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        _ => false,
    }
}
