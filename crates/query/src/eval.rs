//! Local evaluation of filter payloads
//!
//! Applies a [`FilterPayload`] to a raw JSON record the way the console API
//! applies its filter header. In-memory entity sources use this to answer
//! list requests, which keeps tests and demos honest about what a lowered
//! filter actually selects.
//!
//! Semantics:
//! - `+contains` is a case-insensitive substring match
//! - a bare value is equality; numbers and booleans equal their text form
//! - an array-valued record field matches if any element matches
//! - `+and` / `+or` hold lists of nested filter objects
//! - `+order` directives are ignored
//! - a missing record field never matches

use nimbus_core::payload::{AND_KEY, CONTAINS_KEY, OR_KEY, ORDER_PREFIX};
use nimbus_core::FilterPayload;
use serde_json::{Map, Value};

/// Whether `record` satisfies `payload`
///
/// The empty payload matches every record.
pub fn matches(payload: &FilterPayload, record: &Value) -> bool {
    matches_object(payload.as_map(), record)
}

fn matches_object(filter: &Map<String, Value>, record: &Value) -> bool {
    filter.iter().all(|(key, condition)| {
        if key.starts_with(ORDER_PREFIX) {
            return true;
        }
        match key.as_str() {
            AND_KEY => each_filter(condition).all(|f| matches_object(f, record)),
            OR_KEY => each_filter(condition).any(|f| matches_object(f, record)),
            field => match record.get(field) {
                Some(actual) => matches_field(condition, actual),
                None => false,
            },
        }
    })
}

fn each_filter(condition: &Value) -> impl Iterator<Item = &Map<String, Value>> {
    condition
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn matches_field(condition: &Value, actual: &Value) -> bool {
    if let Value::Array(items) = actual {
        return items.iter().any(|item| matches_field(condition, item));
    }
    match condition.get(CONTAINS_KEY) {
        Some(needle) => contains(actual, needle),
        None => equals(condition, actual),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn contains(actual: &Value, needle: &Value) -> bool {
    match (as_text(actual), as_text(needle)) {
        (Some(haystack), Some(needle)) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        _ => false,
    }
}

fn equals(expected: &Value, actual: &Value) -> bool {
    if expected == actual {
        return true;
    }
    match (expected, actual) {
        (Value::Number(_) | Value::Bool(_), Value::String(_))
        | (Value::String(_), Value::Number(_) | Value::Bool(_)) => {
            as_text(expected) == as_text(actual)
        }
        _ => false,
    }
}
