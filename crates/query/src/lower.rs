//! Lowering filter trees to API filter payloads
//!
//! Lowering is per entity: the same [`FilterNode`] lowers differently (or
//! not at all) depending on the [`SearchSchema`] it is lowered against.
//!
//! Rules:
//! - `field:value` becomes one comparison on the resolved API field
//! - a bare term becomes an `+or` over the schema's default fields
//! - an `And` chain becomes one flat `+and` list in clause order
//! - the schema's base filter is merged at the top level and wins
//!
//! The first unsupported field, scanning clauses left to right, fails the
//! whole lowering. Clauses are never silently dropped.

use crate::schema::{MatchRule, SearchSchema};
use nimbus_core::payload::{AND_KEY, CONTAINS_KEY, OR_KEY};
use nimbus_core::{FilterNode, FilterPayload, UnsupportedFieldError};
use serde_json::{Map, Value};

/// Field name reported when a bare term meets a schema with no default fields
pub const BARE_TERM_FIELD: &str = "<bare term>";

/// Lower an optional filter tree against an entity schema
///
/// `None` lowers to the base filter alone.
///
/// # Errors
///
/// Returns [`UnsupportedFieldError`] naming the first clause the schema
/// cannot express.
///
/// # Example
///
/// ```
/// use nimbus_query::{lower, parse, SearchSchema};
///
/// let schema = SearchSchema::new()
///     .with_default_field("label")
///     .with_base_filter("mine", true);
/// let node = parse("label:web").unwrap();
/// let payload = lower(node.as_ref(), &schema).unwrap();
/// assert_eq!(payload.cache_key(), r#"{"label":{"+contains":"web"},"mine":true}"#);
/// ```
pub fn lower(
    node: Option<&FilterNode>,
    schema: &SearchSchema,
) -> Result<FilterPayload, UnsupportedFieldError> {
    let filter = match node {
        Some(node) => into_object(lower_node(node, schema)?),
        None => Map::new(),
    };
    Ok(FilterPayload::from_parts(filter, schema.base_filter()))
}

fn lower_node(node: &FilterNode, schema: &SearchSchema) -> Result<Value, UnsupportedFieldError> {
    let mut lowered = node
        .clauses()
        .into_iter()
        .map(|clause| lower_clause(clause, schema))
        .collect::<Result<Vec<_>, _>>()?;

    if lowered.len() == 1 {
        Ok(lowered.remove(0))
    } else {
        Ok(single(AND_KEY, Value::Array(lowered)))
    }
}

fn lower_clause(clause: &FilterNode, schema: &SearchSchema) -> Result<Value, UnsupportedFieldError> {
    match clause {
        FilterNode::FieldMatch { field, value } => {
            let (name, rule) = schema
                .resolve(field)
                .ok_or_else(|| UnsupportedFieldError::new(field.as_str()))?;
            Ok(comparison(name, rule, value))
        }
        FilterNode::BareTerm { value } => {
            let rule = schema.bare_term_rule();
            match schema.default_fields() {
                [] => Err(UnsupportedFieldError::new(BARE_TERM_FIELD)),
                [only] => Ok(comparison(only, rule, value)),
                fields => Ok(single(
                    OR_KEY,
                    fields
                        .iter()
                        .map(|field| comparison(field, rule, value))
                        .collect(),
                )),
            }
        }
        // clauses() never yields an And
        FilterNode::And { .. } => lower_node(clause, schema),
    }
}

fn comparison(field: &str, rule: MatchRule, value: &str) -> Value {
    match rule {
        MatchRule::Contains => single(field, single(CONTAINS_KEY, Value::String(value.to_string()))),
        MatchRule::Equals => single(field, literal(value)),
    }
}

/// Equality literals: integers and booleans are sent typed, everything else as text
///
/// Only canonical spellings are typed, so `007` and `+5` stay strings.
fn literal(value: &str) -> Value {
    if let Ok(n) = value.parse::<i64>() {
        if n.to_string() == value {
            return Value::from(n);
        }
    }
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(value.to_string()),
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert(AND_KEY.to_string(), Value::Array(vec![other]));
            map
        }
    }
}
