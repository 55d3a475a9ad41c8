//! API-native filter payloads
//!
//! A [`FilterPayload`] is what an entity's REST list endpoint receives as its
//! filter header: a JSON object using the console API's operator keys.
//!
//! ```text
//! {"label": {"+contains": "web"}}
//! {"+and": [{"tags": {"+contains": "prod"}}, {"region": "us-east"}]}
//! {"+or": [{"label": {"+contains": "db"}}, {"tags": {"+contains": "db"}}]}
//! ```
//!
//! Serialization is deterministic: object keys are kept sorted, so the same
//! payload always renders to the same bytes. Downstream caches key on
//! [`FilterPayload::cache_key`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Conjunction operator key
pub const AND_KEY: &str = "+and";
/// Disjunction operator key
pub const OR_KEY: &str = "+or";
/// Case-insensitive substring operator key
pub const CONTAINS_KEY: &str = "+contains";
/// Prefix shared by ordering directives, which never filter records
pub const ORDER_PREFIX: &str = "+order";

/// Lowered filter for one entity's list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPayload(Map<String, Value>);

impl FilterPayload {
    /// The empty filter, matching every record
    pub fn empty() -> Self {
        FilterPayload(Map::new())
    }

    /// Build a payload from a lowered filter object and a base filter
    ///
    /// Base keys are merged at the top level and win on collision.
    pub fn from_parts(filter: Map<String, Value>, base: &Map<String, Value>) -> Self {
        let mut merged = filter;
        for (key, value) in base {
            merged.insert(key.clone(), value.clone());
        }
        FilterPayload(merged)
    }

    /// Whether the payload has no constraints
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Compact, byte-stable rendering used as a cache key
    pub fn cache_key(&self) -> String {
        // A map of JSON values always serializes
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl Default for FilterPayload {
    fn default() -> Self {
        FilterPayload::empty()
    }
}

impl From<Map<String, Value>> for FilterPayload {
    fn from(map: Map<String, Value>) -> Self {
        FilterPayload(map)
    }
}

impl fmt::Display for FilterPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}
