//! Normalized search results

use serde::Serialize;
use serde_json::Value;

/// Entity-tagged projection of a raw API record
///
/// Produced when per-entity pages are merged; immutable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultItem {
    /// Name of the entity the record came from (e.g. "Linode")
    pub entity: String,
    /// Record identifier, rendered as text
    pub id: String,
    /// Display label
    pub label: String,
    /// Navigation target inside the console
    pub url: String,
    /// The untouched API record
    pub raw: Value,
}
