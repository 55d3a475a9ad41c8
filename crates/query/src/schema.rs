//! Per-entity search schemas
//!
//! A [`SearchSchema`] says which fields an entity's list endpoint can filter
//! on, how each one is compared, which fields a bare term searches, and
//! which constraints are always applied.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// How a field comparison is expressed in the API filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// `{"field": {"+contains": "value"}}`
    #[default]
    Contains,
    /// `{"field": value}`
    Equals,
}

/// Filterable surface of one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSchema {
    fields: BTreeMap<String, MatchRule>,
    default_fields: Vec<String>,
    bare_term_rule: MatchRule,
    aliases: BTreeMap<String, String>,
    base_filter: Map<String, Value>,
}

impl SearchSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        SearchSchema::default()
    }

    /// Add a filterable field with its match rule
    pub fn with_field(mut self, name: impl Into<String>, rule: MatchRule) -> Self {
        self.fields.insert(name.into().to_lowercase(), rule);
        self
    }

    /// Add a field searched by bare terms
    ///
    /// The field is also filterable by name with [`MatchRule::Contains`]
    /// unless it was already declared.
    pub fn with_default_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into().to_lowercase();
        self.fields
            .entry(name.clone())
            .or_insert(MatchRule::Contains);
        if !self.default_fields.contains(&name) {
            self.default_fields.push(name);
        }
        self
    }

    /// Set how bare terms compare against the default fields
    pub fn with_bare_term_rule(mut self, rule: MatchRule) -> Self {
        self.bare_term_rule = rule;
        self
    }

    /// Accept `alias` in queries as a spelling of `target`
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases
            .insert(alias.into().to_lowercase(), target.into().to_lowercase());
        self
    }

    /// Add a constraint merged into every lowered filter
    pub fn with_base_filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.base_filter.insert(key.into(), value.into());
        self
    }

    /// Resolve a query field name to the API field and its rule
    ///
    /// Aliases are followed one level.
    pub fn resolve(&self, field: &str) -> Option<(&str, MatchRule)> {
        let field = field.to_lowercase();
        let target = self.aliases.get(&field).unwrap_or(&field);
        self.fields
            .get_key_value(target.as_str())
            .map(|(name, rule)| (name.as_str(), *rule))
    }

    /// Whether `field` can be filtered on
    pub fn supports(&self, field: &str) -> bool {
        self.resolve(field).is_some()
    }

    /// Fields searched by bare terms, in declaration order
    pub fn default_fields(&self) -> &[String] {
        &self.default_fields
    }

    /// Match rule for bare terms
    pub fn bare_term_rule(&self) -> MatchRule {
        self.bare_term_rule
    }

    /// All filterable fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, MatchRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), *rule))
    }

    /// Constraints always applied to this entity
    pub fn base_filter(&self) -> &Map<String, Value> {
        &self.base_filter
    }
}
