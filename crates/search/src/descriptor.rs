//! Entity search descriptors
//!
//! A descriptor bundles everything the orchestrator needs to search one
//! entity: its name, its [`SearchSchema`], the [`EntitySource`] that serves
//! its pages, and a [`ResultPresenter`] that turns raw records into
//! [`SearchResultItem`]s. Descriptors are built at start-up and never
//! mutated.

use crate::source::EntitySource;
use nimbus_core::{FilterNode, FilterPayload, SearchResultItem, UnsupportedFieldError};
use nimbus_query::{lower, SearchSchema};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// UrlTemplate
// ============================================================================

/// Navigation target with `{field}` placeholders
///
/// Placeholders are filled from the raw record. Strings are inserted as-is,
/// numbers and booleans in their JSON text form; missing or structured
/// values render as the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    /// Create a template such as `/linodes/{id}`
    pub fn new(template: impl Into<String>) -> Self {
        UrlTemplate(template.into())
    }

    /// The template text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fill placeholders from `record`
    pub fn render(&self, record: &Value) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            out.push_str(&rest[..open]);
            let field = &rest[open + 1..open + close];
            out.push_str(&field_text(record, field));
            rest = &rest[open + close + 1..];
        }
        out.push_str(rest);
        out
    }
}

/// Text form of a scalar record field
pub(crate) fn field_text(record: &Value, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

// ============================================================================
// ResultPresenter
// ============================================================================

/// Projection of a raw record to `(id, label, url)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPresenter {
    id_field: String,
    label_field: String,
    url: UrlTemplate,
}

impl ResultPresenter {
    /// Presenter reading `id` and `label`
    pub fn new(url: impl Into<String>) -> Self {
        ResultPresenter {
            id_field: "id".to_string(),
            label_field: "label".to_string(),
            url: UrlTemplate::new(url),
        }
    }

    /// Read the identifier from `field`
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Read the display label from `field`
    pub fn with_label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = field.into();
        self
    }

    /// The navigation template
    pub fn url(&self) -> &UrlTemplate {
        &self.url
    }

    /// Build the result item for `record`
    pub fn present(&self, entity: &str, record: Value) -> SearchResultItem {
        SearchResultItem {
            entity: entity.to_string(),
            id: field_text(&record, &self.id_field),
            label: field_text(&record, &self.label_field),
            url: self.url.render(&record),
            raw: record,
        }
    }
}

// ============================================================================
// EntitySearchDescriptor
// ============================================================================

/// Everything needed to search one entity
#[derive(Clone)]
pub struct EntitySearchDescriptor {
    name: String,
    schema: SearchSchema,
    presenter: ResultPresenter,
    source: Arc<dyn EntitySource>,
}

impl EntitySearchDescriptor {
    /// Create a descriptor
    pub fn new(
        name: impl Into<String>,
        schema: SearchSchema,
        presenter: ResultPresenter,
        source: Arc<dyn EntitySource>,
    ) -> Self {
        EntitySearchDescriptor {
            name: name.into(),
            schema,
            presenter,
            source,
        }
    }

    /// Entity name, unique within a registry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filterable surface
    pub fn schema(&self) -> &SearchSchema {
        &self.schema
    }

    /// Record projection
    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    /// Paginated fetch capability
    pub fn source(&self) -> &Arc<dyn EntitySource> {
        &self.source
    }

    /// Lower a parsed query for this entity
    pub fn lower(&self, node: Option<&FilterNode>) -> Result<FilterPayload, UnsupportedFieldError> {
        lower(node, &self.schema)
    }

    /// Build the result item for one of this entity's records
    pub fn present(&self, record: Value) -> SearchResultItem {
        self.presenter.present(&self.name, record)
    }
}

impl fmt::Debug for EntitySearchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySearchDescriptor")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("presenter", &self.presenter)
            .finish_non_exhaustive()
    }
}
