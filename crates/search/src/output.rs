//! Caller-facing search output
//!
//! [`SearchOutput`] is a self-contained projection of a [`SearchState`]:
//! merged results plus the bookkeeping a search bar needs to render
//! loading, error and empty states.

use crate::merge::merge_results;
use crate::registry::EntityRegistry;
use crate::session::{SearchPhase, SearchState};
use nimbus_core::{FetchError, ParseError, SearchResultItem, UnsupportedFieldError};

/// Why an entity contributed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The entity cannot filter on a field the query uses
    Unsupported,
    /// The entity's fetch failed
    Fetch,
}

/// One entity's failure, in display form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFailure {
    /// Entity name
    pub entity: String,
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable reason
    pub reason: String,
}

/// Snapshot of a federated search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutput {
    /// Merged, entity-tagged results
    pub results: Vec<SearchResultItem>,
    /// Whether any page request is in flight
    pub is_loading: bool,
    /// Set when the settled query failed to parse
    pub query_parse_error: Option<ParseError>,
    /// Entities that could not lower the query
    pub unsupported: Vec<(String, UnsupportedFieldError)>,
    /// Entities whose most recent fetch failed
    pub fetch_failures: Vec<(String, FetchError)>,
    /// Entities that lowered the query and are not currently failed
    pub searched_entities: Vec<String>,
    /// Whether `load_more` would fetch anything
    pub has_more_pages: bool,
    /// Lifecycle phase
    pub phase: SearchPhase,
}

impl SearchOutput {
    /// Project `state` through `registry`, listing entities in `order`
    pub fn from_state(state: &SearchState, registry: &EntityRegistry, order: &[usize]) -> Self {
        let mut output = SearchOutput {
            results: Vec::new(),
            is_loading: state.is_fetching(),
            query_parse_error: None,
            unsupported: Vec::new(),
            fetch_failures: Vec::new(),
            searched_entities: Vec::new(),
            has_more_pages: false,
            phase: state.phase,
        };

        let Some(session) = &state.session else {
            return output;
        };

        output.query_parse_error = session.parse_error().cloned();
        output.has_more_pages = session.has_more_pages();
        output.results = merge_results(session, registry, order);

        for &position in order {
            let Some(entity) = session
                .slot_of(position)
                .map(|slot| &session.entities[slot])
            else {
                continue;
            };
            match (&entity.filter, entity.fetch_error()) {
                (Err(err), _) => output.unsupported.push((entity.name.clone(), err.clone())),
                (Ok(_), Some(err)) => output.fetch_failures.push((entity.name.clone(), err.clone())),
                (Ok(_), None) => output.searched_entities.push(entity.name.clone()),
            }
        }

        output
    }

    /// Both failure lists combined, unsupported entities first
    pub fn entity_errors(&self) -> Vec<EntityFailure> {
        let unsupported = self.unsupported.iter().map(|(entity, err)| EntityFailure {
            entity: entity.clone(),
            kind: FailureKind::Unsupported,
            reason: err.to_string(),
        });
        let fetch = self.fetch_failures.iter().map(|(entity, err)| EntityFailure {
            entity: entity.clone(),
            kind: FailureKind::Fetch,
            reason: err.to_string(),
        });
        unsupported.chain(fetch).collect()
    }

    /// Whether the search ran everywhere it could and matched nothing
    ///
    /// False while loading, on a parse error, when any fetch failed, or when
    /// no entity could run the query at all.
    pub fn is_empty_result(&self) -> bool {
        self.phase == SearchPhase::Settled
            && self.results.is_empty()
            && self.query_parse_error.is_none()
            && self.fetch_failures.is_empty()
            && !self.searched_entities.is_empty()
    }
}
