//! Per-query search state
//!
//! A [`SearchSession`] is created for each settled query and replaced
//! wholesale by the next one. It holds the compiled query and one
//! [`EntitySession`] per active entity. [`SearchState`] wraps the current
//! session together with the lifecycle phase and is what subscribers see.
//!
//! # Invariants
//!
//! - Pages of an entity are applied strictly in cursor order: a completion
//!   is accepted only for the page that entity is currently waiting on.
//! - At most one page request per entity is in flight.
//! - A completion for another generation never touches the session.

use nimbus_core::{
    FetchError, FilterNode, FilterPayload, Page, PageRequest, ParseError, UnsupportedFieldError,
};
use serde_json::Value;

// ============================================================================
// FetchState
// ============================================================================

/// Fetch status of one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// Not fetching: the entity could not lower the query
    Idle,
    /// First page in flight
    Loading,
    /// The most recent page request failed
    Error(FetchError),
    /// At least the first page arrived and the last request succeeded
    Success,
}

// ============================================================================
// EntitySession
// ============================================================================

/// Search progress of one entity within a session
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySession {
    /// Entity name
    pub name: String,
    /// Registration position in the entity registry
    pub index: usize,
    /// Lowered filter, or why the entity cannot run the query
    pub filter: Result<FilterPayload, UnsupportedFieldError>,
    /// Fetch status
    pub fetch_state: FetchState,
    /// Pages received so far, in cursor order
    pub pages: Vec<Page>,
    /// Whether another page can be requested
    pub has_next_page: bool,
    /// Whether a page after the first is in flight
    pub is_fetching_next_page: bool,
}

impl EntitySession {
    /// Session for an entity, `Loading` if its filter lowered
    pub fn new(
        name: impl Into<String>,
        index: usize,
        filter: Result<FilterPayload, UnsupportedFieldError>,
    ) -> Self {
        let fetch_state = if filter.is_ok() {
            FetchState::Loading
        } else {
            FetchState::Idle
        };
        EntitySession {
            name: name.into(),
            index,
            filter,
            fetch_state,
            pages: Vec::new(),
            has_next_page: false,
            is_fetching_next_page: false,
        }
    }

    /// Whether any page request is in flight
    pub fn is_fetching(&self) -> bool {
        self.fetch_state == FetchState::Loading || self.is_fetching_next_page
    }

    /// Whether the first page has resolved (or will never be requested)
    pub fn is_resolved(&self) -> bool {
        self.fetch_state != FetchState::Loading
    }

    /// Whether the entity's query could not be lowered
    pub fn is_unsupported(&self) -> bool {
        self.filter.is_err()
    }

    /// The last fetch failure, if the most recent request failed
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match &self.fetch_state {
            FetchState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Page number the entity is waiting on, or would request next
    pub fn expected_page(&self) -> u32 {
        self.pages.last().map_or(1, |page| page.page + 1)
    }

    /// Raw records from every loaded page, in order
    pub fn records(&self) -> impl Iterator<Item = &Value> {
        self.pages.iter().flat_map(|page| page.data.iter())
    }

    /// Number of loaded records
    pub fn record_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Request for the first page, if the filter lowered
    pub fn first_request(&self, page_size: u32) -> Option<PageRequest> {
        self.filter
            .as_ref()
            .ok()
            .map(|filter| PageRequest::first(filter.clone(), page_size))
    }

    /// Whether [`EntitySession::claim_next_page`] would yield a request
    pub fn can_load_more(&self) -> bool {
        self.filter.is_ok() && self.has_next_page && !self.is_fetching()
    }

    /// Mark the next page as in flight and return its request
    pub fn claim_next_page(&mut self, page_size: u32) -> Option<PageRequest> {
        if !self.can_load_more() {
            return None;
        }
        let filter = self.filter.as_ref().ok()?.clone();
        self.is_fetching_next_page = true;
        Some(PageRequest {
            filter,
            page: self.expected_page(),
            page_size,
        })
    }

    /// Apply the outcome of a page request
    ///
    /// `max_pages` caps how many pages the entity will ever load.
    ///
    /// Returns `false` (leaving the session untouched) when the entity is
    /// not waiting on `page`.
    pub fn apply(
        &mut self,
        page: u32,
        outcome: Result<Page, FetchError>,
        max_pages: Option<u32>,
    ) -> bool {
        if !self.is_fetching() || page != self.expected_page() {
            return false;
        }
        self.is_fetching_next_page = false;

        match outcome {
            Ok(received) => {
                let under_cap = max_pages.map_or(true, |max| (self.pages.len() as u32) + 1 < max);
                self.has_next_page = received.has_next_page() && under_cap;
                self.pages.push(received);
                self.fetch_state = FetchState::Success;
            }
            Err(err) => {
                // A failed later page keeps what was loaded so load_more can retry
                if self.pages.is_empty() {
                    self.has_next_page = false;
                }
                self.fetch_state = FetchState::Error(err);
            }
        }
        true
    }
}

// ============================================================================
// SearchSession
// ============================================================================

/// State of one settled query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    /// Identity of the settled query
    pub generation: u64,
    /// The settled query text
    pub query: String,
    /// Parse outcome, shared by every entity
    pub compiled: Result<Option<FilterNode>, ParseError>,
    /// Active entities in registration order
    pub entities: Vec<EntitySession>,
}

impl SearchSession {
    /// Session for a query that failed to parse: no entity is queried
    pub fn rejected(generation: u64, query: impl Into<String>, error: ParseError) -> Self {
        SearchSession {
            generation,
            query: query.into(),
            compiled: Err(error),
            entities: Vec::new(),
        }
    }

    /// The parse error, if the query was rejected
    pub fn parse_error(&self) -> Option<&ParseError> {
        self.compiled.as_ref().err()
    }

    /// Whether every entity has a first page, failed, or was excluded
    pub fn is_settled(&self) -> bool {
        self.entities.iter().all(EntitySession::is_resolved)
    }

    /// Whether any page request is in flight
    pub fn is_fetching(&self) -> bool {
        self.entities.iter().any(EntitySession::is_fetching)
    }

    /// Whether any entity can load another page
    pub fn has_more_pages(&self) -> bool {
        self.entities.iter().any(EntitySession::can_load_more)
    }

    /// Session slot of the entity with registration position `index`
    pub fn slot_of(&self, index: usize) -> Option<usize> {
        self.entities.iter().position(|e| e.index == index)
    }

    /// Claim the next page of every entity that can load more
    ///
    /// Returns `(slot, request)` pairs.
    pub fn claim_next_pages(&mut self, page_size: u32) -> Vec<(usize, PageRequest)> {
        self.entities
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, entity)| {
                entity
                    .claim_next_page(page_size)
                    .map(|request| (slot, request))
            })
            .collect()
    }
}

// ============================================================================
// SearchState
// ============================================================================

/// Lifecycle of the search bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchPhase {
    /// No query
    #[default]
    Idle,
    /// Input changed; waiting for it to settle
    Debouncing,
    /// A settled query is being compiled
    Parsing,
    /// First pages are in flight
    Fetching,
    /// Every entity has a first page, failed, or was excluded
    Settled,
}

/// Snapshot published to subscribers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Identity of the current settled query (or clear)
    pub generation: u64,
    /// Lifecycle phase
    pub phase: SearchPhase,
    /// Input still waiting for the debounce window, if any
    pub pending_input: Option<String>,
    /// Current session, `None` when idle
    pub session: Option<SearchSession>,
}

impl SearchState {
    /// Enter [`SearchPhase::Parsing`] for `generation`
    ///
    /// The previous session is dropped so no snapshot pairs old results
    /// with the new generation.
    pub fn begin_parsing(&mut self, generation: u64) {
        self.generation = generation;
        self.pending_input = None;
        self.session = None;
        self.phase = SearchPhase::Parsing;
    }

    /// Recompute [`SearchState::phase`] from the other fields
    pub fn refresh_phase(&mut self) {
        self.phase = if self.pending_input.is_some() {
            SearchPhase::Debouncing
        } else {
            match &self.session {
                None => SearchPhase::Idle,
                Some(session) if session.is_settled() => SearchPhase::Settled,
                Some(_) => SearchPhase::Fetching,
            }
        };
    }

    /// Whether any page request of the current session is in flight
    pub fn is_fetching(&self) -> bool {
        self.session.as_ref().map_or(false, SearchSession::is_fetching)
    }

    /// Whether nothing is pending: no debounce, no parse, no fetch
    pub fn is_quiescent(&self) -> bool {
        !matches!(self.phase, SearchPhase::Debouncing | SearchPhase::Parsing) && !self.is_fetching()
    }
}
