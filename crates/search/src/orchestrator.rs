//! Federated search orchestrator
//!
//! This module provides:
//! - SearchOrchestrator, which fans a settled query out over every active entity
//! - Per-entity failure isolation (lowering and fetch failures stay local)
//! - Last-query-wins cancellation through generations
//! - Pagination through `load_more`
//!
//! # Architecture
//!
//! ```text
//!  submit("tag:prod web")
//!        │
//!        ▼
//! ┌──────────────────────────────────────────────┐
//! │              SearchOrchestrator              │
//! │  parse once ──► lower per entity             │
//! │                   │        │        │        │
//! │                ┌──┴──┐  ┌──┴──┐  ┌──┴──┐     │
//! │                │fetch│  │fetch│  │skip │ ... │
//! │                └──┬──┘  └──┬──┘  └─────┘     │
//! │                   └───┬────┘  (unsupported)  │
//! │                       ▼                      │
//! │      watch<Arc<SearchState>> (generation)    │
//! └───────────────────────┬──────────────────────┘
//!                         ▼
//!                   SearchOutput
//! ```
//!
//! Every fetch runs as its own tokio task. Completions are applied through
//! `send_if_modified` after re-checking the generation, so results of a
//! superseded query are discarded even if their task was not aborted in
//! time.

use crate::config::SearchConfig;
use crate::descriptor::EntitySearchDescriptor;
use crate::merge::{group_by_entity, presentation_order, ResultGroup};
use crate::output::SearchOutput;
use crate::registry::EntityRegistry;
use crate::session::{EntitySession, SearchPhase, SearchSession, SearchState};
use nimbus_core::{Error, FetchError, Page, PageRequest, Result};
use nimbus_query::parse;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One page request bound to the entity that serves it
struct FetchJob {
    slot: usize,
    descriptor: Arc<EntitySearchDescriptor>,
    request: PageRequest,
}

struct Inner {
    registry: EntityRegistry,
    config: SearchConfig,
    /// Registration positions that are not disabled, in registration order
    active: Vec<usize>,
    /// Active registration positions in presentation order
    order: Vec<usize>,
    generation: AtomicU64,
    state: watch::Sender<Arc<SearchState>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

// ============================================================================
// SearchOrchestrator
// ============================================================================

/// Federated search over an entity registry
///
/// Cheap to clone; clones share state.
///
/// # Example
///
/// ```
/// use nimbus_search::catalog;
/// use nimbus_search::source::{EntitySource, MemorySource};
/// use nimbus_search::{SearchConfig, SearchOrchestrator};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # tokio_test_block_on(async {
/// let registry = catalog::registry_from(|name| {
///     let records = if name == catalog::LINODE {
///         vec![json!({"id": 1, "label": "web-1", "tags": [], "ipv4": []})]
///     } else {
///         vec![]
///     };
///     Arc::new(MemorySource::new(records)) as Arc<dyn EntitySource>
/// })
/// .unwrap();
///
/// let search = SearchOrchestrator::new(registry, SearchConfig::default()).unwrap();
/// let output = search.search("web").await.unwrap();
/// assert_eq!(output.results[0].url, "/linodes/1");
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct SearchOrchestrator {
    inner: Arc<Inner>,
}

impl SearchOrchestrator {
    /// Create an orchestrator over `registry`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `config` fails validation and
    /// [`Error::UnknownEntity`] if it names an entity the registry lacks.
    pub fn new(registry: EntityRegistry, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        for name in config
            .entity_priority
            .iter()
            .chain(config.disabled_entities.iter())
        {
            if registry.get(name).is_none() {
                return Err(Error::UnknownEntity(name.clone()));
            }
        }

        let disabled: Vec<usize> = config
            .disabled_entities
            .iter()
            .filter_map(|name| registry.position(name))
            .collect();
        let active: Vec<usize> = (0..registry.len())
            .filter(|position| !disabled.contains(position))
            .collect();
        let order = presentation_order(&registry, &config.entity_priority)
            .into_iter()
            .filter(|position| active.contains(position))
            .collect();

        let (state, _) = watch::channel(Arc::new(SearchState::default()));

        Ok(SearchOrchestrator {
            inner: Arc::new(Inner {
                registry,
                config,
                active,
                order,
                generation: AtomicU64::new(0),
                state,
                tasks: Mutex::new(Vec::new()),
            }),
        })
    }

    /// The entity registry
    pub fn registry(&self) -> &EntityRegistry {
        &self.inner.registry
    }

    /// The configuration in effect
    pub fn config(&self) -> &SearchConfig {
        &self.inner.config
    }

    /// Names of the entities a query fans out to, in presentation order
    pub fn active_entities(&self) -> Vec<&str> {
        self.inner
            .order
            .iter()
            .filter_map(|&position| self.inner.registry.at(position))
            .map(|descriptor| descriptor.name())
            .collect()
    }

    /// Subscribe to state snapshots
    pub fn subscribe(&self) -> watch::Receiver<Arc<SearchState>> {
        self.inner.state.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> Arc<SearchState> {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Current output
    pub fn output(&self) -> SearchOutput {
        SearchOutput::from_state(&self.state(), &self.inner.registry, &self.inner.order)
    }

    /// Current results grouped by entity
    pub fn grouped_results(&self) -> Vec<ResultGroup> {
        group_by_entity(self.output().results)
    }

    /// Record input that is still inside the debounce window
    pub fn note_input(&self, raw: &str) {
        self.inner.state.send_if_modified(|state| {
            if state.pending_input.as_deref() == Some(raw) {
                return false;
            }
            let state = Arc::make_mut(state);
            state.pending_input = Some(raw.to_string());
            state.refresh_phase();
            true
        });
    }

    /// Forget pending input without searching
    pub fn cancel_input(&self) {
        self.inner.state.send_if_modified(|state| {
            if state.pending_input.is_none() {
                return false;
            }
            let state = Arc::make_mut(state);
            state.pending_input = None;
            state.refresh_phase();
            true
        });
    }

    /// Start a search for a settled query
    ///
    /// Supersedes the current search: its tasks are aborted and any of its
    /// completions still in flight are discarded. Empty input clears.
    /// Returns the new generation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a Tokio runtime.
    pub fn submit(&self, query: &str) -> Result<u64> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(self.clear());
        }

        let runtime = current_runtime()?;
        self.inner.abort_tasks();
        let generation = self.inner.next_generation();

        self.inner
            .state
            .send_modify(|state| Arc::make_mut(state).begin_parsing(generation));

        let session = self.inner.compile(generation, query);
        let jobs = self.inner.first_page_jobs(&session);

        match session.parse_error() {
            Some(err) => info!(
                target: "nimbus::search",
                generation,
                query,
                error = %err,
                "query rejected"
            ),
            None => info!(
                target: "nimbus::search",
                generation,
                query,
                entities = session.entities.len(),
                fetching = jobs.len(),
                "query settled"
            ),
        }

        let installed = self.inner.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            let state = Arc::make_mut(state);
            state.session = Some(session);
            state.refresh_phase();
            true
        });

        if installed {
            Inner::spawn(&self.inner, &runtime, generation, jobs);
        }
        Ok(generation)
    }

    /// Re-issue the current query, if any
    ///
    /// This is how callers retry failed entities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a Tokio runtime.
    pub fn refresh(&self) -> Result<Option<u64>> {
        let query = match &self.state().session {
            Some(session) => session.query.clone(),
            None => return Ok(None),
        };
        self.submit(&query).map(Some)
    }

    /// Drop the current search and return to idle
    ///
    /// Returns the new generation.
    pub fn clear(&self) -> u64 {
        self.inner.abort_tasks();
        let generation = self.inner.next_generation();
        self.inner.state.send_modify(|state| {
            *state = Arc::new(SearchState {
                generation,
                ..SearchState::default()
            });
        });
        debug!(target: "nimbus::search", generation, "search cleared");
        generation
    }

    /// Request the next page of every entity that has one
    ///
    /// Entities already fetching a page are skipped. Returns the number of
    /// page requests started; zero leaves the snapshot untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a Tokio runtime.
    pub fn load_more(&self) -> Result<usize> {
        let runtime = current_runtime()?;
        let page_size = self.inner.config.page_size;
        let mut generation = 0;
        let mut claimed = Vec::new();

        self.inner.state.send_if_modified(|state| {
            let ready = state.session.as_ref().map_or(false, |session| {
                session.generation == state.generation && session.has_more_pages()
            });
            if !ready {
                return false;
            }
            generation = state.generation;
            let state = Arc::make_mut(state);
            if let Some(session) = state.session.as_mut() {
                claimed = session
                    .claim_next_pages(page_size)
                    .into_iter()
                    .map(|(slot, request)| (slot, session.entities[slot].index, request))
                    .collect();
            }
            !claimed.is_empty()
        });

        if claimed.is_empty() {
            debug!(target: "nimbus::search", "no entity has more pages");
            return Ok(0);
        }

        let jobs: Vec<FetchJob> = claimed
            .into_iter()
            .filter_map(|(slot, position, request)| {
                self.inner
                    .registry
                    .at(position)
                    .map(|descriptor| FetchJob {
                        slot,
                        descriptor: Arc::clone(descriptor),
                        request,
                    })
            })
            .collect();
        let count = jobs.len();

        info!(target: "nimbus::search", generation, pages = count, "loading more");
        Inner::spawn(&self.inner, &runtime, generation, jobs);
        Ok(count)
    }

    /// Wait until nothing is pending
    ///
    /// Returns once no input is debouncing and no page request of the
    /// current generation is in flight.
    pub async fn settled(&self) -> Arc<SearchState> {
        let mut receiver = self.inner.state.subscribe();
        let result = receiver.wait_for(|state| state.is_quiescent()).await;
        match result {
            Ok(state) => Arc::clone(&state),
            Err(_) => self.state(),
        }
    }

    /// Submit `query` and wait for it to settle
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a Tokio runtime.
    pub async fn search(&self, query: &str) -> Result<SearchOutput> {
        self.submit(query)?;
        self.settled().await;
        Ok(self.output())
    }

    /// Load more and wait for the requested pages
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a Tokio runtime.
    pub async fn load_more_and_wait(&self) -> Result<SearchOutput> {
        if self.load_more()? > 0 {
            self.settled().await;
        }
        Ok(self.output())
    }
}

impl fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("entities", &self.inner.registry.names())
            .field("config", &self.inner.config)
            .field("generation", &self.inner.generation.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

fn current_runtime() -> Result<Handle> {
    Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))
}

// ============================================================================
// Inner
// ============================================================================

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn abort_tasks(&self) {
        let mut tasks = self.tasks.lock();
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    /// Parse once, then lower for every active entity
    fn compile(&self, generation: u64, query: &str) -> SearchSession {
        let node = match parse(query) {
            Ok(node) => node,
            Err(err) => return SearchSession::rejected(generation, query, err),
        };

        if let Some(tree) = &node {
            debug!(
                target: "nimbus::search",
                generation,
                fields = ?tree.fields(),
                bare_terms = tree.has_bare_terms(),
                "query parsed"
            );
        }

        let entities = self
            .active
            .iter()
            .filter_map(|&position| self.registry.at(position).map(|d| (position, d)))
            .map(|(position, descriptor)| {
                let filter = descriptor.lower(node.as_ref());
                if let Err(err) = &filter {
                    debug!(
                        target: "nimbus::search",
                        generation,
                        entity = %descriptor.name(),
                        field = %err.field,
                        "entity cannot run query"
                    );
                }
                EntitySession::new(descriptor.name(), position, filter)
            })
            .collect();

        SearchSession {
            generation,
            query: query.to_string(),
            compiled: Ok(node),
            entities,
        }
    }

    fn first_page_jobs(&self, session: &SearchSession) -> Vec<FetchJob> {
        session
            .entities
            .iter()
            .enumerate()
            .filter_map(|(slot, entity)| {
                let request = entity.first_request(self.config.page_size)?;
                let descriptor = Arc::clone(self.registry.at(entity.index)?);
                Some(FetchJob {
                    slot,
                    descriptor,
                    request,
                })
            })
            .collect()
    }

    fn spawn(inner: &Arc<Inner>, runtime: &Handle, generation: u64, jobs: Vec<FetchJob>) {
        let mut tasks = inner.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        for job in jobs {
            let inner = Arc::clone(inner);
            tasks.push(runtime.spawn(async move { inner.fetch(generation, job).await }));
        }
    }

    async fn fetch(&self, generation: u64, job: FetchJob) {
        let FetchJob {
            slot,
            descriptor,
            request,
        } = job;
        let entity = descriptor.name();
        let page = request.page;

        debug!(target: "nimbus::search", generation, entity = %entity, page, "fetching page");

        let fetch = descriptor.source().fetch_page(&request);
        let outcome = match self.config.fetch_timeout() {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .unwrap_or_else(|_| Err(FetchError::Timeout(limit.as_millis() as u64))),
            None => fetch.await,
        };

        match &outcome {
            Ok(received) => debug!(
                target: "nimbus::search",
                generation,
                entity = %entity,
                page,
                records = received.len(),
                "page received"
            ),
            Err(err) => warn!(
                target: "nimbus::search",
                generation,
                entity = %entity,
                page,
                error = %err,
                "fetch failed"
            ),
        }

        self.apply(generation, slot, entity, page, outcome);
    }

    fn apply(
        &self,
        generation: u64,
        slot: usize,
        entity: &str,
        page: u32,
        outcome: std::result::Result<Page, FetchError>,
    ) {
        let max_pages = self.config.max_pages_per_entity;
        let mut settled_with: Option<usize> = None;

        let applied = self.state.send_if_modified(|state| {
            let current = state.generation == generation
                && state.session.as_ref().map(|s| s.generation) == Some(generation);
            if !current {
                return false;
            }
            let state = Arc::make_mut(state);
            let Some(session) = state.session.as_mut() else {
                return false;
            };
            let Some(target) = session.entities.get_mut(slot) else {
                return false;
            };
            if !target.apply(page, outcome, max_pages) {
                return false;
            }
            let records = session.entities.iter().map(EntitySession::record_count).sum();
            let was_settled = state.phase == SearchPhase::Settled;
            state.refresh_phase();
            if !was_settled && state.phase == SearchPhase::Settled {
                settled_with = Some(records);
            }
            true
        });

        if !applied {
            debug!(
                target: "nimbus::search",
                generation,
                entity = %entity,
                page,
                "stale result discarded"
            );
        } else if let Some(records) = settled_with {
            info!(target: "nimbus::search", generation, records, "search settled");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}
