//! Nimbus - entity search core for a cloud console
//!
//! Nimbus turns the console search bar's text into API filters and runs
//! them against every searchable entity at once.
//!
//! # Quick Start
//!
//! ```ignore
//! use nimbus::{catalog, SearchConfig, SearchOrchestrator};
//!
//! let registry = catalog::registry_from(|name| client.source_for(name))?;
//! let search = SearchOrchestrator::new(registry, SearchConfig::default())?;
//!
//! let output = search.search("tag:my-app AND label:web").await?;
//! for item in &output.results {
//!     println!("{} {} -> {}", item.entity, item.label, item.url);
//! }
//! ```
//!
//! # Architecture
//!
//! - `nimbus-core`: filter trees, payloads, pages, results and errors
//! - `nimbus-query`: grammar parsing and per-entity lowering
//! - `nimbus-search`: registry, fan-out orchestration and debouncing
//!
//! Single-entity list views can use [`compile`] directly.

pub use nimbus_core::{
    Error, FetchError, FilterNode, FilterPayload, Page, PageRequest, ParseError, ParseErrorKind,
    Result, SearchResultItem, UnsupportedFieldError,
};
pub use nimbus_query::{compile, lower, matches, parse, CompileError, MatchRule, SearchSchema};
pub use nimbus_search::*;
