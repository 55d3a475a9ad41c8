//! Federated entity search for the Nimbus console
//!
//! This crate provides:
//! - EntitySearchDescriptor / EntityRegistry: what can be searched
//! - catalog: the console's built-in entities
//! - EntitySource / MemorySource: paginated fetch capability
//! - SearchOrchestrator: fan-out, isolation, cancellation and pagination
//! - Debouncer: keystroke-to-query settling
//! - SearchOutput: merged, caller-facing snapshot
//! - SearchConfig: `nimbus-search.toml` configuration
//!
//! # Usage
//!
//! ```ignore
//! use nimbus_search::{catalog, Debouncer, SearchConfig, SearchOrchestrator};
//!
//! let registry = catalog::registry_from(|name| api.source_for(name))?;
//! let search = SearchOrchestrator::new(registry, SearchConfig::default())?;
//! let bar = Debouncer::spawn(search.clone())?;
//!
//! bar.input("tag:prod web");
//! let snapshot = search.settled().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod descriptor;
pub mod merge;
pub mod orchestrator;
pub mod output;
pub mod registry;
pub mod session;
pub mod source;

// Re-export commonly used types
pub use catalog::EntityTemplate;
pub use config::SearchConfig;
pub use debounce::Debouncer;
pub use descriptor::{EntitySearchDescriptor, ResultPresenter, UrlTemplate};
pub use merge::{group_by_entity, ResultGroup};
pub use orchestrator::SearchOrchestrator;
pub use output::{EntityFailure, FailureKind, SearchOutput};
pub use registry::{EntityRegistry, RegistryBuilder};
pub use session::{EntitySession, FetchState, SearchPhase, SearchSession, SearchState};
pub use source::{EntitySource, MemorySource};
