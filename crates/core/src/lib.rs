//! Core types for Nimbus search
//!
//! This crate defines the types shared by the query compiler and the
//! federated search orchestrator:
//! - FilterNode: parsed filter expression tree
//! - FilterPayload: lowered, API-native JSON filter
//! - Page / PageRequest: paginated list envelope
//! - SearchResultItem: normalized, entity-tagged result
//! - Error types: ParseError, UnsupportedFieldError, FetchError, Error

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod filter;
pub mod page;
pub mod payload;
pub mod result;

pub use error::{Error, FetchError, ParseError, ParseErrorKind, Result, UnsupportedFieldError};
pub use filter::FilterNode;
pub use page::{Page, PageRequest};
pub use payload::FilterPayload;
pub use result::SearchResultItem;
