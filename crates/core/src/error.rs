//! Error types for Nimbus search
//!
//! This module defines the error taxonomy shared by the query compiler and
//! the federated search orchestrator. We use `thiserror` for automatic
//! `Display` and `Error` trait implementations.
//!
//! - [`ParseError`]: the raw query is not valid grammar. Terminal for the query.
//! - [`UnsupportedFieldError`]: one entity cannot honor a `field:value` clause.
//! - [`FetchError`]: one entity's paginated fetch failed.
//! - [`Error`]: registry, configuration and runtime misuse.

use thiserror::Error;

/// Result type alias for Nimbus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while wiring up or driving the search core
#[derive(Debug, Error)]
pub enum Error {
    /// Two descriptors were registered under the same entity name
    #[error("entity registered twice: {0}")]
    DuplicateEntity(String),

    /// An entity name was referenced that is not in the registry
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// An operation that spawns fetches was called outside a Tokio runtime
    #[error("no async runtime available: {0}")]
    Runtime(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

// ============================================================================
// ParseError
// ============================================================================

/// Category of a grammar failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A quoted value was opened but never closed
    UnterminatedQuote,
    /// A `:` appeared with no field name in front of it
    EmptyField,
    /// A `:` was not followed by a value
    DanglingColon,
    /// A second unescaped `:` appeared inside a value
    UnexpectedColon,
    /// The text in front of a `:` is not a valid field identifier
    InvalidField,
    /// A boolean connective other than `AND` was used
    UnsupportedConnective,
    /// `AND` without a clause on both sides
    DanglingAnd,
}

/// The raw query string does not conform to the search grammar
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at position {position}")]
pub struct ParseError {
    /// Failure category
    pub kind: ParseErrorKind,
    /// Character offset of the offending token
    pub position: usize,
    /// Human-readable message
    pub message: String,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ParseErrorKind, position: usize, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            position,
            message: message.into(),
        }
    }
}

// ============================================================================
// Per-entity errors
// ============================================================================

/// An entity cannot filter on a field referenced by the query
///
/// Scoped to a single entity; other entities proceed normally.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[error("cannot filter on field '{field}'")]
pub struct UnsupportedFieldError {
    /// The field as written in the query (before alias resolution)
    pub field: String,
}

impl UnsupportedFieldError {
    /// Create a new unsupported-field error
    pub fn new(field: impl Into<String>) -> Self {
        UnsupportedFieldError {
            field: field.into(),
        }
    }
}

/// A per-entity network or backend failure
///
/// Never escalates beyond the entity that produced it. The core does not
/// retry; callers re-issue the query instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (connection refused, reset, DNS)
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with an error; `reason` is its message
    #[error("{reason}")]
    Api {
        /// Reason text reported by the API
        reason: String,
    },

    /// The fetch did not complete within the configured limit
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The fetch task ended without producing a page
    #[error("request aborted")]
    Aborted,
}

impl FetchError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        FetchError::Network(msg.into())
    }

    /// Create an API error carrying the backend's reason
    pub fn api(reason: impl Into<String>) -> Self {
        FetchError::Api {
            reason: reason.into(),
        }
    }
}
