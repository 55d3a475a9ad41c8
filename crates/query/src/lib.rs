//! Query compiler for Nimbus search
//!
//! Turns the search bar's raw text into API filter payloads:
//! - lexer: characters to positioned tokens
//! - parser: tokens to a [`FilterNode`] tree, or a positioned [`ParseError`]
//! - schema: per-entity filterable fields, defaults, aliases and base filter
//! - lower: tree plus schema to a [`FilterPayload`]
//! - eval: apply a payload to a raw record locally
//!
//! Parsing happens once per query; lowering happens once per entity.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod eval;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod schema;

pub use eval::matches;
pub use lower::{lower, BARE_TERM_FIELD};
pub use parser::parse;
pub use schema::{MatchRule, SearchSchema};

use nimbus_core::{FilterNode, FilterPayload, ParseError, UnsupportedFieldError};
use thiserror::Error;

/// Failure to compile a query for a single entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The query is not valid grammar
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The query is valid but the entity cannot express it
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFieldError),
}

/// Parse and lower a query for one entity
///
/// Convenience for single-entity list views that filter with the search
/// grammar. Federated search parses once and lowers per entity instead.
///
/// # Example
///
/// ```
/// use nimbus_query::{compile, MatchRule, SearchSchema};
///
/// let schema = SearchSchema::new()
///     .with_default_field("label")
///     .with_field("id", MatchRule::Equals);
/// let payload = compile("id:42", &schema).unwrap();
/// assert_eq!(payload.cache_key(), r#"{"id":42}"#);
/// ```
pub fn compile(input: &str, schema: &SearchSchema) -> Result<FilterPayload, CompileError> {
    let node: Option<FilterNode> = parse(input)?;
    Ok(lower(node.as_ref(), schema)?)
}
