//! Parser for the search grammar
//!
//! ```text
//! query   := clause (sep clause)*
//! sep     := whitespace | whitespace AND whitespace
//! clause  := field ':' value | value
//! field   := [A-Za-z0-9_-]+
//! value   := word | '"' quoted '"'
//! ```
//!
//! Adjacent clauses are implicitly conjoined, so `a b` and `a AND b` parse
//! to the same tree. Field names are case-insensitive and normalized to
//! lowercase; values keep their case.
//!
//! The parser rejects rather than guesses: `OR`, `NOT` and symbolic
//! connectives are reported as unsupported instead of being searched for
//! as literal text.

use crate::lexer::{tokenize, Connective, Token, TokenKind};
use nimbus_core::{FilterNode, ParseError, ParseErrorKind};
use std::iter::Peekable;
use std::vec::IntoIter;
use tracing::trace;

/// Parse a raw query into a filter tree
///
/// Returns `Ok(None)` for empty or whitespace-only input.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying the character position where the
/// grammar was violated.
///
/// # Example
///
/// ```
/// use nimbus_core::FilterNode;
/// use nimbus_query::parse;
///
/// let node = parse("tag:my-app AND web").unwrap().unwrap();
/// assert_eq!(
///     node,
///     FilterNode::and(FilterNode::field("tag", "my-app"), FilterNode::bare("web"))
/// );
/// ```
pub fn parse(input: &str) -> Result<Option<FilterNode>, ParseError> {
    let tokens = tokenize(input)?;
    let result = Parser::new(tokens).parse_query();
    if let Err(err) = &result {
        trace!(target: "nimbus::query", kind = ?err.kind, position = err.position, "query rejected");
    }
    result
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
        }
    }

    fn next_is_adjacent_colon(&mut self) -> bool {
        matches!(self.tokens.peek(), Some(token) if token.is_colon() && !token.spaced)
    }

    fn parse_query(mut self) -> Result<Option<FilterNode>, ParseError> {
        let mut clauses = Vec::new();
        // Position of an AND still waiting for its right operand
        let mut pending_and: Option<usize> = None;

        while let Some(token) = self.tokens.next() {
            let clause = match token.kind {
                TokenKind::Colon => {
                    return Err(ParseError::new(
                        ParseErrorKind::EmptyField,
                        token.position,
                        "expected a field name before ':'",
                    ));
                }
                TokenKind::Quoted(_) if self.next_is_adjacent_colon() => {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidField,
                        token.position,
                        "a quoted value cannot be used as a field name",
                    ));
                }
                TokenKind::Word(_) if self.next_is_adjacent_colon() => self.field_clause(token)?,
                TokenKind::Word(_) => match token.connective() {
                    Some(Connective::And) => {
                        if clauses.is_empty() || pending_and.is_some() {
                            return Err(ParseError::new(
                                ParseErrorKind::DanglingAnd,
                                token.position,
                                "expected a clause before AND",
                            ));
                        }
                        pending_and = Some(token.position);
                        continue;
                    }
                    Some(Connective::Unsupported(word)) => {
                        return Err(ParseError::new(
                            ParseErrorKind::UnsupportedConnective,
                            token.position,
                            format!("'{}' is not supported; only AND can join clauses", word),
                        ));
                    }
                    None => match token.kind {
                        TokenKind::Word(value) => FilterNode::bare(value),
                        _ => unreachable!("matched as a word above"),
                    },
                },
                TokenKind::Quoted(value) => FilterNode::bare(value),
            };

            clauses.push(clause);
            pending_and = None;
        }

        if let Some(position) = pending_and {
            return Err(ParseError::new(
                ParseErrorKind::DanglingAnd,
                position,
                "expected a clause after AND",
            ));
        }

        Ok(FilterNode::conjoin(clauses))
    }

    fn field_clause(&mut self, field: Token) -> Result<FilterNode, ParseError> {
        let name = match &field.kind {
            TokenKind::Word(name) => name.clone(),
            _ => unreachable!("field clauses start with a word"),
        };
        if field.escaped || !is_field_name(&name) {
            return Err(ParseError::new(
                ParseErrorKind::InvalidField,
                field.position,
                format!("'{}' is not a valid field name", name),
            ));
        }

        // The adjacent colon checked by the caller
        let colon_position = self
            .tokens
            .next()
            .map(|colon| colon.position)
            .unwrap_or(field.position + name.chars().count());

        let value_token = self.tokens.next().ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::DanglingColon,
                colon_position,
                format!("expected a value after '{}:'", name),
            )
        })?;

        let value = match value_token.kind {
            TokenKind::Colon => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedColon,
                    value_token.position,
                    "unexpected ':'; escape it as '\\:' or quote the value",
                ));
            }
            TokenKind::Word(_) if value_token.spaced && value_token.connective().is_some() => {
                return Err(ParseError::new(
                    ParseErrorKind::DanglingColon,
                    colon_position,
                    format!("expected a value after '{}:'", name),
                ));
            }
            TokenKind::Word(value) | TokenKind::Quoted(value) => value,
        };

        if let Some(colon) = self.tokens.peek().filter(|t| t.is_colon() && !t.spaced) {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedColon,
                colon.position,
                "unexpected ':'; escape it as '\\:' or quote the value",
            ));
        }

        Ok(FilterNode::field(name.to_lowercase(), value))
    }
}

fn is_field_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
