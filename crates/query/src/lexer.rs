//! Lexer for the search grammar
//!
//! Splits a raw query into words, quoted strings and colons. Every token
//! records its character offset and whether whitespace preceded it, which
//! the parser needs to tell `label:web` apart from `label :web`.
//!
//! Escapes:
//! - unquoted words: `\:`, `\\` and `\"` produce the literal character
//! - quoted strings: `\"` and `\\` produce the literal character; any
//!   other backslash is kept as written

use nimbus_core::{ParseError, ParseErrorKind};

/// Kind of lexical unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted run of characters
    Word(String),
    /// Contents of a `"..."` string, escapes resolved
    Quoted(String),
    /// A `:` separator
    Colon,
}

/// Boolean connective recognized in word position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connective {
    /// `AND`, case-insensitive
    And,
    /// Any other connective-like word or symbol, as written
    Unsupported(String),
}

/// Lexical unit with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What the token is
    pub kind: TokenKind,
    /// Character offset of the token's first character
    pub position: usize,
    /// Whether whitespace (or the start of input) precedes the token
    pub spaced: bool,
    /// Whether the word contained an escape sequence
    pub escaped: bool,
}

impl Token {
    fn new(kind: TokenKind, position: usize, spaced: bool, escaped: bool) -> Self {
        Token {
            kind,
            position,
            spaced,
            escaped,
        }
    }

    /// Whether this token is a colon
    pub fn is_colon(&self) -> bool {
        self.kind == TokenKind::Colon
    }

    /// Classify an unescaped word as a connective
    ///
    /// Quoted strings are never connectives.
    pub fn connective(&self) -> Option<Connective> {
        let word = match &self.kind {
            TokenKind::Word(word) if !self.escaped => word,
            _ => return None,
        };
        if word.eq_ignore_ascii_case("and") {
            return Some(Connective::And);
        }
        let unsupported = ["or", "not", "||", "&&", "!"]
            .iter()
            .any(|c| word.eq_ignore_ascii_case(c));
        unsupported.then(|| Connective::Unsupported(word.clone()))
    }
}

fn is_word_break(c: char) -> bool {
    c.is_whitespace() || c == ':' || c == '"'
}

/// Tokenize a raw query string
///
/// # Errors
///
/// Returns [`ParseErrorKind::UnterminatedQuote`] when a quoted string is
/// never closed.
///
/// # Example
///
/// ```
/// use nimbus_query::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize("label:web").unwrap();
/// assert_eq!(tokens[0].kind, TokenKind::Word("label".into()));
/// assert_eq!(tokens[1].kind, TokenKind::Colon);
/// assert_eq!(tokens[2].kind, TokenKind::Word("web".into()));
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut spaced = true;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            spaced = true;
            i += 1;
            continue;
        }

        if c == ':' {
            tokens.push(Token::new(TokenKind::Colon, i, spaced, false));
            i += 1;
        } else if c == '"' {
            let start = i;
            let mut value = String::new();
            let mut closed = false;
            i += 1;

            while i < chars.len() {
                match chars[i] {
                    '\\' if i + 1 < chars.len() && matches!(chars[i + 1], '"' | '\\') => {
                        value.push(chars[i + 1]);
                        i += 2;
                    }
                    '"' => {
                        closed = true;
                        i += 1;
                        break;
                    }
                    other => {
                        value.push(other);
                        i += 1;
                    }
                }
            }

            if !closed {
                return Err(ParseError::new(
                    ParseErrorKind::UnterminatedQuote,
                    start,
                    "unterminated quoted value",
                ));
            }
            tokens.push(Token::new(TokenKind::Quoted(value), start, spaced, false));
        } else {
            let start = i;
            let mut value = String::new();
            let mut escaped = false;

            while i < chars.len() && !is_word_break(chars[i]) {
                if chars[i] == '\\' && i + 1 < chars.len() && matches!(chars[i + 1], ':' | '\\' | '"')
                {
                    value.push(chars[i + 1]);
                    escaped = true;
                    i += 2;
                    continue;
                }
                value.push(chars[i]);
                i += 1;
            }
            tokens.push(Token::new(TokenKind::Word(value), start, spaced, escaped));
        }

        spaced = false;
    }

    Ok(tokens)
}
