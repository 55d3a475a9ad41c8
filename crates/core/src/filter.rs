//! Parsed filter expression tree
//!
//! A [`FilterNode`] is the structured, backend-independent form of a search
//! query. It is produced once per settled query and shared read-only by every
//! entity that lowers it.

use std::fmt;

/// Connective-like words that must be quoted when rendered as values
const RESERVED_WORDS: &[&str] = &["and", "or", "not", "||", "&&", "!"];

/// Node of the parsed filter expression tree
///
/// # Invariant
///
/// The tree is immutable once parsed and has no back-references.
///
/// # Examples
///
/// ```
/// use nimbus_core::FilterNode;
///
/// let node = FilterNode::and(
///     FilterNode::field("tag", "my-app"),
///     FilterNode::field("is", "domain"),
/// );
/// assert_eq!(node.to_string(), "tag:my-app AND is:domain");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterNode {
    /// `field:value`
    FieldMatch {
        /// Field name, lowercased
        field: String,
        /// Literal value
        value: String,
    },
    /// Unqualified term matched against an entity's default fields
    BareTerm {
        /// Literal value
        value: String,
    },
    /// Conjunction of two sub-expressions
    And {
        /// Left operand
        left: Box<FilterNode>,
        /// Right operand
        right: Box<FilterNode>,
    },
}

impl FilterNode {
    /// Create a field match
    pub fn field(field: impl Into<String>, value: impl Into<String>) -> Self {
        FilterNode::FieldMatch {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a bare term
    pub fn bare(value: impl Into<String>) -> Self {
        FilterNode::BareTerm {
            value: value.into(),
        }
    }

    /// Create a conjunction
    pub fn and(left: FilterNode, right: FilterNode) -> Self {
        FilterNode::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Fold clauses into a left-leaning `And` chain
    ///
    /// Returns `None` for an empty input.
    pub fn conjoin(clauses: impl IntoIterator<Item = FilterNode>) -> Option<FilterNode> {
        clauses
            .into_iter()
            .reduce(|acc, clause| FilterNode::and(acc, clause))
    }

    /// Leaf clauses in left-to-right order
    pub fn clauses(&self) -> Vec<&FilterNode> {
        let mut out = Vec::new();
        self.collect_clauses(&mut out);
        out
    }

    fn collect_clauses<'a>(&'a self, out: &mut Vec<&'a FilterNode>) {
        match self {
            FilterNode::And { left, right } => {
                left.collect_clauses(out);
                right.collect_clauses(out);
            }
            leaf => out.push(leaf),
        }
    }

    /// Field names referenced by `field:value` clauses, in clause order
    pub fn fields(&self) -> Vec<&str> {
        self.clauses()
            .into_iter()
            .filter_map(|clause| match clause {
                FilterNode::FieldMatch { field, .. } => Some(field.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether the tree contains at least one bare term
    pub fn has_bare_terms(&self) -> bool {
        self.clauses()
            .iter()
            .any(|clause| matches!(clause, FilterNode::BareTerm { .. }))
    }
}

/// Renders the canonical query string
///
/// The output parses back to an equal tree.
impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::FieldMatch { field, value } => {
                write!(f, "{}:", field)?;
                write_value(f, value)
            }
            FilterNode::BareTerm { value } => write_value(f, value),
            FilterNode::And { left, right } => write!(f, "{} AND {}", left, right),
        }
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == ':' || c == '"' || c == '\\')
        || RESERVED_WORDS
            .iter()
            .any(|word| value.eq_ignore_ascii_case(word))
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    if !needs_quotes(value) {
        return f.write_str(value);
    }
    f.write_str("\"")?;
    for c in value.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}
