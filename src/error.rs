//! Error types for expression parsing.

use thiserror::Error;

use crate::grammar::KindSet;

/// Result type alias for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A grammar error found while scanning an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text at `position` is not one of the token kinds allowed there.
    #[error("{diagnostic}")]
    UnexpectedToken {
        /// Byte offset of the offending fragment.
        position: usize,
        /// Token kinds that would have been accepted.
        expected: KindSet,
        /// Human-readable message with the fragment marked.
        diagnostic: String,
    },

    /// The input ended right after a token that cannot finish an expression.
    #[error("incomplete expression, expected {expected}")]
    IncompleteExpression { expected: KindSet },

    /// The input ended with open groups.
    #[error("{unclosed} unclosed parenthesis")]
    UnbalancedParens { unclosed: usize },
}

impl ParseError {
    pub(crate) fn unexpected(source: &str, position: usize, expected: KindSet) -> Self {
        let (consumed, rest) = source.split_at(position);
        let diagnostic = if rest.is_empty() {
            format!("unexpected end of expression, expected {expected} in '{consumed}'")
        } else {
            format!("expected {expected} at position {position} in '{consumed}>>>{rest}'")
        };
        ParseError::UnexpectedToken {
            position,
            expected,
            diagnostic,
        }
    }
}

/// Invalid operator keyword configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("operator keyword must not be empty")]
    EmptyKeyword,

    #[error("operator keyword '{0}' must not contain whitespace, quotes or parentheses")]
    ReservedCharacter(String),

    #[error("AND and OR keywords must differ (both are '{0}')")]
    DuplicateKeyword(String),
}
