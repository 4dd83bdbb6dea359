use thiserror::Error;

use crate::ast::node::ParseContext;

/// Errors surfaced by [`SquigglyParser::parse`](crate::compiler::SquigglyParser::parse).
///
/// All variants are fatal to the single parse call that produced them;
/// nothing is cached on failure and nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Malformed expression: unexpected token, unterminated literal,
    /// unbalanced grouping.
    #[error("{context}: {message}")]
    Syntax {
        context: ParseContext,
        message: String,
    },

    /// An operator token outside the canonical table.
    #[error("{context}: unknown operator '{operator}'")]
    UnknownOperator {
        context: ParseContext,
        operator: String,
    },

    /// An unsupported regex flag character.
    #[error("{context}: unsupported flag '{flag}' for pattern '{pattern}'")]
    InvalidPatternFlag {
        context: ParseContext,
        flag: char,
        pattern: String,
    },

    /// Internal invariant violation. A defect, not a user input problem.
    #[error("internal invariant violated: {0}")]
    Structural(String),
}

impl ParseError {
    pub fn syntax(context: ParseContext, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            context,
            message: message.into(),
        }
    }
}

/// Errors from parsing a [`CacheSpec`](crate::cache::CacheSpec) string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheSpecError {
    #[error("unknown cache spec key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for cache spec key '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("malformed cache spec entry '{0}', expected key=value")]
    MalformedEntry(String),
}
