//! Formatter error types

use thiserror::Error;

/// Result type for tokenizing, parsing and printing
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors raised inside the formatting pipeline
///
/// These never escape [`crate::format`]; the fallback guard turns every one
/// of them into the identity transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Malformed input (unterminated string, stray character, unbalanced
    /// parentheses, trailing tokens, misplaced comma)
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// Nesting deeper than the configured maximum
    #[error("Nesting depth exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },
}

impl FormulaError {
    /// Create a syntax error at the given byte offset
    pub fn syntax<S: Into<String>>(offset: usize, message: S) -> Self {
        FormulaError::Syntax {
            offset,
            message: message.into(),
        }
    }
}

/// Result type for request-layer validation
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Reasons a formula is rejected before it reaches the formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Empty or whitespace-only input
    #[error("Formula cannot be empty")]
    Empty,

    /// Parentheses outside string literals do not pair up
    #[error("Unbalanced parentheses in formula")]
    UnbalancedParentheses,
}
