//! # formula-beautifier
//!
//! Indented, multi-line rendering of Excel formulas.
//!
//! This crate provides:
//! - Formula tokenizing (text → tokens)
//! - Formula parsing (tokens → syntax tree)
//! - Tree printing (syntax tree → indented text)
//! - A total [`format`] entry point that hands back the input untouched when
//!   it cannot be parsed
//!
//! ## Example
//!
//! ```rust
//! use formula_beautifier::format;
//!
//! let formatted = format("=IF(A1>0,\"Yes\",\"No\")");
//! assert_eq!(formatted, "=IF(\n    A1>0,\n    \"Yes\",\n    \"No\"\n)");
//!
//! // Malformed input comes back unchanged
//! assert_eq!(format("=IF(A1>0,\"Yes"), "=IF(A1>0,\"Yes");
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod printer;
pub mod validate;

pub use ast::Node;
pub use error::{FormulaError, FormulaResult, ValidationError, ValidationResult};
pub use lexer::{tokenize, Token, TokenKind};
pub use options::{FormatOptions, DEFAULT_MULTILINE_FUNCTIONS};
pub use parser::{parse_formula, parse_tokens};
pub use printer::Printer;
pub use validate::{sanitize_formula, validate_formula};

/// Format a formula with default options.
///
/// Never fails: input that cannot be tokenized or parsed is returned as is.
pub fn format(formula: &str) -> String {
    format_with(formula, &FormatOptions::default())
}

/// Format a formula with the given options, falling back to the original
/// text on any error.
pub fn format_with(formula: &str, options: &FormatOptions) -> String {
    match try_format(formula, options) {
        Ok(formatted) => formatted,
        Err(err) => {
            tracing::debug!(error = %err, "formula left unformatted");
            formula.to_string()
        }
    }
}

/// Format a formula, reporting why it could not be parsed.
///
/// Surrounding whitespace is dropped and a leading `=` is kept. Blank input
/// is returned unchanged.
pub fn try_format(formula: &str, options: &FormatOptions) -> FormulaResult<String> {
    let trimmed = formula.trim();
    if trimmed.is_empty() {
        return Ok(formula.to_string());
    }

    let tokens = tokenize(trimmed)?;
    let root = parse_tokens(&tokens, options.max_depth)?;
    let body = Printer::new(options).print(&root);

    if trimmed.starts_with('=') {
        Ok(format!("={body}"))
    } else {
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_keeps_equals_sign() {
        assert!(format("=IF(A1>0,\"Yes\",\"No\")").starts_with("=IF("));
        assert!(format("IF(A1>0,\"Yes\",\"No\")").starts_with("IF("));
    }

    #[test]
    fn test_format_trims_outer_whitespace() {
        assert_eq!(format("  =A1+B1  "), "=A1+B1");
    }

    #[test]
    fn test_blank_input_is_returned_as_is() {
        assert_eq!(format(""), "");
        assert_eq!(format("   "), "   ");
    }

    #[test]
    fn test_try_format_reports_errors() {
        let options = FormatOptions::default();
        assert!(matches!(
            try_format("=SUM(A1", &options),
            Err(FormulaError::Syntax { .. })
        ));
        assert!(matches!(
            try_format("=SUM(A1", &options),
            Err(FormulaError::Syntax { offset: 4, .. })
        ));
    }

    #[test]
    fn test_depth_exceeded_falls_back() {
        let options = FormatOptions::default().with_max_depth(3);
        let formula = "=IF(A1,IF(A2,IF(A3,1,2),3),4)";
        assert_eq!(
            try_format(formula, &options),
            Err(FormulaError::DepthExceeded { limit: 3 })
        );
        assert_eq!(format_with(formula, &options), formula);
    }
}
