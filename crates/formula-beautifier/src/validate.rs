//! Input checks for the layer that accepts formulas from users
//!
//! These run before [`crate::format`] and decide whether a request is worth
//! formatting at all. The formatter itself never requires them.

use crate::error::{ValidationError, ValidationResult};

/// Reject empty input and parentheses that do not pair up.
///
/// Parentheses inside `"..."` string literals and `'...'` sheet names are
/// ignored.
///
/// # Example
/// ```rust
/// use formula_beautifier::{validate_formula, ValidationError};
///
/// assert!(validate_formula("=SUM(A1:A10)").is_ok());
/// assert_eq!(validate_formula("   "), Err(ValidationError::Empty));
/// assert_eq!(
///     validate_formula("=SUM(A1"),
///     Err(ValidationError::UnbalancedParentheses)
/// );
/// ```
pub fn validate_formula(formula: &str) -> ValidationResult<()> {
    let formula = formula.trim();
    if formula.is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut depth: usize = 0;
    let mut quote: Option<char> = None;

    for c in formula.chars() {
        match (quote, c) {
            // A doubled quote closes and reopens, which leaves the state as is
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(ValidationError::UnbalancedParentheses)?;
            }
            (None, _) => {}
        }
    }

    if depth == 0 {
        Ok(())
    } else {
        Err(ValidationError::UnbalancedParentheses)
    }
}

/// Trim surrounding whitespace and drop one pair of quotes wrapping the
/// whole formula, as left behind by copying a formula out of a CSV cell.
pub fn sanitize_formula(formula: &str) -> String {
    let formula = formula.trim();
    match formula
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        // A lone string literal such as "abc" has no '=' and stays quoted
        Some(inner) if inner.trim_start().starts_with('=') => inner.trim().to_string(),
        _ => formula.to_string(),
    }
}
