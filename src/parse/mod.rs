mod error;
mod grammar;

use winnow::Parser;

use crate::types::{Expr, Statement};

pub use error::ParseError;

/// Parse a single expression such as `0 <= age < 18`.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid expression.
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    grammar::expression
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Parse one or more assignment statements separated by `;` or newlines.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid statement list.
pub fn parse_statements(input: &str) -> Result<Vec<Statement>, ParseError> {
    grammar::statements
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}
