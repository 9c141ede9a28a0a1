use thiserror::Error;

use crate::parse::ParseError;
use crate::types::SpecificationError;

/// Unified error type covering parsing, rule construction, configuration
/// and I/O.
///
/// Returned by convenience loaders like
/// [`RuleSet::from_json()`](crate::RuleSet::from_json) and
/// [`RuleSet::from_file()`](crate::RuleSet::from_file).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Specification(#[from] SpecificationError),

    #[error("invalid rule configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
