use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::check::Check;
use super::correction::Correction;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A fallback name such as `condition_3`, unique within the process.
pub(crate) fn fallback_name(prefix: &str) -> String {
    format!("{prefix}_{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// A rule held by a [`RuleSet`](super::RuleSet).
#[derive(Debug, Clone)]
pub enum Rule {
    Check(Check),
    Correction(Correction),
}

impl Rule {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Rule::Check(check) => check.name(),
            Rule::Correction(correction) => correction.name(),
        }
    }

    #[must_use]
    pub fn as_check(&self) -> Option<&Check> {
        match self {
            Rule::Check(check) => Some(check),
            Rule::Correction(_) => None,
        }
    }

    #[must_use]
    pub fn as_correction(&self) -> Option<&Correction> {
        match self {
            Rule::Check(_) => None,
            Rule::Correction(correction) => Some(correction),
        }
    }
}

impl From<Check> for Rule {
    fn from(check: Check) -> Self {
        Rule::Check(check)
    }
}

impl From<Correction> for Rule {
    fn from(correction: Correction) -> Self {
        Rule::Correction(correction)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Check(check) => write!(f, "{check}"),
            Rule::Correction(correction) => write!(f, "{correction}"),
        }
    }
}
