use std::fmt;

use super::error::EvalError;
use super::value::Value;

/// Classification of one row by a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Pass,
    Fail,
    /// The condition produced a missing value for this row, or raised.
    NotApplicable,
}

impl Outcome {
    pub(crate) fn classify(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Bool(true) => Ok(Outcome::Pass),
            Value::Bool(false) => Ok(Outcome::Fail),
            v if v.is_missing() => Ok(Outcome::NotApplicable),
            other => Err(EvalError::NonBoolean(other.type_name())),
        }
    }

    /// The raw result this outcome came from: `Bool`, or `Null` when not
    /// applicable.
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Outcome::Pass => Value::Bool(true),
            Outcome::Fail => Value::Bool(false),
            Outcome::NotApplicable => Value::Null,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "pass"),
            Outcome::Fail => write!(f, "fail"),
            Outcome::NotApplicable => write!(f, "n/a"),
        }
    }
}
