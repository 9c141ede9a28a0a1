use thiserror::Error;

use crate::parse::ParseError;

/// Invalid rule construction. Raised while building a rule, never while
/// running one.
#[derive(Debug, Error)]
pub enum SpecificationError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("rule '{rule}' is missing required field '{field}'")]
    MissingField { rule: String, field: &'static str },

    #[error("rule '{rule}' does not accept field '{field}'")]
    UnexpectedField { rule: String, field: &'static str },
}

/// Invalid dataset shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("index has {actual} labels, expected {expected}")]
    IndexLength { expected: usize, actual: usize },
}

/// Failure raised by a condition or action while it runs.
///
/// Checks and corrections capture these in their results instead of
/// propagating them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("name '{0}' is not defined")]
    UnknownName(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{function}' takes {expected} argument(s), got {actual}")]
    Arity {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("'{function}' is missing argument '{parameter}'")]
    MissingArgument { function: String, parameter: String },

    #[error("the truth value of {0} is ambiguous; use '&', '|' or '~' for elementwise logic")]
    AmbiguousTruth(&'static str),

    #[error("unsupported operand types for '{op}': {left} and {right}")]
    TypeMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("expected a boolean, got {0}")]
    NonBoolean(&'static str),

    #[error("integer overflow in '{0}'")]
    Overflow(String),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Raised by user-supplied callables.
    #[error("{0}")]
    Failed(String),
}

impl EvalError {
    pub fn failed(message: impl Into<String>) -> Self {
        EvalError::Failed(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message() {
        let err = SpecificationError::MissingField {
            rule: "age_fix".into(),
            field: "action",
        };
        assert_eq!(
            err.to_string(),
            "rule 'age_fix' is missing required field 'action'"
        );
    }

    #[test]
    fn unknown_name_message() {
        let err = EvalError::UnknownName("agee".into());
        assert_eq!(err.to_string(), "name 'agee' is not defined");
    }

    #[test]
    fn type_mismatch_message() {
        let err = EvalError::TypeMismatch {
            op: "<".into(),
            left: "int",
            right: "string",
        };
        assert_eq!(
            err.to_string(),
            "unsupported operand types for '<': int and string"
        );
    }

    #[test]
    fn dataset_error_is_transparent() {
        let err = EvalError::from(DatasetError::LengthMismatch {
            column: "age".into(),
            expected: 3,
            actual: 2,
        });
        assert_eq!(err.to_string(), "column 'age' has 2 rows, expected 3");
    }
}
