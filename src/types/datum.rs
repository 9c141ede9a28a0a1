use std::collections::HashMap;

use super::error::EvalError;
use super::value::Value;

/// Extra keyword bindings passed alongside a dataset when evaluating rules.
pub type Bindings = HashMap<String, Datum>;

/// The result of evaluating an expression: a single scalar, or one value per
/// dataset row.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Scalar(Value),
    Column(Vec<Value>),
}

impl Datum {
    /// Number of rows for a column, `None` for a scalar.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Datum::Scalar(_) => None,
            Datum::Column(values) => Some(values.len()),
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Datum::Scalar(value) => Some(value),
            Datum::Column(_) => None,
        }
    }

    #[must_use]
    pub fn as_column(&self) -> Option<&[Value]> {
        match self {
            Datum::Scalar(_) => None,
            Datum::Column(values) => Some(values),
        }
    }

    /// Expand to exactly `rows` values, repeating a scalar.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::LengthMismatch`] if a column has a different length.
    pub fn broadcast(self, rows: usize) -> Result<Vec<Value>, EvalError> {
        match self {
            Datum::Scalar(value) => Ok(vec![value; rows]),
            Datum::Column(values) if values.len() == rows => Ok(values),
            Datum::Column(values) => Err(EvalError::LengthMismatch {
                expected: rows,
                actual: values.len(),
            }),
        }
    }

    /// Apply `f` to the scalar or to every row.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn map(
        self,
        mut f: impl FnMut(&Value) -> Result<Value, EvalError>,
    ) -> Result<Datum, EvalError> {
        match self {
            Datum::Scalar(value) => Ok(Datum::Scalar(f(&value)?)),
            Datum::Column(values) => values
                .iter()
                .map(f)
                .collect::<Result<Vec<_>, _>>()
                .map(Datum::Column),
        }
    }

    /// Combine two datums row by row, broadcasting scalars.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::LengthMismatch`] for columns of different lengths,
    /// and propagates the first error returned by `f`.
    pub fn zip_with(
        self,
        other: Datum,
        mut f: impl FnMut(&Value, &Value) -> Result<Value, EvalError>,
    ) -> Result<Datum, EvalError> {
        match (self, other) {
            (Datum::Scalar(a), Datum::Scalar(b)) => Ok(Datum::Scalar(f(&a, &b)?)),
            (Datum::Column(a), Datum::Scalar(b)) => a
                .iter()
                .map(|x| f(x, &b))
                .collect::<Result<Vec<_>, _>>()
                .map(Datum::Column),
            (Datum::Scalar(a), Datum::Column(b)) => b
                .iter()
                .map(|y| f(&a, y))
                .collect::<Result<Vec<_>, _>>()
                .map(Datum::Column),
            (Datum::Column(a), Datum::Column(b)) => {
                if a.len() != b.len() {
                    return Err(EvalError::LengthMismatch {
                        expected: a.len(),
                        actual: b.len(),
                    });
                }
                a.iter()
                    .zip(&b)
                    .map(|(x, y)| f(x, y))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Datum::Column)
            }
        }
    }

    /// Elementwise three-valued negation (`~`).
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::TypeMismatch`] for values that are neither
    /// boolean, null nor integer.
    pub fn invert(self) -> Result<Datum, EvalError> {
        self.map(crate::evaluate::invert)
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        Datum::Scalar(value)
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Scalar(Value::Bool(value))
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Scalar(Value::Int(value))
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Scalar(Value::Float(value))
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Scalar(Value::from(value))
    }
}

impl From<Vec<Value>> for Datum {
    fn from(values: Vec<Value>) -> Self {
        Datum::Column(values)
    }
}

impl FromIterator<Value> for Datum {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Datum::Column(iter.into_iter().collect())
    }
}
