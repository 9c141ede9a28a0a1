use std::fmt;

use super::action::Updates;
use super::datum::Datum;
use super::error::{DatasetError, EvalError};
use super::value::Value;

/// A table of named columns aligned by a shared row index.
///
/// Columns keep their insertion order. `Clone` is the copy operation used when
/// corrections must not touch the caller's data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    index: Vec<Value>,
    columns: Vec<(String, Vec<Value>)>,
}

impl Dataset {
    /// Create an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(index: Vec<Value>, columns: Vec<(String, Vec<Value>)>) -> Self {
        Self { index, columns }
    }

    /// Add (or replace) a column. The first column of a dataset without an
    /// explicit index defines the row count and a default `0..n` index.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::LengthMismatch`] if the column length differs
    /// from the row count.
    pub fn with_column<V: Into<Value>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, DatasetError> {
        self.insert_column(name, values.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    /// Replace the row labels.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::IndexLength`] if the dataset already has
    /// columns of a different length.
    pub fn with_index<V: Into<Value>>(
        mut self,
        labels: impl IntoIterator<Item = V>,
    ) -> Result<Self, DatasetError> {
        let labels: Vec<Value> = labels.into_iter().map(Into::into).collect();
        if !self.columns.is_empty() && labels.len() != self.len() {
            return Err(DatasetError::IndexLength {
                expected: self.len(),
                actual: labels.len(),
            });
        }
        self.index = labels;
        Ok(self)
    }

    /// Insert a column, replacing any existing column with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::LengthMismatch`] if the column length differs
    /// from the row count.
    pub fn insert_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), DatasetError> {
        if self.columns.is_empty() && self.index.is_empty() {
            self.index = (0..values.len()).map(default_label).collect();
        } else if values.len() != self.len() {
            return Err(DatasetError::LengthMismatch {
                column: name.to_owned(),
                expected: self.len(),
                actual: values.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name.to_owned(), values)),
        }
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Row labels, in row order.
    #[must_use]
    pub fn index(&self) -> &[Value] {
        &self.index
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// The row at `position`, if any.
    #[must_use]
    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        (position < self.len()).then_some(Row {
            dataset: self,
            position,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len()).map(move |position| Row {
            dataset: self,
            position,
        })
    }

    /// Write `value` into column `name` for every row where `mask` is true.
    /// A missing column is created and filled with nulls first.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::LengthMismatch`] if `mask` or a column `value`
    /// is not aligned with the dataset rows. Nothing is written on error.
    pub fn assign_masked(
        &mut self,
        name: &str,
        value: &Datum,
        mask: &[bool],
    ) -> Result<(), EvalError> {
        self.check_update(value, mask)?;
        let rows = self.len();
        let position = match self.columns.iter().position(|(n, _)| n == name) {
            Some(position) => position,
            None => {
                self.columns.push((name.to_owned(), vec![Value::Null; rows]));
                self.columns.len() - 1
            }
        };
        let column = &mut self.columns[position].1;
        for (row, _) in mask.iter().enumerate().filter(|(_, selected)| **selected) {
            column[row] = match value {
                Datum::Scalar(v) => v.clone(),
                Datum::Column(values) => values[row].clone(),
            };
        }
        Ok(())
    }

    /// Merge every update under `mask`. All updates are validated before any
    /// is written, so a failing update leaves the dataset untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::LengthMismatch`] if any update is misaligned.
    pub fn apply_updates(&mut self, updates: &Updates, mask: &[bool]) -> Result<(), EvalError> {
        for value in updates.values() {
            self.check_update(value, mask)?;
        }
        for (name, value) in updates {
            self.assign_masked(name, value, mask)?;
        }
        Ok(())
    }

    fn check_update(&self, value: &Datum, mask: &[bool]) -> Result<(), EvalError> {
        if mask.len() != self.len() {
            return Err(EvalError::LengthMismatch {
                expected: self.len(),
                actual: mask.len(),
            });
        }
        match value.len() {
            Some(len) if len != self.len() => Err(EvalError::LengthMismatch {
                expected: self.len(),
                actual: len,
            }),
            _ => Ok(()),
        }
    }
}

#[allow(clippy::cast_possible_wrap)]
fn default_label(position: usize) -> Value {
    Value::Int(position as i64)
}

/// A borrowed view of one dataset row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    dataset: &'a Dataset,
    position: usize,
}

impl<'a> Row<'a> {
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn label(&self) -> &'a Value {
        &self.dataset.index[self.position]
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.dataset
            .column(column)
            .and_then(|values| values.get(self.position))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index")?;
        for name in self.column_names() {
            write!(f, "\t{name}")?;
        }
        for row in self.rows() {
            writeln!(f)?;
            write!(f, "{}", row.label())?;
            for (_, values) in &self.columns {
                write!(f, "\t{}", values[row.position])?;
            }
        }
        Ok(())
    }
}
