use std::collections::HashMap;

use super::dataset::Dataset;
use super::datum::{Bindings, Datum};
use super::error::EvalError;
use super::value::Value;
use super::warning::Warning;

/// Arguments bound for one call of a callable condition or action.
///
/// Only the callable's declared parameters are bound. Extra bindings take
/// precedence over dataset columns of the same name; everything else the
/// caller passed is dropped.
pub struct Args<'a> {
    function: &'a str,
    values: HashMap<&'a str, Datum>,
    pub(crate) data: &'a Dataset,
    pub(crate) extra: &'a Bindings,
    pub(crate) warnings: &'a mut Vec<Warning>,
}

impl<'a> Args<'a> {
    pub(crate) fn bind(
        function: &'a str,
        parameters: &'a [String],
        data: &'a Dataset,
        extra: &'a Bindings,
        warnings: &'a mut Vec<Warning>,
    ) -> Result<Self, EvalError> {
        let mut values = HashMap::with_capacity(parameters.len());
        for parameter in parameters {
            let value = extra
                .get(parameter)
                .cloned()
                .or_else(|| data.column(parameter).map(|c| Datum::Column(c.to_vec())))
                .ok_or_else(|| EvalError::MissingArgument {
                    function: function.to_owned(),
                    parameter: parameter.clone(),
                })?;
            values.insert(parameter.as_str(), value);
        }
        Ok(Self {
            function,
            values,
            data,
            extra,
            warnings,
        })
    }

    /// The bound value of a declared parameter.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::MissingArgument`] if `name` was not declared.
    pub fn get(&self, name: &str) -> Result<&Datum, EvalError> {
        self.values.get(name).ok_or_else(|| self.missing(name))
    }

    /// Move a bound value out, leaving the parameter unbound.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::MissingArgument`] if `name` was not declared or was
    /// already taken.
    pub fn take(&mut self, name: &str) -> Result<Datum, EvalError> {
        self.values.remove(name).ok_or_else(|| self.missing(name))
    }

    /// The bound value of a declared parameter as a column.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::MissingArgument`] if `name` was not declared, or
    /// [`EvalError::TypeMismatch`] if it is bound to a scalar.
    pub fn column(&self, name: &str) -> Result<&[Value], EvalError> {
        match self.get(name)? {
            Datum::Column(values) => Ok(values),
            Datum::Scalar(value) => Err(EvalError::TypeMismatch {
                op: format!("{}({name})", self.function),
                left: "column",
                right: value.type_name(),
            }),
        }
    }

    /// Number of rows in the dataset being evaluated.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.data.len()
    }

    /// Record a non-fatal warning on the current rule result.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(Warning::new(message));
    }

    fn missing(&self, name: &str) -> EvalError {
        EvalError::MissingArgument {
            function: self.function.to_owned(),
            parameter: name.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    #[test]
    fn binds_declared_parameters_only() {
        let data = Dataset::new()
            .with_column("age", [1_i64, 2])
            .unwrap()
            .with_column("name", ["a", "b"])
            .unwrap();
        let extra = Bindings::new();
        let mut warnings = Vec::new();
        let parameters = params(&["age"]);
        let args = Args::bind("f", &parameters, &data, &extra, &mut warnings).unwrap();
        assert_eq!(args.rows(), 2);
        assert_eq!(args.column("age").unwrap(), &[Value::Int(1), Value::Int(2)]);
        assert!(matches!(
            args.get("name"),
            Err(EvalError::MissingArgument { .. })
        ));
    }

    #[test]
    fn extra_bindings_win_over_columns() {
        let data = Dataset::new().with_column("limit", [1_i64, 2]).unwrap();
        let mut extra = Bindings::new();
        extra.insert("limit".into(), Datum::from(10_i64));
        let mut warnings = Vec::new();
        let parameters = params(&["limit"]);
        let args = Args::bind("f", &parameters, &data, &extra, &mut warnings).unwrap();
        assert_eq!(args.get("limit").unwrap(), &Datum::from(10_i64));
    }

    #[test]
    fn unbound_parameter_is_an_error() {
        let data = Dataset::new();
        let extra = Bindings::new();
        let mut warnings = Vec::new();
        let parameters = params(&["missing"]);
        let result = Args::bind("check_it", &parameters, &data, &extra, &mut warnings);
        assert_eq!(
            result.err(),
            Some(EvalError::MissingArgument {
                function: "check_it".into(),
                parameter: "missing".into()
            })
        );
    }

    #[test]
    fn warnings_are_recorded() {
        let data = Dataset::new();
        let extra = Bindings::new();
        let mut warnings = Vec::new();
        let mut args = Args::bind("f", &[], &data, &extra, &mut warnings).unwrap();
        args.warn("careful");
        assert_eq!(warnings, vec![Warning::new("careful")]);
    }
}
