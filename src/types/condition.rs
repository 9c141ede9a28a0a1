use std::fmt;
use std::sync::Arc;

use crate::parse::ParseError;
use crate::rewrite::CompiledExpr;

use super::args::Args;
use super::dataset::Dataset;
use super::datum::{Bindings, Datum};
use super::error::EvalError;
use super::warning::Warning;

/// Signature of a callable condition.
pub type ConditionFn = dyn Fn(&mut Args<'_>) -> Result<Datum, EvalError> + Send + Sync;

/// A condition written as expression text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCondition {
    compiled: CompiledExpr,
}

impl TextCondition {
    /// The text the condition was written as.
    #[must_use]
    pub fn source(&self) -> &str {
        self.compiled.source()
    }

    #[must_use]
    pub fn compiled(&self) -> &CompiledExpr {
        &self.compiled
    }
}

/// A condition backed by a Rust function with declared parameters.
#[derive(Clone)]
pub struct CallableCondition {
    name: String,
    description: Option<String>,
    parameters: Vec<String>,
    function: Arc<ConditionFn>,
}

impl CallableCondition {
    /// Attach a description, adopted by checks that do not set their own.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

impl fmt::Debug for CallableCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableCondition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A predicate over a dataset, yielding one boolean per row or a single
/// scalar.
#[derive(Debug, Clone)]
pub enum Condition {
    Text(TextCondition),
    Callable(CallableCondition),
}

/// Anything a [`Condition`] can be made from.
#[derive(Debug, Clone)]
pub enum ConditionSpec {
    Text(String),
    Condition(Condition),
}

impl From<&str> for ConditionSpec {
    fn from(source: &str) -> Self {
        ConditionSpec::Text(source.to_owned())
    }
}

impl From<String> for ConditionSpec {
    fn from(source: String) -> Self {
        ConditionSpec::Text(source)
    }
}

impl From<Condition> for ConditionSpec {
    fn from(condition: Condition) -> Self {
        ConditionSpec::Condition(condition)
    }
}

impl From<CallableCondition> for Condition {
    fn from(callable: CallableCondition) -> Self {
        Condition::Callable(callable)
    }
}

impl Condition {
    /// Build a condition. Text is parsed and, when `rewrite` is set, rewritten
    /// to elementwise form. An existing condition is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the text is not a valid expression.
    pub fn make(spec: impl Into<ConditionSpec>, rewrite: bool) -> Result<Self, ParseError> {
        match spec.into() {
            ConditionSpec::Text(source) => Ok(Condition::Text(TextCondition {
                compiled: CompiledExpr::compile(&source, rewrite)?,
            })),
            ConditionSpec::Condition(condition) => Ok(condition),
        }
    }

    /// Parse and rewrite a text condition.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `source` is not a valid expression.
    pub fn text(source: &str) -> Result<Self, ParseError> {
        Self::make(source, true)
    }

    /// Wrap a function. It is called with only the declared `parameters`
    /// bound, each taken from the extra bindings or the dataset columns.
    ///
    /// ```
    /// use datarules::{CompareOp, Condition, Value};
    ///
    /// let adult = Condition::function("is_adult", &["age"], |args| {
    ///     let ages = args.column("age")?;
    ///     Ok(ages.iter().map(|a| Value::from(a.compare(CompareOp::Gte, &Value::Int(18)))).collect())
    /// });
    /// assert_eq!(adult.to_string(), "is_adult(age)");
    /// ```
    pub fn function<F>(name: &str, parameters: &[&str], function: F) -> Self
    where
        F: Fn(&mut Args<'_>) -> Result<Datum, EvalError> + Send + Sync + 'static,
    {
        Condition::Callable(CallableCondition {
            name: name.to_owned(),
            description: None,
            parameters: parameters.iter().map(|&p| p.to_owned()).collect(),
            function: Arc::new(function),
        })
    }

    /// Attach a description to a callable condition. Text conditions carry
    /// none and are returned unchanged.
    #[must_use]
    pub fn with_description(self, description: &str) -> Self {
        match self {
            Condition::Callable(callable) => Condition::Callable(callable.description(description)),
            text @ Condition::Text(_) => text,
        }
    }

    /// The callable's name. Text conditions are anonymous.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Condition::Text(_) => None,
            Condition::Callable(callable) => Some(&callable.name),
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Condition::Text(_) => None,
            Condition::Callable(callable) => callable.description.as_deref(),
        }
    }

    /// Declared parameters, or the names a text condition refers to.
    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        match self {
            Condition::Text(text) => text.compiled.free_names(),
            Condition::Callable(callable) => callable.parameters.clone(),
        }
    }

    /// Evaluate against `data`, discarding warnings.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if evaluation fails.
    pub fn evaluate(&self, data: &Dataset, extra: &Bindings) -> Result<Datum, EvalError> {
        self.evaluate_with(data, extra, &mut Vec::new())
    }

    /// Evaluate against `data`, collecting warnings into `warnings`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if evaluation fails.
    pub fn evaluate_with(
        &self,
        data: &Dataset,
        extra: &Bindings,
        warnings: &mut Vec<Warning>,
    ) -> Result<Datum, EvalError> {
        match self {
            Condition::Text(text) => text.compiled.evaluate(data, extra, warnings),
            Condition::Callable(callable) => {
                let mut args =
                    Args::bind(&callable.name, &callable.parameters, data, extra, warnings)?;
                (callable.function)(&mut args)
            }
        }
    }

    /// A condition that holds where this one fails, named `"<name>.fails"`.
    ///
    /// Nulls stay null.
    #[must_use]
    pub fn fails(&self) -> Condition {
        let label = match self {
            Condition::Text(text) => text.source().to_owned(),
            Condition::Callable(callable) => callable.name.clone(),
        };
        self.negated(&label)
    }

    pub(crate) fn negated(&self, label: &str) -> Condition {
        let inner = self.clone();
        let parameters = self.parameters();
        let description = self.description().map(|d| format!("not: {d}"));
        Condition::Callable(CallableCondition {
            name: format!("{label}.fails"),
            description,
            parameters,
            function: Arc::new(move |args: &mut Args<'_>| {
                inner
                    .evaluate_with(args.data, args.extra, args.warnings)?
                    .invert()
            }),
        })
    }
}

/// Renders text conditions as their compiled code, callables as a signature.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Text(text) => write!(f, "{}", text.compiled),
            Condition::Callable(callable) => {
                write!(f, "{}({})", callable.name, callable.parameters.join(", "))
            }
        }
    }
}
