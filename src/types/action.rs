use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::evaluate::{exec, Scope};
use crate::parse::{parse_statements, ParseError};

use super::args::Args;
use super::dataset::Dataset;
use super::datum::{Bindings, Datum};
use super::error::EvalError;
use super::expr::Statement;
use super::warning::Warning;

/// New values produced by an action, keyed by column name. A scalar applies
/// to every selected row; a column supplies one value per row.
pub type Updates = BTreeMap<String, Datum>;

/// Signature of a callable action.
pub type ActionFn = dyn Fn(&mut Args<'_>) -> Result<Updates, EvalError> + Send + Sync;

/// An action written as assignment statements, e.g. `age = 0; flag = True`.
///
/// Statements run in order against the dataset and extra bindings; every
/// name they assign becomes an update. Statements are never rewritten.
///
/// There are no local-only names: a helper such as `tmp` in
/// `tmp = age * 2; age = tmp` is written back as a `tmp` column too.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementAction {
    source: String,
    statements: Vec<Statement>,
}

impl StatementAction {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

/// An action backed by a Rust function with declared parameters.
#[derive(Clone)]
pub struct CallableAction {
    name: String,
    description: Option<String>,
    parameters: Vec<String>,
    function: Arc<ActionFn>,
}

impl fmt::Debug for CallableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableAction")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Produces new column values for a correction.
#[derive(Debug, Clone)]
pub enum Action {
    Statement(StatementAction),
    Callable(CallableAction),
}

/// Anything an [`Action`] can be made from.
#[derive(Debug, Clone)]
pub enum ActionSpec {
    Text(String),
    Action(Action),
}

impl From<&str> for ActionSpec {
    fn from(source: &str) -> Self {
        ActionSpec::Text(source.to_owned())
    }
}

impl From<String> for ActionSpec {
    fn from(source: String) -> Self {
        ActionSpec::Text(source)
    }
}

impl From<Action> for ActionSpec {
    fn from(action: Action) -> Self {
        ActionSpec::Action(action)
    }
}

impl Action {
    /// Build an action from statement text, or return an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the text is not a list of assignments.
    pub fn make(spec: impl Into<ActionSpec>) -> Result<Self, ParseError> {
        match spec.into() {
            ActionSpec::Text(source) => Self::statement(&source),
            ActionSpec::Action(action) => Ok(action),
        }
    }

    /// Parse assignment statements.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `source` is not a list of assignments.
    pub fn statement(source: &str) -> Result<Self, ParseError> {
        Ok(Action::Statement(StatementAction {
            source: source.to_owned(),
            statements: parse_statements(source)?,
        }))
    }

    /// Wrap a function returning column updates. It is called with only the
    /// declared `parameters` bound.
    pub fn function<F>(name: &str, parameters: &[&str], function: F) -> Self
    where
        F: Fn(&mut Args<'_>) -> Result<Updates, EvalError> + Send + Sync + 'static,
    {
        Action::Callable(CallableAction {
            name: name.to_owned(),
            description: None,
            parameters: parameters.iter().map(|&p| p.to_owned()).collect(),
            function: Arc::new(function),
        })
    }

    /// Attach a description to a callable action. Statement actions are
    /// returned unchanged.
    #[must_use]
    pub fn with_description(self, description: &str) -> Self {
        match self {
            Action::Callable(mut callable) => {
                callable.description = Some(description.to_owned());
                Action::Callable(callable)
            }
            statement @ Action::Statement(_) => statement,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Action::Statement(_) => None,
            Action::Callable(callable) => Some(&callable.name),
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Action::Statement(_) => None,
            Action::Callable(callable) => callable.description.as_deref(),
        }
    }

    /// Compute updates against `data`, discarding warnings.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if the statements or the function fail.
    pub fn apply(&self, data: &Dataset, extra: &Bindings) -> Result<Updates, EvalError> {
        self.apply_with(data, extra, &mut Vec::new())
    }

    /// Compute updates against `data`, collecting warnings into `warnings`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if the statements or the function fail.
    pub fn apply_with(
        &self,
        data: &Dataset,
        extra: &Bindings,
        warnings: &mut Vec<Warning>,
    ) -> Result<Updates, EvalError> {
        match self {
            Action::Statement(action) => {
                let mut scope = Scope::new(data, extra, warnings);
                exec(&action.statements, &mut scope)?;
                Ok(scope.into_locals().into_iter().collect())
            }
            Action::Callable(callable) => {
                let mut args =
                    Args::bind(&callable.name, &callable.parameters, data, extra, warnings)?;
                (callable.function)(&mut args)
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Statement(action) => {
                for (i, statement) in action.statements.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{statement}")?;
                }
                Ok(())
            }
            Action::Callable(callable) => {
                write!(f, "{}({})", callable.name, callable.parameters.join(", "))
            }
        }
    }
}
