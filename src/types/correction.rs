use std::fmt;

use tracing::{debug, warn};

use super::action::{Action, ActionSpec};
use super::condition::{Condition, ConditionSpec};
use super::dataset::Dataset;
use super::datum::{Bindings, Datum};
use super::error::{EvalError, SpecificationError};
use super::report::CorrectionSummary;
use super::rule::fallback_name;
use super::value::Value;
use super::warning::Warning;

/// A trigger condition paired with an action. The action's updates are
/// written only into the rows the trigger selects.
///
/// # Example
///
/// ```
/// use datarules::{Correction, Dataset, Value};
///
/// let fix = Correction::new("age < 0", "age = 0").unwrap();
/// let mut data = Dataset::new().with_column("age", [-1_i64, 30]).unwrap();
///
/// let result = fix.run(&mut data);
/// assert_eq!(result.applied(), Some(&[true, false][..]));
/// assert_eq!(data.column("age").unwrap(), &[Value::Int(0), Value::Int(30)]);
/// ```
#[derive(Debug, Clone)]
pub struct Correction {
    name: String,
    description: Option<String>,
    tags: Vec<String>,
    trigger: Condition,
    action: Action,
}

/// Builder for a [`Correction`].
#[derive(Debug)]
#[must_use]
pub struct CorrectionBuilder {
    trigger: ConditionSpec,
    action: ActionSpec,
    name: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    rewrite: bool,
}

impl CorrectionBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a text trigger is rewritten to elementwise form. Defaults to
    /// `true`. Actions are never rewritten.
    pub fn rewrite(mut self, rewrite: bool) -> Self {
        self.rewrite = rewrite;
        self
    }

    /// Build the correction. Without an explicit name, a callable action's
    /// name is used, else a generated `correction_<n>`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::Parse`] if the trigger or action text is
    /// malformed.
    pub fn build(self) -> Result<Correction, SpecificationError> {
        let trigger = Condition::make(self.trigger, self.rewrite)?;
        let action = Action::make(self.action)?;
        let name = self
            .name
            .or_else(|| action.name().map(str::to_owned))
            .unwrap_or_else(|| fallback_name("correction"));
        let description = self
            .description
            .or_else(|| action.description().map(str::to_owned));
        Ok(Correction {
            name,
            description,
            tags: self.tags,
            trigger,
            action,
        })
    }
}

impl Correction {
    pub fn builder(
        trigger: impl Into<ConditionSpec>,
        action: impl Into<ActionSpec>,
    ) -> CorrectionBuilder {
        CorrectionBuilder {
            trigger: trigger.into(),
            action: action.into(),
            name: None,
            description: None,
            tags: Vec::new(),
            rewrite: true,
        }
    }

    /// Shorthand for `Correction::builder(trigger, action).build()`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::Parse`] if the trigger or action text is
    /// malformed.
    pub fn new(
        trigger: impl Into<ConditionSpec>,
        action: impl Into<ActionSpec>,
    ) -> Result<Self, SpecificationError> {
        Self::builder(trigger, action).build()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn trigger(&self) -> &Condition {
        &self.trigger
    }

    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn run<'a>(&'a self, data: &mut Dataset) -> CorrectionResult<'a> {
        self.run_with(data, &Bindings::new())
    }

    /// Apply the correction to `data` in place. Errors from the trigger, the
    /// action or the merge are captured in the result and leave `data`
    /// untouched.
    pub fn run_with<'a>(&'a self, data: &mut Dataset, extra: &Bindings) -> CorrectionResult<'a> {
        let mut warnings = Vec::new();
        let (applied, error) = match self.try_apply(data, extra, &mut warnings) {
            Ok(mask) => (Some(mask), None),
            Err(err) => {
                warn!(rule = %self.name, error = %err, "correction raised an error");
                (None, Some(err))
            }
        };
        let result = CorrectionResult {
            correction: self,
            applied,
            error,
            warnings,
        };
        debug!(rule = %self.name, applied = result.count_applied(), "ran correction");
        result
    }

    fn try_apply(
        &self,
        data: &mut Dataset,
        extra: &Bindings,
        warnings: &mut Vec<Warning>,
    ) -> Result<Vec<bool>, EvalError> {
        let triggered = self.trigger.evaluate_with(data, extra, warnings)?;
        let mask = to_mask(triggered, data.len())?;
        let updates = self.action.apply_with(data, extra, warnings)?;
        data.apply_updates(&updates, &mask)?;
        Ok(mask)
    }
}

// A missing trigger value never selects its row.
fn to_mask(triggered: Datum, rows: usize) -> Result<Vec<bool>, EvalError> {
    triggered
        .broadcast(rows)?
        .iter()
        .map(|value| match value {
            Value::Bool(b) => Ok(*b),
            v if v.is_missing() => Ok(false),
            other => Err(EvalError::NonBoolean(other.type_name())),
        })
        .collect()
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "correction {}: if {} then {}",
            self.name, self.trigger, self.action
        )
    }
}

/// The outcome of applying one [`Correction`] to one dataset.
#[derive(Debug, Clone)]
#[must_use]
pub struct CorrectionResult<'a> {
    correction: &'a Correction,
    applied: Option<Vec<bool>>,
    error: Option<EvalError>,
    warnings: Vec<Warning>,
}

impl<'a> CorrectionResult<'a> {
    #[must_use]
    pub fn correction(&self) -> &'a Correction {
        self.correction
    }

    /// The trigger mask the action was applied under, or `None` on error.
    #[must_use]
    pub fn applied(&self) -> Option<&[bool]> {
        self.applied.as_deref()
    }

    /// Number of rows the action was written into.
    #[must_use]
    pub fn count_applied(&self) -> usize {
        self.applied
            .as_ref()
            .map_or(0, |mask| mask.iter().filter(|&&b| b).count())
    }

    #[must_use]
    pub fn error(&self) -> Option<&EvalError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn summary(&self) -> CorrectionSummary {
        CorrectionSummary {
            name: self.correction.name.clone(),
            trigger: self.correction.trigger.to_string(),
            action: self.correction.action.to_string(),
            applied: self.count_applied(),
            error: self.error.as_ref().map(ToString::to_string),
            warnings: self.warnings.len(),
        }
    }
}

impl fmt::Display for CorrectionResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: applied to {} rows",
            self.correction.name,
            self.count_applied()
        )?;
        if let Some(err) = &self.error {
            write!(f, ", error: {err}")?;
        }
        Ok(())
    }
}
