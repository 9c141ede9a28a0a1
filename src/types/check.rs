use std::fmt;

use tracing::{debug, warn};

use super::condition::{Condition, ConditionSpec};
use super::dataset::Dataset;
use super::datum::Bindings;
use super::error::{EvalError, SpecificationError};
use super::outcome::Outcome;
use super::report::CheckSummary;
use super::rule::fallback_name;
use super::warning::Warning;

/// A named, read-only validation over a dataset.
///
/// # Example
///
/// ```
/// use datarules::{Check, Dataset};
///
/// let check = Check::builder("0 <= age < 18").name("minor").build().unwrap();
/// let data = Dataset::new().with_column("age", [5_i64, 15, 25, -1]).unwrap();
///
/// let result = check.run(&data);
/// assert_eq!((result.passes(), result.fails(), result.nas()), (2, 2, 0));
/// ```
#[derive(Debug, Clone)]
pub struct Check {
    name: String,
    description: Option<String>,
    tags: Vec<String>,
    condition: Condition,
}

/// Builder for a [`Check`].
#[derive(Debug)]
#[must_use]
pub struct CheckBuilder {
    condition: ConditionSpec,
    name: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    rewrite: bool,
}

impl CheckBuilder {
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

    /// Whether text conditions are rewritten to elementwise form. Defaults to
    /// `true`.
    pub fn rewrite(mut self, rewrite: bool) -> Self {
        self.rewrite = rewrite;
        self
    }

    /// Build the check. Without an explicit name, a callable condition's name
    /// is used, else a generated `condition_<n>`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::Parse`] if a text condition is malformed.
    pub fn build(self) -> Result<Check, SpecificationError> {
        let condition = Condition::make(self.condition, self.rewrite)?;
        let name = self
            .name
            .or_else(|| condition.name().map(str::to_owned))
            .unwrap_or_else(|| fallback_name("condition"));
        let description = self
            .description
            .or_else(|| condition.description().map(str::to_owned));
        Ok(Check {
            name,
            description,
            tags: self.tags,
            condition,
        })
    }
}

impl Check {
    pub fn builder(condition: impl Into<ConditionSpec>) -> CheckBuilder {
        CheckBuilder {
            condition: condition.into(),
            name: None,
            description: None,
            tags: Vec::new(),
            rewrite: true,
        }
    }

    /// Shorthand for `Check::builder(condition).build()`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::Parse`] if a text condition is malformed.
    pub fn new(condition: impl Into<ConditionSpec>) -> Result<Self, SpecificationError> {
        Self::builder(condition).build()
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
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// A condition holding where this check fails, named `"<name>.fails"`.
    /// Use it to trigger a correction from a check.
    #[must_use]
    pub fn fails(&self) -> Condition {
        self.condition.negated(&self.name)
    }

    pub fn run<'a>(&'a self, data: &Dataset) -> CheckResult<'a> {
        self.run_with(data, &Bindings::new())
    }

    /// Evaluate the condition and classify every row. Evaluation errors are
    /// captured in the result, which then reports every row as not
    /// applicable.
    pub fn run_with<'a>(&'a self, data: &Dataset, extra: &Bindings) -> CheckResult<'a> {
        let rows = data.len();
        let mut warnings = Vec::new();
        let evaluated = self
            .condition
            .evaluate_with(data, extra, &mut warnings)
            .and_then(|datum| datum.broadcast(rows))
            .and_then(|values| {
                values
                    .iter()
                    .map(Outcome::classify)
                    .collect::<Result<Vec<_>, _>>()
            });
        let (outcomes, error) = match evaluated {
            Ok(outcomes) => (outcomes, None),
            Err(err) => {
                warn!(rule = %self.name, error = %err, "check raised an error");
                (vec![Outcome::NotApplicable; rows], Some(err))
            }
        };
        let result = CheckResult {
            check: self,
            outcomes,
            error,
            warnings,
        };
        debug!(
            rule = %self.name,
            passes = result.passes(),
            fails = result.fails(),
            nas = result.nas(),
            "ran check"
        );
        result
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "check {}: {}", self.name, self.condition)
    }
}

/// The outcome of running one [`Check`] against one dataset.
#[derive(Debug, Clone)]
#[must_use]
pub struct CheckResult<'a> {
    check: &'a Check,
    outcomes: Vec<Outcome>,
    error: Option<EvalError>,
    warnings: Vec<Warning>,
}

impl<'a> CheckResult<'a> {
    #[must_use]
    pub fn check(&self) -> &'a Check {
        self.check
    }

    /// Per-row outcomes, in dataset row order.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Number of rows classified.
    #[must_use]
    pub fn items(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn passes(&self) -> usize {
        self.count(Outcome::Pass)
    }

    #[must_use]
    pub fn fails(&self) -> usize {
        self.count(Outcome::Fail)
    }

    #[must_use]
    pub fn nas(&self) -> usize {
        self.count(Outcome::NotApplicable)
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

    pub fn summary(&self) -> CheckSummary {
        CheckSummary {
            name: self.check.name.clone(),
            condition: self.check.condition.to_string(),
            items: self.items(),
            passes: self.passes(),
            fails: self.fails(),
            nas: self.nas(),
            error: self.error.as_ref().map(ToString::to_string),
            warnings: self.warnings.len(),
        }
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|&&o| o == outcome).count()
    }
}

impl fmt::Display for CheckResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} items, {} passes, {} fails, {} nas",
            self.check.name,
            self.items(),
            self.passes(),
            self.fails(),
            self.nas()
        )?;
        if let Some(err) = &self.error {
            write!(f, ", error: {err}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Datum, Value};

    fn ages() -> Dataset {
        Dataset::new()
            .with_column("age", [5_i64, 15, 25, -1])
            .unwrap()
    }

    #[test]
    fn classifies_rows() {
        let check = Check::new("0 <= age < 18").unwrap();
        let result = check.run(&ages());
        assert_eq!(
            result.outcomes(),
            &[Outcome::Pass, Outcome::Pass, Outcome::Fail, Outcome::Fail]
        );
        assert_eq!(result.items(), 4);
        assert!(!result.has_error());
    }

    #[test]
    fn missing_values_are_not_applicable() {
        let data = Dataset::new()
            .with_column("age", [Value::Int(1), Value::Null])
            .unwrap();
        let check = Check::new("age > 0").unwrap();
        let result = check.run(&data);
        assert_eq!((result.passes(), result.fails(), result.nas()), (1, 0, 1));
    }

    #[test]
    fn scalar_result_is_broadcast() {
        let check = Check::new("True").unwrap();
        let result = check.run(&ages());
        assert_eq!(result.passes(), 4);
    }

    #[test]
    fn evaluation_error_is_captured() {
        let check = Check::builder("agee > 1").name("typo").build().unwrap();
        let result = check.run(&ages());
        assert!(result.has_error());
        assert_eq!(result.error(), Some(&EvalError::UnknownName("agee".into())));
        assert_eq!(result.nas(), 4);
        assert_eq!(result.items(), 4);
    }

    #[test]
    fn non_boolean_result_is_an_error() {
        let check = Check::new("age + 1").unwrap();
        let result = check.run(&ages());
        assert_eq!(result.error(), Some(&EvalError::NonBoolean("int")));
    }

    #[test]
    fn name_falls_back_to_callable_then_generated() {
        let condition = Condition::function("is_positive", &["age"], |args| {
            args.get("age")?.clone().map(|v| {
                Ok(Value::from(v.compare(crate::types::CompareOp::Gt, &Value::Int(0))))
            })
        })
        .with_description("age is positive");
        let check = Check::new(condition).unwrap();
        assert_eq!(check.name(), "is_positive");
        assert_eq!(check.description(), Some("age is positive"));

        let anonymous = Check::new("age > 0").unwrap();
        assert!(anonymous.name().starts_with("condition_"));
    }

    #[test]
    fn warnings_are_collected() {
        let check = Check::new("age / 0 > 1").unwrap();
        let result = check.run(&ages());
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.nas(), 4);
    }

    #[test]
    fn extra_bindings_reach_the_condition() {
        let mut extra = Bindings::new();
        extra.insert("limit".into(), Datum::from(10_i64));
        let check = Check::new("age < limit").unwrap();
        assert_eq!(check.run_with(&ages(), &extra).passes(), 2);
    }

    #[test]
    fn fails_condition_is_named_after_check() {
        let check = Check::builder("age >= 0").name("non_negative").build().unwrap();
        let fails = check.fails();
        assert_eq!(fails.name(), Some("non_negative.fails"));
        let mask = fails.evaluate(&ages(), &Bindings::new()).unwrap();
        assert_eq!(
            mask,
            Datum::Column(vec![
                Value::Bool(false),
                Value::Bool(false),
                Value::Bool(false),
                Value::Bool(true)
            ])
        );
    }

    #[test]
    fn summary_row() {
        let check = Check::builder("age < 18").name("minor").build().unwrap();
        let summary = check.run(&ages()).summary();
        assert_eq!(summary.name, "minor");
        assert_eq!(summary.condition, "age < 18");
        assert_eq!((summary.passes, summary.fails, summary.nas), (3, 1, 0));
        assert_eq!(summary.error, None);
    }
}
