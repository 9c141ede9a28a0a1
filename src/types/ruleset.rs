use std::fmt;
use std::sync::Arc;

use crate::spec::{make_rule, RuleRecord, RuleSpec};

use super::check::Check;
use super::correction::Correction;
use super::dataset::Dataset;
use super::datum::Bindings;
use super::error::SpecificationError;
use super::report::{CheckReport, CorrectionReport};
use super::rule::Rule;

/// An ordered collection of checks and corrections.
///
/// Rules run in insertion order. `add` returns a new set and leaves the
/// original untouched; rules are shared between the two.
///
/// # Example
///
/// ```
/// use datarules::{Check, Correction, Dataset, RuleSet, Value};
///
/// let rules = RuleSet::new()
///     .add(Check::builder("0 <= age < 120").name("plausible_age").build().unwrap())
///     .unwrap()
///     .add(Correction::builder("age < 0", "age = 0").name("clamp_age").build().unwrap())
///     .unwrap();
///
/// let data = Dataset::new().with_column("age", [-1_i64, 30]).unwrap();
/// let (fixed, corrections) = rules.apply_corrections(&data);
/// assert_eq!(corrections.total_applied(), 1);
/// assert_eq!(fixed.column("age").unwrap(), &[Value::Int(0), Value::Int(30)]);
///
/// let checks = rules.run_checks(&fixed);
/// assert_eq!(checks.total_failures(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<Rule>>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set from records or ready-made rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`SpecificationError`] raised by a spec.
    pub fn from_specs<I, S>(specs: I) -> Result<Self, SpecificationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<RuleSpec>,
    {
        let rules = specs
            .into_iter()
            .map(|spec| make_rule(spec).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Load a JSON array of rule records.
    ///
    /// ```
    /// use datarules::RuleSet;
    ///
    /// let rules = RuleSet::from_json(r#"[
    ///     {"name": "adult", "condition": "age >= 18"},
    ///     {"name": "clamp", "if": "age < 0", "then": "age = 0"}
    /// ]"#).unwrap();
    /// assert_eq!(rules.to_string(), "RuleSet(2 rules: 1 checks, 1 corrections)");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) for malformed JSON or
    /// unknown fields, and [`Error::Specification`](crate::Error::Specification)
    /// for invalid rules.
    pub fn from_json(input: &str) -> Result<Self, crate::Error> {
        let records: Vec<RuleRecord> = serde_json::from_str(input)?;
        Ok(Self::from_specs(records)?)
    }

    /// Read a file and load it with [`from_json`](Self::from_json).
    ///
    /// # Errors
    ///
    /// Returns [`Error`](crate::Error) on I/O, JSON, or specification failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::Error> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    /// Return a new set with `spec` appended.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError`] if `spec` is not a valid rule.
    pub fn add(&self, spec: impl Into<RuleSpec>) -> Result<RuleSet, SpecificationError> {
        let mut rules = self.rules.clone();
        rules.push(Arc::new(make_rule(spec)?));
        Ok(Self { rules })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|rule| &**rule)
    }

    /// The rule called `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.iter().find(|rule| rule.name() == name)
    }

    pub fn checks(&self) -> impl Iterator<Item = &Check> {
        self.iter().filter_map(Rule::as_check)
    }

    pub fn corrections(&self) -> impl Iterator<Item = &Correction> {
        self.iter().filter_map(Rule::as_correction)
    }

    /// Run every check against `data`. The dataset is never modified.
    pub fn run_checks(&self, data: &Dataset) -> CheckReport<'_> {
        self.run_checks_with(data, &Bindings::new())
    }

    pub fn run_checks_with(&self, data: &Dataset, extra: &Bindings) -> CheckReport<'_> {
        let results = self
            .checks()
            .map(|check| check.run_with(data, extra))
            .collect();
        CheckReport::new(results, data.index().to_vec())
    }

    /// Apply every correction, in order, to a copy of `data`. Returns the
    /// corrected copy; the caller's dataset is not modified.
    pub fn apply_corrections(&self, data: &Dataset) -> (Dataset, CorrectionReport<'_>) {
        self.apply_corrections_with(data, &Bindings::new())
    }

    pub fn apply_corrections_with(
        &self,
        data: &Dataset,
        extra: &Bindings,
    ) -> (Dataset, CorrectionReport<'_>) {
        let mut copy = data.clone();
        let report = self.apply_corrections_in_place_with(&mut copy, extra);
        (copy, report)
    }

    /// Apply every correction, in order, directly to `data`. Each correction
    /// sees the writes of the ones before it.
    pub fn apply_corrections_in_place(&self, data: &mut Dataset) -> CorrectionReport<'_> {
        self.apply_corrections_in_place_with(data, &Bindings::new())
    }

    pub fn apply_corrections_in_place_with(
        &self,
        data: &mut Dataset,
        extra: &Bindings,
    ) -> CorrectionReport<'_> {
        let results = self
            .corrections()
            .map(|correction| correction.run_with(data, extra))
            .collect();
        CorrectionReport::new(results)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} rules: {} checks, {} corrections)",
            self.len(),
            self.checks().count(),
            self.corrections().count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn rules() -> RuleSet {
        RuleSet::new()
            .add(Check::builder("age >= 0").name("non_negative").build().unwrap())
            .unwrap()
            .add(Correction::builder("age < 0", "age = 0").name("clamp").build().unwrap())
            .unwrap()
            .add(
                Correction::builder("age == 0", "newborn = True")
                    .name("flag_newborn")
                    .build()
                    .unwrap(),
            )
            .unwrap()
    }

    fn ages() -> Dataset {
        Dataset::new().with_column("age", [-1_i64, 30]).unwrap()
    }

    #[test]
    fn add_returns_a_new_set() {
        let base = RuleSet::new();
        let extended = base
            .add(Check::new("x > 0").unwrap())
            .unwrap();
        assert!(base.is_empty());
        assert_eq!(extended.len(), 1);
    }

    #[test]
    fn splits_checks_and_corrections() {
        let rules = rules();
        assert_eq!(rules.checks().count(), 1);
        assert_eq!(rules.corrections().count(), 2);
        assert!(rules.get("clamp").is_some());
        assert_eq!(
            rules.to_string(),
            "RuleSet(3 rules: 1 checks, 2 corrections)"
        );
    }

    #[test]
    fn corrections_see_earlier_writes() {
        let rules = rules();
        let data = ages();
        let (fixed, report) = rules.apply_corrections(&data);
        assert_eq!(data, ages());
        assert_eq!(report.len(), 2);
        assert_eq!(
            fixed.column("newborn").unwrap(),
            &[Value::Bool(true), Value::Null]
        );
    }

    #[test]
    fn in_place_mutates_caller_data() {
        let rules = rules();
        let mut data = ages();
        let report = rules.apply_corrections_in_place(&mut data);
        assert_eq!(report.total_applied(), 2);
        assert_eq!(data.column("age").unwrap(), &[Value::Int(0), Value::Int(30)]);
    }

    #[test]
    fn checks_report_on_index() {
        let rules = rules();
        let report = rules.run_checks(&ages());
        assert_eq!(report.len(), 1);
        assert_eq!(report.total_failures(), 1);
    }
}
