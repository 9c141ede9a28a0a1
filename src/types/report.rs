use std::fmt;

use serde::Serialize;

use super::check::CheckResult;
use super::correction::CorrectionResult;
use super::dataset::Dataset;
use super::outcome::Outcome;
use super::value::Value;

/// One row of a [`CheckReport`] summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub condition: String,
    pub items: usize,
    pub passes: usize,
    pub fails: usize,
    pub nas: usize,
    pub error: Option<String>,
    pub warnings: usize,
}

/// One row of a [`CorrectionReport`] summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectionSummary {
    pub name: String,
    pub trigger: String,
    pub action: String,
    pub applied: usize,
    pub error: Option<String>,
    pub warnings: usize,
}

/// Results of [`RuleSet::run_checks()`](super::RuleSet::run_checks), one per
/// check in rule order.
#[derive(Debug, Clone)]
#[must_use]
pub struct CheckReport<'a> {
    results: Vec<CheckResult<'a>>,
    index: Vec<Value>,
}

impl<'a> CheckReport<'a> {
    pub(crate) fn new(results: Vec<CheckResult<'a>>, index: Vec<Value>) -> Self {
        Self { results, index }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckResult<'a>> {
        self.results.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The result of the check called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CheckResult<'a>> {
        self.results.iter().find(|r| r.check().name() == name)
    }

    #[must_use]
    pub fn summary(&self) -> Vec<CheckSummary> {
        self.results.iter().map(CheckResult::summary).collect()
    }

    /// Raw per-row results as a dataset on the checked dataset's index: one
    /// column per check, `True`/`False` or `None` when not applicable.
    ///
    /// A check name that repeats keeps only its last result.
    #[must_use]
    pub fn frame(&self) -> Dataset {
        let mut columns: Vec<(String, Vec<Value>)> = Vec::with_capacity(self.results.len());
        for result in &self.results {
            let values = result.outcomes().iter().map(|o| o.to_value()).collect();
            let name = result.check().name();
            match columns.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => *existing = values,
                None => columns.push((name.to_owned(), values)),
            }
        }
        Dataset::from_parts(self.index.clone(), columns)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(CheckResult::has_error)
    }

    /// Failing rows summed over all checks.
    #[must_use]
    pub fn total_failures(&self) -> usize {
        self.results.iter().map(CheckResult::fails).sum()
    }

    /// Rows classified as `outcome` by the check called `name`.
    #[must_use]
    pub fn rows_with(&self, name: &str, outcome: Outcome) -> Vec<&Value> {
        self.get(name).map_or_else(Vec::new, |result| {
            result
                .outcomes()
                .iter()
                .zip(&self.index)
                .filter(|(o, _)| **o == outcome)
                .map(|(_, label)| label)
                .collect()
        })
    }
}

impl<'r, 'a> IntoIterator for &'r CheckReport<'a> {
    type Item = &'r CheckResult<'a>;
    type IntoIter = std::slice::Iter<'r, CheckResult<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl fmt::Display for CheckReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, result) in self.results.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{result}")?;
        }
        Ok(())
    }
}

/// Results of [`RuleSet::apply_corrections()`](super::RuleSet::apply_corrections),
/// one per correction in rule order.
#[derive(Debug, Clone)]
#[must_use]
pub struct CorrectionReport<'a> {
    results: Vec<CorrectionResult<'a>>,
}

impl<'a> CorrectionReport<'a> {
    pub(crate) fn new(results: Vec<CorrectionResult<'a>>) -> Self {
        Self { results }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorrectionResult<'a>> {
        self.results.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The result of the correction called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CorrectionResult<'a>> {
        self.results.iter().find(|r| r.correction().name() == name)
    }

    #[must_use]
    pub fn summary(&self) -> Vec<CorrectionSummary> {
        self.results.iter().map(CorrectionResult::summary).collect()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(CorrectionResult::has_error)
    }

    /// Corrected rows summed over all corrections.
    #[must_use]
    pub fn total_applied(&self) -> usize {
        self.results.iter().map(CorrectionResult::count_applied).sum()
    }
}

impl<'r, 'a> IntoIterator for &'r CorrectionReport<'a> {
    type Item = &'r CorrectionResult<'a>;
    type IntoIter = std::slice::Iter<'r, CorrectionResult<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl fmt::Display for CorrectionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, result) in self.results.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{result}")?;
        }
        Ok(())
    }
}
