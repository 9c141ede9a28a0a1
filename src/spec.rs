use serde::Deserialize;

use crate::types::{Check, Correction, Rule, SpecificationError};

/// A rule as written in configuration.
///
/// A record with a `trigger` (alias `if`) is a correction and needs an
/// `action` (alias `then`). Any other record is a check and needs a
/// `condition`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub condition: Option<String>,
    #[serde(default = "default_rewrite")]
    pub rewrite: bool,
    #[serde(alias = "if")]
    pub trigger: Option<String>,
    #[serde(alias = "then")]
    pub action: Option<String>,
}

fn default_rewrite() -> bool {
    true
}

impl Default for RuleRecord {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            tags: Vec::new(),
            condition: None,
            rewrite: default_rewrite(),
            trigger: None,
            action: None,
        }
    }
}

impl RuleRecord {
    /// A check record.
    #[must_use]
    pub fn check(condition: &str) -> Self {
        Self {
            condition: Some(condition.to_owned()),
            ..Self::default()
        }
    }

    /// A correction record.
    #[must_use]
    pub fn correction(trigger: &str, action: &str) -> Self {
        Self {
            trigger: Some(trigger.to_owned()),
            action: Some(action.to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    fn into_rule(self) -> Result<Rule, SpecificationError> {
        let RuleRecord {
            name,
            description,
            tags,
            condition,
            rewrite,
            trigger,
            action,
        } = self;
        let label = || name.clone().unwrap_or_else(|| "<unnamed>".to_owned());
        match trigger {
            Some(trigger) => {
                if condition.is_some() {
                    return Err(SpecificationError::UnexpectedField {
                        rule: label(),
                        field: "condition",
                    });
                }
                let action = action.ok_or_else(|| SpecificationError::MissingField {
                    rule: label(),
                    field: "action",
                })?;
                let mut builder = Correction::builder(trigger, action)
                    .tags(tags)
                    .rewrite(rewrite);
                if let Some(name) = &name {
                    builder = builder.name(name);
                }
                if let Some(description) = &description {
                    builder = builder.description(description);
                }
                Ok(Rule::Correction(builder.build()?))
            }
            None => {
                if action.is_some() {
                    return Err(SpecificationError::UnexpectedField {
                        rule: label(),
                        field: "action",
                    });
                }
                let condition = condition.ok_or_else(|| SpecificationError::MissingField {
                    rule: label(),
                    field: "condition",
                })?;
                let mut builder = Check::builder(condition).tags(tags).rewrite(rewrite);
                if let Some(name) = &name {
                    builder = builder.name(name);
                }
                if let Some(description) = &description {
                    builder = builder.description(description);
                }
                Ok(Rule::Check(builder.build()?))
            }
        }
    }
}

/// Anything a [`RuleSet`](crate::RuleSet) accepts as a rule: a configuration
/// record, or a rule that is already built.
#[derive(Debug, Clone)]
pub enum RuleSpec {
    Record(RuleRecord),
    Rule(Rule),
}

impl From<RuleRecord> for RuleSpec {
    fn from(record: RuleRecord) -> Self {
        RuleSpec::Record(record)
    }
}

impl From<Rule> for RuleSpec {
    fn from(rule: Rule) -> Self {
        RuleSpec::Rule(rule)
    }
}

impl From<Check> for RuleSpec {
    fn from(check: Check) -> Self {
        RuleSpec::Rule(Rule::Check(check))
    }
}

impl From<Correction> for RuleSpec {
    fn from(correction: Correction) -> Self {
        RuleSpec::Rule(Rule::Correction(correction))
    }
}

/// Classify and build a rule. Records with a trigger become corrections,
/// other records become checks; built rules pass through unchanged.
///
/// # Errors
///
/// Returns [`SpecificationError`] for missing or conflicting fields and for
/// malformed expression text.
pub fn make_rule(spec: impl Into<RuleSpec>) -> Result<Rule, SpecificationError> {
    match spec.into() {
        RuleSpec::Record(record) => record.into_rule(),
        RuleSpec::Rule(rule) => Ok(rule),
    }
}
