mod action;
mod args;
mod check;
mod condition;
mod correction;
mod dataset;
mod datum;
mod error;
mod expr;
mod outcome;
mod report;
mod rule;
mod ruleset;
mod value;
mod warning;

pub use action::{Action, ActionFn, ActionSpec, CallableAction, StatementAction, Updates};
pub use args::Args;
pub use check::{Check, CheckBuilder, CheckResult};
pub use condition::{CallableCondition, Condition, ConditionFn, ConditionSpec, TextCondition};
pub use correction::{Correction, CorrectionBuilder, CorrectionResult};
pub use dataset::{Dataset, Row};
pub use datum::{Bindings, Datum};
pub use error::{DatasetError, EvalError, SpecificationError};
pub use expr::{AssignOp, BinaryOp, BoolOp, CompareOp, Expr, Statement, UnaryOp};
pub use outcome::Outcome;
pub use report::{CheckReport, CheckSummary, CorrectionReport, CorrectionSummary};
pub use rule::Rule;
pub use ruleset::RuleSet;
pub use value::Value;
pub use warning::Warning;
