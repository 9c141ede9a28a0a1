//! Declarative checks and corrections over tabular data.
//!
//! Conditions are written with ordinary boolean syntax (`0 <= age < 18`,
//! `a and b`) and rewritten into elementwise form (`(0 <= age) & (age < 18)`)
//! so a single evaluation covers every row of a [`Dataset`].

mod error;
mod evaluate;
pub mod parse;
mod rewrite;
mod spec;
mod types;

pub use error::Error;
pub use parse::{parse_expression, parse_statements, ParseError};
pub use rewrite::{rewrite, rewrite_source, CompiledExpr};
pub use spec::{make_rule, RuleRecord, RuleSpec};
pub use types::{
    Action, ActionFn, ActionSpec, Args, AssignOp, BinaryOp, Bindings, BoolOp, CallableAction,
    CallableCondition, Check, CheckBuilder, CheckReport, CheckResult, CheckSummary, CompareOp,
    Condition, ConditionFn, ConditionSpec, Correction, CorrectionBuilder, CorrectionReport,
    CorrectionResult, CorrectionSummary, Dataset, DatasetError, Datum, EvalError, Expr, Outcome,
    Row, Rule, RuleSet, SpecificationError, Statement, StatementAction, TextCondition, UnaryOp,
    Updates, Value, Warning,
};
