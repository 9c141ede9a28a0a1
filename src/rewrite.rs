use std::fmt;

use tracing::trace;

use crate::evaluate::{eval, Scope};
use crate::parse::{parse_expression, ParseError};
use crate::types::{BinaryOp, Bindings, Dataset, Datum, EvalError, Expr, Warning};

/// Rewrite scalar boolean logic into its elementwise equivalent.
///
/// * `a and b and c` becomes `a & b & c`, `a or b` becomes `a | b`.
/// * `a < b < c` becomes `(a < b) & (b < c)`.
///
/// Everything else is rebuilt unchanged around rewritten children. `not` is
/// left alone since it has no chained form. The input tree is not modified,
/// and rewriting an already rewritten tree returns it unchanged.
#[must_use]
pub fn rewrite(expr: &Expr) -> Expr {
    match expr {
        Expr::BoolOp { op, values } => {
            let mut values = values.iter().map(rewrite);
            match values.next() {
                Some(first) => values.fold(first, |acc, value| acc.binary(op.elementwise(), value)),
                None => expr.clone(),
            }
        }
        Expr::Compare { left, rest } if rest.len() > 1 => {
            let mut operands = vec![rewrite(left)];
            operands.extend(rest.iter().map(|(_, operand)| rewrite(operand)));
            let mut pairs = operands
                .windows(2)
                .zip(rest)
                .map(|(pair, (op, _))| pair[0].clone().compare(*op, pair[1].clone()));
            // rest.len() > 1 guarantees at least two pairs.
            let first = pairs.next().unwrap_or_else(|| expr.clone());
            pairs.fold(first, |acc, pair| acc.binary(BinaryOp::BitAnd, pair))
        }
        Expr::Compare { left, rest } => Expr::Compare {
            left: Box::new(rewrite(left)),
            rest: rest
                .iter()
                .map(|(op, operand)| (*op, rewrite(operand)))
                .collect(),
        },
        Expr::Unary { op, operand } => Expr::Unary {
            op: *op,
            operand: Box::new(rewrite(operand)),
        },
        Expr::Binary { op, left, right } => rewrite(left).binary(*op, rewrite(right)),
        Expr::Call { function, args } => Expr::Call {
            function: function.clone(),
            args: args.iter().map(rewrite).collect(),
        },
        Expr::Literal(_) | Expr::Name(_) => expr.clone(),
    }
}

/// Parse `source`, rewrite it, and render the result back to source text.
///
/// # Errors
///
/// Returns [`ParseError`] if `source` is not a valid expression.
pub fn rewrite_source(source: &str) -> Result<String, ParseError> {
    let expr = parse_expression(source)?;
    Ok(rewrite(&expr).to_string())
}

/// A parsed condition expression, ready to be evaluated against datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    source: String,
    expr: Expr,
}

impl CompiledExpr {
    /// Parse `source` and, when `rewrite_enabled`, rewrite it to elementwise form.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `source` is not a valid expression.
    pub fn compile(source: &str, rewrite_enabled: bool) -> Result<Self, ParseError> {
        let parsed = parse_expression(source)?;
        let expr = if rewrite_enabled {
            let rewritten = rewrite(&parsed);
            trace!(source, rewritten = %rewritten, "rewrote expression");
            rewritten
        } else {
            parsed
        };
        Ok(Self {
            source: source.to_owned(),
            expr,
        })
    }

    /// The text the expression was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Names referenced by the expression, in order of first appearance.
    #[must_use]
    pub fn free_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_names(&self.expr, &mut names);
        names
    }

    /// Evaluate against `data`, resolving names that are not columns in `extra`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] on unknown names, type errors, or ambiguous
    /// truth values.
    pub fn evaluate(
        &self,
        data: &Dataset,
        extra: &Bindings,
        warnings: &mut Vec<Warning>,
    ) -> Result<Datum, EvalError> {
        eval(&self.expr, &mut Scope::new(data, extra, warnings))
    }
}

fn collect_names(expr: &Expr, names: &mut Vec<String>) {
    match expr {
        Expr::Name(name) => {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Expr::Literal(_) => {}
        Expr::Unary { operand, .. } => collect_names(operand, names),
        Expr::Binary { left, right, .. } => {
            collect_names(left, names);
            collect_names(right, names);
        }
        Expr::Compare { left, rest } => {
            collect_names(left, names);
            for (_, operand) in rest {
                collect_names(operand, names);
            }
        }
        Expr::BoolOp { values: args, .. } | Expr::Call { args, .. } => {
            for arg in args {
                collect_names(arg, names);
            }
        }
    }
}

/// Renders the compiled (possibly rewritten) expression.
impl fmt::Display for CompiledExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
