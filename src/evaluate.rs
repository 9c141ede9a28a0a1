use std::collections::HashMap;
use std::fmt;

use crate::types::{
    BinaryOp, BoolOp, Bindings, CompareOp, Dataset, Datum, EvalError, Expr, Statement, UnaryOp,
    Value, Warning,
};

/// Name resolution and diagnostics for one evaluation.
///
/// Names resolve to statement-local assignments first, then dataset columns,
/// then extra bindings.
pub(crate) struct Scope<'a> {
    data: &'a Dataset,
    extra: &'a Bindings,
    locals: HashMap<String, Datum>,
    warnings: &'a mut Vec<Warning>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(data: &'a Dataset, extra: &'a Bindings, warnings: &'a mut Vec<Warning>) -> Self {
        Self {
            data,
            extra,
            locals: HashMap::new(),
            warnings,
        }
    }

    fn lookup(&self, name: &str) -> Result<Datum, EvalError> {
        if let Some(datum) = self.locals.get(name) {
            return Ok(datum.clone());
        }
        if let Some(values) = self.data.column(name) {
            return Ok(Datum::Column(values.to_vec()));
        }
        self.extra
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownName(name.to_owned()))
    }

    pub(crate) fn into_locals(self) -> HashMap<String, Datum> {
        self.locals
    }
}

pub(crate) fn eval(expr: &Expr, scope: &mut Scope<'_>) -> Result<Datum, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(Datum::Scalar(value.clone())),
        Expr::Name(name) => scope.lookup(name),
        Expr::Unary { op, operand } => {
            let operand = eval(operand, scope)?;
            match op {
                UnaryOp::Not => Ok(Datum::from(!truth(&operand)?)),
                UnaryOp::Neg => operand.map(negate),
                UnaryOp::Invert => operand.map(invert),
            }
        }
        Expr::Binary { op, left, right } => {
            let left = eval(left, scope)?;
            let right = eval(right, scope)?;
            binary(*op, left, right, expr, scope.warnings)
        }
        Expr::Compare { left, rest } => eval_compare(left, rest, scope),
        Expr::BoolOp { op, values } => eval_bool_op(*op, values, scope),
        Expr::Call { function, args } => {
            let args = args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            call(function, args)
        }
    }
}

/// Run assignments in order; each one is visible to the next.
pub(crate) fn exec(statements: &[Statement], scope: &mut Scope<'_>) -> Result<(), EvalError> {
    for statement in statements {
        let mut value = eval(&statement.value, scope)?;
        if let Some(op) = statement.op.binary() {
            let current = scope.lookup(&statement.target)?;
            value = binary(op, current, value, statement, scope.warnings)?;
        }
        scope.locals.insert(statement.target.clone(), value);
    }
    Ok(())
}

fn truth(datum: &Datum) -> Result<bool, EvalError> {
    match datum {
        Datum::Column(_) => Err(EvalError::AmbiguousTruth("a column")),
        Datum::Scalar(value) => value
            .truthy()
            .ok_or(EvalError::AmbiguousTruth("a null value")),
    }
}

// Short-circuiting, returns the deciding operand itself.
fn eval_bool_op(op: BoolOp, values: &[Expr], scope: &mut Scope<'_>) -> Result<Datum, EvalError> {
    let Some((last, init)) = values.split_last() else {
        return Ok(Datum::Scalar(Value::Null));
    };
    for value in init {
        let datum = eval(value, scope)?;
        let decided = match op {
            BoolOp::And => !truth(&datum)?,
            BoolOp::Or => truth(&datum)?,
        };
        if decided {
            return Ok(datum);
        }
    }
    eval(last, scope)
}

// A chain needs the truth of every intermediate link, so it only works on
// scalars unless it has a single operator.
fn eval_compare(
    left: &Expr,
    rest: &[(CompareOp, Expr)],
    scope: &mut Scope<'_>,
) -> Result<Datum, EvalError> {
    let mut lhs = eval(left, scope)?;
    let mut result = Datum::from(true);
    for (i, (op, operand)) in rest.iter().enumerate() {
        let rhs = eval(operand, scope)?;
        result = compare(*op, lhs, rhs.clone())?;
        if i + 1 < rest.len() && !truth(&result)? {
            return Ok(result);
        }
        lhs = rhs;
    }
    Ok(result)
}

pub(crate) fn compare(op: CompareOp, left: Datum, right: Datum) -> Result<Datum, EvalError> {
    left.zip_with(right, |a, b| {
        if a.is_null() || b.is_null() {
            return Ok(Value::Null);
        }
        match (a.compare(op, b), op) {
            (Some(result), _) => Ok(Value::Bool(result)),
            (None, CompareOp::Eq) => Ok(Value::Bool(false)),
            (None, CompareOp::Neq) => Ok(Value::Bool(true)),
            (None, _) => Err(mismatch(&op.to_string(), a, b)),
        }
    })
}

fn binary(
    op: BinaryOp,
    left: Datum,
    right: Datum,
    site: &dyn fmt::Display,
    warnings: &mut Vec<Warning>,
) -> Result<Datum, EvalError> {
    let mut divided_by_zero = false;
    let result = left.zip_with(right, |a, b| match op {
        BinaryOp::BitAnd => and(a, b),
        BinaryOp::BitOr => or(a, b),
        BinaryOp::Add => add(a, b),
        BinaryOp::Sub => arithmetic(op, a, b, i64::checked_sub, |x, y| x - y),
        BinaryOp::Mul => arithmetic(op, a, b, i64::checked_mul, |x, y| x * y),
        BinaryOp::Div | BinaryOp::Mod => {
            let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) else {
                return null_or_mismatch(op, a, b);
            };
            if y == 0.0 {
                divided_by_zero = true;
                return Ok(Value::Null);
            }
            if op == BinaryOp::Div {
                return Ok(Value::Float(x / y));
            }
            match (a, b) {
                (Value::Int(i), Value::Int(j)) => floor_mod(*i, *j).map(Value::Int),
                _ => Ok(Value::Float(x - y * (x / y).floor())),
            }
        }
    })?;
    if divided_by_zero {
        // A rewritten chain evaluates its shared operand once per link.
        let warning = Warning::new(format!("division by zero in '{site}' produced null"));
        if !warnings.contains(&warning) {
            warnings.push(warning);
        }
    }
    Ok(result)
}

// Three-valued AND: false wins over null.
fn and(a: &Value, b: &Value) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::Bool(false), Value::Bool(_) | Value::Null)
        | (Value::Null, Value::Bool(false)) => Ok(Value::Bool(false)),
        (Value::Bool(true), Value::Bool(true)) => Ok(Value::Bool(true)),
        (Value::Bool(true) | Value::Null, Value::Null) | (Value::Null, Value::Bool(true)) => {
            Ok(Value::Null)
        }
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x & y)),
        _ => Err(mismatch("&", a, b)),
    }
}

// Three-valued OR: true wins over null.
fn or(a: &Value, b: &Value) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::Bool(true), Value::Bool(_) | Value::Null) | (Value::Null, Value::Bool(true)) => {
            Ok(Value::Bool(true))
        }
        (Value::Bool(false), Value::Bool(false)) => Ok(Value::Bool(false)),
        (Value::Bool(false) | Value::Null, Value::Null) | (Value::Null, Value::Bool(false)) => {
            Ok(Value::Null)
        }
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x | y)),
        _ => Err(mismatch("|", a, b)),
    }
}

pub(crate) fn invert(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        Value::Null => Ok(Value::Null),
        Value::Int(i) => Ok(Value::Int(!i)),
        other => Err(EvalError::TypeMismatch {
            op: "~".to_owned(),
            left: other.type_name(),
            right: other.type_name(),
        }),
    }
}

fn negate(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Int(i) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| EvalError::Overflow("-".to_owned())),
        Value::Float(f) => Ok(Value::Float(-f)),
        Value::Null => Ok(Value::Null),
        other => Err(EvalError::TypeMismatch {
            op: "-".to_owned(),
            left: other.type_name(),
            right: other.type_name(),
        }),
    }
}

fn add(a: &Value, b: &Value) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Ok(Value::String(format!("{x}{y}"))),
        _ => arithmetic(BinaryOp::Add, a, b, i64::checked_add, |x, y| x + y),
    }
}

fn arithmetic(
    op: BinaryOp,
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        return int_op(*x, *y)
            .map(Value::Int)
            .ok_or_else(|| EvalError::Overflow(op.to_string()));
    }
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => Ok(Value::Float(float_op(x, y))),
        _ => null_or_mismatch(op, a, b),
    }
}

// Result takes the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> Result<i64, EvalError> {
    let r = a
        .checked_rem(b)
        .ok_or_else(|| EvalError::Overflow("%".to_owned()))?;
    Ok(if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
}

fn null_or_mismatch(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, EvalError> {
    if a.is_null() || b.is_null() {
        Ok(Value::Null)
    } else {
        Err(mismatch(&op.to_string(), a, b))
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn mismatch(op: &str, a: &Value, b: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op: op.to_owned(),
        left: a.type_name(),
        right: b.type_name(),
    }
}

// -- Built-in functions -----------------------------------------------------

type Builtin = fn(&Value) -> Result<Value, EvalError>;

fn builtin(name: &str) -> Option<Builtin> {
    let f: Builtin = match name {
        "isna" => |v: &Value| Ok(Value::Bool(v.is_missing())),
        "notna" => |v: &Value| Ok(Value::Bool(!v.is_missing())),
        "abs" => |v: &Value| match v {
            Value::Int(i) => i
                .checked_abs()
                .map(Value::Int)
                .ok_or_else(|| EvalError::Overflow("abs".to_owned())),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            Value::Null => Ok(Value::Null),
            other => Err(mismatch("abs", other, other)),
        },
        "len" => |v: &Value| match v {
            Value::String(s) => Ok(Value::Int(i64::try_from(s.chars().count()).unwrap_or(i64::MAX))),
            Value::Null => Ok(Value::Null),
            other => Err(mismatch("len", other, other)),
        },
        "lower" => |v: &Value| match v {
            Value::String(s) => Ok(Value::String(s.to_lowercase())),
            Value::Null => Ok(Value::Null),
            other => Err(mismatch("lower", other, other)),
        },
        "upper" => |v: &Value| match v {
            Value::String(s) => Ok(Value::String(s.to_uppercase())),
            Value::Null => Ok(Value::Null),
            other => Err(mismatch("upper", other, other)),
        },
        _ => return None,
    };
    Some(f)
}

fn call(function: &str, args: Vec<Datum>) -> Result<Datum, EvalError> {
    let f = builtin(function).ok_or_else(|| EvalError::UnknownFunction(function.to_owned()))?;
    let actual = args.len();
    let [arg]: [Datum; 1] = args.try_into().map_err(|_| EvalError::Arity {
        function: function.to_owned(),
        expected: 1,
        actual,
    })?;
    arg.map(f)
}
