use std::cmp::Ordering;
use std::fmt;

use super::Value;

/// Comparison operators supported in expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub(crate) fn matches(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Neq => ord != Ordering::Equal,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Gte => ord != Ordering::Less,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Lte => ord != Ordering::Greater,
        }
    }
}

/// Short-circuiting scalar boolean operators (`and`, `or`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    /// The elementwise operator with the same truth table.
    #[must_use]
    pub fn elementwise(self) -> BinaryOp {
        match self {
            BoolOp::And => BinaryOp::BitAnd,
            BoolOp::Or => BinaryOp::BitOr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// Elementwise AND (`&`).
    BitAnd,
    /// Elementwise OR (`|`).
    BitOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Scalar `not`.
    Not,
    /// Arithmetic negation (`-`).
    Neg,
    /// Elementwise negation (`~`).
    Invert,
}

/// Expression syntax tree. Trees are never mutated in place; the rewriter
/// builds new trees.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A possibly chained comparison: `left op0 rest[0] op1 rest[1] ...`.
    Compare {
        left: Box<Expr>,
        rest: Vec<(CompareOp, Expr)>,
    },
    /// An n-ary `and` / `or` with at least two operands.
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Call {
        function: String,
        args: Vec<Expr>,
    },
}

/// Augmented assignment operators in action statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    /// The arithmetic operator applied by an augmented assignment.
    #[must_use]
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
        }
    }
}

/// A single assignment such as `age = 0` or `score *= 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub target: String,
    pub op: AssignOp,
    pub value: Expr,
}

// Binding strength, loosest first.
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_COMPARE: u8 = 4;
const PREC_BITOR: u8 = 5;
const PREC_BITAND: u8 = 6;
const PREC_ADD: u8 = 7;
const PREC_MUL: u8 = 8;
const PREC_UNARY: u8 = 9;
const PREC_ATOM: u8 = 10;

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::BitOr => PREC_BITOR,
            BinaryOp::BitAnd => PREC_BITAND,
            BinaryOp::Add | BinaryOp::Sub => PREC_ADD,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => PREC_MUL,
        }
    }
}

impl Expr {
    #[must_use]
    pub fn name(name: &str) -> Expr {
        Expr::Name(name.to_owned())
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }

    #[must_use]
    pub fn compare(self, op: CompareOp, other: Expr) -> Expr {
        Expr::Compare {
            left: Box::new(self),
            rest: vec![(op, other)],
        }
    }

    #[must_use]
    pub fn binary(self, op: BinaryOp, other: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::BoolOp { op: BoolOp::Or, .. } => PREC_OR,
            Expr::BoolOp { op: BoolOp::And, .. } => PREC_AND,
            Expr::Unary { op: UnaryOp::Not, .. } => PREC_NOT,
            Expr::Compare { .. } => PREC_COMPARE,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { .. } => PREC_UNARY,
            Expr::Literal(Value::Int(i)) if *i < 0 => PREC_UNARY,
            Expr::Literal(Value::Float(f)) if f.is_sign_negative() => PREC_UNARY,
            Expr::Literal(_) | Expr::Name(_) | Expr::Call { .. } => PREC_ATOM,
        }
    }

    /// Writes `self`, parenthesized when it binds looser than `min`.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOp::And => write!(f, "and"),
            BoolOp::Or => write!(f, "or"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::BitAnd => write!(f, "&"),
            BinaryOp::BitOr => write!(f, "|"),
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.binary() {
            None => write!(f, "="),
            Some(op) => write!(f, "{op}="),
        }
    }
}

/// Renders source text with the minimal parentheses needed for the text to
/// parse back into the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Name(name) => write!(f, "{name}"),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => {
                    write!(f, "not ")?;
                    operand.fmt_operand(f, PREC_NOT)
                }
                UnaryOp::Neg => {
                    write!(f, "-")?;
                    operand.fmt_operand(f, PREC_UNARY)
                }
                UnaryOp::Invert => {
                    write!(f, "~")?;
                    operand.fmt_operand(f, PREC_UNARY)
                }
            },
            Expr::Binary { op, left, right } => {
                let prec = op.precedence();
                left.fmt_operand(f, prec)?;
                write!(f, " {op} ")?;
                right.fmt_operand(f, prec + 1)
            }
            Expr::Compare { left, rest } => {
                left.fmt_operand(f, PREC_COMPARE + 1)?;
                for (op, operand) in rest {
                    write!(f, " {op} ")?;
                    operand.fmt_operand(f, PREC_COMPARE + 1)?;
                }
                Ok(())
            }
            Expr::BoolOp { op, values } => {
                let prec = self.precedence();
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {op} ")?;
                    }
                    value.fmt_operand(f, prec + 1)?;
                }
                Ok(())
            }
            Expr::Call { function, args } => {
                write!(f, "{function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.target, self.op, self.value)
    }
}
