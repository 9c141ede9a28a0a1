use winnow::ascii::{digit1, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, separated, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::types::{AssignOp, BinaryOp, BoolOp, CompareOp, Expr, Statement, UnaryOp, Value};

const KEYWORDS: &[&str] = &[
    "and", "or", "not", "True", "False", "None", "true", "false", "null",
];

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1, |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn keyword<'i>(kw: &'static str) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    ident.verify(move |s: &str| s == kw)
}

fn name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    ident
        .verify(|s: &str| !KEYWORDS.contains(&s))
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote = alt(('"', '\'')).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => match any.parse_next(input)? {
                'n' => s.push('\n'),
                't' => s.push('\t'),
                c @ ('"' | '\'' | '\\') => s.push(c),
                other => {
                    s.push('\\');
                    s.push(other);
                }
            },
            c => s.push(c),
        }
    }
}

fn exponent<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)
        .take()
        .parse_next(input)
}

/// Unsigned numeric literal text, and whether it denotes a float.
fn number_text<'i>(input: &mut &'i str) -> ModalResult<(&'i str, bool)> {
    alt((
        (digit1, '.', opt(digit1), opt(exponent))
            .take()
            .map(|text| (text, true)),
        ('.', digit1, opt(exponent)).take().map(|text| (text, true)),
        (digit1, exponent).take().map(|text| (text, true)),
        digit1.map(|text| (text, false)),
    ))
    .parse_next(input)
}

// Integers outside i64 are rejected rather than widened to float.
fn number_value(text: &str, is_float: bool) -> Option<Value> {
    if is_float {
        text.parse::<f64>().ok().map(Value::Float)
    } else {
        text.parse::<i64>().ok().map(Value::Int)
    }
}

fn number(input: &mut &str) -> ModalResult<Value> {
    number_text
        .verify_map(|(text, is_float)| number_value(text, is_float))
        .parse_next(input)
}

/// A numeric literal directly after unary minus, so `i64::MIN` is reachable.
fn negative_number(input: &mut &str) -> ModalResult<Value> {
    number_text
        .verify_map(|(text, is_float)| number_value(&format!("-{text}"), is_float))
        .parse_next(input)
}

fn literal(input: &mut &str) -> ModalResult<Value> {
    alt((
        string_literal.map(Value::String),
        number,
        alt((keyword("True"), keyword("true"))).value(Value::Bool(true)),
        alt((keyword("False"), keyword("false"))).value(Value::Bool(false)),
        alt((keyword("None"), keyword("null"))).value(Value::Null),
    ))
    .parse_next(input)
}

// -- Expressions ------------------------------------------------------------
//
// Loosest first: or, and, not, comparison, |, &, + -, * / %, unary - ~, atom.

fn name_or_call(input: &mut &str) -> ModalResult<Expr> {
    let function = name.parse_next(input)?;
    let args: Option<Vec<Expr>> = opt(preceded(
        (ws, '('),
        cut_err(terminated(separated(0.., expr, (ws, ',')), (ws, ')'))),
    ))
    .parse_next(input)?;
    Ok(match args {
        Some(args) => Expr::Call {
            function: function.to_owned(),
            args,
        },
        None => Expr::name(function),
    })
}

fn atom(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        delimited('(', cut_err(expr), (ws, cut_err(')'))),
        literal.map(Expr::Literal),
        name_or_call,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn unary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    let op = opt(alt(('-'.value(UnaryOp::Neg), '~'.value(UnaryOp::Invert)))).parse_next(input)?;
    let Some(op) = op else {
        return atom(input);
    };
    ws.parse_next(input)?;
    if op == UnaryOp::Neg {
        if let Some(value) = opt(negative_number).parse_next(input)? {
            return Ok(Expr::Literal(value));
        }
    }
    let operand = cut_err(unary).parse_next(input)?;
    Ok(Expr::Unary {
        op,
        operand: Box::new(operand),
    })
}

fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter()
        .fold(first, |acc, (op, right)| acc.binary(op, right))
}

fn term(input: &mut &str) -> ModalResult<Expr> {
    let first = unary(input)?;
    let rest: Vec<(BinaryOp, Expr)> = repeat(
        0..,
        (
            preceded(
                ws,
                alt((
                    '*'.value(BinaryOp::Mul),
                    '/'.value(BinaryOp::Div),
                    '%'.value(BinaryOp::Mod),
                )),
            ),
            cut_err(unary),
        ),
    )
    .parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn arith(input: &mut &str) -> ModalResult<Expr> {
    let first = term(input)?;
    let rest: Vec<(BinaryOp, Expr)> = repeat(
        0..,
        (
            preceded(
                ws,
                alt(('+'.value(BinaryOp::Add), '-'.value(BinaryOp::Sub))),
            ),
            cut_err(term),
        ),
    )
    .parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn bit_and(input: &mut &str) -> ModalResult<Expr> {
    let first = arith(input)?;
    let rest: Vec<(BinaryOp, Expr)> = repeat(
        0..,
        (
            preceded(ws, '&'.value(BinaryOp::BitAnd)),
            cut_err(arith),
        ),
    )
    .parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn bit_or(input: &mut &str) -> ModalResult<Expr> {
    let first = bit_and(input)?;
    let rest: Vec<(BinaryOp, Expr)> = repeat(
        0..,
        (
            preceded(ws, '|'.value(BinaryOp::BitOr)),
            cut_err(bit_and),
        ),
    )
    .parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    ws.parse_next(input)?;
    alt((
        ">=".value(CompareOp::Gte),
        ">".value(CompareOp::Gt),
        "<=".value(CompareOp::Lte),
        "<".value(CompareOp::Lt),
        "==".value(CompareOp::Eq),
        "!=".value(CompareOp::Neq),
    ))
    .parse_next(input)
}

fn comparison(input: &mut &str) -> ModalResult<Expr> {
    let left = bit_or(input)?;
    let rest: Vec<(CompareOp, Expr)> =
        repeat(0.., (compare_op, cut_err(bit_or))).parse_next(input)?;
    if rest.is_empty() {
        return Ok(left);
    }
    Ok(Expr::Compare {
        left: Box::new(left),
        rest,
    })
}

fn not_expr(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    if opt(keyword("not")).parse_next(input)?.is_some() {
        let operand = cut_err(not_expr).parse_next(input)?;
        return Ok(Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        });
    }
    comparison(input)
}

fn bool_op(op: BoolOp, first: Expr, rest: Vec<Expr>) -> Expr {
    if rest.is_empty() {
        return first;
    }
    let mut values = Vec::with_capacity(rest.len() + 1);
    values.push(first);
    values.extend(rest);
    Expr::BoolOp { op, values }
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = not_expr(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, keyword("and")), cut_err(not_expr))).parse_next(input)?;
    Ok(bool_op(BoolOp::And, first, rest))
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, keyword("or")), cut_err(and_expr))).parse_next(input)?;
    Ok(bool_op(BoolOp::Or, first, rest))
}

fn expr(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Top-level parsers ------------------------------------------------------

pub(super) fn expression(input: &mut &str) -> ModalResult<Expr> {
    let parsed = expr(input)?;
    ws.parse_next(input)?;
    Ok(parsed)
}

fn assign_op(input: &mut &str) -> ModalResult<AssignOp> {
    alt((
        "+=".value(AssignOp::Add),
        "-=".value(AssignOp::Sub),
        "*=".value(AssignOp::Mul),
        "/=".value(AssignOp::Div),
        terminated('=', not('=')).value(AssignOp::Assign),
    ))
    .parse_next(input)
}

fn statement(input: &mut &str) -> ModalResult<Statement> {
    ws.parse_next(input)?;
    let target = name.parse_next(input)?;
    ws.parse_next(input)?;
    let op = cut_err(assign_op)
        .context(StrContext::Expected(StrContextValue::Description(
            "assignment operator",
        )))
        .parse_next(input)?;
    let value = cut_err(expr).parse_next(input)?;
    Ok(Statement {
        target: target.to_owned(),
        op,
        value,
    })
}

// Spaces, tabs and comments, but not line endings.
fn inline_ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., [' ', '\t', '\r']).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

fn statement_sep(input: &mut &str) -> ModalResult<()> {
    (inline_ws, alt((';', '\n'))).void().parse_next(input)
}

pub(super) fn statements(input: &mut &str) -> ModalResult<Vec<Statement>> {
    let parsed: Vec<Statement> = separated(1.., statement, statement_sep).parse_next(input)?;
    opt(statement_sep).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use crate::parse::{parse_expression, parse_statements};

    use super::*;

    fn parse(input: &str) -> Expr {
        parse_expression(input).unwrap()
    }

    #[test]
    fn parse_single_comparison() {
        let expr = parse("age >= 18");
        assert_eq!(
            expr,
            Expr::name("age").compare(CompareOp::Gte, Expr::literal(18_i64))
        );
    }

    #[test]
    fn parse_chained_comparison() {
        match parse("0 <= age < 18") {
            Expr::Compare { left, rest } => {
                assert_eq!(*left, Expr::literal(0_i64));
                assert_eq!(rest.len(), 2);
                assert_eq!(rest[0].0, CompareOp::Lte);
                assert_eq!(rest[1].0, CompareOp::Lt);
            }
            other => panic!("expected Compare, got {other:?}"),
        }
    }

    #[test]
    fn parse_and_is_flattened() {
        match parse("a and b and c") {
            Expr::BoolOp { op, values } => {
                assert_eq!(op, BoolOp::And);
                assert_eq!(values.len(), 3);
            }
            other => panic!("expected BoolOp, got {other:?}"),
        }
    }

    #[test]
    fn parse_precedence_and_before_or() {
        match parse("a or b and c") {
            Expr::BoolOp { op, values } => {
                assert_eq!(op, BoolOp::Or);
                assert_eq!(values[0], Expr::name("a"));
                assert!(matches!(values[1], Expr::BoolOp { op: BoolOp::And, .. }));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn parse_parenthesized_grouping() {
        match parse("(a or b) and c") {
            Expr::BoolOp { op, values } => {
                assert_eq!(op, BoolOp::And);
                assert!(matches!(values[0], Expr::BoolOp { op: BoolOp::Or, .. }));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn parse_not_binds_looser_than_comparison() {
        match parse("not x == 1") {
            Expr::Unary { op, operand } => {
                assert_eq!(op, UnaryOp::Not);
                assert!(matches!(*operand, Expr::Compare { .. }));
            }
            other => panic!("expected Not, got {other:?}"),
        }
    }

    #[test]
    fn parse_elementwise_binds_tighter_than_comparison() {
        match parse("a & b == c") {
            Expr::Compare { left, .. } => {
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::BitAnd, .. }));
            }
            other => panic!("expected Compare, got {other:?}"),
        }
    }

    #[test]
    fn parse_arithmetic_precedence() {
        let expr = parse("1 + 2 * x");
        assert_eq!(
            expr,
            Expr::literal(1_i64).binary(
                BinaryOp::Add,
                Expr::literal(2_i64).binary(BinaryOp::Mul, Expr::name("x"))
            )
        );
    }

    #[test]
    fn parse_all_comparison_ops() {
        let ops = [
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Neq),
            (">", CompareOp::Gt),
            (">=", CompareOp::Gte),
            ("<", CompareOp::Lt),
            ("<=", CompareOp::Lte),
        ];
        for (sym, expected_op) in ops {
            match parse(&format!("x {sym} 1")) {
                Expr::Compare { rest, .. } => assert_eq!(rest[0].0, expected_op, "failed for {sym}"),
                other => panic!("expected Compare for {sym}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_all_literal_types() {
        let cases = [
            ("42", Value::Int(42)),
            ("2.5", Value::Float(2.5)),
            ("-5", Value::Int(-5)),
            ("True", Value::Bool(true)),
            ("false", Value::Bool(false)),
            ("None", Value::Null),
            (r#""hello""#, Value::String("hello".into())),
            ("'single'", Value::String("single".into())),
        ];
        for (literal, expected) in cases {
            assert_eq!(parse(literal), Expr::Literal(expected), "failed for {literal}");
        }
    }

    #[test]
    fn parse_string_with_escapes() {
        assert_eq!(
            parse(r#""a\"b\\c""#),
            Expr::literal("a\"b\\c")
        );
    }

    #[test]
    fn parse_call() {
        assert_eq!(
            parse("isna(x)"),
            Expr::Call {
                function: "isna".into(),
                args: vec![Expr::name("x")],
            }
        );
    }

    #[test]
    fn keyword_prefix_is_a_name() {
        assert_eq!(parse("android"), Expr::name("android"));
        assert_eq!(parse("not_null"), Expr::name("not_null"));
    }

    #[test]
    fn parse_comments_ignored() {
        assert_eq!(parse("# header\nx # trailing"), Expr::name("x"));
    }

    #[test]
    fn parse_rejects_trailing_input() {
        assert!(parse_expression("x y").is_err());
        assert!(parse_expression("(x").is_err());
        assert!(parse_expression("x <").is_err());
        assert!(parse_expression("").is_err());
    }

    #[test]
    fn parse_statements_with_separators() {
        let parsed = parse_statements("age = 0; flag = True\nscore *= 2").unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].target, "age");
        assert_eq!(parsed[0].op, AssignOp::Assign);
        assert_eq!(parsed[2].op, AssignOp::Mul);
    }

    #[test]
    fn statement_requires_assignment() {
        assert!(parse_statements("age == 0").is_err());
        assert!(parse_statements("age").is_err());
        assert!(parse_statements("").is_err());
    }

    #[test]
    fn statements_need_a_separator() {
        assert!(parse_statements("age = 0 flag = 1").is_err());
        assert!(parse_statements("x = y z = 1").is_err());
        assert_eq!(parse_statements("age = 0 # reset\n\n  flag = 1;").unwrap().len(), 2);
        assert_eq!(parse_statements("age = 0;\r\nflag = 1\n").unwrap().len(), 2);
    }

    #[test]
    fn parse_float_and_extreme_literals() {
        let cases = [
            ("1.", Value::Float(1.0)),
            (".5", Value::Float(0.5)),
            ("1e3", Value::Float(1000.0)),
            ("2.5E-1", Value::Float(0.25)),
            ("-.5", Value::Float(-0.5)),
            ("-9223372036854775808", Value::Int(i64::MIN)),
        ];
        for (literal, expected) in cases {
            assert_eq!(parse(literal), Expr::Literal(expected), "failed for {literal}");
        }
        assert!(parse_expression("9223372036854775808").is_err());
    }
}
