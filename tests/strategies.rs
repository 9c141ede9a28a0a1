use datarules::{Bindings, Datum, Dataset, Value};
use proptest::prelude::*;

// --- Fixed column schema ---
// x : i64 (-20..=20)
// y : i64 (-20..=20)

const COLUMNS: &[&str] = &["x", "y"];
const OPS: &[&str] = &["<", "<=", ">", ">=", "==", "!="];

/// One generated row of the fixed schema.
#[derive(Debug, Clone, Copy)]
pub struct Row {
    pub x: i64,
    pub y: i64,
}

impl Row {
    /// Bind the row as scalars, for evaluating against an empty dataset.
    #[must_use]
    pub fn bindings(self) -> Bindings {
        Bindings::from([
            ("x".to_owned(), Datum::from(self.x)),
            ("y".to_owned(), Datum::from(self.y)),
        ])
    }
}

/// Build a dataset with one row per generated row.
///
/// # Panics
///
/// Never with rows from [`arb_rows`]; both columns share a length.
#[must_use]
pub fn dataset(rows: &[Row]) -> Dataset {
    Dataset::new()
        .with_column("x", rows.iter().map(|r| r.x))
        .expect("x column")
        .with_column("y", rows.iter().map(|r| r.y))
        .expect("y column")
}

pub fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((-20_i64..=20, -20_i64..=20), 1..=24)
        .prop_map(|pairs| pairs.into_iter().map(|(x, y)| Row { x, y }).collect())
}

fn arb_operand() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(COLUMNS).prop_map(str::to_owned),
        (-20_i64..=20).prop_map(|n| n.to_string()),
    ]
}

/// A comparison chain of one to three operators, e.g. `0 <= x < y`.
pub fn arb_chain() -> impl Strategy<Value = String> {
    (
        arb_operand(),
        prop::collection::vec((prop::sample::select(OPS), arb_operand()), 1..=3),
    )
        .prop_map(|(first, rest)| {
            let mut source = first;
            for (op, operand) in rest {
                source.push_str(&format!(" {op} {operand}"));
            }
            source
        })
        // a chain needs at least one column to be per-row
        .prop_filter("mentions a column", |s| s.contains('x') || s.contains('y'))
}

/// A bounded tree of chains joined with `and`/`or`, parenthesized at random.
pub fn arb_condition() -> impl Strategy<Value = String> {
    arb_chain().prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} and {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} or {b}")),
            inner.prop_map(|a| format!("({a})")),
        ]
    })
}

/// The boolean at each position of a column result.
///
/// # Panics
///
/// Panics if `datum` is not a column of booleans.
#[must_use]
pub fn bools(datum: &Datum) -> Vec<bool> {
    datum
        .as_column()
        .expect("a column result")
        .iter()
        .map(|v| v.as_bool().expect("a boolean"))
        .collect()
}

/// The boolean a scalar result holds.
///
/// # Panics
///
/// Panics if `datum` is not a boolean scalar.
#[must_use]
pub fn scalar_bool(datum: &Datum) -> bool {
    datum
        .as_scalar()
        .and_then(Value::as_bool)
        .expect("a boolean scalar")
}
