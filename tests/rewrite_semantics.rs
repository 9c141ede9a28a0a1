mod strategies;

use datarules::{rewrite_source, Bindings, Condition, Dataset, EvalError};
use proptest::prelude::*;
use strategies::{arb_chain, arb_condition, arb_rows, bools, dataset, scalar_bool};

/// Evaluate `source` row by row with scalar semantics, no rewriting.
fn per_row(source: &str, rows: &[strategies::Row]) -> Vec<bool> {
    let condition = Condition::make(source, false).unwrap();
    rows.iter()
        .map(|row| scalar_bool(&condition.evaluate(&Dataset::new(), &row.bindings()).unwrap()))
        .collect()
}

proptest! {
    /// A rewritten condition over columns agrees with the plain condition
    /// evaluated on each row's scalars.
    #[test]
    fn rewritten_matches_per_row_reference(
        source in arb_condition(),
        rows in arb_rows(),
    ) {
        let condition = Condition::text(&source).unwrap();
        let vectorized = condition.evaluate(&dataset(&rows), &Bindings::new()).unwrap();
        prop_assert_eq!(bools(&vectorized), per_row(&source, &rows));
    }

    /// `a < b < c` behaves like `(a < b) & (b < c)`.
    #[test]
    fn chain_equals_pairwise_conjunction(
        source in arb_chain(),
        rows in arb_rows(),
    ) {
        let data = dataset(&rows);
        let chained = Condition::text(&source).unwrap();
        let pairwise = Condition::make(rewrite_source(&source).unwrap(), false).unwrap();
        prop_assert_eq!(
            chained.evaluate(&data, &Bindings::new()).unwrap(),
            pairwise.evaluate(&data, &Bindings::new()).unwrap()
        );
    }

    /// Rewriting rewritten code changes nothing.
    #[test]
    fn rewrite_is_idempotent(source in arb_condition()) {
        let once = rewrite_source(&source).unwrap();
        let twice = rewrite_source(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Evaluation never panics, whatever the rows.
    #[test]
    fn evaluation_never_panics(source in arb_condition(), rows in arb_rows()) {
        let condition = Condition::text(&source).unwrap();
        let _ = condition.evaluate(&dataset(&rows), &Bindings::new());
    }
}

#[test]
fn unrewritten_chain_over_column_is_ambiguous() {
    let rows = [strategies::Row { x: 1, y: 2 }, strategies::Row { x: 3, y: 4 }];
    let condition = Condition::make("0 < x < 5", false).unwrap();
    assert_eq!(
        condition.evaluate(&dataset(&rows), &Bindings::new()),
        Err(EvalError::AmbiguousTruth("a column"))
    );
}

#[test]
fn unrewritten_and_over_column_is_ambiguous() {
    let rows = [strategies::Row { x: 1, y: 2 }];
    let condition = Condition::make("x > 0 and y > 0", false).unwrap();
    assert!(matches!(
        condition.evaluate(&dataset(&rows), &Bindings::new()),
        Err(EvalError::AmbiguousTruth(_))
    ));
}

#[test]
fn rewritten_forms() {
    assert_eq!(rewrite_source("0 <= x < 18").unwrap(), "(0 <= x) & (x < 18)");
    assert_eq!(rewrite_source("a or b and c").unwrap(), "a | b & c");
    assert_eq!(rewrite_source("x > 1 and y > 1").unwrap(), "(x > 1) & (y > 1)");
    assert_eq!(rewrite_source("x + 1").unwrap(), "x + 1");
}

#[test]
fn rewritten_scalar_code_still_works() {
    let condition = Condition::text("1 < 2 < 3 and True").unwrap();
    let result = condition.evaluate(&Dataset::new(), &Bindings::new()).unwrap();
    assert!(scalar_bool(&result));
}
