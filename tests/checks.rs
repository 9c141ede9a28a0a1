use datarules::{
    Bindings, Check, Condition, Dataset, Datum, EvalError, Outcome, RuleSet, Value,
};

fn ages() -> Dataset {
    Dataset::new()
        .with_column("age", [5_i64, 15, 25, -1])
        .unwrap()
        .with_index(["ann", "bob", "cy", "dee"])
        .unwrap()
}

#[test]
fn chained_comparison_check_end_to_end() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("datarules=debug")
        .with_test_writer()
        .try_init();

    let check = Check::builder("0 <= age < 18").name("minor").build().unwrap();
    assert_eq!(check.condition().to_string(), "(0 <= age) & (age < 18)");

    let result = check.run(&ages());
    assert_eq!(
        result.outcomes(),
        &[Outcome::Pass, Outcome::Pass, Outcome::Fail, Outcome::Fail]
    );
    assert_eq!((result.passes(), result.fails(), result.nas()), (2, 2, 0));
    assert_eq!(result.to_string(), "minor: 4 items, 2 passes, 2 fails, 0 nas");
}

#[test]
fn check_never_modifies_the_dataset() {
    let data = ages();
    let rules = RuleSet::new()
        .add(Check::new("age > 0").unwrap())
        .unwrap()
        .add(Check::new("agee > 0").unwrap())
        .unwrap();
    let _ = rules.run_checks(&data);
    assert_eq!(data, ages());
}

#[test]
fn nulls_are_not_applicable() {
    let data = Dataset::new()
        .with_column("age", [Value::Int(20), Value::Null, Value::Int(-3)])
        .unwrap();
    let check = Check::new("age >= 0").unwrap();
    let result = check.run(&data);
    assert_eq!(
        result.outcomes(),
        &[Outcome::Pass, Outcome::NotApplicable, Outcome::Fail]
    );
}

#[test]
fn one_failing_check_does_not_stop_the_others() {
    let rules = RuleSet::new()
        .add(Check::builder("agee > 0").name("typo").build().unwrap())
        .unwrap()
        .add(Check::builder("age >= 0").name("non_negative").build().unwrap())
        .unwrap();
    let report = rules.run_checks(&ages());

    assert!(report.has_errors());
    let typo = report.get("typo").unwrap();
    assert_eq!(typo.error(), Some(&EvalError::UnknownName("agee".into())));
    assert_eq!(typo.nas(), 4);

    let ok = report.get("non_negative").unwrap();
    assert!(!ok.has_error());
    assert_eq!(ok.fails(), 1);
    assert_eq!(report.rows_with("non_negative", Outcome::Fail), vec![&Value::from("dee")]);
}

#[test]
fn report_frame_is_indexed_like_the_data() {
    let rules = RuleSet::new()
        .add(Check::builder("age < 18").name("minor").build().unwrap())
        .unwrap();
    let report = rules.run_checks(&ages());
    let frame = report.frame();
    assert_eq!(frame.index(), ages().index());
    assert_eq!(
        frame.column("minor").unwrap(),
        &[
            Value::Bool(true),
            Value::Bool(true),
            Value::Bool(false),
            Value::Bool(true)
        ]
    );
}

#[test]
fn division_by_zero_warns_once() {
    let data = Dataset::new()
        .with_column("a", [1_i64, 2, 3])
        .unwrap()
        .with_column("b", [0_i64, 1, 0])
        .unwrap();
    let check = Check::new("a / b > 1").unwrap();
    let result = check.run(&data);
    assert_eq!(result.warnings().len(), 1);
    assert_eq!(
        result.outcomes(),
        &[Outcome::NotApplicable, Outcome::Pass, Outcome::NotApplicable]
    );
}

#[test]
fn rewrite_disabled_surfaces_ambiguity() {
    let check = Check::builder("0 <= age < 18")
        .rewrite(false)
        .build()
        .unwrap();
    let result = check.run(&ages());
    assert!(matches!(result.error(), Some(EvalError::AmbiguousTruth(_))));
    assert_eq!(result.nas(), 4);
}

#[test]
fn callable_condition_with_extra_arguments() {
    let condition = Condition::function("below", &["age", "limit"], |args| {
        let limit = args.take("limit")?;
        let ages = args.take("age")?;
        ages.zip_with(limit, |a, l| {
            Ok(Value::from(a.compare(datarules::CompareOp::Lt, l)))
        })
    });
    let check = Check::new(condition).unwrap();
    assert_eq!(check.name(), "below");

    let extra = Bindings::from([("limit".to_owned(), Datum::from(10_i64))]);
    let result = check.run_with(&ages(), &extra);
    assert_eq!((result.passes(), result.fails()), (2, 2));

    let missing = check.run(&ages());
    assert_eq!(
        missing.error(),
        Some(&EvalError::MissingArgument {
            function: "below".into(),
            parameter: "limit".into(),
        })
    );
}

#[test]
fn builtins_in_conditions() {
    let data = Dataset::new()
        .with_column("name", [Value::from("Ann"), Value::Null])
        .unwrap();
    let check = Check::new("notna(name) and lower(name) == 'ann'").unwrap();
    let result = check.run(&data);
    assert_eq!(result.outcomes(), &[Outcome::Pass, Outcome::Fail]);
}

#[test]
fn summary_serializes() {
    let rules = RuleSet::new()
        .add(Check::builder("age >= 0").name("non_negative").build().unwrap())
        .unwrap();
    let summary = rules.run_checks(&ages()).summary();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json[0]["name"], "non_negative");
    assert_eq!(json[0]["fails"], 1);
}
