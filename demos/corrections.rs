use datarules::{Action, Bindings, Check, Correction, Dataset, Datum, RuleSet, Updates, Value};

fn main() {
    let non_negative = Check::builder("age >= 0")
        .name("non_negative")
        .build()
        .expect("invalid check");

    // Cap incomes with a callable action
    let cap = Action::function("cap_income", &["income", "limit"], |args| {
        let limit = args.take("limit")?;
        let income = args.take("income")?;
        let capped = income.zip_with(limit, |i, l| match (i, l) {
            (Value::Int(i), Value::Int(l)) => Ok(Value::Int(*i.min(l))),
            (other, _) => Ok(other.clone()),
        })?;
        Ok(Updates::from([("income".to_owned(), capped)]))
    });

    let rules = RuleSet::new()
        .add(non_negative.clone())
        .and_then(|r| {
            r.add(
                Correction::builder(non_negative.fails(), "age = 0; age_fixed = True")
                    .name("clamp_age")
                    .build()?,
            )
        })
        .and_then(|r| r.add(Correction::builder("income > limit", cap).name("cap_income").build()?))
        .expect("failed to build rule set");

    let data = Dataset::new()
        .with_column("age", [-1_i64, 30, 42])
        .and_then(|d| d.with_column("income", [1_000_i64, 250_000, 40_000]))
        .expect("invalid dataset");

    let extra: Bindings = [("limit".to_owned(), Datum::from(100_000_i64))].into();
    let (fixed, report) = rules.apply_corrections_with(&data, &extra);

    println!("{report}");
    println!("before:\n{data}");
    println!("after:\n{fixed}");
    println!("{}", rules.run_checks(&fixed));
}
