use datarules::{Check, Dataset, RuleSet};

fn main() {
    // Define checks
    let rules = RuleSet::new()
        .add(
            Check::builder("0 <= age < 18")
                .name("minor")
                .description("age is between 0 and 17")
                .build()
                .expect("invalid check"),
        )
        .and_then(|rules| rules.add(Check::new("status == 'active' or age >= 18").expect("invalid check")))
        .expect("failed to build rule set");

    println!("{rules}");
    for check in rules.checks() {
        println!("  {check}");
    }

    let data = Dataset::new()
        .with_column("age", [5_i64, 15, 25, -1])
        .and_then(|d| d.with_column("status", ["active", "inactive", "active", "inactive"]))
        .and_then(|d| d.with_index(["ann", "bob", "cy", "dee"]))
        .expect("invalid dataset");

    let report = rules.run_checks(&data);
    println!("{report}");
    println!("{}", report.frame());
}
