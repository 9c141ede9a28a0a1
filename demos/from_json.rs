use datarules::{Dataset, RuleSet};

const RULES: &str = r#"[
    {"name": "plausible_age", "condition": "0 <= age < 120"},
    {"name": "has_name", "condition": "notna(name) and len(name) > 0"},
    {"name": "clamp_age", "if": "age < 0", "then": "age = 0"}
]"#;

fn main() {
    // A path argument loads rules from a file instead
    let rules = match std::env::args().nth(1) {
        Some(path) => RuleSet::from_file(path),
        None => RuleSet::from_json(RULES),
    }
    .expect("failed to load rules");

    let data = Dataset::new()
        .with_column("age", [-4_i64, 37, 130])
        .and_then(|d| d.with_column("name", ["Ann", "", "Cy"]))
        .expect("invalid dataset");

    let (fixed, corrections) = rules.apply_corrections(&data);
    let checks = rules.run_checks(&fixed);

    println!("{corrections}");
    println!("{checks}");
    println!(
        "{}",
        serde_json::to_string_pretty(&checks.summary()).expect("summary serializes")
    );
}
