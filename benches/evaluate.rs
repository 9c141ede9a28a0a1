use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use datarules::{parse_expression, rewrite, rewrite_source, Bindings, Condition, Dataset};

/// A condition joining `n` chained comparisons with `and`.
fn chained_source(n: usize) -> String {
    (0..n)
        .map(|i| format!("0 <= c{i} < 100"))
        .collect::<Vec<_>>()
        .join(" and ")
}

fn dataset(columns: usize, rows: usize) -> Dataset {
    let mut data = Dataset::new();
    for c in 0..columns {
        #[allow(clippy::cast_possible_wrap)]
        let values = (0..rows).map(|r| ((r * 7 + c) % 120) as i64);
        data = data.with_column(&format!("c{c}"), values).unwrap();
    }
    data
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");

    for &n in &[1, 5, 20] {
        let source = chained_source(n);
        group.bench_with_input(BenchmarkId::new("parse", n), &source, |b, source| {
            b.iter(|| parse_expression(black_box(source)).unwrap());
        });

        let expr = parse_expression(&source).unwrap();
        group.bench_with_input(BenchmarkId::new("tree", n), &expr, |b, expr| {
            b.iter(|| rewrite(black_box(expr)));
        });

        group.bench_with_input(BenchmarkId::new("source", n), &source, |b, source| {
            b.iter(|| rewrite_source(black_box(source)).unwrap());
        });
    }

    group.finish();
}

fn bench_condition(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition");
    let extra = Bindings::new();

    for &rows in &[100, 10_000] {
        let data = dataset(5, rows);
        let condition = Condition::text(&chained_source(5)).unwrap();
        group.bench_with_input(BenchmarkId::new("text", rows), &data, |b, data| {
            b.iter(|| condition.evaluate(black_box(data), &extra).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rewrite, bench_condition);
criterion_main!(benches);
