use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tidyframe::{coerce, Column, NamedList};

fn wide_input(columns: usize, rows: usize) -> NamedList {
    (0..columns)
        .map(|c| {
            let values: Vec<f64> = (0..rows).map(|r| (r * columns + c) as f64).collect();
            (format!("c{c}"), Column::from(values))
        })
        .collect()
}

fn bench_coerce_wide(c: &mut Criterion) {
    let mut group = c.benchmark_group("coerce_wide");

    // Cost should track the column count only.
    for rows in [100usize, 10_000, 1_000_000] {
        let input = wide_input(26, rows);
        group.bench_with_input(BenchmarkId::new("26_columns", rows), &input, |b, input| {
            b.iter(|| black_box(coerce(input).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_coerce_wide);
criterion_main!(benches);
