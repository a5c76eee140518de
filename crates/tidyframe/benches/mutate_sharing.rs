use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use tidyframe::{col, lit, Column, SortKey, Table};

/// Row counts to sweep. `TIDYFRAME_MUTATE_BENCH_ROWS` takes a comma-separated list; entries
/// that do not parse are skipped and the rest are clamped to 1k..=2M.
fn bench_row_counts() -> Vec<usize> {
    let counts: Vec<usize> = std::env::var("TIDYFRAME_MUTATE_BENCH_ROWS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<usize>().ok())
        .map(|rows| rows.clamp(1_000, 2_000_000))
        .collect();
    if counts.is_empty() {
        vec![10_000, 100_000]
    } else {
        counts
    }
}

fn wide_table(columns: usize, rows: usize) -> Table {
    let columns: Vec<(String, Column)> = (0..columns)
        .map(|c| {
            let values: Vec<i64> = (0..rows as i64).map(|r| r * 31 % 1_009 + c as i64).collect();
            (format!("c{c}"), Column::from(values))
        })
        .collect();
    Table::new(columns).unwrap()
}

fn bench_mutate_sharing(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutate_sharing");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(5));

    for rows in bench_row_counts() {
        let table = wide_table(50, rows);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_with_input(BenchmarkId::new("one_of_50", rows), &table, |b, table| {
            b.iter(|| black_box(table.mutate(&[("c7", col("c7") + lit(1i64))]).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("rename_all", rows), &table, |b, table| {
            b.iter(|| black_box(table.rename(&[("c0", "first")]).unwrap()))
        });

        // Full rebuild, for comparison.
        group.bench_with_input(BenchmarkId::new("arrange", rows), &table, |b, table| {
            b.iter(|| black_box(table.arrange(&[SortKey::desc("c3")]).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mutate_sharing);
criterion_main!(benches);
