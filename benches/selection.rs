//! Selection and comparison benchmarks
//!
//! Runs are small in practice; these measure the pure ranking path so a
//! regression in `RankKey` ordering shows up before it matters.
//!
//! Run with: cargo bench --bench selection

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use model_arena::comparison::ComparisonBuilder;
use model_arena::metrics::{ClassificationMetrics, FailureReason, MetricSet, TaskType};
use model_arena::selection::{rank, select};

const SMALL_SIZE: usize = 16; // typical run
const LARGE_SIZE: usize = 10_000; // hyperparameter sweep

/// Deterministic classification results with frequent accuracy ties.
#[allow(clippy::cast_precision_loss)]
fn results(n: usize) -> Vec<MetricSet> {
    (0..n)
        .map(|i| {
            let name = format!("algo{i}");
            if i % 7 == 0 {
                return MetricSet::failed(name, TaskType::Classification, FailureReason::Fault, "boom");
            }
            let accuracy = (i % 50) as f64 / 50.0;
            let f1 = (i % 13) as f64 / 13.0;
            MetricSet::classification(
                name,
                ClassificationMetrics::new().accuracy(accuracy).f1_score(f1),
            )
        })
        .collect()
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");

    for size in [SMALL_SIZE, LARGE_SIZE] {
        let data = results(size);
        group.bench_with_input(BenchmarkId::new("select", size), &data, |b, data| {
            b.iter(|| select(black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("rank", size), &data, |b, data| {
            b.iter(|| rank(black_box(data)));
        });
    }

    group.finish();
}

fn bench_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparison");
    let builder = ComparisonBuilder::default();

    for size in [SMALL_SIZE, LARGE_SIZE] {
        let data = results(size);
        group.bench_with_input(BenchmarkId::new("build", size), &data, |b, data| {
            b.iter(|| builder.build(black_box(data)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select, bench_comparison);
criterion_main!(benches);
