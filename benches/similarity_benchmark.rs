//! Benchmark comparing pairwise vs matrix-based similarity computation,
//! and the cost of full redundancy pruning on top of it
//!
//! Run with: cargo bench --bench similarity_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand::SeedableRng;

use featsel::pipeline::correlation::{find_similar_pairs, find_similar_pairs_matrix};
use featsel::pipeline::{prune_redundant, FeatureMatrix};

/// Synthetic descriptors: every fourth feature is a noisy copy of an earlier
/// one so the similarity graph has edges to find.
fn generate_matrix(n_rows: usize, n_features: usize, seed: u64) -> FeatureMatrix {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(n_features);

    for i in 0..n_features {
        let values: Vec<f64> = if i % 4 == 3 {
            columns[i - 3]
                .iter()
                .map(|v| v + rng.gen::<f64>() * 10.0 - 5.0)
                .collect()
        } else {
            (0..n_rows).map(|_| rng.gen::<f64>() * 100.0).collect()
        };
        columns.push(values);
    }

    let names = (0..n_features).map(|i| format!("descriptor_{}", i)).collect();
    FeatureMatrix::from_columns(names, columns).expect("valid synthetic matrix")
}

fn benchmark_similarity_by_columns(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity_by_columns");
    group.sample_size(30);

    let n_rows = 5_000;
    let threshold = 0.8;

    for n_cols in [10, 25, 50, 100, 200] {
        let matrix = generate_matrix(n_rows, n_cols, 42);
        group.throughput(Throughput::Elements(((n_cols * (n_cols - 1)) / 2) as u64));

        group.bench_with_input(BenchmarkId::new("pairwise", n_cols), &matrix, |b, m| {
            b.iter(|| find_similar_pairs(black_box(m), black_box(threshold)));
        });

        group.bench_with_input(BenchmarkId::new("matrix", n_cols), &matrix, |b, m| {
            b.iter(|| find_similar_pairs_matrix(black_box(m), black_box(threshold)));
        });
    }

    group.finish();
}

fn benchmark_similarity_by_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity_by_rows");
    group.sample_size(20);

    let n_cols = 50;
    let threshold = 0.8;

    for n_rows in [1_000, 5_000, 20_000, 50_000] {
        let matrix = generate_matrix(n_rows, n_cols, 42);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::new("pairwise", n_rows), &matrix, |b, m| {
            b.iter(|| find_similar_pairs(black_box(m), black_box(threshold)));
        });

        group.bench_with_input(BenchmarkId::new("matrix", n_rows), &matrix, |b, m| {
            b.iter(|| find_similar_pairs_matrix(black_box(m), black_box(threshold)));
        });
    }

    group.finish();
}

fn benchmark_prune_redundant(c: &mut Criterion) {
    let mut group = c.benchmark_group("prune_redundant");
    group.sample_size(20);

    for n_cols in [50, 200] {
        let matrix = generate_matrix(5_000, n_cols, 7);
        group.bench_with_input(BenchmarkId::from_parameter(n_cols), &matrix, |b, m| {
            b.iter(|| prune_redundant(black_box(m), black_box(0.9)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_similarity_by_columns,
    benchmark_similarity_by_rows,
    benchmark_prune_redundant
);
criterion_main!(benches);
