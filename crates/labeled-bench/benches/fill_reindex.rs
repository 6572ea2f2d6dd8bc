// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use labeled_bench::{shuffled_index, stepped_index, wave_series};
use labeled_series::{FillMethod, FillOptions, FillSpec, OrderOptions, ReindexOptions, Scalar};
use std::sync::Arc;

const N: usize = 200_000;

fn benchmark_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fillna");
    let series = wave_series(stepped_index(N, 0, 1), 3).expect("benchmark series should be valid");

    group.bench_function("pad_unlimited_n2e5", |b| {
        b.iter(|| {
            black_box(&series)
                .fillna(&FillSpec::Method(FillMethod::Pad), &FillOptions::default())
                .expect("pad should succeed")
        })
    });
    group.bench_function("backfill_limit1_n2e5", |b| {
        b.iter(|| {
            black_box(&series)
                .fillna(
                    &FillSpec::Method(FillMethod::Backfill),
                    &FillOptions { limit: Some(1) },
                )
                .expect("backfill should succeed")
        })
    });
    group.bench_function("value_n2e5", |b| {
        b.iter(|| {
            black_box(&series)
                .fillna(&FillSpec::Value(Scalar::Float(0.0)), &FillOptions::default())
                .expect("value fill should succeed")
        })
    });

    group.finish();
}

fn benchmark_reindex(c: &mut Criterion) {
    let mut group = c.benchmark_group("reindex");
    let series = wave_series(stepped_index(N, 0, 2), 0).expect("benchmark series should be valid");
    let denser = Arc::new(stepped_index(N, 0, 1));
    let same = series.index_arc();

    group.bench_function("equal_index_short_circuit_n2e5", |b| {
        b.iter(|| {
            black_box(&series)
                .reindex(
                    Some(Arc::clone(&same)),
                    &ReindexOptions {
                        copy: false,
                        ..ReindexOptions::default()
                    },
                )
                .expect("reindex should succeed")
        })
    });
    group.bench_function("denser_target_pad_n2e5", |b| {
        b.iter(|| {
            black_box(&series)
                .reindex(
                    Some(Arc::clone(&denser)),
                    &ReindexOptions {
                        method: Some(FillMethod::Pad),
                        ..ReindexOptions::default()
                    },
                )
                .expect("reindex should succeed")
        })
    });

    group.finish();
}

fn benchmark_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    let series =
        wave_series(shuffled_index(N, 0x9e37_79b9_7f4a_7c15), 5).expect("benchmark series should be valid");

    group.bench_function("order_stable_n2e5", |b| {
        b.iter(|| {
            black_box(&series)
                .order(&OrderOptions::default())
                .expect("order should succeed")
        })
    });
    group.bench_function("sort_index_n2e5", |b| {
        b.iter(|| black_box(&series).sort_index(true).expect("sort should succeed"))
    });

    group.finish();
}

criterion_group!(benches, benchmark_fill, benchmark_reindex, benchmark_sort);
criterion_main!(benches);
