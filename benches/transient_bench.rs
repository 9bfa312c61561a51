//! Benchmark for TransientTreeList.
//!
//! Compares batch updates through a transient against the same updates
//! applied one version at a time to PersistentTreeList, with TreeList as
//! the in-place baseline.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ordtree::TreeList;
use ordtree::persistent::{PersistentTreeList, TransientTreeList};
use std::hint::black_box;

// =============================================================================
// Push Back
// =============================================================================

fn benchmark_push_back(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("transient_push_back");

    for size in [1_000, 10_000, 100_000] {
        // TransientTreeList push_back
        group.bench_with_input(
            BenchmarkId::new("TransientTreeList", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut transient = TransientTreeList::new();
                    for value in 0..size {
                        transient.push_back(black_box(value));
                    }
                    black_box(transient.persistent())
                });
            },
        );

        // PersistentTreeList push_back (immutable)
        group.bench_with_input(
            BenchmarkId::new("PersistentTreeList", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut list = PersistentTreeList::new();
                    for value in 0..size {
                        list = list.push_back(black_box(value));
                    }
                    black_box(list)
                });
            },
        );

        // TreeList push_back
        group.bench_with_input(BenchmarkId::new("TreeList", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut list = TreeList::new();
                for value in 0..size {
                    list.push_back(black_box(value));
                }
                black_box(list)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Update
// =============================================================================

fn benchmark_update(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("transient_update");

    for size in [1_000, 10_000, 100_000] {
        let base: PersistentTreeList<usize> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("TransientTreeList", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut transient = base.clone().transient();
                    for index in (0..size).step_by(3) {
                        let _ = transient.set(index, black_box(index * 2));
                    }
                    black_box(transient.persistent())
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("PersistentTreeList", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut list = base.clone();
                    for index in (0..size).step_by(3) {
                        if let Ok(updated) = list.set(index, black_box(index * 2)) {
                            list = updated;
                        }
                    }
                    black_box(list)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Roundtrip
// =============================================================================

fn benchmark_roundtrip(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("transient_roundtrip");

    for batch in [10, 100, 1_000] {
        let base: PersistentTreeList<usize> = (0..10_000).collect();

        group.bench_with_input(BenchmarkId::new("insert_middle", batch), &batch, |bencher, &batch| {
            bencher.iter(|| {
                let mut transient = base.clone().transient();
                for value in 0..batch {
                    let _ = transient.insert(transient.len() / 2, black_box(value));
                }
                black_box(transient.persistent())
            });
        });

        group.bench_with_input(BenchmarkId::new("snapshot_each", batch), &batch, |bencher, &batch| {
            bencher.iter(|| {
                let mut transient = base.clone().transient();
                let mut snapshots = Vec::with_capacity(batch);
                for value in 0..batch {
                    transient.push_front(black_box(value));
                    snapshots.push(transient.to_persistent());
                }
                black_box(snapshots)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(benches, benchmark_push_back, benchmark_update, benchmark_roundtrip);

criterion_main!(benches);
