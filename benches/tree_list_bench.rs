//! Benchmark for TreeList.
//!
//! Compares positional access and mid-sequence edits of TreeList against
//! `Vec` and `VecDeque`, and measures lookups in SortedTreeList and
//! HashBucketedTree against `BTreeSet` and `HashSet`.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ordtree::{HashBucketedTree, SortedTreeList, TreeList};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hint::black_box;

// =============================================================================
// Positional Access
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("tree_list_get");

    for size in [1_000, 10_000, 100_000] {
        let list: TreeList<usize> = (0..size).collect();
        let vector: Vec<usize> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("TreeList", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0;
                for index in (0..size).step_by(7) {
                    sum += *list.get(black_box(index)).unwrap_or(&0);
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0;
                for index in (0..size).step_by(7) {
                    sum += *vector.get(black_box(index)).unwrap_or(&0);
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn benchmark_iterate(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("tree_list_iterate");

    for size in [1_000, 100_000] {
        let list: TreeList<usize> = (0..size).collect();
        let vector: Vec<usize> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("TreeList", size), &size, |bencher, _| {
            bencher.iter(|| black_box(list.iter().sum::<usize>()));
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, _| {
            bencher.iter(|| black_box(vector.iter().sum::<usize>()));
        });
    }

    group.finish();
}

// =============================================================================
// Edits
// =============================================================================

fn benchmark_insert_middle(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("tree_list_insert_middle");

    for size in [1_000, 10_000, 50_000] {
        group.bench_with_input(BenchmarkId::new("TreeList", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut list = TreeList::new();
                for value in 0..size {
                    let _ = list.insert(list.len() / 2, black_box(value));
                }
                black_box(list)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut vector = Vec::new();
                for value in 0..size {
                    vector.insert(vector.len() / 2, black_box(value));
                }
                black_box(vector)
            });
        });

        group.bench_with_input(BenchmarkId::new("VecDeque", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut deque = VecDeque::new();
                for value in 0..size {
                    deque.insert(deque.len() / 2, black_box(value));
                }
                black_box(deque)
            });
        });
    }

    group.finish();
}

fn benchmark_push_back(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("tree_list_push_back");

    for branching_factor in [4, 32, 128] {
        group.bench_with_input(
            BenchmarkId::new("TreeList", branching_factor),
            &branching_factor,
            |bencher, &branching_factor| {
                bencher.iter(|| {
                    let mut list = TreeList::with_branching_factor(branching_factor)
                        .unwrap_or_default();
                    for value in 0..10_000 {
                        list.push_back(black_box(value));
                    }
                    black_box(list)
                });
            },
        );
    }

    group.finish();
}

fn benchmark_remove_range(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("tree_list_remove_range");

    for size in [10_000, 100_000] {
        let list: TreeList<usize> = (0..size).collect();
        let vector: Vec<usize> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("TreeList", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut working = list.clone();
                let _ = working.remove_range(size / 4, size / 2);
                black_box(working)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut working = vector.clone();
                working.drain(size / 4..size / 4 + size / 2);
                black_box(working)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Lookups
// =============================================================================

fn benchmark_sorted_contains(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("sorted_tree_list_contains");

    for size in [1_000, 100_000] {
        let sorted: SortedTreeList<usize> = (0..size).map(|value| value * 2).collect();
        let set: BTreeSet<usize> = (0..size).map(|value| value * 2).collect();

        group.bench_with_input(BenchmarkId::new("SortedTreeList", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let found = (0..size).step_by(3).filter(|value| sorted.contains(value)).count();
                black_box(found)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let found = (0..size).step_by(3).filter(|value| set.contains(value)).count();
                black_box(found)
            });
        });
    }

    group.finish();
}

fn benchmark_hash_bucketed_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("hash_bucketed_insert");

    for size in [1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("HashBucketedTree", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut set: HashBucketedTree<usize> = HashBucketedTree::new();
                    for value in 0..size {
                        set.insert(black_box(value));
                    }
                    black_box(set)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("HashSet", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut set = HashSet::new();
                for value in 0..size {
                    set.insert(black_box(value));
                }
                black_box(set)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_get,
    benchmark_iterate,
    benchmark_insert_middle,
    benchmark_push_back,
    benchmark_remove_range,
    benchmark_sorted_contains,
    benchmark_hash_bucketed_insert,
);

criterion_main!(benches);
