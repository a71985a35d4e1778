//! Flag Set Operation Benchmarks
//!
//! Cost of the hot paths a control loop or interrupt handler hits:
//! - raise/solve cycles on a single node (1000 operations per iteration)
//! - idempotent raise (indicator re-assertion only)
//! - dependency-blocked solve
//! - aggregator contention from several threads
//!
//! Run with: cargo bench --bench flag_ops

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emergency_core::{
    AtomicIndicator, DependencyTable, FlagId, FlagSet, GlobalAggregator, CAPACITY,
};
use std::sync::Arc;
use std::thread;

const OPERATIONS: usize = 1000;

fn node(deps: DependencyTable) -> FlagSet {
    let aggregator = Arc::new(GlobalAggregator::new(Box::new(AtomicIndicator::new())));
    aggregator.init_once().unwrap();
    FlagSet::new(aggregator, Arc::new(deps))
}

/// Benchmark raise then solve over the whole identifier space
fn bench_raise_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("flag_set");

    group.bench_function("raise_1000", |b| {
        let mut set = node(DependencyTable::empty());
        b.iter(|| {
            for i in 0..OPERATIONS {
                let _ = set.raise(black_box((i % CAPACITY) as FlagId));
            }
            set.destroy();
        });
    });

    group.bench_function("raise_solve_1000", |b| {
        let mut set = node(DependencyTable::empty());
        b.iter(|| {
            for i in 0..OPERATIONS {
                let id = (i % CAPACITY) as FlagId;
                let _ = set.raise(black_box(id));
                let _ = set.solve(black_box(id));
            }
        });
    });

    group.bench_function("idempotent_raise", |b| {
        let mut set = node(DependencyTable::empty());
        set.raise(3).unwrap();
        b.iter(|| set.raise(black_box(3)));
    });

    group.bench_function("blocked_solve", |b| {
        let deps = DependencyTable::builder().depends_on(4, 2).unwrap().build();
        let mut set = node(deps);
        set.raise(2).unwrap();
        set.raise(4).unwrap();
        b.iter(|| black_box(set.solve(black_box(4))).is_err());
    });

    group.finish();
}

/// Benchmark aggregator transitions with several nodes competing for the lock
fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregator_contention");

    for &threads in &[1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, &threads| {
            let aggregator = Arc::new(GlobalAggregator::new(Box::new(AtomicIndicator::new())));
            aggregator.init_once().unwrap();
            let deps = Arc::new(DependencyTable::empty());

            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let mut set = FlagSet::new(Arc::clone(&aggregator), Arc::clone(&deps));
                        thread::spawn(move || {
                            for i in 0..OPERATIONS {
                                let id = (i % CAPACITY) as FlagId;
                                let _ = set.raise(id);
                                let _ = set.solve(id);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_raise_solve, bench_contention);
criterion_main!(benches);
