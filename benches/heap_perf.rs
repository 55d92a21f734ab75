//! Criterion benchmarks for the heap's three hot paths plus the tally
//! workload that motivates them.
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench heap_perf
//!
//! # Only one group
//! cargo bench --bench heap_perf -- insert
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hashtag_counter::fibonacci::FibonacciHeap;
use hashtag_counter::tally::HashtagTally;

const SIZES: [usize; 3] = [1 << 10, 1 << 13, 1 << 16];

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for size in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut heap = FibonacciHeap::with_capacity(size);
                for i in 0..size {
                    heap.insert(black_box(i as f64), i);
                }
                heap
            });
        });
    }
    group.finish();
}

fn bench_increase_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("increase_key");
    for size in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_with_setup(
                || {
                    let mut heap = FibonacciHeap::with_capacity(size);
                    let handles: Vec<_> =
                        (0..size).map(|i| heap.insert(i as f64, i)).collect();
                    // Consolidate once so promotions actually cut
                    heap.delete_max();
                    (heap, handles)
                },
                |(mut heap, handles)| {
                    for (i, handle) in handles.iter().enumerate() {
                        if heap.contains(*handle) {
                            heap.increase_key(*handle, black_box((i % 64) as f64 + 1.0))
                                .unwrap();
                        }
                    }
                    heap
                },
            );
        });
    }
    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain");
    for size in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_with_setup(
                || {
                    let mut heap = FibonacciHeap::with_capacity(size);
                    for i in 0..size {
                        // Scatter keys so consolidation sees varied shapes
                        heap.insert(((i * 2_654_435_761) % size) as f64, i);
                    }
                    heap
                },
                |mut heap| {
                    while let Some(pair) = heap.delete_max() {
                        black_box(pair);
                    }
                    heap
                },
            );
        });
    }
    group.finish();
}

fn bench_tally(c: &mut Criterion) {
    let mut group = c.benchmark_group("tally");
    group.bench_function("observe_and_top", |b| {
        b.iter(|| {
            let mut tally = HashtagTally::new();
            for i in 0..4096u32 {
                let tag = format!("tag{}", i % 512);
                tally.observe(&tag, f64::from(i % 17)).unwrap();
            }
            black_box(tally.top(20))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_increase_key, bench_drain, bench_tally);
criterion_main!(benches);
