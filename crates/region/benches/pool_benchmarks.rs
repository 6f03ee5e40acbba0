//! Pool benchmarks
//!
//! Per-request workloads: many small allocations followed by a reset,
//! large allocations with early release, and chain growth.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nebula_region::{Pool, PoolConfig};

/// Allocate a request's worth of small objects, then reset
fn bench_request_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_cycle");

    for objects in [16_usize, 128, 1024] {
        group.throughput(Throughput::Elements(objects as u64));
        group.bench_with_input(BenchmarkId::new("alloc_reset", objects), &objects, |b, &n| {
            let mut pool = Pool::with_config(PoolConfig::production()).unwrap();

            b.iter(|| {
                for i in 0..n {
                    let ptr = pool.alloc(32 + (i % 4) * 16).unwrap();
                    black_box(ptr);
                }
                pool.reset();
            });
        });
    }

    group.bench_function("system_box_baseline_128", |b| {
        b.iter(|| {
            let boxes: Vec<Box<[u8; 48]>> = (0..128).map(|_| Box::new([0_u8; 48])).collect();
            black_box(boxes);
        });
    });

    group.finish();
}

/// Typed helpers
fn bench_typed(c: &mut Criterion) {
    let mut group = c.benchmark_group("typed");

    group.bench_function("alloc_str", |b| {
        let mut pool = Pool::new(64 * 1024).unwrap();
        b.iter(|| {
            for _ in 0..64 {
                black_box(pool.alloc_str("workflow-execution-id").unwrap());
            }
            pool.reset();
        });
    });

    group.bench_function("alloc_value", |b| {
        let mut pool = Pool::new(64 * 1024).unwrap();
        b.iter(|| {
            for i in 0..64_u64 {
                black_box(pool.alloc_value((i, i * 2)).unwrap());
            }
            pool.reset();
        });
    });

    group.finish();
}

/// Large allocations freed early, exercising slot reuse
fn bench_large(c: &mut Criterion) {
    let mut group = c.benchmark_group("large");

    group.bench_function("alloc_free_reuse", |b| {
        let pool = Pool::new(4096).unwrap();
        b.iter(|| {
            let ptr = pool.alloc(16 * 1024).unwrap();
            // SAFETY: ptr is not used after release.
            unsafe { pool.free_large(black_box(ptr)).unwrap() };
        });
    });

    group.finish();
}

/// Filling many blocks from a small pool
fn bench_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("growth");

    for block_size in [256_usize, 4096] {
        group.bench_with_input(
            BenchmarkId::new("fill_64_blocks", block_size),
            &block_size,
            |b, &size| {
                b.iter(|| {
                    let pool = Pool::new(size).unwrap();
                    let request = pool.max_small_size();
                    for _ in 0..64 {
                        black_box(pool.alloc(request).unwrap());
                    }
                    pool.destroy();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_request_cycle,
    bench_typed,
    bench_large,
    bench_growth
);
criterion_main!(benches);
