//! Concurrent Pool Benchmarks
//!
//! Measures `InstancePool` throughput for checkout-heavy, checkin-heavy and
//! mixed workloads, with and without a background reaper.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use instance_pool::config::InstancePoolConfig;
use instance_pool::{FnRunner, InstancePool};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const CACHE_SIZE: usize = 10_000;
const OPS_PER_THREAD: usize = 1_000;

fn make_pool() -> Arc<InstancePool<usize, usize>> {
    let pool = InstancePool::init(InstancePoolConfig { capacity: CACHE_SIZE }, None);
    for i in 0..CACHE_SIZE {
        pool.put_inactive(i, i);
    }
    Arc::new(pool)
}

/// Threads checking instances out and back in
fn concurrent_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Cycles");

    for num_threads in [1, 2, 4, 8] {
        group.throughput(Throughput::Elements((num_threads * OPS_PER_THREAD) as u64));
        let pool = make_pool();
        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            &num_threads,
            |b, &num_threads| {
                b.iter(|| run_cycles(Arc::clone(&pool), num_threads, OPS_PER_THREAD));
            },
        );
    }

    group.finish();
}

/// 80% lookups, 20% checkins
fn concurrent_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Mixed");
    group.throughput(Throughput::Elements((8 * OPS_PER_THREAD) as u64));

    let pool = make_pool();
    group.bench_function("8 threads", |b| {
        b.iter(|| run_mixed(Arc::clone(&pool), 8, OPS_PER_THREAD));
    });

    group.finish();
}

/// Mixed workload while a reaper sweeps the idle tier
fn concurrent_with_reaper(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent With Reaper");
    group.throughput(Throughput::Elements((8 * OPS_PER_THREAD) as u64));

    let pool = make_pool();
    let stop = Arc::new(AtomicBool::new(false));
    let reaper = {
        let pool = Arc::clone(&pool);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                pool.sweep(&mut FnRunner::new(
                    |k: &usize, _: &usize| k % 16 == 0,
                    |k, v| {
                        black_box((k, v));
                    },
                ));
            }
        })
    };

    group.bench_function("8 threads", |b| {
        b.iter(|| run_mixed(Arc::clone(&pool), 8, OPS_PER_THREAD));
    });

    stop.store(true, Ordering::Relaxed);
    reaper.join().unwrap();
    group.finish();
}

// Checkout followed by checkin of the same key
fn run_cycles(pool: Arc<InstancePool<usize, usize>>, num_threads: usize, ops_per_thread: usize) {
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let pool = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let key = (t * ops_per_thread + i) % CACHE_SIZE;
                let instance = pool.get(&key).unwrap_or(key);
                black_box(pool.put_inactive(key, instance));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

fn run_mixed(pool: Arc<InstancePool<usize, usize>>, num_threads: usize, ops_per_thread: usize) {
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let pool = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let key = (t * ops_per_thread + i) % CACHE_SIZE;
                if i % 5 == 0 {
                    // 20% checkins
                    pool.put_inactive(key, key);
                } else {
                    // 80% lookups
                    black_box(pool.peek(&key));
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

criterion_group!(
    benches,
    concurrent_cycles,
    concurrent_mixed,
    concurrent_with_reaper
);
criterion_main!(benches);
