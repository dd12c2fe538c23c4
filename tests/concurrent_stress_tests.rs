//! Stress Tests for the Concurrent Pool
//!
//! These tests verify thread safety and tier bookkeeping under high contention,
//! with sweeps running alongside checkouts and checkins.

#![cfg(feature = "concurrent")]

use instance_pool::config::InstancePoolConfig;
use instance_pool::{Budgeted, CacheMetrics, FnRunner, InstancePool, SweepRunner};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 10_000;

fn pool(capacity: usize) -> InstancePool<usize, usize> {
    InstancePool::init(InstancePoolConfig { capacity }, None)
}

/// Test high contention with many threads cycling the same keys
#[test]
fn stress_checkout_checkin_high_contention() {
    let pool = Arc::new(pool(16));

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let pool = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = i % 10; // Only 10 keys for high contention
                match (t + i) % 3 {
                    0 => {
                        pool.put_active(key, t * OPS_PER_THREAD + i);
                    }
                    1 => {
                        pool.put_inactive(key, t * OPS_PER_THREAD + i);
                    }
                    _ => {
                        let _ = pool.get(&key);
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(pool.len() <= 10);
    assert_eq!(pool.len(), pool.active_len() + pool.inactive_len());
    for key in 0..10 {
        assert!(!(pool.is_active(&key) && pool.is_inactive(&key)));
    }
}

/// Sweepers and writers racing on the same key space
#[test]
fn stress_sweeps_with_writers() {
    let pool = Arc::new(pool(256));
    let evicted = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicBool::new(false));

    let mut writers = Vec::new();
    for t in 0..8 {
        let pool = Arc::clone(&pool);
        writers.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = (t * 31 + i) % 256;
                match i % 4 {
                    0 => {
                        pool.put_active(key, i);
                    }
                    1 | 2 => {
                        pool.put_inactive(key, i);
                    }
                    _ => {
                        let _ = pool.remove(&key);
                    }
                }
            }
        }));
    }

    let mut sweepers = Vec::new();
    for s in 0..4 {
        let pool = Arc::clone(&pool);
        let evicted = Arc::clone(&evicted);
        let done = Arc::clone(&done);
        sweepers.push(thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                let n = pool.sweep(&mut FnRunner::new(
                    move |k: &usize, _: &usize| k % 4 == s,
                    |_, _| {},
                ));
                evicted.fetch_add(n, Ordering::Relaxed);
            }
        }));
    }

    for handle in writers {
        handle.join().expect("Writer panicked");
    }
    done.store(true, Ordering::Relaxed);
    for handle in sweepers {
        handle.join().expect("Sweeper panicked");
    }

    assert!(pool.len() <= 256);
    assert_eq!(pool.len(), pool.active_len() + pool.inactive_len());

    // A final sweep still sees every idle entry exactly once
    let idle = pool.inactive_len();
    let mut seen = HashSet::new();
    let n = pool.sweep(&mut FnRunner::new(
        |_: &usize, _: &usize| true,
        |k, _| assert!(seen.insert(k), "key {} evicted twice", k),
    ));
    assert_eq!(n, idle);
    assert_eq!(pool.inactive_len(), 0);

    let stats = pool.metrics();
    assert_eq!(
        stats.get("evictions"),
        Some(&((evicted.load(Ordering::Relaxed) + n) as f64))
    );
}

/// A slow callback must not block other threads
#[test]
fn stress_callback_does_not_hold_lock() {
    let pool = Arc::new(pool(0));
    for i in 0..4 {
        pool.put_inactive(i, i);
    }

    let barrier = Arc::new(Barrier::new(2));
    let worker = {
        let pool = Arc::clone(&pool);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            // Runs while the sweeper is parked inside its callback
            for i in 100..200 {
                pool.put_active(i, i);
                assert_eq!(pool.get(&i), Some(i));
            }
            barrier.wait();
        })
    };

    let mut first = true;
    let n = pool.sweep(&mut FnRunner::new(
        |_: &usize, _: &usize| true,
        |_, _| {
            if first {
                first = false;
                barrier.wait();
                barrier.wait();
            }
        },
    ));
    worker.join().expect("Worker panicked");

    assert_eq!(n, 4);
    assert_eq!(pool.active_len(), 100);
    assert_eq!(pool.inactive_len(), 0);
}

/// Nested sweeps from inside a callback walk with their own cursors
#[test]
fn stress_nested_sweep_from_callback() {
    let pool = pool(0);
    for i in 0..10 {
        pool.put_inactive(i, i);
    }

    let mut outer = Vec::new();
    let mut inner = Vec::new();
    pool.sweep(&mut FnRunner::new(
        |k: &usize, _: &usize| k % 2 == 0,
        |k, _| {
            outer.push(k);
            if k == 0 {
                pool.sweep(&mut FnRunner::new(
                    |k: &usize, _: &usize| k % 2 == 1,
                    |k, _| inner.push(k),
                ));
            }
        },
    ));

    assert_eq!(outer, vec![0, 2, 4, 6, 8]);
    assert_eq!(inner, vec![1, 3, 5, 7, 9]);
    assert!(pool.is_empty());
}

/// Recycling runner: parks evicted instances for reuse
struct Recycler {
    spare: Arc<Mutex<Vec<usize>>>,
}

impl SweepRunner<usize, usize> for Recycler {
    fn should_remove(&mut self, _key: &usize, _value: &usize) -> bool {
        true
    }

    fn remove(&mut self, _key: usize, value: usize) {
        self.spare.lock().unwrap().push(value);
    }
}

/// Budgeted reapers from several threads never evict more than they are allowed
#[test]
fn stress_budgeted_reapers() {
    let pool = Arc::new(pool(1024));
    for i in 0..1000 {
        pool.put_inactive(i, i);
    }

    let spare = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();
    for _ in 0..4 {
        let pool = Arc::clone(&pool);
        let spare = Arc::clone(&spare);
        handles.push(thread::spawn(move || {
            let mut runner = Budgeted::new(Recycler { spare }, 100);
            pool.sweep(&mut runner)
        }));
    }

    let total: usize = handles
        .into_iter()
        .map(|h| h.join().expect("Reaper panicked"))
        .sum();

    assert_eq!(total, 400);
    assert_eq!(pool.inactive_len(), 600);
    let mut spare = spare.lock().unwrap().clone();
    spare.sort_unstable();
    spare.dedup();
    assert_eq!(spare.len(), 400);
}

/// trim_inactive from many threads converges on the bound
#[test]
fn stress_trim_inactive() {
    let pool = Arc::new(pool(0));
    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let pool = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            for i in 0..500 {
                pool.put_inactive(t * 500 + i, i);
                if i % 50 == 0 {
                    pool.trim_inactive(64, |_, _| {});
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    pool.trim_inactive(64, |_, _| {});
    assert!(pool.inactive_len() <= 64);
}
