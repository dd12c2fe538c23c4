//! Instance Pool Usage Examples
//!
//! This example demonstrates checkout/checkin cycles, a background reaper and
//! zero-copy access with the concurrent `InstancePool`.
//!
//! Run with: cargo run --example pool_usage --features concurrent

extern crate instance_pool;

use instance_pool::config::InstancePoolConfig;
use instance_pool::{Budgeted, CacheMetrics, InstancePool, SweepRunner};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// A pooled stateful session.
#[derive(Debug, Clone)]
struct Session {
    id: u32,
    last_used: Instant,
    scratch: Vec<u8>,
}

impl Session {
    fn open(id: u32) -> Self {
        Session {
            id,
            last_used: Instant::now(),
            scratch: vec![0; 256],
        }
    }
}

/// Closes sessions idle for longer than `max_idle`.
struct IdleReaper {
    max_idle: Duration,
    closed: Vec<u32>,
}

impl SweepRunner<u32, Session> for IdleReaper {
    fn should_remove(&mut self, _id: &u32, session: &Session) -> bool {
        session.last_used.elapsed() >= self.max_idle
    }

    fn remove(&mut self, id: u32, session: Session) {
        // Runs outside the pool lock, so slow teardown is fine here
        debug_assert_eq!(id, session.id);
        self.closed.push(id);
    }
}

fn main() {
    println!("Instance Pool Usage Examples");
    println!("============================\n");

    checkout_checkin();
    println!();

    idle_reaper();
    println!();

    zero_copy_get_with();
}

/// Threads checking sessions out and back in
fn checkout_checkin() {
    println!("1. Checkout / Checkin");
    println!("   -------------------");

    let pool = Arc::new(InstancePool::init(InstancePoolConfig { capacity: 64 }, None));
    let num_threads = 4;
    let ops_per_thread = 1000;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let id = (thread_id * 16 + i % 16) as u32;
                    let mut session = pool.get(&id).unwrap_or_else(|| Session::open(id));
                    session.last_used = Instant::now();
                    pool.put_inactive(id, session);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    println!(
        "   Completed {} cycles across {} threads",
        num_threads * ops_per_thread,
        num_threads
    );
    println!(
        "   Pool: {} active, {} idle",
        pool.active_len(),
        pool.inactive_len()
    );
    let metrics = pool.metrics();
    println!(
        "   Hit rate: {:.1}%",
        metrics.get("hit_rate").copied().unwrap_or_default() * 100.0
    );
}

/// Reaping sessions that sat idle too long
fn idle_reaper() {
    println!("2. Idle Reaper");
    println!("   -----------");

    let pool: InstancePool<u32, Session> = InstancePool::new();
    for id in 0..10 {
        pool.put_inactive(id, Session::open(id));
    }
    thread::sleep(Duration::from_millis(20));

    // Two sessions are touched again and survive the reaper
    for id in [3, 7] {
        if let Some(mut session) = pool.get(&id) {
            session.last_used = Instant::now();
            pool.put_inactive(id, session);
        }
    }

    // Close at most five stale sessions per pass
    let mut reaper = Budgeted::new(
        IdleReaper {
            max_idle: Duration::from_millis(10),
            closed: Vec::new(),
        },
        5,
    );
    let first = pool.sweep(&mut reaper);
    let mut reaper = reaper.into_inner();
    let second = pool.sweep(&mut reaper);

    println!("   First pass closed {}, second pass closed {}", first, second);
    println!("   Closed sessions: {:?}", reaper.closed);
    println!("   Still pooled: {}", pool.len());
}

/// Zero-copy access pattern using get_with()
fn zero_copy_get_with() {
    println!("3. Zero-Copy Access with get_with()");
    println!("   ----------------------------------");

    let pool: InstancePool<u32, Session> = InstancePool::new();
    pool.put_inactive(1, Session::open(1));

    // Inspect the scratch buffer without cloning the session
    let len = pool.peek_with(&1, |session| session.scratch.len());
    println!("   Scratch buffer: {} bytes", len.unwrap_or_default());

    // Mutate in place; this also checks the session out
    pool.get_mut_with(&1, |session| session.scratch.fill(0xAB));
    let all_set = pool.get_with(&1, |session| session.scratch.iter().all(|&b| b == 0xAB));
    println!("   Scratch rewritten in place: {}", all_set.unwrap_or(false));
    println!("   Session active: {}", pool.is_active(&1));
}
