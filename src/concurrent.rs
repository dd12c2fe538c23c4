//! Concurrent Pool Implementation
//!
//! The thread-safe flavour of the two-tier cache. One `parking_lot::Mutex`
//! guards the whole pool: both key indices and the inactive ring are updated
//! together, so every direct operation is atomic with respect to every other.
//!
//! ## Why one Mutex instead of lock striping or RwLock?
//!
//! The LRU ordering of the inactive tier is global: a sweep must visit idle
//! entries in demotion order across all keys. Striping the key space would
//! give each stripe its own order and break that. And every `get` can promote
//! an idle entry, so reads need exclusive access anyway; an `RwLock` would add
//! bookkeeping without adding parallelism.
//!
//! ## Sweeps and the lock
//!
//! A sweep does not hold the lock for its whole pass. Each step takes the lock,
//! moves the cursor, asks the runner, and unlinks an accepted entry; the lock
//! is released before the runner's `remove` callback runs. Other threads keep
//! using the pool while a slow cleanup is in progress, and the callback may
//! call back into the pool.
//!
//! ```text
//!  thread A (sweep)                     thread B
//!  ─────────────────                    ─────────
//!  lock · step · unlink · unlock
//!  remove(k, v)  ◄── lock free ──►      put_active / get / remove ...
//!  lock · step · ... · unlock
//! ```
//!
//! | Type | Description |
//! |------|-------------|
//! | [`InstancePool`] | Thread-safe two-tier pool with LRU sweep |
//!
//! # Thread Safety
//!
//! `InstancePool` is `Send + Sync` whenever its keys, values and hasher are
//! `Send`, and can be shared through an `Arc`.
//!
//! # Zero-Copy Access
//!
//! `get` and `peek` return clones. Use `get_with` / `peek_with` to read a
//! value in place while the lock is held:
//!
//! ```rust
//! use instance_pool::InstancePool;
//!
//! let pool = InstancePool::new();
//! pool.put_inactive("conn", vec![0u8; 4096]);
//! let len = pool.get_with(&"conn", |buf| buf.len());
//! assert_eq!(len, Some(4096));
//! ```

mod pool;

pub use self::pool::InstancePool;
