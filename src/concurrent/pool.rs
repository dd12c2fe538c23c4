//! Concurrent Instance Pool
//!
//! A thread-safe two-tier pool: an **active** tier of checked-out instances and
//! an **inactive** tier of idle ones kept in LRU order. Idle instances are only
//! ever reclaimed by [`InstancePool::sweep`], which the owner calls on its own
//! schedule with a policy object deciding what goes.
//!
//! # Typical Use
//!
//! ```text
//!   checkout:  pool.get(&id)  or  pool.put_active(id, fresh)
//!   checkin:   pool.put_inactive(id, instance)
//!   reaper:    pool.sweep(&mut policy)          (periodically)
//! ```
//!
//! # Example
//!
//! ```rust
//! use instance_pool::{FnRunner, InstancePool};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let pool = Arc::new(InstancePool::new());
//!
//! let handles: Vec<_> = (0..4u32)
//!     .map(|t| {
//!         let pool = Arc::clone(&pool);
//!         thread::spawn(move || {
//!             for i in 0..100u32 {
//!                 let id = t * 1000 + i;
//!                 pool.put_active(id, format!("instance-{}", id));
//!                 pool.put_inactive(id, format!("instance-{}", id));
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(pool.inactive_len(), 400);
//!
//! // Reap everything, closing instances outside the pool lock
//! let mut closed = 0;
//! pool.sweep(&mut FnRunner::new(|_: &u32, _: &String| true, |_, _| closed += 1));
//! assert_eq!(closed, 400);
//! assert!(pool.is_empty());
//! ```

extern crate alloc;

use crate::config::InstancePoolConfig;
use crate::list::CursorId;
use crate::metrics::CacheMetrics;
use crate::sweep::{self, Budgeted, FnRunner, SweepRunner};
use crate::tiered::TieredSegment;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// Ends a sweep even if a runner callback unwinds.
struct SweepCursor<'a, K, V, S> {
    segment: &'a Mutex<TieredSegment<K, V, S>>,
    cursor: CursorId,
}

impl<K, V, S> Drop for SweepCursor<'_, K, V, S> {
    fn drop(&mut self) {
        self.segment.lock().end_sweep(self.cursor);
    }
}

/// A thread-safe two-tier instance pool with an externally paced LRU sweep.
///
/// Every direct operation runs under one pool-wide lock. [`sweep`](Self::sweep)
/// takes that lock one step at a time and releases it before handing an
/// evicted instance to the runner.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq`; `Clone` for `put_inactive`.
/// - `V`: Value type. `Clone` is only needed by [`get`](Self::get) and
///   [`peek`](Self::peek).
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
///
/// # Example
///
/// ```rust
/// use instance_pool::InstancePool;
///
/// let pool = InstancePool::new();
/// assert_eq!(pool.len(), 0);
///
/// pool.put_inactive("x", "v1");
/// assert_eq!(pool.len(), 1);
/// assert!(!pool.is_active(&"x"));
/// assert_eq!(pool.peek(&"x"), Some("v1"));
///
/// assert_eq!(pool.get(&"x"), Some("v1"));
/// assert!(pool.is_active(&"x"));
///
/// assert_eq!(pool.remove(&"x"), Some("v1"));
/// assert_eq!(pool.len(), 0);
/// ```
pub struct InstancePool<K, V, S = DefaultHashBuilder> {
    segment: Mutex<TieredSegment<K, V, S>>,
}

impl<K, V> InstancePool<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates an empty pool with the default hasher and no pre-allocation.
    pub fn new() -> Self {
        Self::init(InstancePoolConfig::default(), None)
    }

    /// Creates a pool from a configuration with an optional hasher.
    ///
    /// This is the **recommended** way to create a pool.
    ///
    /// # Arguments
    ///
    /// * `config` - Pre-allocation settings
    /// * `hasher` - Optional custom hash builder. If `None`, uses `DefaultHashBuilder`
    ///
    /// # Example
    ///
    /// ```rust
    /// use instance_pool::config::InstancePoolConfig;
    /// use instance_pool::InstancePool;
    ///
    /// let config = InstancePoolConfig { capacity: 1024 };
    /// let pool: InstancePool<u64, String> = InstancePool::init(config, None);
    /// assert!(pool.is_empty());
    /// ```
    pub fn init(config: InstancePoolConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K, V> Default for InstancePool<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> InstancePool<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Clone,
{
    /// Creates a pool with a custom hash builder.
    ///
    /// Use this for deterministic hashing or DoS-resistant hashers.
    pub fn init_with_hasher(config: InstancePoolConfig, hash_builder: S) -> Self {
        InstancePool {
            segment: Mutex::new(TieredSegment::with_hasher(config, hash_builder)),
        }
    }
}

impl<K, V, S> InstancePool<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Total number of entries in both tiers.
    pub fn len(&self) -> usize {
        self.segment.lock().len()
    }

    /// Returns `true` if neither tier holds anything.
    pub fn is_empty(&self) -> bool {
        self.segment.lock().is_empty()
    }

    /// Number of checked-out entries.
    pub fn active_len(&self) -> usize {
        self.segment.lock().active_len()
    }

    /// Number of idle entries.
    pub fn inactive_len(&self) -> usize {
        self.segment.lock().inactive_len()
    }

    /// The configuration this pool was built with.
    pub fn config(&self) -> InstancePoolConfig {
        self.segment.lock().config()
    }

    /// Places `value` in the active tier, promoting `key` if it was idle.
    ///
    /// Returns the value this replaced: the previous active value, or else the
    /// idle one that was unlinked.
    pub fn put_active(&self, key: K, value: V) -> Option<V> {
        self.segment.lock().put_active(key, value)
    }

    /// Places `value` in the inactive tier as the most recently demoted entry.
    ///
    /// Any active value or older idle entry for `key` is displaced and
    /// returned, so the caller can dispose of it.
    pub fn put_inactive(&self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        self.segment.lock().put_inactive(key, value)
    }

    /// Looks `key` up, promoting an idle entry to the active tier.
    ///
    /// Returns a **clone** of the value so the lock is not held by the caller.
    /// Use [`get_with`](Self::get_with) to avoid the clone.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().get(key).cloned()
    }

    /// Looks `key` up like [`get`](Self::get) and applies `f` under the lock.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().get(key).map(f)
    }

    /// Looks `key` up like [`get`](Self::get) and lets `f` modify the value in place.
    pub fn get_mut_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&mut V) -> R,
    {
        self.segment.lock().get_mut(key).map(f)
    }

    /// Looks `key` up in either tier without promoting or reordering.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().peek(key).cloned()
    }

    /// Like [`peek`](Self::peek) but applies `f` under the lock instead of cloning.
    pub fn peek_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().peek(key).map(f)
    }

    /// Removes `key` from both tiers and returns its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().remove(key)
    }

    /// Returns `true` if `key` is checked out.
    pub fn is_active<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().is_active(key)
    }

    /// Returns `true` if `key` is idle and eligible for eviction.
    pub fn is_inactive<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().is_inactive(key)
    }

    /// Returns `true` if `key` is in either tier.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().contains(key)
    }

    /// Drops every entry in both tiers. No runner is notified.
    ///
    /// Safe to call while another thread is sweeping: its cursor only meets
    /// tombstones from here on and the sweep ends normally.
    pub fn clear(&self) {
        self.segment.lock().clear();
    }

    /// Makes one pass over the inactive tier, least recently demoted first.
    ///
    /// For each step the runner is asked
    /// [`should_continue`](SweepRunner::should_continue) with the lock
    /// released, then [`should_remove`](SweepRunner::should_remove) under the
    /// lock. An accepted entry is unlinked and de-indexed, the lock is
    /// released, and only then is [`remove`](SweepRunner::remove) called.
    ///
    /// Entries demoted while the sweep runs are visited if the cursor has not
    /// passed them yet. Every entry is offered at most once per call. Sweeps
    /// may overlap, from several threads or nested inside `remove`; each one
    /// holds back at most one unlinked slot from reuse.
    ///
    /// A `remove` that demotes every evicted instance again keeps feeding the
    /// cursor; bound such a runner with [`Budgeted`] or `should_continue`.
    ///
    /// Returns the number of entries evicted.
    ///
    /// # Deadlocks
    ///
    /// `should_remove` runs while the pool lock is held, and the lock is not
    /// reentrant. Calling any method of this pool from `should_remove`, even
    /// [`is_active`](Self::is_active), deadlocks the calling thread.
    /// `should_continue` and `remove` run with the lock released and may call
    /// back into the pool freely, including starting another sweep.
    pub fn sweep<R>(&self, runner: &mut R) -> usize
    where
        R: SweepRunner<K, V> + ?Sized,
    {
        let cursor = self.segment.lock().begin_sweep();
        let _cursor = SweepCursor {
            segment: &self.segment,
            cursor,
        };
        let evicted = sweep::drive(runner, |r| {
            let mut segment = self.segment.lock();
            segment.sweep_step(cursor, r)
        });
        evicted
    }

    /// Evicts idle entries, oldest first, until at most `max_inactive` remain.
    ///
    /// The excess is measured once when the call starts; entries other threads
    /// demote in the meantime are not taken into account. `on_remove` runs
    /// outside the lock. Returns the number evicted.
    pub fn trim_inactive<F>(&self, max_inactive: usize, on_remove: F) -> usize
    where
        F: FnMut(K, V),
    {
        let excess = self.inactive_len().saturating_sub(max_inactive);
        if excess == 0 {
            return 0;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(excess, max_inactive, "trimming inactive tier");
        let mut runner = Budgeted::new(FnRunner::new(|_: &K, _: &V| true, on_remove), excess);
        self.sweep(&mut runner)
    }
}

impl<K, V, S> CacheMetrics for InstancePool<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.lock().metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "TIERED_LRU"
    }
}

impl<K, V, S> fmt::Debug for InstancePool<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // try_lock: Debug may be reached from inside a runner callback.
        match self.segment.try_lock() {
            Some(segment) => f
                .debug_struct("InstancePool")
                .field("active", &segment.active_len())
                .field("inactive", &segment.inactive_len())
                .field("sweeping", &segment.sweep_in_progress())
                .finish(),
            None => f
                .debug_struct("InstancePool")
                .field("state", &"<locked>")
                .finish(),
        }
    }
}
