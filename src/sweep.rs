//! Sweep policies.
//!
//! A sweep walks the inactive tier once, from the least to the most recently
//! demoted entry, and asks a [`SweepRunner`] what to do with each candidate:
//!
//! ```text
//!   sentinel ◄── prev ── LRU ◄── ... ◄── MRU ◄── prev ── sentinel
//!       │                 ▲                               ▲
//!       └── cursor starts here, first step lands on LRU   └── stop
//! ```
//!
//! For every step the runner is polled with
//! [`should_continue`](SweepRunner::should_continue), then consulted with
//! [`should_remove`](SweepRunner::should_remove). Accepted entries are unlinked
//! and de-indexed first; only then is [`remove`](SweepRunner::remove) called
//! with ownership of the evicted pair. Eviction is not a transaction: `remove`
//! is a notification and cannot put the entry back.
//!
//! In the concurrent pool `should_remove` runs under the pool lock and must
//! not call back into the same pool. `should_continue` and `remove` run with
//! the lock released and may use the pool freely.

use core::fmt;

/// Caller-supplied eviction policy for a sweep.
///
/// # Examples
///
/// ```
/// use instance_pool::{SweepRunner, TieredCache};
///
/// /// Evicts idle connections to one host and closes them.
/// struct CloseIdle<'a> {
///     host: &'a str,
///     closed: Vec<u32>,
/// }
///
/// impl SweepRunner<(String, u32), u32> for CloseIdle<'_> {
///     fn should_remove(&mut self, key: &(String, u32), _conn: &u32) -> bool {
///         key.0 == self.host
///     }
///
///     fn remove(&mut self, _key: (String, u32), conn: u32) {
///         self.closed.push(conn);
///     }
/// }
///
/// let mut cache = TieredCache::new();
/// cache.put_inactive(("db".to_string(), 1), 10);
/// cache.put_inactive(("web".to_string(), 1), 20);
/// cache.put_inactive(("db".to_string(), 2), 30);
///
/// let mut runner = CloseIdle { host: "db", closed: Vec::new() };
/// assert_eq!(cache.sweep(&mut runner), 2);
/// assert_eq!(runner.closed, vec![10, 30]);
/// assert_eq!(cache.len(), 1);
/// ```
pub trait SweepRunner<K, V> {
    /// Polled before every step. Returning `false` ends the sweep at once.
    ///
    /// This is the only cancellation hook: budgets and deadlines live here.
    fn should_continue(&mut self) -> bool {
        true
    }

    /// Decides whether the candidate is evicted.
    fn should_remove(&mut self, key: &K, value: &V) -> bool;

    /// Receives an entry that has already been evicted.
    fn remove(&mut self, key: K, value: V);
}

impl<K, V, R> SweepRunner<K, V> for &mut R
where
    R: SweepRunner<K, V> + ?Sized,
{
    #[inline]
    fn should_continue(&mut self) -> bool {
        (**self).should_continue()
    }

    #[inline]
    fn should_remove(&mut self, key: &K, value: &V) -> bool {
        (**self).should_remove(key, value)
    }

    #[inline]
    fn remove(&mut self, key: K, value: V) {
        (**self).remove(key, value)
    }
}

/// A runner built from two closures.
///
/// # Examples
///
/// ```
/// use instance_pool::{FnRunner, TieredCache};
///
/// let mut cache = TieredCache::new();
/// for i in 0..6 {
///     cache.put_inactive(i, i * 10);
/// }
///
/// let mut dropped = Vec::new();
/// let mut runner = FnRunner::new(|_k: &i32, v: &i32| v % 20 == 0, |k, _v| dropped.push(k));
/// cache.sweep(&mut runner);
/// assert_eq!(dropped, vec![0, 2, 4]);
/// ```
pub struct FnRunner<P, F> {
    should_remove: P,
    remove: F,
}

impl<P, F> FnRunner<P, F> {
    /// `should_remove` picks candidates, `remove` receives the evicted pairs.
    pub fn new(should_remove: P, remove: F) -> Self {
        FnRunner {
            should_remove,
            remove,
        }
    }
}

impl<K, V, P, F> SweepRunner<K, V> for FnRunner<P, F>
where
    P: FnMut(&K, &V) -> bool,
    F: FnMut(K, V),
{
    #[inline]
    fn should_remove(&mut self, key: &K, value: &V) -> bool {
        (self.should_remove)(key, value)
    }

    #[inline]
    fn remove(&mut self, key: K, value: V) {
        (self.remove)(key, value)
    }
}

impl<P, F> fmt::Debug for FnRunner<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRunner").finish_non_exhaustive()
    }
}

/// Wraps a runner and stops the sweep after a fixed number of evictions.
///
/// # Examples
///
/// ```
/// use instance_pool::{Budgeted, FnRunner, TieredCache};
///
/// let mut cache = TieredCache::new();
/// for i in 0..10 {
///     cache.put_inactive(i, ());
/// }
///
/// let mut runner = Budgeted::new(FnRunner::new(|_: &i32, _: &()| true, |_, _| {}), 3);
/// assert_eq!(cache.sweep(&mut runner), 3);
/// assert_eq!(runner.remaining(), 0);
/// assert_eq!(cache.inactive_len(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct Budgeted<R> {
    inner: R,
    remaining: usize,
}

impl<R> Budgeted<R> {
    /// Allows at most `max_evictions` evictions through `inner`.
    pub fn new(inner: R, max_evictions: usize) -> Self {
        Budgeted {
            inner,
            remaining: max_evictions,
        }
    }

    /// Evictions still allowed.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Unwraps the inner runner.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<K, V, R> SweepRunner<K, V> for Budgeted<R>
where
    R: SweepRunner<K, V>,
{
    fn should_continue(&mut self) -> bool {
        self.remaining > 0 && self.inner.should_continue()
    }

    fn should_remove(&mut self, key: &K, value: &V) -> bool {
        self.inner.should_remove(key, value)
    }

    fn remove(&mut self, key: K, value: V) {
        self.remaining = self.remaining.saturating_sub(1);
        self.inner.remove(key, value);
    }
}

/// Outcome of advancing a sweep cursor by one node.
pub(crate) enum SweepStep<K, V> {
    /// The cursor came back to the sentinel.
    Finished,
    /// Tombstone, or a live entry the runner kept.
    Skipped,
    /// Entry already unlinked and de-indexed, waiting for `remove`.
    Evicted(K, V),
}

/// Runs the sweep loop shared by every pool flavour.
///
/// `step` advances the cursor under whatever locking the caller needs and must
/// have released it by the time it returns; `runner.remove` is called here.
pub(crate) fn drive<K, V, R, F>(runner: &mut R, mut step: F) -> usize
where
    R: SweepRunner<K, V> + ?Sized,
    F: FnMut(&mut R) -> SweepStep<K, V>,
{
    #[cfg(feature = "tracing")]
    let mut visited = 0usize;
    let mut evicted = 0usize;

    while runner.should_continue() {
        match step(&mut *runner) {
            SweepStep::Finished => break,
            SweepStep::Skipped => {
                #[cfg(feature = "tracing")]
                {
                    visited += 1;
                }
            }
            SweepStep::Evicted(key, value) => {
                #[cfg(feature = "tracing")]
                {
                    visited += 1;
                }
                evicted += 1;
                #[cfg(feature = "tracing")]
                tracing::trace!(evicted, "evicting idle entry");
                runner.remove(key, value);
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(visited, evicted, "inactive sweep finished");

    evicted
}
