//! Two-Tier Instance Cache Implementation
//!
//! A keyed cache split into an **active** tier (checked out, pinned, never
//! evicted) and an **inactive** tier (idle, reclaimable, LRU-ordered). Idle
//! entries leave only through an explicit sweep driven by a
//! [`SweepRunner`], so the cache itself never evicts on insert.
//!
//! # Algorithm
//!
//! ```text
//!   active:   HashMap<K, V>                      (no ordering, O(1) membership)
//!   inactive: HashMap<K, SlotId> ──┐
//!                                  ▼
//!   ring:   [sentinel] ⇄ MRU ⇄ ... ⇄ LRU ⇄ [sentinel]
//! ```
//!
//! - `put_inactive` (demotion) links a fresh node right after the sentinel.
//! - `get` on an idle key (promotion) unlinks it and moves the value to the
//!   active map. `put_active` promotes unconditionally.
//! - A sweep starts at the sentinel and follows `prev` links, so the first
//!   candidate is the entry demoted longest ago.
//!
//! A key lives in at most one tier at a time.
//!
//! # Performance Characteristics
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `get` / `peek` / `is_active` | O(1) |
//! | `put_active` / `put_inactive` / `remove` | O(1) |
//! | `sweep` | O(visited) |
//!
//! # Thread Safety
//!
//! [`TieredCache`] is the single-threaded flavour and works in `no_std`
//! environments. The concurrent `InstancePool` (feature `concurrent`) wraps the
//! same segment in a mutex and releases it around eviction callbacks.

extern crate alloc;

use crate::config::InstancePoolConfig;
use crate::list::{CursorId, List, SlotId, SENTINEL};
use crate::metrics::{CacheMetrics, PoolMetrics};
use crate::sweep::{self, Budgeted, FnRunner, SweepRunner, SweepStep};
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Internal two-tier segment containing the actual algorithm.
///
/// Shared between [`TieredCache`] (single-threaded) and `InstancePool`
/// (multi-threaded). The ring list owns every inactive key/value pair; the
/// inactive index only maps keys to ring slots.
pub(crate) struct TieredSegment<K, V, S = DefaultHashBuilder> {
    config: InstancePoolConfig,
    active: HashMap<K, V, S>,
    inactive: HashMap<K, SlotId, S>,
    list: List<(K, V)>,
    metrics: PoolMetrics,
}

impl<K, V, S> TieredSegment<K, V, S> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }

    #[inline]
    pub(crate) fn active_len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub(crate) fn inactive_len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub(crate) fn config(&self) -> InstancePoolConfig {
        self.config
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    /// Opens a cursor on the ring for a sweep. It starts on the sentinel.
    pub(crate) fn begin_sweep(&mut self) -> CursorId {
        self.metrics.record_sweep();
        self.list.open_cursor()
    }

    /// Closes the cursor opened by [`begin_sweep`](Self::begin_sweep).
    pub(crate) fn end_sweep(&mut self, cursor: CursorId) {
        self.list.close_cursor(cursor);
    }

    #[inline]
    pub(crate) fn sweep_in_progress(&self) -> bool {
        self.list.has_cursors()
    }

    /// Inactive entries from the least to the most recently demoted.
    pub(crate) fn iter_inactive(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list.iter().map(|(k, v)| (k, v))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> TieredSegment<K, V, S> {
    pub(crate) fn with_hasher(config: InstancePoolConfig, hash_builder: S) -> Self
    where
        S: Clone,
    {
        TieredSegment {
            config,
            active: HashMap::with_capacity_and_hasher(config.capacity, hash_builder.clone()),
            inactive: HashMap::with_capacity_and_hasher(config.capacity, hash_builder),
            list: List::with_capacity(config.capacity),
            metrics: PoolMetrics::new(),
        }
    }

    #[inline]
    pub(crate) fn is_active<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.active.contains_key(key)
    }

    #[inline]
    pub(crate) fn is_inactive<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inactive.contains_key(key)
    }

    #[inline]
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.is_active(key) || self.is_inactive(key)
    }

    /// Unlinks the inactive node for `key`, if any, and returns its pair.
    fn take_inactive<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.inactive.remove(key)?;
        let pair = self.list.unlink(id);
        debug_assert!(pair.is_some(), "inactive index pointed at a tombstone");
        pair
    }

    /// Makes sure `key` is in the active tier, promoting it if it was idle.
    /// Returns `false` when the key is in neither tier.
    fn promote<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.active.contains_key(key) {
            self.metrics.record_active_hit();
            return true;
        }
        match self.take_inactive(key) {
            Some((k, v)) => {
                self.active.insert(k, v);
                self.metrics.record_inactive_hit();
                true
            }
            None => {
                self.metrics.record_miss();
                false
            }
        }
    }

    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.promote(key) {
            self.active.get(key)
        } else {
            None
        }
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.promote(key) {
            self.active.get_mut(key)
        } else {
            None
        }
    }

    pub(crate) fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if let Some(value) = self.active.get(key) {
            return Some(value);
        }
        let id = *self.inactive.get(key)?;
        self.list.get(id).map(|(_, v)| v)
    }

    pub(crate) fn put_active(&mut self, key: K, value: V) -> Option<V> {
        self.metrics.record_activation();
        let idle = self.take_inactive(&key).map(|(_, v)| v);
        self.active.insert(key, value).or(idle)
    }

    pub(crate) fn put_inactive(&mut self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        self.metrics.record_demotion();
        let displaced = self.active.remove(&key);
        // An older idle node for the same key must leave the ring, or it
        // would linger there unreachable from the index.
        let stale = self.take_inactive(&key).map(|(_, v)| v);
        let id = self.list.push_front((key.clone(), value));
        self.inactive.insert(key, id);
        displaced.or(stale)
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let active = self.active.remove(key);
        let idle = self.take_inactive(key).map(|(_, v)| v);
        let found = active.or(idle);
        if found.is_some() {
            self.metrics.record_removal();
        }
        found
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
        self.inactive.clear();
        self.list.clear();
    }

    /// Advances `cursor` one node toward the MRU end and applies the runner.
    ///
    /// The list keeps the tombstone under a parked cursor and redirects its
    /// `prev` link as neighbours go, so a cursor left on an entry that was
    /// removed since the last step still finds its way back into the live ring.
    pub(crate) fn sweep_step<R>(&mut self, cursor: CursorId, runner: &mut R) -> SweepStep<K, V>
    where
        R: SweepRunner<K, V> + ?Sized,
    {
        let id = self.list.advance(cursor);
        if id == SENTINEL {
            return SweepStep::Finished;
        }
        if self.list.is_removed(id) {
            return SweepStep::Skipped;
        }
        let accept = match self.list.get(id) {
            Some((key, value)) => runner.should_remove(key, value),
            None => false,
        };
        if !accept {
            return SweepStep::Skipped;
        }
        match self.list.unlink(id) {
            Some((key, value)) => {
                let indexed = self.inactive.remove(&key);
                debug_assert_eq!(indexed, Some(id));
                self.metrics.record_eviction();
                SweepStep::Evicted(key, value)
            }
            None => SweepStep::Skipped,
        }
    }

    #[cfg(test)]
    pub(crate) fn slots(&self) -> usize {
        self.list.slots()
    }

    /// Checks tier exclusivity and index/ring agreement.
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        self.list.debug_validate_invariants();
        assert_eq!(self.list.len(), self.inactive.len());
        for (key, &id) in self.inactive.iter() {
            assert!(!self.active.contains_key(key), "key present in both tiers");
            match self.list.get(id) {
                Some((k, _)) => assert!(k == key, "index points at another key"),
                None => panic!("index points at a tombstone"),
            }
        }
    }
}

impl<K, V, S> fmt::Debug for TieredSegment<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredSegment")
            .field("active", &self.active.len())
            .field("inactive", &self.inactive.len())
            .field("sweeping", &self.sweep_in_progress())
            .field("list", &self.list)
            .finish()
    }
}

/// Ends the sweep even if a runner callback unwinds.
struct SweepGuard<'a, K, V, S> {
    segment: &'a mut TieredSegment<K, V, S>,
    cursor: CursorId,
}

impl<K, V, S> Drop for SweepGuard<'_, K, V, S> {
    fn drop(&mut self) {
        self.segment.end_sweep(self.cursor);
    }
}

/// A two-tier (active/inactive) keyed cache with an externally paced LRU sweep.
///
/// Active entries are in use and never evicted. Inactive entries are idle and
/// are reclaimed, least recently demoted first, by [`sweep`](Self::sweep).
/// This is the single-threaded flavour; see `InstancePool` for the shared one.
///
/// # Examples
///
/// ```
/// use instance_pool::{FnRunner, TieredCache};
///
/// let mut cache = TieredCache::new();
///
/// // Check two instances back in
/// cache.put_inactive("a", 1);
/// cache.put_inactive("b", 2);
/// assert!(!cache.is_active(&"a"));
///
/// // Checking one out promotes it to the active tier
/// assert_eq!(cache.get(&"a"), Some(&1));
/// assert!(cache.is_active(&"a"));
///
/// // A sweep only ever sees idle entries
/// let mut reclaimed = Vec::new();
/// cache.sweep(&mut FnRunner::new(|_: &&str, _: &i32| true, |k, _| reclaimed.push(k)));
/// assert_eq!(reclaimed, vec!["b"]);
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug)]
pub struct TieredCache<K, V, S = DefaultHashBuilder> {
    segment: TieredSegment<K, V, S>,
}

impl<K: Hash + Eq, V> TieredCache<K, V, DefaultHashBuilder> {
    /// Creates an empty cache with the default hasher and no pre-allocation.
    pub fn new() -> Self {
        Self::init(InstancePoolConfig::default(), None)
    }

    /// Creates a cache from a configuration with an optional hasher.
    ///
    /// # Arguments
    ///
    /// * `config` - Pre-allocation settings
    /// * `hasher` - Optional custom hash builder. If `None`, uses `DefaultHashBuilder`
    pub fn init(config: InstancePoolConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K: Hash + Eq, V> Default for TieredCache<K, V, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Clone> TieredCache<K, V, S> {
    /// Creates a cache with a custom hash builder.
    pub fn init_with_hasher(config: InstancePoolConfig, hash_builder: S) -> Self {
        TieredCache {
            segment: TieredSegment::with_hasher(config, hash_builder),
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> TieredCache<K, V, S> {
    /// Total number of entries in both tiers.
    #[inline]
    pub fn len(&self) -> usize {
        self.segment.len()
    }

    /// Returns `true` if neither tier holds anything.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    /// Number of entries in the active tier.
    #[inline]
    pub fn active_len(&self) -> usize {
        self.segment.active_len()
    }

    /// Number of entries in the inactive tier.
    #[inline]
    pub fn inactive_len(&self) -> usize {
        self.segment.inactive_len()
    }

    /// The configuration this cache was built with.
    #[inline]
    pub fn config(&self) -> InstancePoolConfig {
        self.segment.config()
    }

    /// Places `value` in the active tier, promoting `key` if it was idle.
    ///
    /// Returns the value this replaced: the previous active value, or else the
    /// idle one that was unlinked.
    #[inline]
    pub fn put_active(&mut self, key: K, value: V) -> Option<V> {
        self.segment.put_active(key, value)
    }

    /// Places `value` in the inactive tier as the most recently demoted entry.
    ///
    /// Any active value or older idle entry for `key` is displaced and returned.
    #[inline]
    pub fn put_inactive(&mut self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        self.segment.put_inactive(key, value)
    }

    /// Looks `key` up, promoting an idle entry to the active tier.
    #[inline]
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get(key)
    }

    /// Like [`get`](Self::get) but returns a mutable reference.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get_mut(key)
    }

    /// Looks `key` up in either tier without changing anything.
    #[inline]
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.peek(key)
    }

    /// Removes `key` from both tiers.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.remove(key)
    }

    /// Returns `true` if `key` is checked out.
    #[inline]
    pub fn is_active<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.is_active(key)
    }

    /// Returns `true` if `key` is idle and eligible for eviction.
    #[inline]
    pub fn is_inactive<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.is_inactive(key)
    }

    /// Returns `true` if `key` is in either tier.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.contains(key)
    }

    /// Drops every entry in both tiers. No runner is notified.
    #[inline]
    pub fn clear(&mut self) {
        self.segment.clear()
    }

    /// Idle entries from the least to the most recently demoted.
    pub fn iter_inactive(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.segment.iter_inactive()
    }

    /// Makes one pass over the inactive tier, least recently demoted first.
    ///
    /// Each idle entry is offered to the runner at most once. Returns the
    /// number of entries evicted.
    pub fn sweep<R>(&mut self, runner: &mut R) -> usize
    where
        R: SweepRunner<K, V> + ?Sized,
    {
        let cursor = self.segment.begin_sweep();
        let guard = SweepGuard {
            segment: &mut self.segment,
            cursor,
        };
        let segment = &mut *guard.segment;
        let evicted = sweep::drive(runner, |r| segment.sweep_step(cursor, r));
        evicted
    }

    /// Evicts idle entries, oldest first, until at most `max_inactive` remain.
    ///
    /// Each evicted pair is handed to `on_remove`. Returns the number evicted.
    pub fn trim_inactive<F>(&mut self, max_inactive: usize, on_remove: F) -> usize
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

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for TieredCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.segment.metrics().algorithm_name()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::panic::{self, AssertUnwindSafe};

    fn evict_all<K, V>(cache: &mut TieredCache<K, V>) -> Vec<K>
    where
        K: Hash + Eq,
    {
        let mut order = Vec::new();
        cache.sweep(&mut FnRunner::new(|_: &K, _: &V| true, |k, _| order.push(k)));
        order
    }

    #[test]
    fn test_tiered_put_get() {
        let mut cache = TieredCache::new();
        assert_eq!(cache.put_inactive("apple", 1), None);
        assert_eq!(cache.put_active("banana", 2), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.active_len(), 1);
        assert_eq!(cache.inactive_len(), 1);
        assert_eq!(cache.get(&"apple"), Some(&1));
        assert!(cache.is_active(&"apple"));
        assert!(!cache.is_inactive(&"apple"));
        assert_eq!(cache.get(&"cherry"), None);
        cache.segment.validate();
    }

    #[test]
    fn test_tiered_put_active_promotes() {
        let mut cache = TieredCache::new();
        cache.put_inactive("a", 1);
        assert_eq!(cache.put_active("a", 2), Some(1));
        assert!(cache.is_active(&"a"));
        assert_eq!(cache.inactive_len(), 0);
        assert_eq!(cache.peek(&"a"), Some(&2));
        cache.segment.validate();
    }

    #[test]
    fn test_tiered_put_inactive_demotes() {
        let mut cache = TieredCache::new();
        cache.put_active("a", 1);
        assert_eq!(cache.put_inactive("a", 2), Some(1));
        assert!(!cache.is_active(&"a"));
        assert!(cache.is_inactive(&"a"));
        assert_eq!(cache.len(), 1);
        cache.segment.validate();
    }

    #[test]
    fn test_tiered_repeated_put_inactive_leaves_one_node() {
        let mut cache = TieredCache::new();
        cache.put_inactive("a", 1);
        cache.put_inactive("b", 2);
        assert_eq!(cache.put_inactive("a", 3), Some(1));
        assert_eq!(cache.inactive_len(), 2);
        assert_eq!(cache.segment.list.len(), 2);
        cache.segment.validate();
        // The re-demoted key is now the most recent one.
        let order: Vec<_> = cache.iter_inactive().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(order, vec![("b", 2), ("a", 3)]);
    }

    #[test]
    fn test_tiered_peek_does_not_promote() {
        let mut cache = TieredCache::new();
        cache.put_inactive("a", 1);
        cache.put_inactive("b", 2);
        assert_eq!(cache.peek(&"a"), Some(&1));
        assert!(!cache.is_active(&"a"));
        assert_eq!(evict_all(&mut cache), vec!["a", "b"]);
    }

    #[test]
    fn test_tiered_get_mut() {
        let mut cache = TieredCache::new();
        cache.put_inactive("a", 1);
        if let Some(v) = cache.get_mut(&"a") {
            *v = 5;
        }
        assert!(cache.is_active(&"a"));
        assert_eq!(cache.peek(&"a"), Some(&5));
    }

    #[test]
    fn test_tiered_remove() {
        let mut cache = TieredCache::new();
        cache.put_active("a", 1);
        cache.put_inactive("b", 2);
        assert_eq!(cache.remove(&"a"), Some(1));
        assert_eq!(cache.remove(&"b"), Some(2));
        assert_eq!(cache.remove(&"b"), None);
        assert!(cache.is_empty());
        cache.segment.validate();
    }

    #[test]
    fn test_tiered_string_keys() {
        let mut cache = TieredCache::new();
        cache.put_inactive("apple".to_string(), 1);
        cache.put_active("banana".to_string(), 2);
        assert_eq!(cache.peek("apple"), Some(&1));
        assert_eq!(cache.get("apple"), Some(&1));
        assert!(cache.is_active("banana"));
        assert_eq!(cache.remove("banana"), Some(2));
    }

    #[test]
    fn test_tiered_sweep_lru_order() {
        let mut cache = TieredCache::new();
        cache.put_inactive('a', 1);
        cache.put_inactive('b', 2);
        cache.put_inactive('c', 3);
        cache.put_active('z', 26);
        assert_eq!(evict_all(&mut cache), vec!['a', 'b', 'c']);
        assert_eq!(cache.len(), 1);
        assert!(cache.is_active(&'z'));
        cache.segment.validate();
    }

    #[test]
    fn test_tiered_sweep_skips_rejected() {
        let mut cache = TieredCache::new();
        for i in 0..10 {
            cache.put_inactive(i, i);
        }
        let mut evicted = Vec::new();
        let count = cache.sweep(&mut FnRunner::new(
            |k: &i32, _: &i32| k % 3 == 0,
            |k, _| evicted.push(k),
        ));
        assert_eq!(count, 4);
        assert_eq!(evicted, vec![0, 3, 6, 9]);
        let left: Vec<i32> = cache.iter_inactive().map(|(k, _)| *k).collect();
        assert_eq!(left, vec![1, 2, 4, 5, 7, 8]);
        cache.segment.validate();
    }

    #[test]
    fn test_tiered_sweep_closes_cursor_afterwards() {
        let mut cache = TieredCache::new();
        cache.put_inactive(1, 1);
        evict_all(&mut cache);
        assert!(!cache.segment.sweep_in_progress());
        cache.segment.validate();
    }

    #[test]
    fn test_tiered_sweep_closes_cursor_on_panic() {
        let mut cache = TieredCache::new();
        cache.put_inactive(1, 1);
        cache.put_inactive(2, 2);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            cache.sweep(&mut FnRunner::new(
                |_: &i32, _: &i32| true,
                |_: i32, _: i32| panic!("cleanup failed"),
            ));
        }));
        assert!(result.is_err());
        assert!(!cache.segment.sweep_in_progress());
        // The entry handed to the failing callback stays evicted.
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        cache.segment.validate();
    }

    #[test]
    fn test_tiered_trim_inactive() {
        let mut cache = TieredCache::new();
        for i in 0..8 {
            cache.put_inactive(i, ());
        }
        cache.put_active(100, ());
        let mut trimmed = Vec::new();
        assert_eq!(cache.trim_inactive(5, |k, _| trimmed.push(k)), 3);
        assert_eq!(trimmed, vec![0, 1, 2]);
        assert_eq!(cache.inactive_len(), 5);
        assert_eq!(cache.trim_inactive(5, |_, _| {}), 0);
        assert_eq!(cache.active_len(), 1);
    }

    #[test]
    fn test_tiered_clear() {
        let mut cache = TieredCache::new();
        cache.put_inactive(1, 1);
        cache.put_active(2, 2);
        cache.clear();
        assert!(cache.is_empty());
        cache.put_inactive(3, 3);
        assert_eq!(cache.peek(&3), Some(&3));
        cache.segment.validate();
    }

    #[test]
    fn test_tiered_metrics() {
        let mut cache = TieredCache::new();
        cache.put_inactive("a", 1);
        cache.put_active("b", 2);
        cache.get(&"a");
        cache.get(&"b");
        cache.get(&"missing");
        cache.put_inactive("c", 3);
        cache.remove(&"b");
        evict_all(&mut cache);

        let metrics = cache.metrics();
        assert_eq!(metrics.get("requests"), Some(&3.0));
        assert_eq!(metrics.get("active_hits"), Some(&1.0));
        assert_eq!(metrics.get("inactive_hits"), Some(&1.0));
        assert_eq!(metrics.get("cache_misses"), Some(&1.0));
        assert_eq!(metrics.get("demotions"), Some(&2.0));
        assert_eq!(metrics.get("activations"), Some(&1.0));
        assert_eq!(metrics.get("removals"), Some(&1.0));
        assert_eq!(metrics.get("evictions"), Some(&1.0));
        assert_eq!(metrics.get("sweeps"), Some(&1.0));
        assert_eq!(cache.algorithm_name(), "TIERED_LRU");
    }

    #[test]
    fn test_tiered_config_preallocates() {
        let cache: TieredCache<u32, u32> =
            TieredCache::init(InstancePoolConfig { capacity: 64 }, None);
        assert_eq!(cache.config().capacity, 64);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_tiered_exclusivity_under_mixed_ops() {
        let mut cache = TieredCache::new();
        for i in 0..500u32 {
            let key = i % 37;
            match i % 5 {
                0 => {
                    cache.put_active(key, i);
                }
                1 | 2 => {
                    cache.put_inactive(key, i);
                }
                3 => {
                    cache.get(&key);
                }
                _ => {
                    cache.remove(&key);
                }
            }
            if i % 50 == 0 {
                cache.sweep(&mut FnRunner::new(|k: &u32, _: &u32| k % 2 == 0, |_, _| {}));
            }
            cache.segment.validate();
        }
    }
}
