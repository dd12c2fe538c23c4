//! Instance Pool Metrics
//!
//! Counters for the two-tier pool: lookups split by the tier that served them,
//! tier transitions, explicit removals and sweep evictions.

extern crate alloc;

use super::CacheMetrics;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Counters tracked by a two-tier instance pool.
///
/// All counters are monotonic. They are updated under the same lock as the
/// data they describe, so a snapshot is internally consistent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Total number of `get` lookups
    pub requests: u64,

    /// Lookups served straight from the active tier
    pub active_hits: u64,

    /// Lookups that found an idle entry and promoted it
    pub inactive_hits: u64,

    /// Lookups that found nothing in either tier
    pub misses: u64,

    /// Calls to `put_active`
    pub activations: u64,

    /// Calls to `put_inactive`
    pub demotions: u64,

    /// Explicit `remove` calls that found an entry
    pub removals: u64,

    /// Entries evicted by sweeps
    pub evictions: u64,

    /// Sweeps started
    pub sweeps: u64,
}

impl PoolMetrics {
    /// Creates a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_active_hit(&mut self) {
        self.requests += 1;
        self.active_hits += 1;
    }

    #[inline]
    pub(crate) fn record_inactive_hit(&mut self) {
        self.requests += 1;
        self.inactive_hits += 1;
    }

    #[inline]
    pub(crate) fn record_miss(&mut self) {
        self.requests += 1;
        self.misses += 1;
    }

    #[inline]
    pub(crate) fn record_activation(&mut self) {
        self.activations += 1;
    }

    #[inline]
    pub(crate) fn record_demotion(&mut self) {
        self.demotions += 1;
    }

    #[inline]
    pub(crate) fn record_removal(&mut self) {
        self.removals += 1;
    }

    #[inline]
    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    #[inline]
    pub(crate) fn record_sweep(&mut self) {
        self.sweeps += 1;
    }

    /// Lookups served by either tier.
    pub fn cache_hits(&self) -> u64 {
        self.active_hits + self.inactive_hits
    }

    /// Fraction of lookups that found an entry, 0.0 when there were none.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups that found nothing, 0.0 when there were none.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.misses as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of hits that had to promote an idle entry.
    pub fn promotion_rate(&self) -> f64 {
        let hits = self.cache_hits();
        if hits > 0 {
            self.inactive_hits as f64 / hits as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("active_hits".to_string(), self.active_hits as f64);
        metrics.insert("inactive_hits".to_string(), self.inactive_hits as f64);
        metrics.insert("cache_hits".to_string(), self.cache_hits() as f64);
        metrics.insert("cache_misses".to_string(), self.misses as f64);

        metrics.insert("activations".to_string(), self.activations as f64);
        metrics.insert("demotions".to_string(), self.demotions as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("sweeps".to_string(), self.sweeps as f64);

        // Rates (0.0 to 1.0)
        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());
        metrics.insert("promotion_rate".to_string(), self.promotion_rate());

        metrics
    }
}

impl CacheMetrics for PoolMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "TIERED_LRU"
    }
}
