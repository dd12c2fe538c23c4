//! Pool Metrics System
//!
//! Counters collected by the pool and reported through the [`CacheMetrics`]
//! trait as a `BTreeMap<String, f64>`.
//!
//! # Why BTreeMap over HashMap?
//!
//! BTreeMap keeps metrics in a deterministic order, which keeps test
//! assertions, log lines and exported snapshots stable between runs. With a
//! dozen keys the O(log n) lookups do not matter.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;

pub mod pool;

pub use pool::PoolMetrics;

/// Trait for reporting metrics from a pool implementation.
///
/// Both [`TieredCache`](crate::TieredCache) and the concurrent `InstancePool`
/// implement it, so monitoring code can treat them uniformly.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    ///
    /// Keys are sorted alphabetically for consistent output.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification (e.g. `"TIERED_LRU"`).
    fn algorithm_name(&self) -> &'static str;
}
