#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! This section gives quick examples for each part of the API.
//!
//! ## Tiers
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                        put_active / get                              │
//! │            ┌──────────────────────────────────────────┐              │
//! │            ▼                                          │              │
//! │   ┌─────────────────┐     put_inactive      ┌─────────┴─────────┐    │
//! │   │     ACTIVE      │ ────────────────────▶ │     INACTIVE      │    │
//! │   │  checked out    │                       │  idle, LRU order  │    │
//! │   │  never evicted  │                       │  MRU ... LRU      │    │
//! │   └─────────────────┘                       └─────────┬─────────┘    │
//! │                                                       │ sweep        │
//! │                                                       ▼              │
//! │                                               SweepRunner::remove    │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Reference
//!
//! | Type | Description | Use Case |
//! |------|-------------|----------|
//! | [`TieredCache`] | Single-threaded two-tier cache | Owned by one task, `no_std` |
//! | [`InstancePool`] | Thread-safe two-tier pool | Shared through an `Arc` |
//! | [`SweepRunner`] | Eviction policy trait | Decide and clean up idle entries |
//! | [`FnRunner`] | Runner from two closures | Ad-hoc sweeps |
//! | [`Budgeted`] | Eviction cap for any runner | Bounded reaper passes |
//!
//! ## Performance Characteristics
//!
//! | Operation | Cost | Notes |
//! |-----------|------|-------|
//! | `get` / `peek` | O(1) | `get` promotes idle entries |
//! | `put_active` / `put_inactive` | O(1) | No eviction on insert |
//! | `remove` | O(1) | Either tier |
//! | `sweep` | O(visited) | One pass, LRU first |
//!
//! ## Code Examples
//!
//! ### Single-threaded cache
//!
//! ```rust
//! use instance_pool::{FnRunner, TieredCache};
//!
//! let mut cache = TieredCache::new();
//! cache.put_inactive("x", "v1");
//! assert!(!cache.is_active(&"x"));
//!
//! assert_eq!(cache.get(&"x"), Some(&"v1"));
//! assert!(cache.is_active(&"x"));
//!
//! cache.put_inactive("x", "v1");
//! let mut removed = Vec::new();
//! cache.sweep(&mut FnRunner::new(|_: &&str, _: &&str| true, |k, v| removed.push((k, v))));
//! assert_eq!(removed, vec![("x", "v1")]);
//! assert!(cache.is_empty());
//! ```
//!
//! ### Budgeted reaper
//!
//! ```rust
//! use instance_pool::{Budgeted, FnRunner, TieredCache};
//!
//! let mut cache = TieredCache::new();
//! for id in 0..100u32 {
//!     cache.put_inactive(id, ());
//! }
//!
//! // Close at most ten idle instances per pass
//! let mut runner = Budgeted::new(FnRunner::new(|_: &u32, _: &()| true, |_, _| {}), 10);
//! assert_eq!(cache.sweep(&mut runner), 10);
//! assert_eq!(cache.inactive_len(), 90);
//! ```
//!
//! ### Metrics
//!
//! ```rust
//! use instance_pool::{CacheMetrics, TieredCache};
//!
//! let mut cache = TieredCache::new();
//! cache.put_inactive(1, "one");
//! cache.get(&1);
//! cache.get(&2);
//!
//! let metrics = cache.metrics();
//! assert_eq!(metrics.get("inactive_hits"), Some(&1.0));
//! assert_eq!(metrics.get("cache_misses"), Some(&1.0));
//! assert_eq!(cache.algorithm_name(), "TIERED_LRU");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `hashbrown` | Yes | Use `hashbrown` maps (works in `no_std`) |
//! | `concurrent` | Yes | [`InstancePool`] on `parking_lot`; implies `std` |
//! | `std` | No | Link the standard library |
//! | `tracing` | No | Debug and trace events for sweeps |
//! | `nightly` | No | Nightly-only `hashbrown` optimizations |

#![no_std]

#[cfg(any(feature = "std", not(feature = "hashbrown")))]
extern crate std;

#[cfg(test)]
extern crate scoped_threadpool;

/// Arena-backed circular list holding the inactive tier.
///
/// Internal infrastructure: slots unlinked during a sweep are not reused
/// until the sweep ends, so a cursor parked on one can still walk back.
pub(crate) mod list;

/// Pool configuration.
pub mod config;

/// Pool metrics.
///
/// Counters for lookups, tier transitions and sweeps, reported through the
/// [`CacheMetrics`] trait.
pub mod metrics;

/// Sweep policies and the eviction loop shared by both pool flavours.
pub mod sweep;

/// Single-threaded two-tier cache.
///
/// The building block for [`InstancePool`]; usable on its own in `no_std`.
pub mod tiered;

/// Thread-safe instance pool.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use config::InstancePoolConfig;
pub use metrics::{CacheMetrics, PoolMetrics};
pub use sweep::{Budgeted, FnRunner, SweepRunner};
pub use tiered::TieredCache;

#[cfg(feature = "concurrent")]
pub use concurrent::InstancePool;
