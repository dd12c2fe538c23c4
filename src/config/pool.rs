//! Configuration for the two-tier instance pool.
//!
//! The pool has no size limit of its own. Idle entries leave the inactive tier
//! only when a caller-driven sweep evicts them, so the single knob here is a
//! pre-allocation hint.
//!
//! # Sizing Guidelines
//!
//! Set `capacity` to the number of instances you expect to hold at steady
//! state (active plus idle). Both key indices and the node arena reserve that
//! much room up front; going past it just grows them.
//!
//! ```text
//! Memory ≈ capacity × (2 × index slot + arena node)
//! arena node ≈ size_of::<(K, V)>() + 24 bytes (links and tombstone flag)
//! ```
//!
//! # Examples
//!
//! ```
//! use instance_pool::config::InstancePoolConfig;
//! use instance_pool::TieredCache;
//!
//! // A pool that usually keeps around 1000 instances
//! let config = InstancePoolConfig { capacity: 1000 };
//! let cache: TieredCache<u64, Vec<u8>> = TieredCache::init(config, None);
//!
//! // Start empty and grow on demand
//! let config = InstancePoolConfig { capacity: 0 };
//! let cache: TieredCache<&str, i32> = TieredCache::init(config, None);
//! ```

use core::fmt;

/// Configuration for a two-tier (active/inactive) instance pool.
///
/// # Fields
///
/// - `capacity`: Expected number of entries across both tiers. This is a
///   pre-allocation hint, not a bound: the pool never evicts on insert.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct InstancePoolConfig {
    /// Number of entries to reserve room for in each index and in the
    /// inactive-list arena.
    pub capacity: usize,
}

impl fmt::Debug for InstancePoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstancePoolConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}
