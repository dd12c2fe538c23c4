//! Pool Configuration Module
//!
//! Configuration structures for the pool implementations. Each config is a
//! plain struct with public fields:
//!
//! - **Simple**: Just create the struct with all fields set
//! - **Type safety**: All parameters must be provided at construction
//! - **No boilerplate**: No constructors or builder methods needed
//!
//! | Config | Used by | Description |
//! |--------|---------|-------------|
//! | `InstancePoolConfig` | [`TieredCache`](crate::TieredCache), `InstancePool` | Two-tier pool with LRU sweep |
//!
//! # Examples
//!
//! ```
//! use instance_pool::config::InstancePoolConfig;
//! use instance_pool::TieredCache;
//!
//! let config = InstancePoolConfig { capacity: 256 };
//! let cache: TieredCache<String, i32> = TieredCache::init(config, None);
//! assert!(cache.is_empty());
//! ```

pub mod pool;

pub use pool::InstancePoolConfig;
