//! Mini LRU - A bounded in-memory least-recently-used cache
//!
//! Capacity is accounted by a configurable weight per entry, and entries can
//! expire after a time-to-live. Expiration is checked lazily on access or by an
//! explicit [`LruCache::prune`]; there is no background sweeper.

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;

pub use builder::CacheBuilder;
pub use cache::{
    CacheStats, Clock, Dispose, DumpEntry, Entry, LruCache, ManualClock, RecencyList,
    SystemClock, Weigher,
};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
