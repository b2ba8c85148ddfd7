//! Cache Module
//!
//! Bounded in-memory LRU caching with weighted capacity and lazy TTL
//! expiration.

mod clock;
mod dispose;
mod entry;
mod expiry;
mod lru;
mod stats;
mod store;
mod weigher;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use dispose::{Dispose, FnDispose};
pub use entry::Entry;
pub use expiry::ExpirationPolicy;
pub use lru::{Iter, RecencyList};
pub use stats::CacheStats;
pub use store::{DumpEntry, LruCache};
pub use weigher::{FnWeigher, UnitWeigher, WeightAccountant, Weigher};
