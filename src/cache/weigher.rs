//! Entry weigher and capacity accounting.
//!
//! The cache enforces `Σ weight(entry) ≤ max` whenever `max` is nonzero. By
//! default every entry costs 1 unit ([`UnitWeigher`]), so `max` is simply the
//! maximum number of entries. A custom weigher lets the cache bound something
//! else, such as total value size.
//!
//! # Example
//! ```
//! use mini_lru::CacheBuilder;
//!
//! // At most 8 bytes of string data.
//! let mut cache = CacheBuilder::new()
//!     .max(8)
//!     .weigher(|_key: &&'static str, value: &String| value.len() as u64)
//!     .build();
//!
//! assert!(cache.set("a", "AAAA".to_string()));
//! assert!(!cache.set("b", "way too long".to_string()));
//! ```

/// Computes the capacity cost of an entry.
///
/// Weights may be zero; such entries never count against capacity.
pub trait Weigher<K, V>: Send + 'static {
    fn weigh(&self, key: &K, value: &V) -> u64;
}

// == Built-in Weighers ==
/// Every entry costs exactly 1 unit. This is the default weigher.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitWeigher;

impl<K, V> Weigher<K, V> for UnitWeigher {
    #[inline]
    fn weigh(&self, _key: &K, _value: &V) -> u64 {
        1
    }
}

/// A weigher backed by a closure.
///
/// Created via [`CacheBuilder::weigher`](crate::CacheBuilder::weigher) or
/// [`LruCache::set_length_calculator`](crate::LruCache::set_length_calculator).
pub struct FnWeigher<F>(pub F);

impl<K, V, F> Weigher<K, V> for FnWeigher<F>
where
    F: Fn(&K, &V) -> u64 + Send + 'static,
{
    #[inline]
    fn weigh(&self, key: &K, value: &V) -> u64 {
        (self.0)(key, value)
    }
}

// == Weight Accountant ==
/// Tracks the running weight total against the configured capacity.
///
/// The accountant never touches entries itself; the cache asks it whether an
/// entry fits and whether trimming is due, and reports every weight change.
pub struct WeightAccountant<K, V> {
    weigher: Box<dyn Weigher<K, V>>,
    /// Capacity; 0 = unlimited
    max: u64,
    /// Sum of the weights of all stored entries. Wider than a single weight so
    /// the sum of many `u64` weights never wraps or saturates.
    total: u128,
}

impl<K: 'static, V: 'static> WeightAccountant<K, V> {
    pub fn new(max: u64, weigher: Box<dyn Weigher<K, V>>) -> Self {
        Self {
            weigher,
            max,
            total: 0,
        }
    }

    /// Weighs an entry with the current weigher.
    pub fn weigh(&self, key: &K, value: &V) -> u64 {
        self.weigher.weigh(key, value)
    }

    /// Installs a new weigher, or the unit weigher when `None` is given.
    ///
    /// The caller is responsible for recomputing stored weights afterwards.
    pub fn set_weigher(&mut self, weigher: Option<Box<dyn Weigher<K, V>>>) {
        self.weigher = weigher.unwrap_or_else(|| Box::new(UnitWeigher));
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn set_max(&mut self, max: u64) {
        self.max = max;
    }

    /// Sum of stored weights, clamped to `u64::MAX`.
    ///
    /// Only an unlimited cache can hold more than `u64::MAX` units; a bounded
    /// one is trimmed back under `max` before this is observed.
    pub fn total(&self) -> u64 {
        u64::try_from(self.total).unwrap_or(u64::MAX)
    }

    // == Capacity Checks ==
    /// Whether a single entry of `weight` can ever be retained.
    pub fn fits(&self, weight: u64) -> bool {
        self.max == 0 || weight <= self.max
    }

    /// Whether entries must be trimmed to restore the capacity bound.
    pub fn over_capacity(&self) -> bool {
        self.max > 0 && self.total > u128::from(self.max)
    }

    // == Bookkeeping ==
    pub fn add(&mut self, weight: u64) {
        self.total += u128::from(weight);
    }

    pub fn sub(&mut self, weight: u64) {
        self.total = self.total.saturating_sub(u128::from(weight));
    }

    /// Replaces the running total after a full recomputation.
    pub fn reset_total(&mut self, total: u128) {
        self.total = total;
    }
}
