//! Cache Builder Module
//!
//! Typed construction of an [`LruCache`] with documented defaults.

use std::hash::Hash;
use std::time::Duration;

use crate::cache::{
    CacheStats, Clock, Dispose, ExpirationPolicy, FnDispose, FnWeigher, LruCache, RecencyList,
    SystemClock, UnitWeigher, WeightAccountant, Weigher,
};
use crate::config::CacheConfig;

/// Builder for configuring and constructing an [`LruCache`].
///
/// Defaults: unlimited capacity, no TTL, stale reads disabled, age not
/// refreshed on get, replaced values disposed, unit weights, no disposal
/// hook and the system clock.
///
/// # Example
/// ```
/// use mini_lru::CacheBuilder;
/// use std::time::Duration;
///
/// let mut cache = CacheBuilder::new()
///     .max(1_000)
///     .max_age(Duration::from_secs(60))
///     .build();
///
/// cache.set("session".to_string(), vec![0u8; 16]);
/// assert!(cache.has(&"session".to_string()));
/// ```
pub struct CacheBuilder<K, V> {
    max: u64,
    max_age: Duration,
    allow_stale: bool,
    update_age_on_get: bool,
    no_dispose_on_set: bool,
    weigher: Box<dyn Weigher<K, V>>,
    dispose: Option<Box<dyn Dispose<K, V>>>,
    clock: Box<dyn Clock>,
}

impl<K: 'static, V: 'static> Default for CacheBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: 'static, V: 'static> CacheBuilder<K, V> {
    pub fn new() -> Self {
        CacheBuilder {
            max: 0,
            max_age: Duration::ZERO,
            allow_stale: false,
            update_age_on_get: false,
            no_dispose_on_set: false,
            weigher: Box::new(UnitWeigher),
            dispose: None,
            clock: Box::new(SystemClock),
        }
    }

    /// Starts from the numeric and boolean options of a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new()
            .max(config.max)
            .max_age(config.max_age())
            .allow_stale(config.stale)
            .update_age_on_get(config.update_age_on_get)
            .no_dispose_on_set(config.no_dispose_on_set)
    }

    /// Capacity in weight units (0 = unlimited).
    pub fn max(mut self, max: u64) -> Self {
        self.max = max;
        self
    }

    /// Cache-wide TTL (zero = entries never expire).
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Return a stale value once from `get` before dropping it.
    pub fn allow_stale(mut self, allow_stale: bool) -> Self {
        self.allow_stale = allow_stale;
        self
    }

    /// Restart an entry's TTL on every successful `get`.
    pub fn update_age_on_get(mut self, update_age_on_get: bool) -> Self {
        self.update_age_on_get = update_age_on_get;
        self
    }

    /// Do not dispose a value that `set` replaces.
    pub fn no_dispose_on_set(mut self, no_dispose_on_set: bool) -> Self {
        self.no_dispose_on_set = no_dispose_on_set;
        self
    }

    /// Set a custom entry weigher via closure.
    pub fn weigher<F>(mut self, f: F) -> Self
    where
        F: Fn(&K, &V) -> u64 + Send + 'static,
    {
        self.weigher = Box::new(FnWeigher(f));
        self
    }

    /// Set a weigher using any type that implements the [`Weigher`] trait.
    pub fn weigher_impl<W: Weigher<K, V>>(mut self, w: W) -> Self {
        self.weigher = Box::new(w);
        self
    }

    /// Register a disposal hook closure.
    ///
    /// The closure runs synchronously inside the cache operation that removed
    /// the entry.
    pub fn dispose<F>(mut self, f: F) -> Self
    where
        F: FnMut(K, V) + Send + 'static,
    {
        self.dispose = Some(Box::new(FnDispose(f)));
        self
    }

    /// Register a disposal hook via the [`Dispose`] trait.
    pub fn dispose_impl<D: Dispose<K, V>>(mut self, d: D) -> Self {
        self.dispose = Some(Box::new(d));
        self
    }

    /// Replace the time source, e.g. with a [`ManualClock`](crate::ManualClock).
    pub fn clock<C: Clock>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    pub fn build(self) -> LruCache<K, V> {
        LruCache {
            list: RecencyList::new(),
            accountant: WeightAccountant::new(self.max, self.weigher),
            expiry: ExpirationPolicy::new(self.max_age),
            allow_stale: self.allow_stale,
            update_age_on_get: self.update_age_on_get,
            no_dispose_on_set: self.no_dispose_on_set,
            dispose: self.dispose,
            clock: self.clock,
            stats: CacheStats::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let cache: LruCache<String, String> = CacheBuilder::new().build();

        assert_eq!(cache.max(), 0);
        assert_eq!(cache.max_age(), Duration::ZERO);
        assert!(!cache.allow_stale());
        assert!(!cache.update_age_on_get());
        assert!(!cache.no_dispose_on_set());
        assert_eq!(cache.weigh(&"k".to_string(), &"value".to_string()), 1);
    }

    #[test]
    fn test_builder_options() {
        let cache: LruCache<String, String> = CacheBuilder::new()
            .max(100)
            .max_age(Duration::from_millis(250))
            .allow_stale(true)
            .update_age_on_get(true)
            .no_dispose_on_set(true)
            .weigher(|_k, v: &String| v.len() as u64)
            .build();

        assert_eq!(cache.max(), 100);
        assert_eq!(cache.max_age(), Duration::from_millis(250));
        assert!(cache.allow_stale());
        assert!(cache.update_age_on_get());
        assert!(cache.no_dispose_on_set());
        assert_eq!(cache.weigh(&"k".to_string(), &"value".to_string()), 5);
    }

    #[test]
    fn test_builder_from_config() {
        let config = CacheConfig {
            max: 3,
            max_age_ms: 40,
            stale: true,
            ..CacheConfig::default()
        };

        let cache: LruCache<u32, u32> = CacheBuilder::from_config(&config).build();

        assert_eq!(cache.max(), 3);
        assert_eq!(cache.max_age(), Duration::from_millis(40));
        assert!(cache.allow_stale());
        assert!(!cache.update_age_on_get());
    }

    struct HalfWeigher;

    impl Weigher<u32, u64> for HalfWeigher {
        fn weigh(&self, _key: &u32, value: &u64) -> u64 {
            value / 2
        }
    }

    #[test]
    fn test_builder_weigher_impl() {
        let cache = CacheBuilder::new().weigher_impl(HalfWeigher).build();
        assert_eq!(cache.weigh(&1, &10), 5);
    }
}
