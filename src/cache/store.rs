//! Cache Store Module
//!
//! Main cache engine combining the recency list, weight accounting, lazy TTL
//! expiration and the disposal hook.

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::builder::CacheBuilder;
use crate::cache::{
    CacheStats, Clock, Dispose, Entry, ExpirationPolicy, FnWeigher, RecencyList,
    WeightAccountant, Weigher,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Dump Entry ==
/// Snapshot of a live entry produced by [`LruCache::dump`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpEntry<K, V> {
    pub key: K,
    pub value: V,
    /// Unix milliseconds after which the entry is stale; `None` = never
    pub expires_at: Option<u64>,
}

// == LRU Cache ==
/// Bounded least-recently-used cache with weighted capacity and lazy TTL
/// expiration.
///
/// The cache is single-writer: every operation completes synchronously and
/// nothing runs in the background. Wrap it in a lock to share it between
/// threads.
///
/// ```
/// use mini_lru::LruCache;
///
/// let mut cache = LruCache::new(2);
/// cache.set("a", "A");
/// cache.set("b", "B");
/// cache.get(&"a");
/// cache.set("c", "C");
///
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"a"), Some("A"));
/// ```
pub struct LruCache<K, V> {
    pub(crate) list: RecencyList<K, V>,
    pub(crate) accountant: WeightAccountant<K, V>,
    pub(crate) expiry: ExpirationPolicy,
    /// Return a stale value once before dropping it
    pub(crate) allow_stale: bool,
    /// Refresh `last_touched` on every successful get
    pub(crate) update_age_on_get: bool,
    /// Skip disposal of a value replaced through `set`
    pub(crate) no_dispose_on_set: bool,
    pub(crate) dispose: Option<Box<dyn Dispose<K, V>>>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    // == Constructors ==
    /// Creates a cache bounded to `max` units of weight (0 = unlimited) with
    /// every other option at its default.
    pub fn new(max: u64) -> Self {
        CacheBuilder::new().max(max).build()
    }

    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }

    /// Creates a cache from a validated [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Self {
        CacheBuilder::from_config(config).build()
    }

    // == Set ==
    /// Stores a key-value pair using the cache-wide TTL.
    ///
    /// An existing key gets its value replaced and moves to the most recently
    /// used position; the old value is disposed unless `no_dispose_on_set` is
    /// enabled. Least recently used entries are then evicted until the
    /// capacity holds again.
    ///
    /// Returns `false` when the value alone is heavier than a nonzero
    /// capacity. Such a value is never stored and goes straight to the
    /// disposal hook, and any previous entry for the key is removed.
    pub fn set(&mut self, key: K, value: V) -> bool {
        let now = self.clock.now_ms();
        self.store(key, value, None, now)
    }

    /// Stores a key-value pair with its own TTL.
    ///
    /// A zero `max_age` falls back to the cache-wide TTL.
    ///
    /// # Errors
    /// `CacheError::InvalidArgument` if the expiration timestamp would not fit
    /// in a millisecond clock reading.
    pub fn set_with_max_age(&mut self, key: K, value: V, max_age: Duration) -> Result<bool> {
        let now = self.clock.now_ms();
        let representable = u64::try_from(max_age.as_millis())
            .ok()
            .and_then(|ttl_ms| now.checked_add(ttl_ms))
            .is_some();

        if !representable {
            return Err(CacheError::InvalidArgument(format!(
                "maxAge of {:?} is out of range",
                max_age
            )));
        }

        Ok(self.store(key, value, Some(max_age), now))
    }

    fn store(&mut self, key: K, value: V, max_age: Option<Duration>, now: u64) -> bool {
        let weight = self.accountant.weigh(&key, &value);
        let mut removed = Vec::new();

        if !self.accountant.fits(weight) {
            debug!(
                "Rejecting entry of weight {} (capacity {})",
                weight,
                self.accountant.max()
            );
            if let Some(previous) = self.list.remove(&key) {
                self.accountant.sub(previous.weight);
                removed.push(previous.into_parts());
            }
            removed.push((key, value));
            self.dispose_all(removed);
            return false;
        }

        match self.list.get_mut(&key) {
            Some(entry) => {
                let old_weight = entry.weight;
                let old_value = entry.replace(value, weight, now, max_age);
                self.accountant.sub(old_weight);
                self.accountant.add(weight);
                self.list.move_to_front(&key);
                if !self.no_dispose_on_set {
                    removed.push((key, old_value));
                }
            }
            None => {
                self.list.insert_front(Entry::new(key, value, weight, now, max_age));
                self.accountant.add(weight);
            }
        }

        self.evict_overflow(&mut removed);
        self.dispose_all(removed);
        true
    }

    // == Get ==
    /// Retrieves a value and marks it most recently used.
    ///
    /// A stale entry is removed and disposed. With `allow_stale` its value is
    /// still returned this one last time; otherwise the read is a miss. With
    /// `update_age_on_get` a fresh hit also restarts the entry's TTL.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now_ms();

        let stale = match self.list.get(key) {
            Some(entry) => self.expiry.is_stale(entry, now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if stale {
            let (key, value) = self.remove_expired(key)?.into_parts();
            let stale_value = self.allow_stale.then(|| value.clone());
            match stale_value {
                Some(_) => self.stats.record_hit(),
                None => self.stats.record_miss(),
            }
            self.dispose_all(vec![(key, value)]);
            return stale_value;
        }

        if self.update_age_on_get {
            if let Some(entry) = self.list.get_mut(key) {
                entry.touch(now);
            }
        }
        self.list.move_to_front(key);
        self.stats.record_hit();
        self.list.get(key).map(|entry| entry.value.clone())
    }

    // == Peek ==
    /// Reads a value without changing recency order or removing anything.
    ///
    /// A stale entry is reported as absent unless `allow_stale` is set, but it
    /// stays in the cache until a mutating call finds it. This deliberately
    /// differs from a bare presence lookup, matching how `has` treats age.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let entry = self.list.get(key)?;
        if self.allow_stale || !self.expiry.is_stale(entry, self.clock.now_ms()) {
            Some(&entry.value)
        } else {
            None
        }
    }

    // == Has ==
    /// Whether `key` is present and fresh. Never mutates.
    pub fn has(&self, key: &K) -> bool {
        let now = self.clock.now_ms();
        self.list
            .get(key)
            .is_some_and(|entry| !self.expiry.is_stale(entry, now))
    }

    // == Delete ==
    /// Removes and disposes the entry for `key`.
    ///
    /// Returns whether an entry was present; deleting a missing key is a no-op.
    pub fn del(&mut self, key: &K) -> bool {
        match self.list.remove(key) {
            Some(entry) => {
                self.accountant.sub(entry.weight);
                self.dispose_all(vec![entry.into_parts()]);
                true
            }
            None => false,
        }
    }

    // == Reset ==
    /// Removes and disposes every entry. Configuration is kept.
    pub fn reset(&mut self) {
        let drained = self.list.drain();
        self.accountant.reset_total(0);
        debug!("Reset cache, dropping {} entries", drained.len());

        self.dispose_all(drained.into_iter().map(Entry::into_parts).collect());
    }

    // == Prune ==
    /// Removes and disposes every stale entry.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self) -> usize {
        let now = self.clock.now_ms();
        let stale_keys: Vec<K> = self
            .list
            .iter()
            .filter(|entry| self.expiry.is_stale(*entry, now))
            .map(|entry| entry.key.clone())
            .collect();

        let removed: Vec<(K, V)> = stale_keys
            .iter()
            .filter_map(|key| self.remove_expired(key))
            .map(Entry::into_parts)
            .collect();

        let count = removed.len();
        if count > 0 {
            debug!("Prune: removed {} expired entries", count);
        }

        self.dispose_all(removed);
        count
    }

    // == Pop ==
    /// Removes the least recently used entry and hands it to the caller.
    ///
    /// The disposal hook is not called: ownership moves to the caller.
    pub fn pop(&mut self) -> Option<(K, V)> {
        let entry = self.list.remove_tail()?;
        self.accountant.sub(entry.weight);
        Some(entry.into_parts())
    }

    // == For Each ==
    /// Visits entries from most to least recently used.
    ///
    /// Stale entries met on the way are removed and disposed; they are still
    /// visited when `allow_stale` is set. Recency order is not changed.
    pub fn for_each<F>(&mut self, visitor: F)
    where
        F: FnMut(&V, &K, &Self),
    {
        let keys = self.list.keys();
        self.visit(keys, visitor);
    }

    /// Same as [`for_each`](Self::for_each) but from least to most recently
    /// used.
    pub fn for_each_rev<F>(&mut self, visitor: F)
    where
        F: FnMut(&V, &K, &Self),
    {
        let keys: Vec<K> = self.list.iter_rev().map(|entry| entry.key.clone()).collect();
        self.visit(keys, visitor);
    }

    fn visit<F>(&mut self, keys: Vec<K>, mut visitor: F)
    where
        F: FnMut(&V, &K, &Self),
    {
        let now = self.clock.now_ms();

        for key in keys {
            let Some(entry) = self.list.get(&key) else {
                continue;
            };

            if !self.expiry.is_stale(entry, now) {
                visitor(&entry.value, &entry.key, &*self);
                continue;
            }

            if let Some(entry) = self.remove_expired(&key) {
                if self.allow_stale {
                    visitor(&entry.value, &entry.key, &*self);
                }
                self.dispose_all(vec![entry.into_parts()]);
            }
        }
    }

    // == Keys / Values ==
    /// Keys from most to least recently used, stale ones included.
    pub fn keys(&self) -> Vec<K> {
        self.list.keys()
    }

    /// Values from most to least recently used, stale ones included.
    pub fn values(&self) -> Vec<V> {
        self.list.iter().map(|entry| entry.value.clone()).collect()
    }

    // == Dump ==
    /// Snapshots every fresh entry, most recently used first.
    pub fn dump(&self) -> Vec<DumpEntry<K, V>> {
        let now = self.clock.now_ms();
        self.list
            .iter()
            .filter(|entry| !self.expiry.is_stale(*entry, now))
            .map(|entry| DumpEntry {
                key: entry.key.clone(),
                value: entry.value.clone(),
                expires_at: self.expiry.expires_at(entry),
            })
            .collect()
    }

    /// Replaces the contents with a previous [`dump`](Self::dump).
    ///
    /// Entries are inserted from last to first so the dumped recency order is
    /// restored. An entry that carries an expiration timestamp keeps whatever
    /// time it had left and is skipped if that has already run out.
    pub fn load<I>(&mut self, dump: I)
    where
        I: IntoIterator<Item = DumpEntry<K, V>>,
    {
        self.reset();

        let now = self.clock.now_ms();
        let dump: Vec<DumpEntry<K, V>> = dump.into_iter().collect();

        for entry in dump.into_iter().rev() {
            match entry.expires_at {
                None => {
                    self.store(entry.key, entry.value, None, now);
                }
                Some(expires_at) if expires_at > now => {
                    let remaining = Duration::from_millis(expires_at - now);
                    self.store(entry.key, entry.value, Some(remaining), now);
                }
                Some(_) => {
                    trace!("Skipping expired entry while loading dump");
                }
            }
        }
    }

    // == Dump LRU ==
    /// Read-only view of the internal recency list, for diagnostics and
    /// tests. Not part of the stable interface.
    pub fn dump_lru(&self) -> &RecencyList<K, V> {
        &self.list
    }

    // == Capacity ==
    /// Capacity in weight units; 0 = unlimited.
    pub fn max(&self) -> u64 {
        self.accountant.max()
    }

    /// Changes the capacity and trims immediately.
    pub fn set_max(&mut self, max: u64) {
        self.accountant.set_max(max);
        self.trim_to_capacity();
    }

    // == TTL ==
    /// Cache-wide TTL; zero = disabled.
    pub fn max_age(&self) -> Duration {
        self.expiry.max_age()
    }

    /// Changes the cache-wide TTL for subsequent staleness checks.
    pub fn set_max_age(&mut self, max_age: Duration) {
        self.expiry.set_max_age(max_age);
    }

    pub fn allow_stale(&self) -> bool {
        self.allow_stale
    }

    pub fn set_allow_stale(&mut self, allow_stale: bool) {
        self.allow_stale = allow_stale;
    }

    pub fn update_age_on_get(&self) -> bool {
        self.update_age_on_get
    }

    pub fn no_dispose_on_set(&self) -> bool {
        self.no_dispose_on_set
    }

    // == Weigher ==
    /// Weighs a key-value pair with the current weigher.
    pub fn weigh(&self, key: &K, value: &V) -> u64 {
        self.accountant.weigh(key, value)
    }

    /// Installs a new weigher and recomputes every stored weight, then trims.
    ///
    /// `None` installs the default unit weigher.
    pub fn set_weigher(&mut self, weigher: Option<Box<dyn Weigher<K, V>>>) {
        self.accountant.set_weigher(weigher);
        self.recompute_weights();
    }

    /// Closure form of [`set_weigher`](Self::set_weigher).
    pub fn set_length_calculator<F>(&mut self, weigher: F)
    where
        F: Fn(&K, &V) -> u64 + Send + 'static,
    {
        self.set_weigher(Some(Box::new(FnWeigher(weigher))));
    }

    fn recompute_weights(&mut self) {
        let accountant = &self.accountant;
        let mut total: u128 = 0;
        for entry in self.list.entries_mut() {
            entry.weight = accountant.weigh(&entry.key, &entry.value);
            total += u128::from(entry.weight);
        }

        self.accountant.reset_total(total);
        debug!(
            "Recomputed weights for {} entries, total {}",
            self.list.len(),
            total
        );
        self.trim_to_capacity();
    }

    // == Size ==
    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Total weight of all stored entries.
    pub fn weight(&self) -> u64 {
        self.accountant.total()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.list.len());
        stats
    }

    // == Internal Helpers ==
    fn trim_to_capacity(&mut self) {
        let mut removed = Vec::new();
        self.evict_overflow(&mut removed);
        self.dispose_all(removed);
    }

    /// Unlinks least recently used entries until the capacity holds.
    fn evict_overflow(&mut self, removed: &mut Vec<(K, V)>) {
        let mut evicted = 0usize;
        while self.accountant.over_capacity() {
            let Some(entry) = self.list.remove_tail() else {
                break;
            };
            self.accountant.sub(entry.weight);
            self.stats.record_eviction();
            removed.push(entry.into_parts());
            evicted += 1;
        }

        if evicted > 0 {
            debug!(
                "Evicted {} entries, weight now {} of {}",
                evicted,
                self.accountant.total(),
                self.accountant.max()
            );
        }
    }

    fn remove_expired(&mut self, key: &K) -> Option<Entry<K, V>> {
        let entry = self.list.remove(key)?;
        self.accountant.sub(entry.weight);
        self.stats.record_expiration();
        trace!("Expired entry of weight {}", entry.weight);
        Some(entry)
    }

    /// Hands removed pairs to the disposal hook. Bookkeeping must be complete
    /// before this runs.
    fn dispose_all(&mut self, removed: Vec<(K, V)>) {
        if let Some(hook) = self.dispose.as_mut() {
            for (key, value) in removed {
                hook.dispose(key, value);
            }
        }
    }
}

impl<K: 'static, V: 'static> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max", &self.accountant.max())
            .field("weight", &self.accountant.total())
            .field("max_age", &self.expiry.max_age())
            .field("allow_stale", &self.allow_stale)
            .field("update_age_on_get", &self.update_age_on_get)
            .field("no_dispose_on_set", &self.no_dispose_on_set)
            .finish_non_exhaustive()
    }
}
