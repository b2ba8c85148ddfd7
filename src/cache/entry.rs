//! Cache Entry Module
//!
//! Defines the record stored for every cached key.

use std::time::Duration;

// == Cache Entry ==
/// A single stored key/value pair with its bookkeeping.
///
/// Entries are owned by the cache. Callers only ever see them through shared
/// references (diagnostics) or as copies (reads and dumps).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Capacity cost assigned by the weigher
    pub(crate) weight: u64,
    /// Last write, or last read when age is refreshed on get (Unix milliseconds)
    pub(crate) last_touched: u64,
    /// Per-entry TTL; `None` defers to the cache-wide TTL
    pub(crate) max_age: Option<Duration>,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates a new entry.
    ///
    /// # Arguments
    /// * `weight` - Capacity cost of the entry
    /// * `now_ms` - Creation timestamp in Unix milliseconds
    /// * `max_age` - Optional TTL override. A zero override is treated as absent.
    pub fn new(key: K, value: V, weight: u64, now_ms: u64, max_age: Option<Duration>) -> Self {
        Self {
            key,
            value,
            weight,
            last_touched: now_ms,
            max_age: max_age.filter(|ttl| !ttl.is_zero()),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Unix milliseconds of the last write (or refreshing read).
    pub fn last_touched(&self) -> u64 {
        self.last_touched
    }

    /// Per-entry TTL override, if one was given.
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    // == Age ==
    /// Time elapsed since the entry was last touched.
    ///
    /// A clock reading earlier than `last_touched` yields zero.
    pub fn age(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.last_touched))
    }

    /// Refreshes the timestamp, extending the entry's life.
    pub(crate) fn touch(&mut self, now_ms: u64) {
        self.last_touched = now_ms;
    }

    /// Swaps in a new value and bookkeeping, returning the previous value.
    pub(crate) fn replace(
        &mut self,
        value: V,
        weight: u64,
        now_ms: u64,
        max_age: Option<Duration>,
    ) -> V {
        self.weight = weight;
        self.last_touched = now_ms;
        self.max_age = max_age.filter(|ttl| !ttl.is_zero());
        std::mem::replace(&mut self.value, value)
    }

    /// Splits the entry into its key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}
