//! Expiration Policy Module
//!
//! Decides entry staleness from timestamps and TTL settings.
//!
//! Staleness is a pure function of the entry and the clock reading passed in.
//! Nothing here runs on a timer: the cache asks at access time.

use std::time::Duration;

use crate::cache::Entry;

// == Expiration Policy ==
/// Holds the cache-wide TTL and evaluates entries against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpirationPolicy {
    /// Cache-wide TTL; zero disables expiration
    max_age: Duration,
}

impl ExpirationPolicy {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Changes the cache-wide TTL.
    ///
    /// Existing timestamps are left alone; the new TTL applies from the next
    /// staleness check.
    pub fn set_max_age(&mut self, max_age: Duration) {
        self.max_age = max_age;
    }

    // == Effective TTL ==
    /// The entry's own TTL if it has one, else the cache-wide TTL.
    ///
    /// `None` means the entry never expires.
    pub fn effective_ttl<K, V>(&self, entry: &Entry<K, V>) -> Option<Duration> {
        entry
            .max_age()
            .or(Some(self.max_age))
            .filter(|ttl| !ttl.is_zero())
    }

    // == Is Stale ==
    /// An entry is stale once strictly more than its TTL has elapsed since it
    /// was last touched.
    pub fn is_stale<K, V>(&self, entry: &Entry<K, V>, now_ms: u64) -> bool {
        match self.effective_ttl(entry) {
            Some(ttl) => entry.age(now_ms) > ttl,
            None => false,
        }
    }

    // == Expires At ==
    /// Unix milliseconds after which the entry is stale, or `None` if it never
    /// expires.
    pub fn expires_at<K, V>(&self, entry: &Entry<K, V>) -> Option<u64> {
        self.effective_ttl(entry).map(|ttl| {
            let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
            entry.last_touched().saturating_add(ttl_ms)
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_000_000;

    fn entry(max_age: Option<Duration>) -> Entry<&'static str, &'static str> {
        Entry::new("key", "value", 1, T0, max_age)
    }

    #[test]
    fn test_disabled_never_stale() {
        let policy = ExpirationPolicy::default();
        let entry = entry(None);

        assert!(policy.effective_ttl(&entry).is_none());
        assert!(!policy.is_stale(&entry, u64::MAX));
        assert!(policy.expires_at(&entry).is_none());
    }

    #[test]
    fn test_global_ttl() {
        let policy = ExpirationPolicy::new(Duration::from_millis(10));
        let entry = entry(None);

        assert!(!policy.is_stale(&entry, T0 + 5));
        assert!(policy.is_stale(&entry, T0 + 11));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let policy = ExpirationPolicy::new(Duration::from_millis(10));
        let entry = entry(None);

        // Exactly at the TTL is still fresh
        assert!(!policy.is_stale(&entry, T0 + 10));
        assert!(policy.is_stale(&entry, T0 + 11));
    }

    #[test]
    fn test_override_shorter_than_global() {
        let policy = ExpirationPolicy::new(Duration::from_millis(50));
        let entry = entry(Some(Duration::from_millis(20)));

        assert_eq!(policy.effective_ttl(&entry), Some(Duration::from_millis(20)));
        assert!(policy.is_stale(&entry, T0 + 25));
    }

    #[test]
    fn test_override_longer_than_global() {
        let policy = ExpirationPolicy::new(Duration::from_millis(20));
        let entry = entry(Some(Duration::from_millis(50)));

        assert!(!policy.is_stale(&entry, T0 + 25));
        assert!(policy.is_stale(&entry, T0 + 51));
    }

    #[test]
    fn test_override_without_global() {
        let policy = ExpirationPolicy::default();
        let entry = entry(Some(Duration::from_millis(5)));

        assert!(policy.is_stale(&entry, T0 + 6));
    }

    #[test]
    fn test_set_max_age_applies_to_existing_entries() {
        let mut policy = ExpirationPolicy::default();
        let entry = entry(None);
        assert!(!policy.is_stale(&entry, T0 + 100_000));

        policy.set_max_age(Duration::from_millis(1));
        assert!(policy.is_stale(&entry, T0 + 100_000));
    }

    #[test]
    fn test_expires_at() {
        let policy = ExpirationPolicy::new(Duration::from_secs(1));

        assert_eq!(policy.expires_at(&entry(None)), Some(T0 + 1_000));
        assert_eq!(
            policy.expires_at(&entry(Some(Duration::from_millis(20)))),
            Some(T0 + 20)
        );
    }
}
