//! Disposal hook: a callback invoked whenever an entry leaves the cache.
//!
//! # Example
//! ```
//! use mini_lru::CacheBuilder;
//! use std::sync::{Arc, Mutex};
//!
//! let disposed = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&disposed);
//!
//! let mut cache = CacheBuilder::new()
//!     .max(1)
//!     .dispose(move |key: u32, value: u32| sink.lock().unwrap().push((key, value)))
//!     .build();
//!
//! cache.set(1, 10);
//! cache.set(2, 20); // evicts 1
//! assert_eq!(*disposed.lock().unwrap(), vec![(1, 10)]);
//! ```

/// Receives ownership of every removed key and value.
///
/// Called exactly once per removal: capacity trims, lazy or manual
/// expiration, `del`, `reset`, replacement via `set` (unless disabled with
/// `no_dispose_on_set`) and values rejected for being heavier than the
/// capacity. `pop` hands the entry to its caller instead.
///
/// The hook runs synchronously after the cache has finished its own
/// bookkeeping. A panic inside it unwinds through the calling operation and
/// leaves the cache consistent.
pub trait Dispose<K, V>: Send + 'static {
    fn dispose(&mut self, key: K, value: V);
}

/// A [`Dispose`] hook backed by a closure.
///
/// Created via [`CacheBuilder::dispose`](crate::CacheBuilder::dispose).
pub struct FnDispose<F>(pub F);

impl<K, V, F> Dispose<K, V> for FnDispose<F>
where
    F: FnMut(K, V) + Send + 'static,
{
    fn dispose(&mut self, key: K, value: V) {
        (self.0)(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_fn_dispose_receives_ownership() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut hook = FnDispose(move |k: String, v: Vec<u8>| {
            sink.lock().unwrap().push((k, v.len()));
        });

        hook.dispose("a".to_string(), vec![1, 2, 3]);

        assert_eq!(*seen.lock().unwrap(), vec![("a".to_string(), 3)]);
    }
}
