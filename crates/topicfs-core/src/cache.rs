//! Short-TTL lookup cache.
//!
//! Remote list/search calls are expensive and flood-controlled, while
//! filesystem operations repeat the same lookups constantly, so results are
//! memoized for a bounded staleness window. Entries expire by TTL only;
//! mutations do not invalidate, and callers accept stale reads until the
//! window closes.
//!
//! The entry map lock is held across the loader, so concurrent callers wait
//! for an in-flight load instead of duplicating it.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Entry<T> {
    fn is_fresh(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// String-keyed memoization with a uniform expiry deadline per entry.
pub struct TtlCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, or run `loader` and memoize it.
    ///
    /// Only successful `Some` results are stored; a loader returning
    /// `Ok(None)` or `Err` leaves the cache unchanged for that key.
    pub async fn get_with<F, Fut, E>(&self, key: &str, loader: F) -> Result<Option<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get(key)
            && entry.is_fresh()
        {
            return Ok(Some(entry.value.clone()));
        }

        let loaded = loader().await?;
        if let Some(value) = &loaded {
            entries.insert(
                key.to_string(),
                Entry {
                    value: value.clone(),
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }
        Ok(loaded)
    }

    /// Mutate the live entry for `key` in place, if one is still fresh.
    ///
    /// Expired or absent entries are left alone; the next `get_with` will
    /// reload them from the remote anyway.
    pub async fn update<F>(&self, key: &str, apply: F)
    where
        F: FnOnce(&mut T),
    {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key)
            && entry.is_fresh()
        {
            apply(&mut entry.value);
        }
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
