//! Generic TTL cache
//!
//! A mutex-guarded map from string keys to values stamped with their insert
//! time. Entries past their TTL are dropped lazily, on the next `get` that
//! touches them; nothing sweeps in the background.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Convert a configured duration in seconds. Zero and negative values both
/// mean "never expires".
pub fn ttl_from_secs(seconds: i64) -> Duration {
    u64::try_from(seconds).map_or(Duration::ZERO, Duration::from_secs)
}

#[derive(Debug, Clone)]
struct CachedItem<T> {
    value: T,
    created_at: Instant,
}

impl<T> CachedItem<T> {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        !ttl.is_zero() && now.saturating_duration_since(self.created_at) > ttl
    }
}

struct Inner<T> {
    items: HashMap<String, CachedItem<T>>,
    ttl: Duration,
}

/// Thread-safe TTL store.
///
/// A disabled cache stores nothing: every `get` misses and `set`/`delete` are
/// ignored, so callers never need to branch on whether caching is on.
///
/// Every operation takes the single lock for its whole duration. Values are
/// cloned out, so callers never alias the cached copy.
pub struct ItemCache<T> {
    inner: Mutex<Inner<T>>,
    enabled: bool,
}

impl<T: Clone> ItemCache<T> {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: HashMap::new(),
                ttl,
            }),
            enabled,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        if !self.enabled {
            return None;
        }

        let mut inner = self.inner.lock();
        let ttl = inner.ttl;
        let expired = inner.items.get(key)?.is_expired(ttl, Instant::now());
        if expired {
            inner.items.remove(key);
            return None;
        }

        inner.items.get(key).map(|item| item.value.clone())
    }

    /// Insert or overwrite `key`, restarting its TTL.
    pub fn set(&self, key: impl Into<String>, value: T) {
        if !self.enabled {
            return;
        }

        let item = CachedItem {
            value,
            created_at: Instant::now(),
        };
        self.inner.lock().items.insert(key.into(), item);
    }

    pub fn delete(&self, key: &str) {
        if !self.enabled {
            return;
        }
        self.inner.lock().items.remove(key);
    }

    /// Whether `key` holds a live entry. Unlike `get` this never evicts.
    pub fn contains(&self, key: &str) -> bool {
        if !self.enabled {
            return false;
        }

        let inner = self.inner.lock();
        inner
            .items
            .get(key)
            .is_some_and(|item| !item.is_expired(inner.ttl, Instant::now()))
    }

    /// Insert time of the entry under `key`, expired or not.
    pub fn created_at(&self, key: &str) -> Option<Instant> {
        self.inner.lock().items.get(key).map(|item| item.created_at)
    }

    pub fn ttl(&self) -> Duration {
        self.inner.lock().ttl
    }

    /// Change the TTL. Existing entries are judged against the new value
    /// from the next read on.
    pub fn set_ttl(&self, ttl: Duration) {
        self.inner.lock().ttl = ttl;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().items.keys().cloned().collect()
    }

    /// Drop every entry whose key is not in `keep`. Returns how many went.
    pub fn retain_keys(&self, keep: &HashSet<String>) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.items.len();
        inner.items.retain(|key, _| keep.contains(key));
        before - inner.items.len()
    }

    pub fn clear(&self) {
        self.inner.lock().items.clear();
    }
}

impl<T> fmt::Debug for ItemCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ItemCache")
            .field("entries", &inner.items.len())
            .field("ttl", &inner.ttl)
            .field("enabled", &self.enabled)
            .finish()
    }
}
