//! Process-local cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::{Cache, CacheBucket};

/// A stored value and the instant it stops being valid.
///
/// `expires_at` is `None` when the TTL is too large to represent.
struct Entry {
    expires_at: Option<Instant>,
    value: Vec<u8>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

type Store = HashMap<(String, String), Entry>;

/// In-memory [`Cache`] used when no external store is configured.
///
/// Cloning the cache, or opening the same bucket twice, shares the same
/// storage. Writes to the same key are serialized by a mutex; the last write
/// wins.
#[derive(Clone, Default)]
pub struct MemoryCache {
    store: Arc<Mutex<Store>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str, ttl: Duration) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            ttl,
            store: Arc::clone(&self.store),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    ttl: Duration,
    store: Arc<Mutex<Store>>,
}

impl MemoryCacheBucket {
    fn entry_key(&self, key: &str) -> (String, String) {
        (self.name.clone(), key.to_owned())
    }
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let entry_key = self.entry_key(key);

        let entry = store.get(&entry_key)?;
        if entry.is_expired(Instant::now()) {
            store.remove(&entry_key);
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: &[u8]) {
        let entry = Entry {
            expires_at: Instant::now().checked_add(self.ttl),
            value: value.to_vec(),
        };
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.entry_key(key), entry);
    }
}
