//! Cache abstraction layer for tagdown.
//!
//! This crate provides generic caching traits that decouple cache consumers
//! from the underlying storage mechanism. Two traits form the core API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store whose entries expire after a fixed TTL
//!
//! Expiry is passive: an entry is checked against its deadline when it is
//! read, and nothing sweeps stale entries in the background.
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: Process-local map, shared by all buckets with the same name
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tagdown_cache::{Cache, MemoryCache, NullCache};
//!
//! let cache = NullCache;
//! let bucket = cache.bucket("links", Duration::from_secs(3600));
//! bucket.set("api/commands/and", b"/api/commands/and.html");
//! assert_eq!(bucket.get("api/commands/and"), None); // NullCache always misses
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("links", Duration::from_secs(3600));
//! bucket.set("and", b"/api/commands/and.html");
//! assert_eq!(bucket.get("and"), Some(b"/api/commands/and.html".to_vec()));
//! ```

mod ext;
mod file;
mod memory;

use std::time::Duration;

pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Each bucket stores key-value pairs that stay valid for the TTL the bucket
/// was opened with. Writing a key again replaces the value and restarts its
/// TTL window (last write wins).
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `Some(value)` if the key exists and its TTL has not elapsed.
    /// Returns `None` on cache miss or expired entry.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value in the cache.
    ///
    /// Overwrites any existing entry for the same key.
    fn set(&self, key: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// A `Cache` produces buckets that are logically isolated from each other.
/// For example, a file-based cache stores each bucket in a separate
/// subdirectory.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket whose entries expire after `ttl`.
    ///
    /// Calling `bucket` multiple times with the same name may return
    /// independent handles that share the same underlying storage.
    ///
    /// # Arguments
    ///
    /// * `name` - Bucket name (e.g., "links")
    /// * `ttl` - Lifetime of each entry, measured from the moment it was written
    fn bucket(&self, name: &str, ttl: Duration) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
///
/// Every `get` returns `None`; every `set` is silently discarded.
/// Used as the bucket type for [`NullCache`].
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled. All operations are no-ops and all lookups
/// return `None`.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str, _ttl: Duration) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_null_cache_always_misses() {
        let cache = NullCache;
        let bucket = cache.bucket("links", HOUR);

        assert_eq!(bucket.get("key"), None);

        bucket.set("key", b"hello");
        assert_eq!(bucket.get("key"), None);
    }

    #[test]
    fn test_null_cache_different_buckets_all_miss() {
        let cache = NullCache;

        for name in &["links", "pages", "external"] {
            let bucket = cache.bucket(name, HOUR);
            bucket.set("k", b"data");
            assert_eq!(bucket.get("k"), None, "bucket {name} should miss");
        }
    }
}
