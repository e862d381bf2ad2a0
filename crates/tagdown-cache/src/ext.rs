//! Extension trait for [`CacheBucket`] with string convenience methods.

use crate::CacheBucket;

/// UTF-8 string access for [`CacheBucket`].
///
/// [`CacheBucket`] itself stays object-safe and byte-oriented; a blanket impl
/// gives every bucket these methods.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tagdown_cache::{Cache, CacheBucketExt, MemoryCache};
///
/// let cache = MemoryCache::new();
/// let bucket = cache.bucket("links", Duration::from_secs(60));
///
/// bucket.set_string("and", "/api/commands/and.html");
/// assert_eq!(bucket.get_string("and").as_deref(), Some("/api/commands/and.html"));
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on cache miss, expiry, or invalid UTF-8.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value in the cache.
    fn set_string(&self, key: &str, value: &str) {
        self.set(key, value.as_bytes());
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{Cache, MemoryCache};

    #[test]
    fn test_string_round_trip() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("links", Duration::from_secs(60));

        bucket.set_string("and", "/api/commands/and.html");
        assert_eq!(bucket.get_string("and").as_deref(), Some("/api/commands/and.html"));
        assert_eq!(bucket.get("and"), Some(b"/api/commands/and.html".to_vec()));
    }

    #[test]
    fn test_invalid_utf8_string_misses() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("links", Duration::from_secs(60));

        bucket.set("k", &[0xFF, 0xFE]);
        assert_eq!(bucket.get_string("k"), None);
    }
}
