//! File-based cache implementation.
//!
//! [`FileCache`] stores cache entries as files on disk, organized into buckets
//! (subdirectories). Keys are hashed with SHA-256 so that hrefs containing
//! `/`, `:` or `#` map to flat, filesystem-safe names. Each entry is a single
//! file with a fixed header followed by the data:
//!
//! ```text
//! [expires_at: u64 LE, milliseconds since UNIX epoch][data bytes]
//! ```
//!
//! On read, only the header is read first to check the deadline. The data is
//! read only when the entry is still fresh.
//!
//! On construction, [`FileCache`] validates a `VERSION` file in the cache root.
//! If the version mismatches or is missing, the entire cache directory is wiped
//! and recreated. This ensures stale caches from previous builds are never used.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::{Cache, CacheBucket};

/// Header value for entries that never expire.
const NO_EXPIRY: u64 = u64::MAX;

/// Size of the expiry header.
const HEADER_LEN: usize = 8;

/// Distinguishes temporary files written by threads of this process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # contains the cache version string
/// +-- links/             # bucket "links"
///     +-- 3a7bd3e2...    # cache entry (sha256 of the key)
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// If the `VERSION` file inside `root` does not match `version`, the entire
    /// cache directory is removed and recreated with the new version. Errors
    /// during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str, ttl: Duration) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
            ttl,
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
    ttl: Duration,
}

impl FileCacheBucket {
    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(hex::encode(digest))
    }

    /// Write through a unique temporary file and rename it into place, so
    /// concurrent writers of one key never interleave; the last rename wins.
    fn write_entry(&self, key: &str, value: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(NO_EXPIRY);
        let expires_at = now_millis().checked_add(ttl_ms).unwrap_or(NO_EXPIRY);

        let mut entry = Vec::with_capacity(HEADER_LEN + value.len());
        entry.extend_from_slice(&expires_at.to_le_bytes());
        entry.extend_from_slice(value);

        let path = self.entry_path(key);
        let tmp = path.with_extension(format!(
            "tmp.{}.{}",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, &entry)?;
        fs::rename(&tmp, &path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        let mut file = File::open(&path).ok()?;

        let mut header = [0u8; HEADER_LEN];
        file.read_exact(&mut header).ok()?;
        let expires_at = u64::from_le_bytes(header);

        if expires_at != NO_EXPIRY && now_millis() >= expires_at {
            tracing::debug!(key, "Cache entry expired");
            return None;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data).ok()?;
        Some(data)
    }

    fn set(&self, key: &str, value: &[u8]) {
        if let Err(e) = self.write_entry(key, value) {
            tracing::warn!(key, error = %e, "Failed to write cache entry");
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(NO_EXPIRY))
}

/// Make sure `root` holds a cache written by `version`, starting over otherwise.
///
/// Failures only cost cache hits, so they are logged and never returned.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");
    let stored = fs::read_to_string(&version_file).ok();

    if stored.as_deref() == Some(version) {
        tracing::debug!(version, "Cache version matches");
        return;
    }
    tracing::info!(
        stored = stored.as_deref().unwrap_or("none"),
        current = version,
        path = %root.display(),
        "Resetting cache"
    );

    let reset = match fs::remove_dir_all(root) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => fs::create_dir_all(root).and_then(|()| fs::write(&version_file, version)),
    };
    if let Err(e) = reset {
        tracing::warn!(path = %root.display(), error = %e, "Failed to reset cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_file_bucket_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("links", HOUR);

        bucket.set("and", b"/api/commands/and.html");
        assert_eq!(bucket.get("and"), Some(b"/api/commands/and.html".to_vec()));
    }

    #[test]
    fn test_file_bucket_zero_ttl_misses() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("links", Duration::ZERO);

        bucket.set("and", b"stale");
        assert_eq!(bucket.get("and"), None);
    }

    #[test]
    fn test_file_bucket_get_nonexistent_key() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("links", HOUR);

        assert_eq!(bucket.get("nonexistent"), None);
    }

    #[test]
    fn test_file_bucket_overwrite() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("links", HOUR);

        bucket.set("key", b"first");
        bucket.set("key", b"second");

        assert_eq!(bucket.get("key"), Some(b"second".to_vec()));
    }

    #[test]
    fn test_file_cache_buckets_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");

        let bucket_a = cache.bucket("alpha", HOUR);
        let bucket_b = cache.bucket("beta", HOUR);

        bucket_a.set("key", b"alpha-data");
        bucket_b.set("key", b"beta-data");

        assert_eq!(bucket_a.get("key"), Some(b"alpha-data".to_vec()));
        assert_eq!(bucket_b.get("key"), Some(b"beta-data".to_vec()));
    }

    #[test]
    fn test_file_bucket_url_key() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("links", HOUR);

        let key = "https://docs.cypress.io/api/commands/and#Syntax";
        bucket.set(key, b"ok");
        assert_eq!(bucket.get(key), Some(b"ok".to_vec()));
    }

    #[test]
    fn test_concurrent_writers_last_write_wins() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");

        std::thread::scope(|scope| {
            for i in 0..8u8 {
                let bucket = cache.bucket("links", HOUR);
                scope.spawn(move || bucket.set("and", &[i; 512]));
            }
        });

        let value = cache.bucket("links", HOUR).get("and").unwrap();
        assert_eq!(value.len(), 512);
        assert!(value.iter().all(|b| *b == value[0]));

        let leftovers = fs::read_dir(tmp.path().join("cache/links")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_version_match_keeps_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let cache = FileCache::new(root.clone(), "v1");
        cache.bucket("links", HOUR).set("key", b"preserved");

        let cache2 = FileCache::new(root, "v1");
        let bucket2 = cache2.bucket("links", HOUR);
        assert_eq!(bucket2.get("key"), Some(b"preserved".to_vec()));
    }

    #[test]
    fn test_version_mismatch_wipes_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let cache = FileCache::new(root.clone(), "v1");
        cache.bucket("links", HOUR).set("key", b"will-be-wiped");

        let cache2 = FileCache::new(root.clone(), "v2");
        assert_eq!(cache2.bucket("links", HOUR).get("key"), None);

        let version = fs::read_to_string(root.join("VERSION")).unwrap();
        assert_eq!(version, "v2");
    }

    #[test]
    fn test_nonexistent_root_creates_version() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("deeply/nested/cache");

        assert!(!root.exists());

        let _cache = FileCache::new(root.clone(), "v1");

        assert!(root.exists());
        let version = fs::read_to_string(root.join("VERSION")).unwrap();
        assert_eq!(version, "v1");
    }
}
