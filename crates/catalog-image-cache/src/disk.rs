//! Content-addressed disk tier with capacity enforcement
//!
//! Entries are JPEG files named by the hex digest of their cache key,
//! trimmed oldest-first by modification time when the directory exceeds its
//! cap. Purely an acceleration layer: deleting the directory, or any
//! failure inside it, must never change behavior beyond speed.

use crate::error::Result;
use crate::types::CacheKey;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

const JPEG_QUALITY: u8 = 85;

pub const DEFAULT_MAX_ENTRIES: usize = 512;

/// Disk tier capability: active with a root directory, or disabled.
#[derive(Debug)]
enum DiskTier {
    Active(PathBuf),
    Disabled,
}

/// Fixed-capacity spillover cache keyed by hashed cache keys.
#[derive(Debug)]
pub struct DiskStore {
    tier: DiskTier,
    max_entries: usize,
}

impl DiskStore {
    /// Open the store rooted at `dir`, creating the directory and trimming
    /// it to `max_entries`. Any initialization failure disables the tier
    /// and the system degrades to memory-only caching.
    pub fn open(dir: impl Into<PathBuf>, max_entries: usize) -> Self {
        let dir = dir.into();
        match init(&dir, max_entries) {
            Ok(()) => {
                debug!(dir = ?dir, max_entries, "Disk store ready");
                Self {
                    tier: DiskTier::Active(dir),
                    max_entries,
                }
            }
            Err(e) => {
                warn!(dir = ?dir, error = %e, "Disk store unavailable, continuing memory-only");
                Self {
                    tier: DiskTier::Disabled,
                    max_entries,
                }
            }
        }
    }

    /// A store that never touches the filesystem.
    pub fn disabled() -> Self {
        Self {
            tier: DiskTier::Disabled,
            max_entries: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.tier, DiskTier::Active(_))
    }

    /// Look up a stored variant. Corrupt or unreadable entries are deleted
    /// and reported absent.
    pub fn lookup(&self, key: &CacheKey) -> Option<RgbImage> {
        let path = self.entry_path(key)?;
        let bytes = fs::read(&path).ok()?;
        match image::load_from_memory(&bytes) {
            Ok(decoded) => {
                debug!(url = %key.url, size = %key.size, "Disk cache hit");
                Some(decoded.to_rgb8())
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Removing corrupt cache entry");
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    /// Store a variant as JPEG, overwriting any existing entry. Failures
    /// are logged and swallowed: a full or read-only disk costs speed, not
    /// correctness.
    pub fn store(&self, key: &CacheKey, image: &RgbImage) {
        let Some(path) = self.entry_path(key) else {
            return;
        };
        if let Err(e) = write_jpeg(&path, image) {
            warn!(path = ?path, error = %e, "Failed to write cache entry");
        }
    }

    /// Re-run the capacity trim. Called automatically at `open`; exposed so
    /// long-lived owners can trim between batches, outside the concurrent
    /// fetch window.
    pub fn enforce_capacity(&self) -> Result<()> {
        match &self.tier {
            DiskTier::Active(dir) => enforce_capacity(dir, self.max_entries),
            DiskTier::Disabled => Ok(()),
        }
    }

    /// Current on-disk entry count, 0 when disabled.
    pub fn entry_count(&self) -> usize {
        match &self.tier {
            DiskTier::Active(dir) => list_entries(dir).map(|v| v.len()).unwrap_or(0),
            DiskTier::Disabled => 0,
        }
    }

    fn entry_path(&self, key: &CacheKey) -> Option<PathBuf> {
        match &self.tier {
            DiskTier::Active(dir) => Some(dir.join(key.digest())),
            DiskTier::Disabled => None,
        }
    }
}

fn init(dir: &Path, max_entries: usize) -> Result<()> {
    fs::create_dir_all(dir)?;
    enforce_capacity(dir, max_entries)
}

fn write_jpeg(path: &Path, image: &RgbImage) -> Result<()> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    image.write_with_encoder(encoder)?;
    fs::write(path, &bytes)?;
    Ok(())
}

fn list_entries(dir: &Path) -> Result<Vec<(PathBuf, SystemTime)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push((entry.path(), mtime));
    }
    Ok(entries)
}

/// Delete oldest-by-mtime entries until the count is at or under the cap.
///
/// Modification time approximates recency: entries are written once and
/// never touched on read, so this is recency-of-write, not of access.
fn enforce_capacity(dir: &Path, max_entries: usize) -> Result<()> {
    let mut entries = list_entries(dir)?;
    if entries.len() <= max_entries {
        return Ok(());
    }
    entries.sort_by_key(|(_, mtime)| *mtime);
    let excess = entries.len() - max_entries;
    for (path, _) in entries.into_iter().take(excess) {
        debug!(path = ?path, "Evicting oldest cache entry");
        fs::remove_file(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetSize;
    use std::time::Duration;
    use tempfile::tempdir;

    fn key(url: &str) -> CacheKey {
        CacheKey::new(url, TargetSize::new(300, 300))
    }

    fn test_image() -> RgbImage {
        RgbImage::from_pixel(60, 40, image::Rgb([200, 30, 30]))
    }

    #[test]
    fn test_store_and_lookup() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path(), DEFAULT_MAX_ENTRIES);
        assert!(store.is_active());

        let key = key("https://example.com/a.jpg");
        assert!(store.lookup(&key).is_none());

        store.store(&key, &test_image());
        let found = store.lookup(&key).unwrap();
        assert_eq!(found.dimensions(), (60, 40));
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn test_store_overwrites() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path(), DEFAULT_MAX_ENTRIES);
        let key = key("https://example.com/a.jpg");

        store.store(&key, &test_image());
        store.store(&key, &RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 0])));

        assert_eq!(store.entry_count(), 1);
        assert_eq!(store.lookup(&key).unwrap().dimensions(), (10, 10));
    }

    #[test]
    fn test_corrupt_entry_is_deleted() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path(), DEFAULT_MAX_ENTRIES);
        let key = key("https://example.com/corrupt.jpg");

        fs::write(dir.path().join(key.digest()), b"not an image").unwrap();

        assert!(store.lookup(&key).is_none());
        // Deleted, not retried
        assert!(!dir.path().join(key.digest()).exists());
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn test_capacity_enforcement_keeps_newest() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path(), DEFAULT_MAX_ENTRIES);

        for i in 0..5 {
            store.store(&key(&format!("https://example.com/{i}.jpg")), &test_image());
            // Space out mtimes so eviction order is deterministic
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(store.entry_count(), 5);

        let trimmed = DiskStore::open(dir.path(), 3);
        assert_eq!(trimmed.entry_count(), 3);

        // The two oldest are gone, the newest survive
        assert!(trimmed.lookup(&key("https://example.com/0.jpg")).is_none());
        assert!(trimmed.lookup(&key("https://example.com/1.jpg")).is_none());
        assert!(trimmed.lookup(&key("https://example.com/4.jpg")).is_some());
    }

    #[test]
    fn test_enforce_capacity_under_cap_is_noop() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path(), DEFAULT_MAX_ENTRIES);
        store.store(&key("https://example.com/a.jpg"), &test_image());

        store.enforce_capacity().unwrap();
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn test_unusable_directory_disables_tier() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, b"file, not a directory").unwrap();

        let store = DiskStore::open(blocker.join("cache"), DEFAULT_MAX_ENTRIES);
        assert!(!store.is_active());

        // All operations degrade to no-ops
        let key = key("https://example.com/a.jpg");
        store.store(&key, &test_image());
        assert!(store.lookup(&key).is_none());
        assert_eq!(store.entry_count(), 0);
        store.enforce_capacity().unwrap();
    }

    #[test]
    fn test_disabled_store() {
        let store = DiskStore::disabled();
        assert!(!store.is_active());
        assert!(store.lookup(&key("https://example.com/a.jpg")).is_none());
    }
}
