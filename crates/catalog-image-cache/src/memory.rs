//! Session-scoped in-memory image cache

use crate::types::{CacheKey, CacheStats};
use image::RgbImage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local map from cache key to decoded, size-bounded image.
///
/// The authoritative fast path for one catalog-editing session: entries are
/// never evicted or refreshed, the count is bounded by the catalog size, and
/// everything is dropped with the owning session. Safe under concurrent
/// access from the batch fetcher's workers.
pub struct ImageCache {
    entries: RwLock<HashMap<CacheKey, Arc<RgbImage>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ImageCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the cached variant for `key`, if resident.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<RgbImage>> {
        let found = self.entries.read().await.get(key).cloned();
        match &found {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(url = %key.url, size = %key.size, "Memory cache hit");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }
        found
    }

    /// Insert a variant, replacing any previous entry for `key`.
    pub async fn put(&self, key: CacheKey, image: Arc<RgbImage>) {
        self.entries.write().await.insert(key, image);
    }

    /// Residency check that does not touch the hit/miss counters.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.read().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetSize;

    fn test_image(width: u32, height: u32) -> Arc<RgbImage> {
        Arc::new(RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30])))
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = ImageCache::new();
        let key = CacheKey::new("https://example.com/a.jpg", TargetSize::new(400, 400));

        assert!(cache.get(&key).await.is_none());

        cache.put(key.clone(), test_image(40, 30)).await;
        let found = cache.get(&key).await.unwrap();
        assert_eq!(found.dimensions(), (40, 30));
    }

    #[tokio::test]
    async fn test_get_returns_shared_image() {
        let cache = ImageCache::new();
        let key = CacheKey::new("https://example.com/a.jpg", TargetSize::new(400, 400));
        cache.put(key.clone(), test_image(4, 4)).await;

        let first = cache.get(&key).await.unwrap();
        let second = cache.get(&key).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_sizes_are_distinct_entries() {
        let cache = ImageCache::new();
        let url = "https://example.com/a.jpg";
        let thumb = CacheKey::new(url, TargetSize::new(400, 400));
        let cell = CacheKey::new(url, TargetSize::new(300, 300));

        cache.put(thumb.clone(), test_image(400, 300)).await;

        assert!(cache.contains(&thumb).await);
        assert!(!cache.contains(&cell).await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_stats_counters() {
        let cache = ImageCache::new();
        let key = CacheKey::new("https://example.com/a.jpg", TargetSize::new(400, 400));

        cache.get(&key).await;
        cache.put(key.clone(), test_image(4, 4)).await;
        cache.get(&key).await;
        // contains() must not move the counters
        cache.contains(&key).await;

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
