//! Single-image retrieval with normalization and dual-tier write-through

use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use crate::types::FetchOutcome;
use catalog_image_cache::{placeholder, CacheKey, DiskStore, ImageCache, TargetSize};
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::Arc;
use tracing::{debug, warn};

/// Treat empty fields and the spreadsheet missing-value sentinel as "no
/// image": the ingestion layer stringifies absent cells as `nan`.
pub fn is_missing_url(url: &str) -> bool {
    let trimmed = url.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Retrieves one image per call: memory tier, then disk tier, then the
/// network, falling back to the placeholder on any failure.
pub struct ImageFetcher {
    client: reqwest::Client,
    cache: Arc<ImageCache>,
    disk: Arc<DiskStore>,
}

impl ImageFetcher {
    pub fn new(cache: Arc<ImageCache>, disk: Arc<DiskStore>, config: &FetcherConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            cache,
            disk,
        }
    }

    /// The memory tier this fetcher writes through.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Resolve `url` to an opaque image no larger than `size`.
    ///
    /// Always returns a usable image; failures surface only through the
    /// outcome tag, never as an error.
    pub async fn fetch(&self, url: &str, size: TargetSize) -> (Arc<RgbImage>, FetchOutcome) {
        if is_missing_url(url) {
            return (placeholder(), FetchOutcome::Empty);
        }
        let key = CacheKey::new(url.trim(), size);

        if let Some(image) = self.cache.get(&key).await {
            return (image, FetchOutcome::Cached);
        }

        if let Some(image) = self.disk_lookup(&key).await {
            let image = Arc::new(image);
            self.cache.put(key, image.clone()).await;
            return (image, FetchOutcome::DiskHit);
        }

        match self.download(&key, size).await {
            Ok(image) => {
                let image = Arc::new(image);
                self.cache.put(key, image.clone()).await;
                (image, FetchOutcome::Downloaded)
            }
            Err(e) => {
                warn!(url = %key.url, error = %e, "Falling back to placeholder");
                (placeholder(), FetchOutcome::Error)
            }
        }
    }

    async fn disk_lookup(&self, key: &CacheKey) -> Option<RgbImage> {
        let disk = self.disk.clone();
        let key = key.clone();
        tokio::task::spawn_blocking(move || disk.lookup(&key))
            .await
            .ok()
            .flatten()
    }

    async fn download(&self, key: &CacheKey, size: TargetSize) -> Result<RgbImage> {
        debug!(url = %key.url, "Downloading image");

        let response = self.client.get(&key.url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let bytes = response.bytes().await?;

        let disk = self.disk.clone();
        let key = key.clone();
        tokio::task::spawn_blocking(move || -> Result<RgbImage> {
            let decoded = image::load_from_memory(&bytes)?;
            let image = normalize(decoded, size);
            disk.store(&key, &image);
            Ok(image)
        })
        .await?
    }
}

/// Bound a decoded image to `size` and flatten it to opaque RGB.
///
/// Downscaling preserves aspect ratio and never upscales; palette sources
/// decode to direct color, and alpha is composited over white because every
/// consumer renders into an opaque context.
pub fn normalize(decoded: DynamicImage, size: TargetSize) -> RgbImage {
    let (w, h) = (decoded.width(), decoded.height());
    let bounded = if w > size.max_width || h > size.max_height {
        decoded.resize(size.max_width, size.max_height, FilterType::Lanczos3)
    } else {
        decoded
    };
    flatten_onto_white(&bounded)
}

fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        out.put_pixel(x, y, Rgb([over_white(r, a), over_white(g, a), over_white(b, a)]));
    }
    out
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u32, alpha as u32);
    ((c * a + 0xff * (0xff - a)) / 0xff) as u8
}
