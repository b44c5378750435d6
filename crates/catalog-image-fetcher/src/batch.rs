//! Concurrent cache warming for catalog batches

use crate::fetcher::{is_missing_url, ImageFetcher};
use crate::types::{BatchStats, FetchOutcome};
use catalog_image_cache::{CacheKey, TargetSize};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Pre-populates the cache tiers for many URLs with a bounded worker pool.
///
/// After `warm` returns, the serial per-row render path is a memory hit for
/// every URL that could be fetched at all, and rows whose URL could not be
/// fetched fall back to the placeholder. This is the only place network
/// fetches run in parallel.
pub struct BatchFetcher {
    fetcher: Arc<ImageFetcher>,
    max_workers: usize,
}

impl BatchFetcher {
    pub fn new(fetcher: Arc<ImageFetcher>, max_workers: usize) -> Self {
        Self {
            fetcher,
            max_workers: max_workers.max(1),
        }
    }

    /// Fetch every distinct URL in `urls` at `size`.
    ///
    /// `on_progress(completed, total_distinct)` fires once up front with the
    /// already-resident count, then once per completion in completion
    /// order; the completed count is monotonic. No ordering is guaranteed
    /// across URLs.
    pub async fn warm<F>(&self, urls: &[String], size: TargetSize, mut on_progress: F) -> BatchStats
    where
        F: FnMut(usize, usize),
    {
        let total = urls.len();
        let mut empty = 0usize;
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for url in urls {
            if is_missing_url(url) {
                empty += 1;
            } else if seen.insert(url.trim().to_string()) {
                distinct.push(url.trim().to_string());
            }
        }
        let valid_urls = distinct.len();

        let mut cached = 0usize;
        let mut pending = Vec::new();
        for url in distinct {
            let key = CacheKey::new(url.as_str(), size);
            if self.fetcher.cache().contains(&key).await {
                cached += 1;
            } else {
                pending.push(url);
            }
        }

        let mut completed = cached;
        on_progress(completed, valid_urls);

        info!(
            total,
            valid_urls,
            cached,
            pending = pending.len(),
            "Warming image cache"
        );

        let mut ok = 0usize;
        let mut failed = 0usize;
        let mut outcomes = stream::iter(pending.into_iter().map(|url| {
            let fetcher = self.fetcher.clone();
            async move {
                let (_, outcome) = fetcher.fetch(&url, size).await;
                (url, outcome)
            }
        }))
        .buffer_unordered(self.max_workers);

        while let Some((url, outcome)) = outcomes.next().await {
            completed += 1;
            match outcome {
                FetchOutcome::Error | FetchOutcome::Empty => failed += 1,
                FetchOutcome::Downloaded | FetchOutcome::DiskHit | FetchOutcome::Cached => ok += 1,
            }
            debug!(url = %url, outcome = ?outcome, completed, valid_urls, "Warmed");
            on_progress(completed, valid_urls);
        }

        let stats = BatchStats {
            total,
            valid_urls,
            cached,
            ok,
            failed,
            empty,
        };
        info!(
            ok = stats.ok,
            failed = stats.failed,
            cached = stats.cached,
            empty = stats.empty,
            "Warm complete"
        );
        stats
    }
}
