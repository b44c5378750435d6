//! Catalog Image Warmer - batch pre-fetch into the cache tiers
//!
//! Reads one image URL per line from a list file, warms both cache tiers
//! with a bounded worker pool, and prints the generation report. Stands in
//! for the catalog UI's pre-render warming step.

use catalog_image_cache::{DiskStore, ImageCache, TargetSize, DEFAULT_MAX_ENTRIES};
use catalog_image_fetcher::{BatchFetcher, FetcherConfig, ImageFetcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug)]
struct WarmerConfig {
    cache_dir: PathBuf,
    max_disk_entries: usize,
    target: TargetSize,
    fetcher: FetcherConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("catalog_image_warmer=info".parse()?)
        .add_directive("catalog_image_fetcher=info".parse()?)
        .add_directive("catalog_image_cache=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let list_path = std::env::args()
        .nth(1)
        .ok_or("usage: catalog-image-warmer <url-list-file>")?;

    let config = load_config();
    info!("Starting catalog image warmer...");
    info!("URL list: {}", list_path);
    info!("Cache dir: {:?}", config.cache_dir);
    info!("Max disk entries: {}", config.max_disk_entries);
    info!("Target box: {}", config.target);
    info!("Workers: {}", config.fetcher.max_workers);

    // Blank lines count as empty references, like blank spreadsheet cells
    let urls: Vec<String> = std::fs::read_to_string(&list_path)?
        .lines()
        .map(|line| line.trim().to_string())
        .collect();

    let cache = Arc::new(ImageCache::new());
    let disk = Arc::new(DiskStore::open(&config.cache_dir, config.max_disk_entries));
    let fetcher = Arc::new(ImageFetcher::new(cache.clone(), disk, &config.fetcher));
    let batch = BatchFetcher::new(fetcher, config.fetcher.max_workers);

    let started_at = chrono::Utc::now();
    let stats = batch
        .warm(&urls, config.target, |completed, total| {
            if total > 0 && (completed % 25 == 0 || completed == total) {
                info!(completed, total, "Warm progress");
            }
        })
        .await;
    let elapsed_ms = (chrono::Utc::now() - started_at).num_milliseconds();

    info!(elapsed_ms, "Warm finished");
    println!("{}", stats.summary());
    println!("{}", serde_json::to_string(&stats)?);

    Ok(())
}

fn load_config() -> WarmerConfig {
    let cache_dir = std::env::var("CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./cache/images"));

    let max_disk_entries = std::env::var("MAX_DISK_ENTRIES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_ENTRIES);

    let target_width = std::env::var("TARGET_WIDTH")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(400);

    let target_height = std::env::var("TARGET_HEIGHT")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(400);

    let mut fetcher = FetcherConfig::default();
    if let Some(workers) = std::env::var("MAX_WORKERS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
    {
        fetcher.max_workers = workers;
    }
    if let Some(secs) = std::env::var("FETCH_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
    {
        fetcher.timeout = Duration::from_secs(secs);
    }

    WarmerConfig {
        cache_dir,
        max_disk_entries,
        target: TargetSize::new(target_width, target_height),
        fetcher,
    }
}
