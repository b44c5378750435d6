//! Two-tier image cache for catalog rendering
//!
//! Decoded, size-bounded product images are held in a session-scoped memory
//! tier backed by a fixed-capacity content-addressed disk tier, with a
//! deterministic placeholder tile for rows without a usable image.

mod disk;
mod error;
mod memory;
mod placeholder;
mod types;

pub use disk::{DiskStore, DEFAULT_MAX_ENTRIES};
pub use error::{CacheError, Result};
pub use memory::ImageCache;
pub use placeholder::{placeholder, PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH};
pub use types::{CacheKey, CacheStats, TargetSize};
