//! Cache key and statistics types

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Bounding box an image variant is resized to fit, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSize {
    pub max_width: u32,
    pub max_height: u32,
}

impl TargetSize {
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.max_width, self.max_height)
    }
}

/// Identifies one cacheable image variant: source URL plus target box.
///
/// The same URL at two different boxes is two distinct entries; the grid
/// thumbnail and the PDF cell request different sizes of the same image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: String,
    pub size: TargetSize,
}

impl CacheKey {
    pub fn new(url: impl Into<String>, size: TargetSize) -> Self {
        Self {
            url: url.into(),
            size,
        }
    }

    /// Hex-encoded SHA-256 of `"{url}|{size}"`, used as the on-disk filename.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}|{}", self.url, self.size).as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Statistics about the memory tier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}
