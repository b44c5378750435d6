//! Error types for the catalog image cache

use std::fmt;

/// Errors from disk-tier operations
#[derive(Debug)]
pub enum CacheError {
    Io(std::io::Error),
    Image(image::ImageError),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Image(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<image::ImageError> for CacheError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
