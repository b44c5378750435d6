//! Error types for the image fetcher
//!
//! These never cross the fetch boundary: `ImageFetcher::fetch` converts
//! every variant into a placeholder result after logging it.

use std::fmt;

#[derive(Debug)]
pub enum FetchError {
    /// Transport-level failure: timeout, refused connection, bad TLS.
    Http(reqwest::Error),
    /// The host answered with a non-success status.
    Status(reqwest::StatusCode),
    /// The body was not a decodable image.
    Decode(image::ImageError),
    /// The blocking decode task was cancelled or panicked.
    Task(tokio::task::JoinError),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::Status(status) => write!(f, "Host returned status {}", status),
            Self::Decode(e) => write!(f, "Image decode error: {}", e),
            Self::Task(e) => write!(f, "Decode task error: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Task(e) => Some(e),
            Self::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<image::ImageError> for FetchError {
    fn from(e: image::ImageError) -> Self {
        Self::Decode(e)
    }
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e)
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
