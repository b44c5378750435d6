//! Fetcher configuration

use std::time::Duration;

/// Some image hosts answer 403 to bare library agents, so requests carry a
/// browser-like identity.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Connect-plus-read budget for one request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Worker pool width for batch warming.
pub const DEFAULT_MAX_WORKERS: usize = 12;

/// Tuning knobs for the fetcher and batch warmer.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_workers: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}
