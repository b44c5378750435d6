//! Fetch outcomes and batch statistics

use serde::{Deserialize, Serialize};

/// How a fetch call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Served from the memory tier.
    Cached,
    /// Served from the disk tier, now resident in memory.
    DiskHit,
    /// Retrieved over the network, written through both tiers.
    Downloaded,
    /// The URL field was empty or the spreadsheet missing-value sentinel.
    Empty,
    /// Fetch or decode failed; the placeholder was substituted.
    Error,
}

/// Aggregate result of warming a batch of URL references.
///
/// Each distinct non-empty URL is counted exactly once: under `cached` if it
/// was resident before the warm began, `ok` if it was fetched during the
/// warm (network download or disk hit), `failed` otherwise. Duplicate
/// references beyond the first contribute only to `total`; empty references
/// are counted per occurrence in `empty`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// References passed in, duplicates and empties included.
    pub total: usize,
    /// Distinct non-empty URLs.
    pub valid_urls: usize,
    /// Resident in memory before the warm began.
    pub cached: usize,
    /// Fetched successfully during the warm.
    pub ok: usize,
    /// Exhausted every fallback; the placeholder stands in.
    pub failed: usize,
    /// Empty or sentinel references, per occurrence.
    pub empty: usize,
}

impl BatchStats {
    /// One-line generation report for the catalog UI.
    pub fn summary(&self) -> String {
        if self.failed == 0 {
            format!("All {} images ready", self.valid_urls)
        } else {
            format!(
                "{} of {} images failed and used a placeholder",
                self.failed, self.valid_urls
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_all_ok() {
        let stats = BatchStats {
            total: 5,
            valid_urls: 4,
            cached: 1,
            ok: 3,
            failed: 0,
            empty: 1,
        };
        assert_eq!(stats.summary(), "All 4 images ready");
    }

    #[test]
    fn test_summary_with_failures() {
        let stats = BatchStats {
            total: 10,
            valid_urls: 8,
            cached: 0,
            ok: 5,
            failed: 3,
            empty: 2,
        };
        assert_eq!(
            stats.summary(),
            "3 of 8 images failed and used a placeholder"
        );
    }

    #[test]
    fn test_stats_serialization() {
        let stats = BatchStats {
            total: 4,
            valid_urls: 2,
            cached: 0,
            ok: 1,
            failed: 1,
            empty: 1,
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"valid_urls\":2"));

        let roundtrip: BatchStats = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, stats);
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&FetchOutcome::DiskHit).unwrap(),
            "\"disk_hit\""
        );
    }
}
