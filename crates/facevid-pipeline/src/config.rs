//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of candidate images generated per run
    pub candidate_count: usize,
    /// Root directory for per-run output directories
    pub output_dir: PathBuf,
    /// Interval between video operation polls
    pub poll_interval: Duration,
    /// Overall timeout for the video operation
    pub poll_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            candidate_count: 4,
            output_dir: PathBuf::from("/tmp/facevid"),
            poll_interval: Duration::from_secs(10),
            poll_timeout: Duration::from_secs(600), // 10 minutes
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            candidate_count: std::env::var("FACEVID_CANDIDATE_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(4),
            output_dir: std::env::var("FACEVID_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/facevid")),
            poll_interval: Duration::from_secs(
                std::env::var("FACEVID_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            poll_timeout: Duration::from_secs(
                std::env::var("FACEVID_POLL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
        }
    }
}
