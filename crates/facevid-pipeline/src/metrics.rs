//! Pipeline metrics collection.
//!
//! Provides standardized metrics for monitoring pipeline execution:
//! - Stage counters by stage and status
//! - Stage latency histograms
//! - Run counters by outcome

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total stage executions by stage and status.
    pub const STAGES_TOTAL: &str = "facevid_stages_total";

    /// Stage latency in seconds by stage.
    pub const STAGE_LATENCY_SECONDS: &str = "facevid_stage_latency_seconds";

    /// Total pipeline runs by outcome.
    pub const RUNS_TOTAL: &str = "facevid_runs_total";
}

/// Record metrics for a completed stage.
pub fn record_stage(stage: &str, success: bool, latency_secs: f64) {
    let status = if success { "success" } else { "failure" };

    counter!(
        names::STAGES_TOTAL,
        "stage" => stage.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!(
        names::STAGE_LATENCY_SECONDS,
        "stage" => stage.to_string()
    )
    .record(latency_secs);
}

/// Record the outcome of a whole run.
pub fn record_run(success: bool) {
    let outcome = if success { "completed" } else { "failed" };

    counter!(
        names::RUNS_TOTAL,
        "outcome" => outcome
    )
    .increment(1);
}
