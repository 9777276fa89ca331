//! Structured run logging utilities.
//!
//! Provides consistent, structured logging for pipeline runs with
//! tracing spans and contextual information.

use tracing::{error, info, Span};

use facevid_models::RunId;

/// Run logger for structured logging with consistent formatting.
///
/// Tags every lifecycle event with the run ID and subject so a run can be
/// followed through the stage machine in aggregated logs.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    subject: String,
}

impl RunLogger {
    /// Create a new logger for a run.
    pub fn new(run_id: &RunId, subject: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            subject: subject.to_string(),
        }
    }

    /// Log the start of a stage.
    pub fn stage_started(&self, stage: &str, message: &str) {
        info!(
            run_id = %self.run_id,
            subject = %self.subject,
            stage = %stage,
            "Stage started: {}", message
        );
    }

    /// Log the successful completion of a stage.
    pub fn stage_completed(&self, stage: &str, message: &str) {
        info!(
            run_id = %self.run_id,
            subject = %self.subject,
            stage = %stage,
            "Stage completed: {}", message
        );
    }

    /// Log a terminal stage failure.
    pub fn stage_failed(&self, stage: &str, message: &str) {
        error!(
            run_id = %self.run_id,
            subject = %self.subject,
            stage = %stage,
            "Stage failed: {}", message
        );
    }

    /// Get the run ID.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "pipeline_run",
            run_id = %self.run_id,
            subject = %self.subject
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, "alice");

        assert_eq!(logger.run_id(), run_id.to_string());
    }
}
