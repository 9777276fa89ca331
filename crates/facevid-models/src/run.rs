//! Pipeline run definitions and the stage state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stage of the pipeline state machine.
///
/// Data flows strictly forward; each transition is gated by the success of
/// the corresponding component. Any failure moves the run to `Failed`,
/// which is terminal - there is no retry or resumption from an
/// intermediate stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// References loaded, nothing generated yet
    #[default]
    Initialized,
    /// Every reference has a conformant facial composite profile
    Described,
    /// Profiles reconciled into one subject description
    Synthesized,
    /// Exactly N square candidates generated
    CandidatesGenerated,
    /// One candidate promoted
    Selected,
    /// Selected candidate expanded to 16:9
    Outpainted,
    /// Final clip rendered to disk
    VideoRendered,
    /// Terminal failure; see the run's `error` for stage and cause
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Initialized => "initialized",
            PipelineStage::Described => "described",
            PipelineStage::Synthesized => "synthesized",
            PipelineStage::CandidatesGenerated => "candidates_generated",
            PipelineStage::Selected => "selected",
            PipelineStage::Outpainted => "outpainted",
            PipelineStage::VideoRendered => "video_rendered",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::VideoRendered | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The stage a run failed at and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StageFailure {
    /// Name of the component that failed (e.g. "select", "outpaint")
    pub stage: String,
    /// Human-readable cause, sufficient to decide between retrying the
    /// whole run and fixing the input
    pub cause: String,
}

/// Aggregate record of one pipeline invocation.
///
/// Binds one subject (a set of reference images), one scenario string, and
/// the chain of derived artifacts through to the final clip. Persisted only
/// as files on disk; artifact fields hold the paths returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PipelineRun {
    /// Unique run ID
    pub id: RunId,

    /// Subject label (typically the reference directory name)
    pub subject: String,

    /// Scenario string guiding candidate generation
    pub scenario: String,

    /// Current stage
    #[serde(default)]
    pub stage: PipelineStage,

    /// Reference images the run was invoked with
    pub reference_paths: Vec<PathBuf>,

    /// Persisted candidate images (set once candidates are generated)
    #[serde(default)]
    pub candidate_paths: Vec<PathBuf>,

    /// Index of the selected candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,

    /// Outpainted 16:9 image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outpainted_path: Option<PathBuf>,

    /// Final rendered clip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<PathBuf>,

    /// Terminal failure details (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StageFailure>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Completion timestamp (success or failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    /// Create a new run for a subject and scenario.
    pub fn new(
        subject: impl Into<String>,
        scenario: impl Into<String>,
        reference_paths: Vec<PathBuf>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RunId::new(),
            subject: subject.into(),
            scenario: scenario.into(),
            stage: PipelineStage::Initialized,
            reference_paths,
            candidate_paths: Vec::new(),
            selected_index: None,
            outpainted_path: None,
            video_path: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    fn advance(mut self, stage: PipelineStage) -> Self {
        self.stage = stage;
        self.updated_at = Utc::now();
        self
    }

    /// All references have conformant profiles.
    pub fn described(self) -> Self {
        self.advance(PipelineStage::Described)
    }

    /// Profiles reconciled into one subject description.
    pub fn synthesized(self) -> Self {
        self.advance(PipelineStage::Synthesized)
    }

    /// Exactly N candidates generated and persisted.
    pub fn candidates_generated(mut self, candidate_paths: Vec<PathBuf>) -> Self {
        self.candidate_paths = candidate_paths;
        self.advance(PipelineStage::CandidatesGenerated)
    }

    /// One candidate promoted.
    pub fn selected(mut self, index: usize) -> Self {
        self.selected_index = Some(index);
        self.advance(PipelineStage::Selected)
    }

    /// Selected candidate expanded to widescreen.
    pub fn outpainted(mut self, path: PathBuf) -> Self {
        self.outpainted_path = Some(path);
        self.advance(PipelineStage::Outpainted)
    }

    /// Final clip rendered; the run is complete.
    pub fn video_rendered(mut self, path: PathBuf) -> Self {
        self.video_path = Some(path);
        self.completed_at = Some(Utc::now());
        self.advance(PipelineStage::VideoRendered)
    }

    /// Record a terminal failure at the named stage.
    pub fn fail(mut self, stage: impl Into<String>, cause: impl Into<String>) -> Self {
        self.error = Some(StageFailure {
            stage: stage.into(),
            cause: cause.into(),
        });
        self.completed_at = Some(Utc::now());
        self.advance(PipelineStage::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_run() -> PipelineRun {
        PipelineRun::new(
            "alice",
            "a man wearing a spiderman outfit in the desert",
            vec![PathBuf::from("/refs/a.jpg"), PathBuf::from("/refs/b.jpg")],
        )
    }

    #[test]
    fn test_run_creation() {
        let run = new_run();
        assert_eq!(run.stage, PipelineStage::Initialized);
        assert_eq!(run.reference_paths.len(), 2);
        assert!(run.error.is_none());
        assert!(!run.stage.is_terminal());
    }

    #[test]
    fn test_forward_transitions() {
        let run = new_run()
            .described()
            .synthesized()
            .candidates_generated(vec![
                PathBuf::from("/out/candidate_0.png"),
                PathBuf::from("/out/candidate_1.png"),
            ])
            .selected(1)
            .outpainted(PathBuf::from("/out/outpainted.png"))
            .video_rendered(PathBuf::from("/out/video.mp4"));

        assert_eq!(run.stage, PipelineStage::VideoRendered);
        assert!(run.stage.is_terminal());
        assert_eq!(run.selected_index, Some(1));
        assert!(run.completed_at.is_some());
        assert!(run.error.is_none());
    }

    #[test]
    fn test_failure_is_terminal_and_tagged() {
        let run = new_run().described().fail("select", "index out of range");

        assert_eq!(run.stage, PipelineStage::Failed);
        assert!(run.stage.is_terminal());
        let failure = run.error.unwrap();
        assert_eq!(failure.stage, "select");
        assert_eq!(failure.cause, "index out of range");
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&PipelineStage::CandidatesGenerated).unwrap();
        assert_eq!(json, "\"candidates_generated\"");
    }
}
