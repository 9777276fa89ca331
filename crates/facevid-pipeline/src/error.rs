//! Pipeline error types.
//!
//! Every stage failure is fatal to the run: there is no automatic retry,
//! no partial-result salvage, and no resumption from an intermediate
//! stage. The taxonomy tells the caller which component failed and whether
//! the fix is a whole-run retry or an input change.

use thiserror::Error;

use facevid_providers::ProviderError;

use crate::runner::stage_names;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or empty reference directory; raised before any external call.
    #[error("input validation failed: {0}")]
    InputValidation(String),

    /// The vision model's output could not be parsed into the profile schema.
    #[error("profile schema violation: {0}")]
    SchemaViolation(String),

    /// Description synthesis returned empty or whitespace-only text.
    #[error("description synthesis returned empty output: {0}")]
    GenerationEmpty(String),

    /// Candidate generation errored or produced fewer images than requested.
    #[error("candidate generation failed: {0}")]
    GenerationFailed(String),

    /// The selector's verdict could not be mapped to one candidate.
    #[error("candidate selection ambiguous: {0}")]
    SelectionAmbiguous(String),

    /// The outpaint request was rejected or the result is not 16:9.
    #[error("outpainting failed: {0}")]
    OutpaintFailed(String),

    /// Video synthesis errored; no partial video is produced.
    #[error("video generation failed: {0}")]
    VideoGenerationFailed(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An ambient failure tagged with the stage it interrupted.
    ///
    /// Built by [`PipelineError::with_stage`]; only `Provider` and `Io`
    /// errors end up wrapped, every other variant already names its stage.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    pub fn input_validation(msg: impl Into<String>) -> Self {
        Self::InputValidation(msg.into())
    }

    pub fn schema_violation(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }

    pub fn generation_empty(msg: impl Into<String>) -> Self {
        Self::GenerationEmpty(msg.into())
    }

    pub fn generation_failed(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    pub fn selection_ambiguous(msg: impl Into<String>) -> Self {
        Self::SelectionAmbiguous(msg.into())
    }

    pub fn outpaint_failed(msg: impl Into<String>) -> Self {
        Self::OutpaintFailed(msg.into())
    }

    pub fn video_generation_failed(msg: impl Into<String>) -> Self {
        Self::VideoGenerationFailed(msg.into())
    }

    /// The stage this error is attributed to, if any.
    ///
    /// Taxonomy variants map to a fixed stage; `Provider` and `Io` carry
    /// none until the runner tags them via [`PipelineError::with_stage`].
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            PipelineError::InputValidation(_) => Some(stage_names::LOAD_REFERENCES),
            PipelineError::SchemaViolation(_) => Some(stage_names::DESCRIBE),
            PipelineError::GenerationEmpty(_) => Some(stage_names::SYNTHESIZE),
            PipelineError::GenerationFailed(_) => Some(stage_names::GENERATE_CANDIDATES),
            PipelineError::SelectionAmbiguous(_) => Some(stage_names::SELECT),
            PipelineError::OutpaintFailed(_) => Some(stage_names::OUTPAINT),
            PipelineError::VideoGenerationFailed(_) => Some(stage_names::RENDER_VIDEO),
            PipelineError::Stage { stage, .. } => Some(stage),
            PipelineError::Provider(_) | PipelineError::Io(_) => None,
        }
    }

    /// Attribute an ambient error to the stage it interrupted.
    ///
    /// Errors that already name a stage pass through unchanged.
    pub fn with_stage(self, stage: &'static str) -> Self {
        match self.stage() {
            Some(_) => self,
            None => PipelineError::Stage {
                stage,
                source: Box::new(self),
            },
        }
    }

    /// The fix is an input change rather than a retry.
    pub fn is_input_error(&self) -> bool {
        matches!(self, PipelineError::InputValidation(_))
    }

    /// Whether restarting the whole run could plausibly succeed unchanged.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::Provider(e) => e.is_transient(),
            PipelineError::Stage { source, .. } => source.is_transient(),
            PipelineError::Io(_) => false,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(PipelineError::input_validation("empty dir").is_input_error());
        assert!(!PipelineError::generation_failed("3 of 4").is_input_error());

        let transient: PipelineError = ProviderError::status(503, "unavailable").into();
        assert!(transient.is_transient());

        let permanent: PipelineError = ProviderError::decode("bad json").into();
        assert!(!permanent.is_transient());
        assert!(!PipelineError::selection_ambiguous("index 9 of 4").is_transient());
    }

    #[test]
    fn test_taxonomy_variants_name_their_stage() {
        assert_eq!(
            PipelineError::input_validation("empty dir").stage(),
            Some(stage_names::LOAD_REFERENCES)
        );
        assert_eq!(
            PipelineError::schema_violation("missing field").stage(),
            Some(stage_names::DESCRIBE)
        );
        assert_eq!(
            PipelineError::video_generation_failed("empty clip").stage(),
            Some(stage_names::RENDER_VIDEO)
        );

        let ambient: PipelineError = ProviderError::status(500, "boom").into();
        assert_eq!(ambient.stage(), None);
    }

    #[test]
    fn test_with_stage_tags_ambient_errors_only() {
        let ambient: PipelineError = ProviderError::status(503, "unavailable").into();
        let tagged = ambient.with_stage(stage_names::DESCRIBE);
        assert_eq!(tagged.stage(), Some(stage_names::DESCRIBE));
        // Transience classification survives the wrapping.
        assert!(tagged.is_transient());

        // A taxonomy error keeps its own stage attribution.
        let already_tagged =
            PipelineError::selection_ambiguous("index 9 of 4").with_stage(stage_names::DESCRIBE);
        assert_eq!(already_tagged.stage(), Some(stage_names::SELECT));
    }
}
