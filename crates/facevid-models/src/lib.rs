//! Shared data models for the FaceVid pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Reference images and generated image artifacts
//! - The facial composite profile schema
//! - Subject descriptions used as image-guidance prompts
//! - Pipeline runs and their stage state machine
//! - Aspect ratios for generation and outpainting

pub mod artifacts;
pub mod aspect;
pub mod profile;
pub mod reference;
pub mod run;

// Re-export common types
pub use artifacts::{CandidateImage, OutpaintedImage, SelectedImage};
pub use aspect::AspectRatio;
pub use profile::{FacialCompositeProfile, ProfileValidationError};
pub use reference::{mime_type_for_extension, EmptyDescription, ReferenceImage, SubjectDescription};
pub use run::{PipelineRun, PipelineStage, RunId, StageFailure};
