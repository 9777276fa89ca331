//! Face-consistent video generation pipeline.
//!
//! Orchestrates a strictly forward-flowing chain of generative calls:
//! reference photos are profiled by a vision-language model, the profiles
//! are reconciled into one subject description, N square candidates are
//! generated from it, the most faithful candidate is selected, outpainted
//! to 16:9, and finally rendered into a short clip.
//!
//! Each stage is gated by the previous one's success; any failure is fatal
//! to the run and surfaces as a stage-tagged [`PipelineError`].

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod reference;
pub mod runner;
pub mod stages;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::RunLogger;
pub use reference::load_reference_set;
pub use runner::Pipeline;
