//! Provider clients for the FaceVid pipeline.
//!
//! The pipeline's boundary is three black-box capabilities, each behind a
//! trait so stages can run against test doubles:
//! - Vision-language analysis and selection (Gemini `generateContent`)
//! - Text-to-image generation and outpainting (Imagen `predict`)
//! - Image-to-video synthesis (Veo `predictLongRunning` + poll)

pub mod error;
pub mod gemini;
pub mod imagen;
pub mod traits;
pub mod veo;

pub use error::{ProviderError, ProviderResult};
pub use gemini::GeminiClient;
pub use imagen::ImagenClient;
pub use traits::{ImagePart, ImageProvider, VideoProvider, VisionLanguageProvider};
pub use veo::VeoClient;

/// Default public endpoint for the Generative Language API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
