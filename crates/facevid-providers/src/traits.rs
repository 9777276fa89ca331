//! Provider traits wrapping the external generative services.
//!
//! These traits give the pipeline a uniform interface over the three
//! provider capabilities so each stage can be exercised against test
//! doubles. Providers own transport and payload decoding only; mapping
//! outputs into the pipeline's error taxonomy is the caller's job.

use async_trait::async_trait;

use facevid_models::AspectRatio;

use crate::error::ProviderResult;

/// An image handed to a provider call, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct ImagePart<'a> {
    pub mime_type: &'a str,
    pub bytes: &'a [u8],
}

/// Vision-language analysis and selection service.
#[async_trait]
pub trait VisionLanguageProvider: Send + Sync {
    /// Analyze one image under a JSON response-schema constraint.
    ///
    /// Returns the raw JSON text; the caller deserializes it strictly and
    /// decides whether it conforms.
    async fn analyze_structured(
        &self,
        prompt: &str,
        image: ImagePart<'_>,
        response_schema: serde_json::Value,
    ) -> ProviderResult<String>;

    /// Free-form text generation from a prompt alone.
    async fn generate_text(&self, prompt: &str) -> ProviderResult<String>;

    /// Rank a set of images against a prompt.
    ///
    /// Returns the model's raw verdict text; the caller maps it back to a
    /// member of the input set.
    async fn rank_images(&self, prompt: &str, images: &[ImagePart<'_>]) -> ProviderResult<String>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Text-to-image generation and outpainting service.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate `count` images from guidance text plus reference images.
    ///
    /// Returns the decoded image payloads in provider order. The provider
    /// may return fewer than requested; the caller enforces exactness.
    async fn generate(
        &self,
        prompt: &str,
        references: &[ImagePart<'_>],
        count: u32,
        aspect: AspectRatio,
    ) -> ProviderResult<Vec<Vec<u8>>>;

    /// Extend an image's canvas to the target aspect ratio.
    async fn outpaint(
        &self,
        image: ImagePart<'_>,
        prompt: &str,
        aspect: AspectRatio,
    ) -> ProviderResult<Vec<u8>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Image-to-video synthesis service.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Render a short clip from a single source image.
    ///
    /// Returns the encoded video bytes once the provider's operation
    /// completes.
    async fn generate_video(&self, image: ImagePart<'_>, prompt: &str) -> ProviderResult<Vec<u8>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
