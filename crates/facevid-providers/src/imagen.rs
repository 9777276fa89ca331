//! Imagen client for candidate generation and outpainting.
//!
//! Drives the `predict` endpoint in two modes: subject-conditioned
//! generation (guidance prompt + reference images, square output) and
//! outpainting (source image extended to a wider canvas).

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use facevid_models::AspectRatio;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::{ImagePart, ImageProvider};
use crate::DEFAULT_API_BASE;

const DEFAULT_MODEL: &str = "imagen-3.0-capability-001";

/// Imagen API client.
pub struct ImagenClient {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance {
    prompt: String,
    #[serde(rename = "referenceImages", skip_serializing_if = "Vec::is_empty")]
    reference_images: Vec<ReferencePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<InlineImage>,
}

#[derive(Debug, Serialize)]
struct ReferencePayload {
    #[serde(rename = "referenceId")]
    reference_id: u32,
    #[serde(rename = "referenceImage")]
    reference_image: InlineImage,
}

#[derive(Debug, Serialize)]
struct InlineImage {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

impl InlineImage {
    fn from_part(part: ImagePart<'_>) -> Self {
        Self {
            bytes_base64_encoded: base64::engine::general_purpose::STANDARD.encode(part.bytes),
            mime_type: part.mime_type.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Parameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
    #[serde(rename = "editMode", skip_serializing_if = "Option::is_none")]
    edit_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

impl ImagenClient {
    /// Create a new Imagen client from the environment.
    pub fn new() -> ProviderResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ProviderError::MissingApiKey("GEMINI_API_KEY not set".into()))?;

        let model = std::env::var("FACEVID_IMAGEN_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            client: Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            model,
        })
    }

    /// Create a client against a custom endpoint (used in tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    async fn predict(&self, request: &PredictRequest) -> ProviderResult<Vec<Vec<u8>>> {
        let url = format!(
            "{}/v1beta/models/{}:predict?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status, body));
        }

        let predict_response: PredictResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(format!("Imagen response: {}", e)))?;

        let mut images = Vec::with_capacity(predict_response.predictions.len());
        for prediction in predict_response.predictions {
            let encoded = prediction
                .bytes_base64_encoded
                .ok_or_else(|| ProviderError::empty_response("prediction without image bytes"))?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| ProviderError::decode(format!("image base64: {}", e)))?;
            images.push(bytes);
        }

        debug!("Imagen returned {} image(s)", images.len());
        Ok(images)
    }
}

#[async_trait::async_trait]
impl ImageProvider for ImagenClient {
    async fn generate(
        &self,
        prompt: &str,
        references: &[ImagePart<'_>],
        count: u32,
        aspect: AspectRatio,
    ) -> ProviderResult<Vec<Vec<u8>>> {
        let reference_images = references
            .iter()
            .enumerate()
            .map(|(i, part)| ReferencePayload {
                reference_id: i as u32 + 1,
                reference_image: InlineImage::from_part(*part),
            })
            .collect();

        let request = PredictRequest {
            instances: vec![Instance {
                prompt: prompt.to_string(),
                reference_images,
                image: None,
            }],
            parameters: Parameters {
                sample_count: count,
                aspect_ratio: aspect.as_str().to_string(),
                edit_mode: None,
            },
        };

        self.predict(&request).await
    }

    async fn outpaint(
        &self,
        image: ImagePart<'_>,
        prompt: &str,
        aspect: AspectRatio,
    ) -> ProviderResult<Vec<u8>> {
        let request = PredictRequest {
            instances: vec![Instance {
                prompt: prompt.to_string(),
                reference_images: Vec::new(),
                image: Some(InlineImage::from_part(image)),
            }],
            parameters: Parameters {
                sample_count: 1,
                aspect_ratio: aspect.as_str().to_string(),
                edit_mode: Some("EDIT_MODE_OUTPAINT".to_string()),
            },
        };

        let mut images = self.predict(&request).await?;
        if images.is_empty() {
            return Err(ProviderError::empty_response(
                "outpaint returned no predictions",
            ));
        }
        Ok(images.swap_remove(0))
    }

    fn name(&self) -> &'static str {
        "imagen"
    }
}
