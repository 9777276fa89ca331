//! Veo client for image-to-video synthesis.
//!
//! Video generation is a long-running operation: `predictLongRunning`
//! returns an operation name which is polled until `done`, after which the
//! clip arrives either inline (base64) or behind a download URI.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::traits::{ImagePart, VideoProvider};
use crate::DEFAULT_API_BASE;

const DEFAULT_MODEL: &str = "veo-2.0-generate-001";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Veo API client.
pub struct VeoClient {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct VideoRequest {
    instances: Vec<VideoInstance>,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    image: InlineImage,
}

#[derive(Debug, Serialize)]
struct InlineImage {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct OperationHandle {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Operation {
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(rename = "generateVideoResponse")]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
struct GenerateVideoResponse {
    #[serde(rename = "generatedSamples", default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoPayload>,
}

#[derive(Debug, Deserialize)]
struct VideoPayload {
    uri: Option<String>,
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

impl VeoClient {
    /// Create a new Veo client from the environment.
    pub fn new() -> ProviderResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ProviderError::MissingApiKey("GEMINI_API_KEY not set".into()))?;

        let model = std::env::var("FACEVID_VEO_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            client: Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            model,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        })
    }

    /// Create a client against a custom endpoint (used in tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Override the operation poll cadence.
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }

    async fn start_operation(&self, request: &VideoRequest) -> ProviderResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status, body));
        }

        let handle: OperationHandle = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(format!("operation handle: {}", e)))?;

        info!("Veo operation started: {}", handle.name);
        Ok(handle.name)
    }

    async fn poll_operation(&self, operation: &str) -> ProviderResult<Operation> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, operation, self.api_key);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status, body));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::decode(format!("operation status: {}", e)))
    }

    /// Poll until the operation completes, fails or times out.
    async fn await_operation(&self, operation: &str) -> ProviderResult<Operation> {
        let deadline = tokio::time::Instant::now() + self.poll_timeout;

        loop {
            let state = self.poll_operation(operation).await?;
            if state.done {
                if let Some(err) = state.error {
                    return Err(ProviderError::operation_failed(operation, err.message));
                }
                return Ok(state);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(ProviderError::OperationTimeout {
                    operation: operation.to_string(),
                    secs: self.poll_timeout.as_secs(),
                });
            }

            debug!("Veo operation {} still running", operation);
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Pull the clip bytes out of a completed operation.
    async fn fetch_clip(&self, operation: &str, state: Operation) -> ProviderResult<Vec<u8>> {
        let video = state
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .ok_or_else(|| {
                ProviderError::operation_failed(operation, "completed without a video sample")
            })?;

        if let Some(encoded) = video.bytes_base64_encoded {
            return base64::engine::general_purpose::STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| ProviderError::decode(format!("video base64: {}", e)));
        }

        let uri = video.uri.ok_or_else(|| {
            ProviderError::operation_failed(operation, "video sample carries neither bytes nor uri")
        })?;

        // The download URI requires the same API key as the operation.
        let separator = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{}{}key={}", uri, separator, self.api_key);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status, body));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl VideoProvider for VeoClient {
    async fn generate_video(&self, image: ImagePart<'_>, prompt: &str) -> ProviderResult<Vec<u8>> {
        let request = VideoRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
                image: InlineImage {
                    bytes_base64_encoded: base64::engine::general_purpose::STANDARD
                        .encode(image.bytes),
                    mime_type: image.mime_type.to_string(),
                },
            }],
        };

        let operation = self.start_operation(&request).await?;
        let state = self.await_operation(&operation).await?;
        self.fetch_clip(&operation, state).await
    }

    fn name(&self) -> &'static str {
        "veo"
    }
}
