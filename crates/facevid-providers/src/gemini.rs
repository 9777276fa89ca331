//! Gemini client for vision-language analysis and candidate selection.
//!
//! Drives the `generateContent` endpoint for three call purposes: schema-
//! constrained forensic description, free-form description synthesis, and
//! best-candidate ranking over a set of images.

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::traits::{ImagePart, VisionLanguageProvider};
use crate::DEFAULT_API_BASE;

/// Models tried in order until one succeeds.
const FALLBACK_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.5-pro",
];

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    client: Client,
    base_url: String,
    models: Vec<String>,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(image: ImagePart<'_>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.to_string(),
                data: base64::engine::general_purpose::STANDARD.encode(image.bytes),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// Strip a markdown code fence from model output before JSON parsing.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

impl GeminiClient {
    /// Create a new Gemini client from the environment.
    pub fn new() -> ProviderResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ProviderError::MissingApiKey("GEMINI_API_KEY not set".into()))?;

        let models = match std::env::var("FACEVID_GEMINI_MODEL") {
            Ok(m) if !m.trim().is_empty() => vec![m],
            _ => FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        Ok(Self {
            api_key,
            client: Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            models,
        })
    }

    /// Create a client against a custom endpoint (used in tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: base_url.into(),
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Call `generateContent`, walking the fallback model list.
    async fn generate_content(&self, request: &GeminiRequest) -> ProviderResult<String> {
        let mut last_error = None;

        for model in &self.models {
            match self.call_model(model, request).await {
                Ok(text) => {
                    info!("Got response from {}", model);
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Gemini model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::empty_response("no Gemini models configured")))
    }

    async fn call_model(&self, model: &str, request: &GeminiRequest) -> ProviderResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status, body));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(format!("Gemini response: {}", e)))?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| ProviderError::empty_response("no content in Gemini response"))?;

        Ok(strip_code_fence(text).to_string())
    }
}

#[async_trait::async_trait]
impl VisionLanguageProvider for GeminiClient {
    async fn analyze_structured(
        &self,
        prompt: &str,
        image: ImagePart<'_>,
        response_schema: Value,
    ) -> ProviderResult<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt), Part::image(image)],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(response_schema),
            },
        };
        self.generate_content(&request).await
    }

    async fn generate_text(&self, prompt: &str) -> ProviderResult<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: GenerationConfig {
                response_mime_type: None,
                response_schema: None,
            },
        };
        self.generate_content(&request).await
    }

    async fn rank_images(&self, prompt: &str, images: &[ImagePart<'_>]) -> ProviderResult<String> {
        let mut parts = vec![Part::text(prompt)];
        parts.extend(images.iter().map(|i| Part::image(*i)));

        let request = GeminiRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: None,
            },
        };
        self.generate_content(&request).await
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_request_serialization() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::text("describe"),
                    Part::image(ImagePart {
                        mime_type: "image/png",
                        bytes: &[1, 2, 3],
                    }),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: None,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(json["generationConfig"].get("responseSchema").is_none());
    }
}
