//! HTTP-level tests for the provider clients against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use facevid_models::AspectRatio;
use facevid_providers::{
    GeminiClient, ImagePart, ImageProvider, ImagenClient, ProviderError, VeoClient, VideoProvider,
    VisionLanguageProvider,
};

fn gemini_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {"content": {"parts": [{"text": text}]}}
        ]
    })
}

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4e, 0x47];

fn png_part() -> ImagePart<'static> {
    ImagePart {
        mime_type: "image/png",
        bytes: PNG_BYTES,
    }
}

#[tokio::test]
async fn gemini_generate_text_returns_first_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("A tall subject.")))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", server.uri());
    let text = client.generate_text("summarize").await.unwrap();
    assert_eq!(text, "A tall subject.");
}

#[tokio::test]
async fn gemini_strips_markdown_fences() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_body("```json\n{\"best_index\": 2}\n```")),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", server.uri());
    let text = client.rank_images("pick one", &[png_part()]).await.unwrap();
    assert_eq!(text, "{\"best_index\": 2}");
}

#[tokio::test]
async fn gemini_falls_back_to_next_model() {
    let server = MockServer::start().await;

    // First model in the fallback list fails, the second succeeds.
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash-lite:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("ok")))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", server.uri());
    let text = client.generate_text("hello").await.unwrap();
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn gemini_surfaces_status_when_all_models_fail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", server.uri());
    let err = client.generate_text("hello").await.unwrap_err();
    match err {
        ProviderError::Status { status, .. } => assert_eq!(status, 429),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn gemini_empty_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", server.uri());
    let err = client.generate_text("hello").await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyResponse(_)));
}

#[tokio::test]
async fn imagen_decodes_all_predictions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:predict$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [
                {"bytesBase64Encoded": "AAEC", "mimeType": "image/png"},
                {"bytesBase64Encoded": "AwQF", "mimeType": "image/png"}
            ]
        })))
        .mount(&server)
        .await;

    let client = ImagenClient::with_base_url("test-key", server.uri());
    let images = client
        .generate("a portrait", &[png_part()], 2, AspectRatio::Square)
        .await
        .unwrap();

    assert_eq!(images.len(), 2);
    assert_eq!(images[0], vec![0, 1, 2]);
    assert_eq!(images[1], vec![3, 4, 5]);
}

#[tokio::test]
async fn imagen_invalid_base64_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:predict$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{"bytesBase64Encoded": "!!not-base64!!"}]
        })))
        .mount(&server)
        .await;

    let client = ImagenClient::with_base_url("test-key", server.uri());
    let err = client
        .outpaint(png_part(), "extend", AspectRatio::Widescreen)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)));
}

#[tokio::test]
async fn imagen_rejection_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:predict$"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unsupported aspect ratio"))
        .mount(&server)
        .await;

    let client = ImagenClient::with_base_url("test-key", server.uri());
    let err = client
        .outpaint(png_part(), "extend", AspectRatio::Widescreen)
        .await
        .unwrap_err();
    match err {
        ProviderError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("unsupported"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn veo_polls_until_done_and_decodes_inline_video() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:predictLongRunning$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "operations/op-1"})),
        )
        .mount(&server)
        .await;

    // First poll: still running. Second poll: done with inline bytes.
    Mock::given(method("GET"))
        .and(path("/v1beta/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": false})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [
                        {"video": {"bytesBase64Encoded": "AAECAwQ="}}
                    ]
                }
            }
        })))
        .mount(&server)
        .await;

    let client = VeoClient::with_base_url("test-key", server.uri())
        .with_polling(Duration::from_millis(10), Duration::from_secs(5));
    let clip = client
        .generate_video(png_part(), "subject walking")
        .await
        .unwrap();
    assert_eq!(clip, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn veo_operation_error_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:predictLongRunning$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "operations/op-2"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/operations/op-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "done": true,
            "error": {"code": 3, "message": "safety filters rejected the image"}
        })))
        .mount(&server)
        .await;

    let client = VeoClient::with_base_url("test-key", server.uri())
        .with_polling(Duration::from_millis(10), Duration::from_secs(5));
    let err = client
        .generate_video(png_part(), "subject walking")
        .await
        .unwrap_err();
    match err {
        ProviderError::OperationFailed { message, .. } => {
            assert!(message.contains("safety filters"));
        }
        other => panic!("expected operation failure, got {other:?}"),
    }
}

#[tokio::test]
async fn veo_times_out_when_operation_never_completes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:predictLongRunning$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "operations/op-3"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/operations/op-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": false})))
        .mount(&server)
        .await;

    let client = VeoClient::with_base_url("test-key", server.uri())
        .with_polling(Duration::from_millis(5), Duration::from_millis(20));
    let err = client
        .generate_video(png_part(), "subject walking")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::OperationTimeout { .. }));
}
