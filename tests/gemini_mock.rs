//! Gemini driver and HTTP transport against a mock server

use learnware_grove::cache::{CacheConfig, CacheManager, NullCache};
use learnware_grove::drivers::{GeminiDriver, ModelDriver};
use learnware_grove::transport::HttpTransport;
use learnware_grove::{
    ApiKey, AppError, ContentGenerator, ContentKind, Error, ErrorCode, GenerationParams,
    GenerationRequest, GeneratorConfig,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const MODEL: &str = "gemini-1.5-flash";
const PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

/// Test fixture that owns a mock server and a driver pointed at it
struct GeminiFixture {
    server: ServerGuard,
    driver: GeminiDriver,
}

impl GeminiFixture {
    async fn new() -> Self {
        let server = Server::new_async().await;
        let transport = HttpTransport::new(&server.url(), Duration::from_secs(5)).unwrap();
        Self {
            driver: GeminiDriver::new(transport, MODEL),
            server,
        }
    }

    fn candidate_body(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 30, "totalTokenCount": 42 }
        })
        .to_string()
    }
}

fn key() -> ApiKey {
    ApiKey::new("test-key").unwrap()
}

#[tokio::test]
async fn test_request_shape_and_text_extraction() {
    let mut fx = GeminiFixture::new().await;
    let mock = fx
        .server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{ "parts": [{ "text": "hello" }] }],
            "generationConfig": { "maxOutputTokens": 8192 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(GeminiFixture::candidate_body("{\"overview\":\"x\"}"))
        .create_async()
        .await;

    let response = fx
        .driver
        .generate_text(&key(), "hello", &GenerationParams::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.content, "{\"overview\":\"x\"}");
    assert_eq!(response.usage.unwrap().total_tokens, 42);
}

#[tokio::test]
async fn test_error_status_maps_to_remote() {
    let mut fx = GeminiFixture::new().await;
    fx.server
        .mock("POST", PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#)
        .create_async()
        .await;

    let err = fx
        .driver
        .generate_text(&key(), "hello", &GenerationParams::default())
        .await
        .unwrap_err();

    match err {
        Error::Remote { status, ref message, ref body } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
            assert_eq!(body.as_ref().unwrap()["error"]["status"], "INVALID_ARGUMENT");
        }
        ref other => panic!("expected remote error, got {:?}", other),
    }
    let app = AppError::from(&err);
    assert_eq!(app.code, ErrorCode::ApiError);
}

#[tokio::test]
async fn test_non_json_error_body_uses_reason() {
    let mut fx = GeminiFixture::new().await;
    fx.server
        .mock("POST", PATH)
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let err = fx
        .driver
        .generate_text(&key(), "hello", &GenerationParams::default())
        .await
        .unwrap_err();
    match err {
        Error::Remote { status, message, body } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
            assert_eq!(body, Some(json!("upstream unavailable")));
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blocked_prompt_is_provider_error() {
    let mut fx = GeminiFixture::new().await;
    fx.server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
        .create_async()
        .await;

    let err = fx
        .driver
        .generate_text(&key(), "hello", &GenerationParams::default())
        .await
        .unwrap_err();
    assert_eq!(AppError::from(&err).code, ErrorCode::ModelProviderError);
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Bind then drop a listener so nothing answers on the port.
    let url = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let transport = HttpTransport::new(&url, Duration::from_secs(2)).unwrap();
    let driver = GeminiDriver::new(transport, MODEL);

    let err = driver
        .generate_text(&key(), "hello", &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "{:?}", err);
    assert_eq!(AppError::from(&err).code, ErrorCode::NetworkError);
}

#[tokio::test]
async fn test_generator_over_http() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(GeminiFixture::candidate_body(
            "Sure! ```json\n{\"topic\":\"Algebra\",\"questions\":[{\"question\":\"2x=4, x=?\",\"options\":[\"1\",\"2\"],\"correctAnswer\":\"2\",\"explanation\":\"divide\"}]}\n```",
        ))
        .expect(1)
        .create_async()
        .await;

    let config = GeneratorConfig::new()
        .with_api_base(server.url())
        .with_cache_ttl(Duration::from_secs(60));
    let generator = ContentGenerator::builder()
        .config(config)
        .api_key("test-key")
        .build()
        .unwrap();

    let request = GenerationRequest::new(ContentKind::Quiz, "Algebra");
    let quiz = generator.generate(&request).await.unwrap();
    let again = generator.generate(&request).await.unwrap();
    assert_eq!(quiz, again);
    assert_eq!(quiz.as_quiz().unwrap().questions[0].correct_answer, "2");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_null_cache_always_calls_model() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(GeminiFixture::candidate_body("A course about sets."))
        .expect(2)
        .create_async()
        .await;

    let transport = HttpTransport::new(&server.url(), Duration::from_secs(5)).unwrap();
    let generator = ContentGenerator::builder()
        .driver(Arc::new(GeminiDriver::new(transport, MODEL)))
        .cache(Arc::new(CacheManager::new(CacheConfig::new(), Box::new(NullCache::new()))))
        .api_key("test-key")
        .build()
        .unwrap();

    for _ in 0..2 {
        let text = generator
            .generate_course_description("Set Theory", None)
            .await
            .unwrap();
        assert_eq!(text, "A course about sets.");
    }
    mock.assert_async().await;
}
