//! End-to-end behaviour of the content generator against a stub model

mod common;

use common::{configured_generator, manual_cache, CountingDriver, Reply, COURSE_CONTENT_JSON, TTL};
use learnware_grove::cache::CacheKeyGenerator;
use learnware_grove::credentials::{CredentialChain, MemoryStore};
use learnware_grove::transport::TransportError;
use learnware_grove::{
    ContentGenerator, ContentKind, Error, ErrorCode, GenerationRequest, GenerationResult,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_repeat_request_hits_cache() {
    let driver = CountingDriver::replying(r#"{"topic":"Algebra","questions":[]}"#);
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver.clone(), cache);
    let request = GenerationRequest::new(ContentKind::Quiz, "Algebra");

    let first = generator.generate(&request).await.unwrap();
    let second = generator.generate(&request).await.unwrap();

    assert_eq!(driver.calls(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_topic_changes_the_cache_entry() {
    let driver = CountingDriver::replying(r#"{"topic":"Algebra","questions":[]}"#);
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver.clone(), cache.clone());

    let bare = GenerationRequest::new(ContentKind::Quiz, "Algebra");
    let with_topic = GenerationRequest::new(ContentKind::Quiz, "Algebra").with_topic("intro");
    assert_ne!(generator.cache_key_for(&bare), generator.cache_key_for(&with_topic));

    generator.generate(&bare).await.unwrap();
    generator.generate(&with_topic).await.unwrap();
    assert_eq!(driver.calls(), 2);
    assert_eq!(cache.len().await, 2);
}

#[tokio::test]
async fn test_fenced_reply_is_parsed() {
    let driver = CountingDriver::replying("Here you go:\n```json\n{\"overview\":\"x\"}\n```");
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver, cache);

    let result = generator
        .generate(&GenerationRequest::new(ContentKind::CourseContent, "Algebra"))
        .await
        .unwrap();
    assert_eq!(result.as_course_content().unwrap().overview, "x");
}

#[tokio::test]
async fn test_unparseable_reply_is_not_cached() {
    let driver = CountingDriver::replying("I cannot help with that.");
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver.clone(), cache.clone());
    let request = GenerationRequest::new(ContentKind::StudyMaterial, "Physics").with_topic("Optics");

    let err = generator.generate(&request).await.unwrap_err();
    assert_eq!(err.kind, ErrorCode::InvalidResponseFormat);
    assert_eq!(err.raw_text.as_deref(), Some("I cannot help with that."));
    assert!(cache.is_empty().await);

    generator.generate(&request).await.unwrap_err();
    assert_eq!(driver.calls(), 2);
}

#[tokio::test]
async fn test_unconfigured_generator_never_calls_model() {
    let driver = CountingDriver::replying(COURSE_CONTENT_JSON);
    let generator = ContentGenerator::builder()
        .driver(driver.clone())
        .credentials(CredentialChain::new().with_store(Arc::new(MemoryStore::new())))
        .build()
        .unwrap();
    assert!(!generator.is_configured());

    for kind in ContentKind::ALL {
        let err = generator
            .generate(&GenerationRequest::new(kind, "Algebra"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorCode::AuthError);
    }
    assert_eq!(driver.calls(), 0);

    generator.set_api_key("late-key").unwrap();
    generator
        .generate(&GenerationRequest::new(ContentKind::CourseContent, "Algebra"))
        .await
        .unwrap();
    assert_eq!(driver.calls(), 1);
}

#[tokio::test]
async fn test_expired_entry_calls_model_again() {
    let driver = CountingDriver::replying("A short course on limits.");
    let (cache, clock) = manual_cache();
    let generator = configured_generator(driver.clone(), cache.clone());
    let request = GenerationRequest::new(ContentKind::CourseDescription, "Calculus");
    let key = generator.cache_key_for(&request);

    generator.generate(&request).await.unwrap();
    clock.advance(TTL - Duration::from_secs(1));
    generator.generate(&request).await.unwrap();
    assert_eq!(driver.calls(), 1);

    clock.advance(Duration::from_secs(2));
    assert_eq!(cache.get::<GenerationResult>(&key).await, None);
    generator.generate(&request).await.unwrap();
    assert_eq!(driver.calls(), 2);
}

#[tokio::test]
async fn test_course_content_scenario() {
    let driver = CountingDriver::replying(COURSE_CONTENT_JSON);
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver.clone(), cache);

    let content = generator
        .generate_course_content("Intro to Databases", "SQL Basics")
        .await
        .unwrap();
    assert!(!content.overview.is_empty());
    assert!(!content.key_topics.is_empty());
    assert!(content.key_topics.iter().all(|t| !t.title.is_empty() && !t.description.is_empty()));

    let again = generator
        .generate_course_content("Intro to Databases", "SQL Basics")
        .await
        .unwrap();
    assert_eq!(again, content);
    assert_eq!(driver.calls(), 1);

    let prompt = &driver.prompts()[0];
    assert!(prompt.contains("Intro to Databases"));
    assert!(prompt.contains("SQL Basics"));
}

#[tokio::test]
async fn test_missing_fields_are_still_success() {
    let driver = CountingDriver::replying(r#"{"title":"Optics"}"#);
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver.clone(), cache.clone());

    let material = generator.generate_study_material("Physics", "Optics").await.unwrap();
    assert_eq!(material.title, "Optics");
    assert!(material.key_points.is_empty());
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_null_fields_are_success_and_cached() {
    let driver = CountingDriver::replying(r#"{"overview":"x","prerequisites":null}"#);
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver.clone(), cache.clone());
    let request = GenerationRequest::new(ContentKind::CourseContent, "Algebra");

    let first = generator.generate(&request).await.unwrap();
    let content = first.as_course_content().unwrap();
    assert_eq!(content.overview, "x");
    assert!(content.prerequisites.is_empty());

    let second = generator.generate(&request).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(driver.calls(), 1);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_blank_subject_reaches_the_model() {
    let driver = CountingDriver::replying(r#"{"topic":"","questions":[]}"#);
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver.clone(), cache);

    generator.generate_quiz("   ", None).await.unwrap();
    assert_eq!(driver.calls(), 1);
    assert!(driver.prompts()[0].contains(r#"course "   ""#));
}

#[tokio::test]
async fn test_model_failure_is_reported_and_not_cached() {
    let driver = CountingDriver::with_replies(vec![
        Reply::Fail(|| Error::Transport(TransportError::Other("connection reset".into()))),
        Reply::Text(COURSE_CONTENT_JSON.into()),
    ]);
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver.clone(), cache.clone());
    let request = GenerationRequest::new(ContentKind::CourseContent, "Databases");

    let err = generator.generate(&request).await.unwrap_err();
    assert_eq!(err.kind, ErrorCode::ModelProviderError);
    assert_eq!(err.details.as_ref().unwrap()["cause"], json!("NETWORK_ERROR"));
    assert!(cache.is_empty().await);

    generator.generate(&request).await.unwrap();
    assert_eq!(driver.calls(), 2);
}

#[tokio::test]
async fn test_remote_rejection_keeps_provider_message() {
    let driver = CountingDriver::failing(|| Error::Remote {
        status: 400,
        message: "API key not valid. Please pass a valid API key.".into(),
        body: Some(json!({"error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}})),
    });
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver, cache);

    let err = generator
        .generate(&GenerationRequest::new(ContentKind::Quiz, "Algebra"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorCode::ModelProviderError);
    assert_eq!(err.message, "API key not valid. Please pass a valid API key.");
    assert_eq!(err.details.as_ref().unwrap()["cause"], json!("API_ERROR"));
}

#[tokio::test]
async fn test_cache_keys_share_the_gemini_namespace() {
    let driver = CountingDriver::replying(r#"{"query":"Graphs"}"#);
    let (cache, _clock) = manual_cache();
    let generator = configured_generator(driver, cache.clone());

    generator.research_assistance("Graphs").await.unwrap();
    let prefix = CacheKeyGenerator::new().operation_prefix("researchAssistance");
    let cached: Vec<GenerationResult> = cache.get_by_prefix(&prefix).await;
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].kind(), ContentKind::ResearchAssistance);
}
