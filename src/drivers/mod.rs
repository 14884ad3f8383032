//! Model driver abstraction: one outbound call per generation, no retry.
//!
//! The [`ContentGenerator`](crate::generation::ContentGenerator) only talks to
//! `dyn ModelDriver`, so tests can swap in a counting stub and production code
//! can pick a provider at startup.

pub mod gemini;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::GenerationParams;
use crate::credentials::ApiKey;
use crate::Result;

pub use gemini::GeminiDriver;

/// Unified text response from a provider.
#[derive(Debug, Clone)]
pub struct DriverResponse {
    /// Extracted text content.
    pub content: String,
    /// Finish reason normalized to `stop` / `length` / `content_filter` / provider value.
    pub finish_reason: Option<String>,
    /// Token usage statistics.
    pub usage: Option<UsageInfo>,
    /// Raw provider response for debugging.
    pub raw: Value,
}

impl DriverResponse {
    /// Response carrying only text, as produced by stubs and fixtures.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: Some("stop".into()),
            usage: None,
            raw: Value::Null,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// A generative model reachable with an API key.
///
/// Implementations make exactly one request per call. Failures are returned
/// as typed [`Error`](crate::Error)s: `Transport` when no response arrived,
/// `Remote` for error statuses, `Provider` for unusable answers.
#[async_trait]
pub trait ModelDriver: Send + Sync {
    /// Provider identifier, e.g. `"gemini"`.
    fn provider_id(&self) -> &str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    async fn generate_text(
        &self,
        api_key: &ApiKey,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<DriverResponse>;
}
