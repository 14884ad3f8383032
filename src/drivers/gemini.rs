//! Google Gemini generateContent driver.
//!
//! - Request body: `contents[].parts[].text` plus `generationConfig`
//!   (`temperature`, `maxOutputTokens`).
//! - Response: `candidates[0].content.parts[*].text`.
//! - The API key travels in the `x-goog-api-key` header so it never appears in URLs.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;

use crate::config::{GenerationParams, GeneratorConfig};
use crate::credentials::ApiKey;
use crate::error::Error;
use crate::transport::HttpTransport;
use crate::Result;

use super::{DriverResponse, ModelDriver, UsageInfo};

pub struct GeminiDriver {
    transport: HttpTransport,
    model: String,
}

impl GeminiDriver {
    pub fn new(transport: HttpTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.api_base, config.http_timeout)?;
        Ok(Self::new(transport, config.model.clone()))
    }

    fn path(&self) -> String {
        format!("/v1beta/models/{}:generateContent", self.model)
    }

    pub fn build_request(prompt: &str, params: &GenerationParams) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "temperature": params.temperature,
                "maxOutputTokens": params.max_output_tokens,
            },
        })
    }

    pub fn parse_response(body: &Value) -> Result<DriverResponse> {
        // { candidates: [{ content: { parts: [{text}] }, finishReason }], usageMetadata, promptFeedback }
        let Some(candidate) = body.pointer("/candidates/0") else {
            let reason = body
                .pointer("/promptFeedback/blockReason")
                .and_then(|r| r.as_str())
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "response contained no candidates".to_string());
            return Err(Error::Provider {
                message: reason,
                raw: Some(body.clone()),
            });
        };

        let finish_reason = candidate
            .get("finishReason")
            .and_then(|v| v.as_str())
            .map(|r| match r {
                "STOP" => "stop".to_string(),
                "MAX_TOKENS" => "length".to_string(),
                "SAFETY" | "RECITATION" => "content_filter".to_string(),
                other => other.to_lowercase(),
            });

        let texts: Vec<&str> = candidate
            .pointer("/content/parts")
            .and_then(|p| p.as_array())
            .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
            .unwrap_or_default();

        if texts.is_empty() {
            return Err(Error::Provider {
                message: format!(
                    "candidate contained no text (finish reason: {})",
                    finish_reason.as_deref().unwrap_or("unknown")
                ),
                raw: Some(body.clone()),
            });
        }

        let usage = body.get("usageMetadata").map(|u| UsageInfo {
            prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
            completion_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0),
            total_tokens: u["totalTokenCount"].as_u64().unwrap_or(0),
        });

        Ok(DriverResponse {
            content: texts.concat(),
            finish_reason,
            usage,
            raw: body.clone(),
        })
    }
}

#[async_trait]
impl ModelDriver for GeminiDriver {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_text(
        &self,
        api_key: &ApiKey,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<DriverResponse> {
        let started = Instant::now();
        let body = Self::build_request(prompt, params);
        let raw = self
            .transport
            .post_json(&self.path(), &[("x-goog-api-key", api_key.expose())], &body)
            .await?;
        let response = Self::parse_response(&raw)?;
        info!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            total_tokens = response.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0),
            "gemini generateContent completed"
        );
        Ok(response)
    }
}
