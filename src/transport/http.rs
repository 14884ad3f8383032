use crate::error::{Error, ErrorContext};
use crate::transport::TransportError;
use crate::Result;
use reqwest::Proxy;
use serde_json::Value;
use std::env;
use std::time::Duration;
use url::Url;

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(
                env::var("LEARNWARE_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("LEARNWARE_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and return the decoded JSON answer.
    ///
    /// Non-2xx statuses become [`Error::Remote`] with the provider's
    /// `error.message` when the body has one. Send failures become
    /// [`Error::Transport`].
    pub async fn post_json(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<Value> {
        let url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid request URL: {}", e),
                ErrorContext::new()
                    .with_field_path("config.api_base")
                    .with_details(self.base_url.clone()),
            )
        })?;

        let mut request = self.client.post(url).json(body);
        for (k, v) in headers {
            request = request.header(*k, *v);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        if !status.is_success() {
            let parsed = serde_json::from_str::<Value>(&text).ok();
            let message = parsed
                .as_ref()
                .and_then(|v| v.pointer("/error/message"))
                .and_then(|m| m.as_str())
                .map(String::from)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(Error::Remote {
                status: status.as_u16(),
                message,
                body: parsed.or_else(|| (!text.is_empty()).then(|| Value::String(text))),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
