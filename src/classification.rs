//! Error normalization: maps any failure into one [`AppError`] with a closed
//! [`ErrorCode`].
//!
//! Failures are described by a [`FailureShape`], built from the typed
//! [`Error`] at the point it originates. Classification runs the rules below
//! in order and the first match wins:
//!
//! 1. carries an HTTP response → [`ErrorCode::ApiError`]
//! 2. carries a request that got no response → [`ErrorCode::NetworkError`]
//! 3. message names the provider (`Gemini`) → [`ErrorCode::ModelProviderError`]
//! 4. named `ValidationError` → [`ErrorCode::ValidationError`]
//! 5. message mentions `authentication` or `API key` → [`ErrorCode::AuthError`]
//! 6. anything else → [`ErrorCode::UnknownError`]

use crate::error::Error;
use crate::error_code::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider name looked for by rule 3.
pub const PROVIDER_NAME: &str = "Gemini";

const VALIDATION_ERROR_NAME: &str = "ValidationError";

/// HTTP response attached to a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseShape {
    pub status: u16,
    pub message: Option<String>,
    pub body: Option<Value>,
}

/// Outbound request that never received a response.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestShape {
    pub description: String,
}

/// Everything the normalizer is allowed to look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureShape {
    pub name: Option<String>,
    pub message: Option<String>,
    pub response: Option<ResponseShape>,
    pub request: Option<RequestShape>,
    pub details: Option<Value>,
}

impl FailureShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_response(mut self, status: u16, message: Option<String>, body: Option<Value>) -> Self {
        self.response = Some(ResponseShape {
            status,
            message,
            body,
        });
        self
    }

    pub fn with_request(mut self, description: impl Into<String>) -> Self {
        self.request = Some(RequestShape {
            description: description.into(),
        });
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    fn message_contains(&self, needle: &str) -> bool {
        self.message.as_deref().is_some_and(|m| m.contains(needle))
    }
}

impl From<&Error> for FailureShape {
    fn from(err: &Error) -> Self {
        match err {
            Error::Remote {
                status,
                message,
                body,
            } => FailureShape::new()
                .with_message(err.to_string())
                .with_response(*status, Some(message.clone()), body.clone()),
            Error::Transport(inner) => FailureShape::new()
                .with_message(err.to_string())
                .with_request(inner.to_string()),
            Error::Provider { raw, .. } => {
                let shape = FailureShape::new().with_message(err.to_string());
                match raw {
                    Some(raw) => shape.with_details(raw.clone()),
                    None => shape,
                }
            }
            Error::Validation { message, context } => {
                let shape = FailureShape::new()
                    .with_name(VALIDATION_ERROR_NAME)
                    .with_message(message.clone());
                match context.field_path {
                    Some(ref field) => shape.with_details(serde_json::json!({ "field": field })),
                    None => shape,
                }
            }
            Error::Configuration { .. }
            | Error::Serialization(_)
            | Error::Persistence { .. }
            | Error::Unknown { .. } => FailureShape::new().with_message(err.to_string()),
        }
    }
}

/// Normalized, caller-facing error. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_auth_error(&self) -> bool {
        self.code == ErrorCode::AuthError
    }

    pub fn is_network_error(&self) -> bool {
        self.code == ErrorCode::NetworkError
    }

    pub fn is_validation_error(&self) -> bool {
        self.code == ErrorCode::ValidationError
    }
}

impl From<&Error> for AppError {
    fn from(err: &Error) -> Self {
        normalize(&FailureShape::from(err))
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::from(&err)
    }
}

/// Classify a failure. See the module docs for the rule order.
pub fn normalize(failure: &FailureShape) -> AppError {
    if let Some(ref response) = failure.response {
        let message = response
            .message
            .clone()
            .or_else(|| body_message(response.body.as_ref()))
            .unwrap_or_else(|| ErrorCode::ApiError.default_message().to_string());
        return AppError {
            code: ErrorCode::ApiError,
            message,
            details: response.body.clone(),
        };
    }

    if let Some(ref request) = failure.request {
        return AppError::new(ErrorCode::NetworkError, ErrorCode::NetworkError.default_message())
            .with_details(Value::String(request.description.clone()));
    }

    if failure.message_contains(PROVIDER_NAME) {
        return AppError {
            code: ErrorCode::ModelProviderError,
            message: ErrorCode::ModelProviderError.default_message().to_string(),
            details: failure_details(failure),
        };
    }

    if failure.name.as_deref() == Some(VALIDATION_ERROR_NAME) {
        return AppError {
            code: ErrorCode::ValidationError,
            message: failure
                .message
                .clone()
                .unwrap_or_else(|| ErrorCode::ValidationError.default_message().to_string()),
            details: failure.details.clone(),
        };
    }

    if failure.message_contains("authentication") || failure.message_contains("API key") {
        return AppError {
            code: ErrorCode::AuthError,
            message: ErrorCode::AuthError.default_message().to_string(),
            details: failure_details(failure),
        };
    }

    AppError {
        code: ErrorCode::UnknownError,
        message: failure
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| ErrorCode::UnknownError.default_message().to_string()),
        details: failure.details.clone(),
    }
}

/// Write one structured line to the operational log.
pub fn log_error(error: &AppError) {
    match error.details {
        Some(ref details) => tracing::error!(
            code = %error.code,
            details = %details,
            "{}",
            error.message
        ),
        None => tracing::error!(code = %error.code, "{}", error.message),
    }
}

fn body_message(body: Option<&Value>) -> Option<String> {
    let body = body?;
    body.get("message")
        .or_else(|| body.pointer("/error/message"))
        .and_then(|m| m.as_str())
        .map(String::from)
}

fn failure_details(failure: &FailureShape) -> Option<Value> {
    failure
        .details
        .clone()
        .or_else(|| failure.message.clone().map(Value::String))
}
