use thiserror::Error;

/// Where a failure happened and what it was about, for log lines and `Display`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Setting or field involved, e.g. `config.api_base` or `courses.id`.
    pub field_path: Option<String>,
    /// Free-form detail such as the offending value.
    pub details: Option<String>,
    /// Component that raised it, e.g. `credentials` or `persistence`.
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Internal error type for Learnware Grove.
///
/// Every failure is constructed with a typed variant at the point where it
/// originates (credential lookup, model call, parse step, record store), so the
/// normalizer in [`crate::classification`] never has to guess what it caught.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// The request never produced an HTTP response (DNS, connect, timeout, TLS).
    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    /// The remote API answered with a non-success status.
    #[error("Remote error: HTTP {status}: {message}")]
    Remote {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// The model provider answered but the answer was unusable (no candidates, blocked, etc).
    #[error("Gemini provider error: {message}")]
    Provider {
        message: String,
        raw: Option<serde_json::Value>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Persistence error: {message}{}", format_context(.context))]
    Persistence {
        message: String,
        context: ErrorContext,
    },

    #[error("Unknown error: {message}{}", format_context(.context))]
    Unknown {
        message: String,
        context: ErrorContext,
    },
}

/// Renders ` (field: .., details: .., source: ..)`, or nothing for an empty context.
fn format_context(ctx: &ErrorContext) -> String {
    let parts: Vec<String> = [
        ("field", &ctx.field_path),
        ("details", &ctx.details),
        ("source", &ctx.source),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
    .collect();
    if parts.is_empty() {
        return String::new();
    }
    format!(" ({})", parts.join(", "))
}

impl Error {
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn persistence_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Persistence {
            message: msg.into(),
            context,
        }
    }

    pub fn unknown_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Unknown {
            message: msg.into(),
            context,
        }
    }

    /// The structured context, for variants that carry one.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. }
            | Error::Persistence { context, .. }
            | Error::Unknown { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_rendered_in_display() {
        let err = Error::validation_with_context(
            "api key must not be blank",
            ErrorContext::new()
                .with_field_path("credentials.api_key")
                .with_source("credentials"),
        );
        assert_eq!(
            err.to_string(),
            "Validation error: api key must not be blank (field: credentials.api_key, source: credentials)"
        );
    }

    #[test]
    fn test_empty_context_adds_nothing() {
        let err = Error::unknown_with_context("boom", ErrorContext::default());
        assert_eq!(err.to_string(), "Unknown error: boom");
        assert!(err.context().is_some());
    }
}
