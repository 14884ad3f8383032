//! Closed set of error kinds surfaced to callers.
//!
//! Every failure that crosses the [`ContentGenerator`](crate::generation::ContentGenerator)
//! boundary carries exactly one of these codes. The wire names (`"API_ERROR"`,
//! `"AUTH_ERROR"`, ...) are what callers and logs see.
//!
//! ## Example
//!
//! ```rust
//! use learnware_grove::error_code::ErrorCode;
//!
//! let code = ErrorCode::from_name("NETWORK_ERROR").unwrap();
//! assert_eq!(code, ErrorCode::NetworkError);
//! assert_eq!(code.as_str(), "NETWORK_ERROR");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The remote API answered with an error response.
    ApiError,
    /// The request never received a response.
    NetworkError,
    /// The generative-AI provider failed or refused.
    #[serde(rename = "GEMINI_API_ERROR")]
    ModelProviderError,
    /// Input rejected before or by the provider as invalid.
    ValidationError,
    /// Missing or rejected credential.
    AuthError,
    /// The model answered, but no JSON payload could be extracted.
    InvalidResponseFormat,
    /// Anything that matched no other rule.
    UnknownError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 7] = [
        Self::ApiError,
        Self::NetworkError,
        Self::ModelProviderError,
        Self::ValidationError,
        Self::AuthError,
        Self::InvalidResponseFormat,
        Self::UnknownError,
    ];

    /// Returns the wire name (e.g., `"AUTH_ERROR"`).
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiError => "API_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::ModelProviderError => "GEMINI_API_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::AuthError => "AUTH_ERROR",
            Self::InvalidResponseFormat => "INVALID_RESPONSE_FORMAT",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Generic human-readable message used when the failure carries none.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ApiError => "An API error occurred",
            Self::NetworkError => "A network error occurred. Please check your connection.",
            Self::ModelProviderError => "An error occurred with the Gemini API",
            Self::ValidationError => "The request was invalid",
            Self::AuthError => "Authentication failed. Please check your API key.",
            Self::InvalidResponseFormat => "Invalid response format",
            Self::UnknownError => "An unexpected error occurred",
        }
    }

    /// Parses a wire name back into a code.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
