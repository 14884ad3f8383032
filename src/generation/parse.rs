//! Tolerant JSON extraction from free-text model output.
//!
//! Two stages, first success wins:
//!
//! 1. parse the whole text as JSON;
//! 2. take the span from the first `{` to the last `}` (greedy) and parse that.
//!
//! If both fail the result is [`InvalidResponseFormat`] carrying the original
//! text. Nothing here panics or logs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static JSON_OBJECT_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("Failed to compile JSON span regex"));

/// Which stage produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Direct,
    BraceFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub value: Value,
    pub stage: ParseStage,
}

/// Neither stage produced JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid response format")]
pub struct InvalidResponseFormat {
    pub raw_text: String,
}

pub fn extract_json(text: &str) -> Result<Extracted, InvalidResponseFormat> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(Extracted {
            value,
            stage: ParseStage::Direct,
        });
    }

    JSON_OBJECT_SPAN
        .find(text)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .map(|value| Extracted {
            value,
            stage: ParseStage::BraceFallback,
        })
        .ok_or_else(|| InvalidResponseFormat {
            raw_text: text.to_string(),
        })
}
