//! Kind-specific generation results and the error result returned in their place.
//!
//! Fields are decoded leniently: a missing, `null` or mistyped field takes its
//! empty value. Any JSON object the model returns is a success, and whether
//! the fields are filled in is the caller's business.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use super::parse::{extract_json, InvalidResponseFormat};
use super::request::ContentKind;
use crate::classification::AppError;
use crate::error_code::ErrorCode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseContent {
    #[serde(deserialize_with = "lenient::string")]
    pub overview: String,
    #[serde(deserialize_with = "lenient::list")]
    pub learning_objectives: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub key_topics: Vec<KeyTopic>,
    #[serde(deserialize_with = "lenient::list")]
    pub prerequisites: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::optional_list")]
    pub study_materials: Option<Vec<StudyLink>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::optional_list")]
    pub quizzes: Option<Vec<TopicQuiz>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyTopic {
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyLink {
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicQuiz {
    #[serde(deserialize_with = "lenient::string")]
    pub topic: String,
    #[serde(deserialize_with = "lenient::list")]
    pub questions: Vec<TopicQuizQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicQuizQuestion {
    #[serde(deserialize_with = "lenient::string")]
    pub question_text: String,
    #[serde(deserialize_with = "lenient::list")]
    pub options: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudyMaterial {
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::list")]
    pub key_points: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub examples: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub practice_questions: Vec<PracticeQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeQuestion {
    #[serde(deserialize_with = "lenient::string")]
    pub question: String,
    #[serde(deserialize_with = "lenient::string")]
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quiz {
    #[serde(deserialize_with = "lenient::string")]
    pub topic: String,
    #[serde(deserialize_with = "lenient::list")]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(deserialize_with = "lenient::string")]
    pub question: String,
    #[serde(deserialize_with = "lenient::list")]
    pub options: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub correct_answer: String,
    #[serde(deserialize_with = "lenient::string")]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResearchAssistance {
    #[serde(deserialize_with = "lenient::string")]
    pub query: String,
    #[serde(deserialize_with = "lenient::string")]
    pub overview: String,
    #[serde(deserialize_with = "lenient::list")]
    pub key_findings: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub relevant_concepts: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub suggested_resources: Vec<SuggestedResource>,
    #[serde(deserialize_with = "lenient::list")]
    pub further_exploration: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestedResource {
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
}

/// A successfully parsed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum GenerationResult {
    CourseContent(CourseContent),
    CourseDescription(String),
    StudyMaterial(StudyMaterial),
    Quiz(Quiz),
    ResearchAssistance(ResearchAssistance),
}

impl GenerationResult {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::CourseContent(_) => ContentKind::CourseContent,
            Self::CourseDescription(_) => ContentKind::CourseDescription,
            Self::StudyMaterial(_) => ContentKind::StudyMaterial,
            Self::Quiz(_) => ContentKind::Quiz,
            Self::ResearchAssistance(_) => ContentKind::ResearchAssistance,
        }
    }

    /// Turn raw model text into the result for `kind`.
    ///
    /// Descriptions are taken as trimmed plain text. Every other kind goes
    /// through [`extract_json`] and is then decoded leniently. Only a top-level
    /// value that is not an object is reported like text with no JSON at all.
    pub fn from_model_text(kind: ContentKind, text: &str) -> Result<Self, InvalidResponseFormat> {
        let invalid = || InvalidResponseFormat {
            raw_text: text.to_string(),
        };

        let object = || -> Result<Value, InvalidResponseFormat> {
            let value = extract_json(text)?.value;
            if value.is_object() {
                Ok(value)
            } else {
                Err(invalid())
            }
        };

        let decoded = match kind {
            ContentKind::CourseDescription => {
                let description = text.trim();
                if description.is_empty() {
                    return Err(invalid());
                }
                return Ok(Self::CourseDescription(description.to_string()));
            }
            ContentKind::CourseContent => serde_json::from_value(object()?).map(Self::CourseContent),
            ContentKind::StudyMaterial => serde_json::from_value(object()?).map(Self::StudyMaterial),
            ContentKind::Quiz => serde_json::from_value(object()?).map(Self::Quiz),
            ContentKind::ResearchAssistance => {
                serde_json::from_value(object()?).map(Self::ResearchAssistance)
            }
        };
        decoded.map_err(|_| invalid())
    }

    pub fn as_course_content(&self) -> Option<&CourseContent> {
        match self {
            Self::CourseContent(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_course_description(&self) -> Option<&str> {
        match self {
            Self::CourseDescription(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_study_material(&self) -> Option<&StudyMaterial> {
        match self {
            Self::StudyMaterial(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_quiz(&self) -> Option<&Quiz> {
        match self {
            Self::Quiz(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_research_assistance(&self) -> Option<&ResearchAssistance> {
        match self {
            Self::ResearchAssistance(r) => Some(r),
            _ => None,
        }
    }

    /// The payload as plain JSON, in the record field naming used by storage.
    pub fn to_json(&self) -> Value {
        let value = match self {
            Self::CourseContent(c) => serde_json::to_value(c),
            Self::CourseDescription(d) => Ok(Value::String(d.clone())),
            Self::StudyMaterial(m) => serde_json::to_value(m),
            Self::Quiz(q) => serde_json::to_value(q),
            Self::ResearchAssistance(r) => serde_json::to_value(r),
        };
        value.unwrap_or(Value::Null)
    }
}

/// Returned instead of a [`GenerationResult`] when a call fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("[{kind}] {message}")]
pub struct ErrorResult {
    pub kind: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResult {
    pub fn invalid_response(raw_text: impl Into<String>) -> Self {
        Self {
            kind: ErrorCode::InvalidResponseFormat,
            message: ErrorCode::InvalidResponseFormat.default_message().to_string(),
            raw_text: Some(raw_text.into()),
            details: None,
        }
    }
}

impl From<AppError> for ErrorResult {
    fn from(err: AppError) -> Self {
        Self {
            kind: err.code,
            message: err.message,
            raw_text: None,
            details: err.details,
        }
    }
}

impl From<InvalidResponseFormat> for ErrorResult {
    fn from(err: InvalidResponseFormat) -> Self {
        Self::invalid_response(err.raw_text)
    }
}

/// What [`ContentGenerator::generate`](super::ContentGenerator::generate) resolves to.
pub type GenerationOutcome = Result<GenerationResult, ErrorResult>;
