use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    CourseContent,
    CourseDescription,
    StudyMaterial,
    Quiz,
    ResearchAssistance,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        Self::CourseContent,
        Self::CourseDescription,
        Self::StudyMaterial,
        Self::Quiz,
        Self::ResearchAssistance,
    ];

    /// Operation name used in cache keys.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::CourseContent => "courseContent",
            Self::CourseDescription => "courseDescription",
            Self::StudyMaterial => "studyMaterial",
            Self::Quiz => "quiz",
            Self::ResearchAssistance => "researchAssistance",
        }
    }

    /// Whether the model is asked for a JSON object (everything but descriptions).
    pub fn expects_json(&self) -> bool {
        !matches!(self, Self::CourseDescription)
    }

    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.replace('-', "_").to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| {
            k.operation().eq_ignore_ascii_case(name) || k.snake_name() == normalized
        })
    }

    fn snake_name(&self) -> &'static str {
        match self {
            Self::CourseContent => "course_content",
            Self::CourseDescription => "course_description",
            Self::StudyMaterial => "study_material",
            Self::Quiz => "quiz",
            Self::ResearchAssistance => "research_assistance",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.snake_name())
    }
}

/// One generation call. Built per call, never persisted.
///
/// `subject_name` is passed to the model as-is, blank or not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub kind: ContentKind,
    pub subject_name: String,
    pub topic: Option<String>,
    pub extra_context: Option<String>,
}

impl GenerationRequest {
    pub fn new(kind: ContentKind, subject_name: impl Into<String>) -> Self {
        Self {
            kind,
            subject_name: subject_name.into(),
            topic: None,
            extra_context: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_extra_context(mut self, context: impl Into<String>) -> Self {
        self.extra_context = Some(context.into());
        self
    }

    /// Positional argument list for cache keys: `[subject, topic, context]`
    /// with absent trailing arguments dropped and absent inner ones as `null`.
    pub fn cache_args(&self) -> Vec<Value> {
        let mut args = vec![
            Value::String(self.subject_name.clone()),
            self.topic.clone().map(Value::String).unwrap_or(Value::Null),
            self.extra_context.clone().map(Value::String).unwrap_or(Value::Null),
        ];
        while args.len() > 1 && args.last() == Some(&Value::Null) {
            args.pop();
        }
        args
    }
}
