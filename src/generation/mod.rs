//! # Content Generation
//!
//! Turns a [`GenerationRequest`] into a typed [`GenerationResult`] with one
//! model call, caching successes.
//!
//! | Kind | Model output | Result |
//! |------|--------------|--------|
//! | `course_content` | JSON object | [`CourseContent`] |
//! | `course_description` | plain text | `String` |
//! | `study_material` | JSON object | [`StudyMaterial`] |
//! | `quiz` | JSON object | [`Quiz`] |
//! | `research_assistance` | JSON object | [`ResearchAssistance`] |
//!
//! Failures come back as an [`ErrorResult`] value, never as a panic. Text
//! that holds no JSON object yields `INVALID_RESPONSE_FORMAT` with the raw
//! model text attached. A parsed object is always a success; `null` or
//! mistyped fields fall back to empty values.

mod generator;
mod lenient;
pub mod parse;
pub mod prompts;
mod request;
mod result;

pub use generator::{ContentGenerator, ContentGeneratorBuilder};
pub use parse::{extract_json, Extracted, InvalidResponseFormat, ParseStage};
pub use prompts::build_prompt;
pub use request::{ContentKind, GenerationRequest};
pub use result::{
    CourseContent, ErrorResult, GenerationOutcome, GenerationResult, KeyTopic, PracticeQuestion,
    Quiz, QuizQuestion, ResearchAssistance, StudyLink, StudyMaterial, SuggestedResource,
    TopicQuiz, TopicQuizQuestion,
};
