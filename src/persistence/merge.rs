use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::model::{Course, Note, OwnerId};
use super::store::{not_found, RecordStore};
use crate::generation::{GenerationResult, ResearchAssistance};
use crate::Result;

pub const RESEARCH_TAG: &str = "research";

/// What a merge changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Merged {
    Course(Course),
    Note(Note),
}

/// Writes generation output into a user's course records.
///
/// | Result | Effect |
/// |--------|--------|
/// | course content | replaces `content` |
/// | course description | replaces `description` |
/// | study material | appended to `study_materials` |
/// | quiz | appended to `quizzes` |
/// | research assistance | new note linked to the course, tagged `research` |
pub struct CourseMerger {
    courses: Arc<dyn RecordStore<Course>>,
    notes: Arc<dyn RecordStore<Note>>,
}

impl CourseMerger {
    pub fn new(courses: Arc<dyn RecordStore<Course>>, notes: Arc<dyn RecordStore<Note>>) -> Self {
        Self { courses, notes }
    }

    /// Appends read the course and then write the whole list back. Two
    /// concurrent merges into one course can lose an append; the later write
    /// wins.
    pub async fn apply(
        &self,
        owner: &OwnerId,
        course_id: Uuid,
        result: &GenerationResult,
    ) -> Result<Merged> {
        let course = self
            .courses
            .get_record(owner, course_id)
            .await?
            .ok_or_else(|| not_found::<Course>(course_id))?;

        let patch = match result {
            GenerationResult::CourseContent(content) => json!({ "content": content }),
            GenerationResult::CourseDescription(text) => json!({ "description": text }),
            GenerationResult::StudyMaterial(material) => {
                let mut materials = course.study_materials;
                materials.push(material.clone());
                json!({ "study_materials": materials })
            }
            GenerationResult::Quiz(quiz) => {
                let mut quizzes = course.quizzes;
                quizzes.push(quiz.clone());
                json!({ "quizzes": quizzes })
            }
            GenerationResult::ResearchAssistance(research) => {
                let note = research_note(research).with_course(course_id);
                let note = self.notes.create_record(owner, note).await?;
                info!(course = %course_id, note = %note.id, "research saved as note");
                return Ok(Merged::Note(note));
            }
        };

        let course = self.courses.update_record(owner, course_id, patch).await?;
        info!(course = %course_id, kind = %result.kind(), "generation merged into course");
        Ok(Merged::Course(course))
    }
}

/// Markdown body for a research note.
pub fn research_note(research: &ResearchAssistance) -> Note {
    let mut body = String::new();
    body.push_str(&research.overview);
    push_section(&mut body, "Key findings", &research.key_findings);
    push_section(&mut body, "Relevant concepts", &research.relevant_concepts);
    if !research.suggested_resources.is_empty() {
        body.push_str("\n\n## Suggested resources\n");
        for r in &research.suggested_resources {
            body.push_str(&format!("\n- [{}]({}): {}", r.title, r.url, r.description));
        }
    }
    push_section(&mut body, "Further exploration", &research.further_exploration);

    Note::new(research.query.clone(), body.trim().to_string()).with_tag(RESEARCH_TAG)
}

fn push_section(body: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    body.push_str(&format!("\n\n## {}\n", heading));
    for item in items {
        body.push_str("\n- ");
        body.push_str(item);
    }
}
