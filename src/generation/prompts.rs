//! Prompt templates, one per [`ContentKind`].
//!
//! Filling a template is pure: the same request always yields the same prompt.

use super::request::{ContentKind, GenerationRequest};

const RAW_JSON_ONLY: &str =
    "Return only the raw JSON object, without any markdown formatting, code blocks, or extra text.";

pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = match request.kind {
        ContentKind::CourseContent => course_content(request),
        ContentKind::CourseDescription => course_description(request),
        ContentKind::StudyMaterial => study_material(request),
        ContentKind::Quiz => quiz(request),
        ContentKind::ResearchAssistance => research_assistance(request),
    };
    if let Some(ref context) = request.extra_context {
        prompt.push_str("\nAdditional context from the learner:\n");
        prompt.push_str(context);
        prompt.push('\n');
    }
    if request.kind.expects_json() {
        prompt.push('\n');
        prompt.push_str(RAW_JSON_ONLY);
    }
    prompt
}

fn topic_clause(request: &GenerationRequest) -> String {
    match request.topic {
        Some(ref topic) => format!(" on the topic of \"{}\"", topic),
        None => String::new(),
    }
}

fn course_content(request: &GenerationRequest) -> String {
    format!(
        r#"Generate a detailed, well-structured JSON object for a course titled "{subject}"{topic}.

The JSON response must include the following fields:
- "overview": A comprehensive summary of what the course covers, its goals, and who it's for.
- "learning_objectives": An array of 5-7 key skills or knowledge points students will gain.
- "key_topics": An array of 4-6 modules, each with a "title" and a "description" of what that module teaches.
- "prerequisites": An array of 2-4 recommended skills or courses to take before starting this one.
- "study_materials" (optional): An array of objects with "title" and "url".
- "quizzes" (optional): An array of objects with "topic" and "questions", each question having "question_text", "options" (array of strings) and "answer".

Example structure:
{{
  "overview": "This course provides a complete introduction to...",
  "learning_objectives": ["Understand the core principles of...", "Develop practical skills in..."],
  "key_topics": [{{ "title": "Introduction to X", "description": "Learn the basics of..." }}],
  "prerequisites": ["Basic understanding of..."]
}}
"#,
        subject = request.subject_name,
        topic = topic_clause(request),
    )
}

fn course_description(request: &GenerationRequest) -> String {
    format!(
        "Write a description of 2-5 sentences for a course titled \"{subject}\"{topic}. \
Describe what the course covers and who it is for. \
Respond with plain text only: no JSON, no markdown, no headings.\n",
        subject = request.subject_name,
        topic = topic_clause(request),
    )
}

fn study_material(request: &GenerationRequest) -> String {
    format!(
        r#"Create study material for the course "{subject}"{topic}.

Respond with a single JSON object with these fields:
- "title": A short title for the material.
- "content": The full explanatory text.
- "summary": A 2-3 sentence summary.
- "keyPoints": An array of the most important points.
- "examples": An array of worked examples.
- "practiceQuestions": An array of objects with "question" and "answer".
"#,
        subject = request.subject_name,
        topic = topic_clause(request),
    )
}

fn quiz(request: &GenerationRequest) -> String {
    format!(
        r#"Create a multiple-choice quiz for the course "{subject}"{topic}.

Respond with a single JSON object with these fields:
- "topic": The topic the quiz covers.
- "questions": An array of 5-10 objects, each with "question", "options" (array of 4 strings), "correctAnswer" (one of the options) and "explanation".
"#,
        subject = request.subject_name,
        topic = topic_clause(request),
    )
}

fn research_assistance(request: &GenerationRequest) -> String {
    let query = match request.topic {
        Some(ref topic) => format!("{} ({})", topic, request.subject_name),
        None => request.subject_name.clone(),
    };
    format!(
        r#"Please provide a detailed research overview on the following topic: {query}.
Include key points, potential research directions, and relevant academic areas to explore.

Respond with a single JSON object with these fields:
- "query": The topic as researched.
- "overview": A thorough overview of the topic.
- "keyFindings": An array of key findings.
- "relevantConcepts": An array of related concepts.
- "suggestedResources": An array of objects with "title", "url" and "description".
- "furtherExploration": An array of directions for further research.
"#,
        query = query,
    )
}
