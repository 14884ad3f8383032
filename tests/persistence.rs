//! Merging generation results into owner-scoped records

use learnware_grove::generation::{CourseContent, KeyTopic, Quiz, ResearchAssistance, StudyMaterial};
use learnware_grove::persistence::{Course, Merged, Note, RESEARCH_TAG};
use learnware_grove::{CourseMerger, Error, GenerationResult, MemoryRecordStore, OwnerId, RecordStore};
use std::sync::Arc;

struct Fixture {
    courses: Arc<MemoryRecordStore<Course>>,
    notes: Arc<MemoryRecordStore<Note>>,
    merger: CourseMerger,
    owner: OwnerId,
}

impl Fixture {
    fn new() -> Self {
        let courses = Arc::new(MemoryRecordStore::<Course>::new());
        let notes = Arc::new(MemoryRecordStore::<Note>::new());
        let merger = CourseMerger::new(courses.clone(), notes.clone());
        Self {
            courses,
            notes,
            merger,
            owner: OwnerId::new("user-1"),
        }
    }

    async fn course(&self) -> Course {
        self.courses
            .create_record(&self.owner, Course::new("Intro to Databases").with_topic("SQL Basics"))
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_content_and_description_replace_fields() {
    let fx = Fixture::new();
    let course = fx.course().await;

    let content = CourseContent {
        overview: "Relational databases from scratch.".into(),
        key_topics: vec![KeyTopic {
            title: "Joins".into(),
            description: "Combining tables.".into(),
        }],
        ..Default::default()
    };
    fx.merger
        .apply(&fx.owner, course.id, &GenerationResult::CourseContent(content.clone()))
        .await
        .unwrap();
    let merged = fx
        .merger
        .apply(&fx.owner, course.id, &GenerationResult::CourseDescription("Learn SQL.".into()))
        .await
        .unwrap();

    let Merged::Course(updated) = merged else {
        panic!("expected a course");
    };
    assert_eq!(updated.content, Some(content));
    assert_eq!(updated.description.as_deref(), Some("Learn SQL."));
    assert_eq!(updated.name, "Intro to Databases");
    assert_eq!(updated.created_at, course.created_at);
}

#[tokio::test]
async fn test_materials_and_quizzes_accumulate() {
    let fx = Fixture::new();
    let course = fx.course().await;

    for title in ["Joins", "Indexes"] {
        let material = StudyMaterial {
            title: title.into(),
            ..Default::default()
        };
        fx.merger
            .apply(&fx.owner, course.id, &GenerationResult::StudyMaterial(material))
            .await
            .unwrap();
    }
    fx.merger
        .apply(
            &fx.owner,
            course.id,
            &GenerationResult::Quiz(Quiz {
                topic: "Joins".into(),
                questions: vec![],
            }),
        )
        .await
        .unwrap();

    let stored = fx.courses.get_record(&fx.owner, course.id).await.unwrap().unwrap();
    let titles: Vec<&str> = stored.study_materials.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Joins", "Indexes"]);
    assert_eq!(stored.quizzes.len(), 1);
}

#[tokio::test]
async fn test_research_becomes_tagged_note() {
    let fx = Fixture::new();
    let course = fx.course().await;
    let research = ResearchAssistance {
        query: "Query planners".into(),
        overview: "How databases choose execution plans.".into(),
        key_findings: vec!["Cost-based optimizers dominate".into()],
        ..Default::default()
    };

    let merged = fx
        .merger
        .apply(&fx.owner, course.id, &GenerationResult::ResearchAssistance(research))
        .await
        .unwrap();
    let Merged::Note(note) = merged else {
        panic!("expected a note");
    };
    assert_eq!(note.course_id, Some(course.id));
    assert_eq!(note.tags, vec![RESEARCH_TAG]);
    assert_eq!(note.title, "Query planners");

    let notes = fx.notes.list_records(&fx.owner).await.unwrap();
    assert_eq!(notes, vec![note]);
    let unchanged = fx.courses.get_record(&fx.owner, course.id).await.unwrap().unwrap();
    assert_eq!(unchanged, course);
}

#[tokio::test]
async fn test_merge_into_someone_elses_course_fails() {
    let fx = Fixture::new();
    let course = fx.course().await;
    let intruder = OwnerId::new("user-2");

    let err = fx
        .merger
        .apply(&intruder, course.id, &GenerationResult::CourseDescription("mine now".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    let stored = fx.courses.get_record(&fx.owner, course.id).await.unwrap().unwrap();
    assert_eq!(stored.description, None);
    assert!(fx.notes.is_empty().await);
}
