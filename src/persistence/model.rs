//! Stored record shapes. Field names are `snake_case` throughout.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::generation::{CourseContent, Quiz, StudyMaterial};

/// Owner of a record: the authenticated user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Something a [`RecordStore`](super::RecordStore) can hold.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table or collection name, used in logs and errors.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
    fn owner(&self) -> &OwnerId;

    /// Set the store-managed fields on creation.
    fn assign(&mut self, id: Uuid, owner: OwnerId, now: DateTime<Utc>);

    /// Called after every successful update.
    fn touch(&mut self, _now: DateTime<Utc>) {}

    fn created_at(&self) -> DateTime<Utc>;
}

/// Fields a patch may never overwrite.
pub const MANAGED_FIELDS: [&str; 3] = ["id", "user_id", "created_at"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub user_id: OwnerId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub content: Option<CourseContent>,
    #[serde(default)]
    pub study_materials: Vec<StudyMaterial>,
    #[serde(default)]
    pub quizzes: Vec<Quiz>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// A draft; `id`, `user_id` and `created_at` are replaced by the store.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            user_id: OwnerId::new(""),
            name: name.into(),
            code: None,
            description: None,
            topic: None,
            difficulty: None,
            content: None,
            study_materials: Vec::new(),
            quizzes: Vec::new(),
            progress: None,
            start_date: None,
            end_date: None,
            created_at: DateTime::<Utc>::default(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl Record for Course {
    const COLLECTION: &'static str = "courses";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> &OwnerId {
        &self.user_id
    }

    fn assign(&mut self, id: Uuid, owner: OwnerId, now: DateTime<Utc>) {
        self.id = id;
        self.user_id = owner;
        self.created_at = now;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: OwnerId,
    #[serde(default)]
    pub course_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            user_id: OwnerId::new(""),
            course_id: None,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    pub fn with_course(mut self, course_id: Uuid) -> Self {
        self.course_id = Some(course_id);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

impl Record for Note {
    const COLLECTION: &'static str = "notes";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> &OwnerId {
        &self.user_id
    }

    fn assign(&mut self, id: Uuid, owner: OwnerId, now: DateTime<Utc>) {
        self.id = id;
        self.user_id = owner;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
