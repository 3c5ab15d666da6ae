use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted author record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Assigned by the store on insertion; `Uuid::nil()` until then.
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    /// Free-text classification tag
    pub main_category: String,
    /// Owned courses. Populated on reads; on insertion every course is
    /// assigned an id and attached to this author.
    pub courses: Vec<Course>,
}

impl Author {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        main_category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            main_category: main_category.into(),
            courses: Vec::new(),
        }
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }
}

/// Persisted course record, always owned by exactly one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Generated on insertion when nil, otherwise kept (caller-chosen upsert id).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Set by the store when the course is added, never by callers.
    pub author_id: Uuid,
}

impl Course {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::nil(),
            title: title.into(),
            description,
            author_id: Uuid::nil(),
        }
    }
}
