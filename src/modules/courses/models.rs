use std::borrow::Cow;

use courselib_store::Course;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Object names used to key cross-field validation errors.
pub const COURSE_FOR_CREATE: &str = "CourseForCreate";
pub const COURSE_FOR_UPSERT: &str = "CourseForUpsert";

/// Course as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Uuid,
}

impl From<&Course> for CourseDto {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            author_id: course.author_id,
        }
    }
}

/// Payload for creating a course; the description is optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "create_title_differs_from_description"))]
pub struct CourseForCreate {
    #[validate(
        required(message = "You should fill out a title."),
        length(max = 150, message = "The title shouldn't have more than 150 characters.")
    )]
    #[serde(alias = "Title")]
    pub title: Option<String>,

    #[validate(length(
        max = 1500,
        message = "The description shouldn't have more than 1500 characters."
    ))]
    #[serde(alias = "Description")]
    pub description: Option<String>,
}

impl CourseForCreate {
    /// Entity with a nil id; the store assigns id and owner.
    pub fn into_entity(self) -> Course {
        Course::new(self.title.unwrap_or_default(), self.description)
    }
}

/// Full replacement of a course's fields (PUT body and PATCH target).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "upsert_title_differs_from_description"))]
pub struct CourseForUpsert {
    #[validate(
        required(message = "You should fill out a title."),
        length(max = 150, message = "The title shouldn't have more than 150 characters.")
    )]
    #[serde(alias = "Title")]
    pub title: Option<String>,

    #[validate(
        required(message = "You should fill out a description."),
        length(
            max = 1500,
            message = "The description shouldn't have more than 1500 characters."
        )
    )]
    #[serde(alias = "Description")]
    pub description: Option<String>,
}

impl CourseForUpsert {
    /// Entity carrying the caller-chosen id for create-through-upsert.
    pub fn into_entity(self, course_id: Uuid) -> Course {
        let mut course = Course::new(self.title.unwrap_or_default(), self.description);
        course.id = course_id;
        course
    }

    /// Copy the fields onto a stored course. Id and owner stay untouched.
    pub fn apply_to(self, course: &mut Course) {
        course.title = self.title.unwrap_or_default();
        course.description = self.description;
    }
}

impl From<&Course> for CourseForUpsert {
    fn from(course: &Course) -> Self {
        Self {
            title: Some(course.title.clone()),
            description: course.description.clone(),
        }
    }
}

fn title_differs_from_description(
    title: Option<&str>,
    description: Option<&str>,
) -> Result<(), ValidationError> {
    match (title, description) {
        (Some(title), Some(description)) if title == description => Err(ValidationError::new(
            "title_equals_description",
        )
        .with_message(Cow::Borrowed(
            "The provided description should be different from the title.",
        ))),
        _ => Ok(()),
    }
}

fn create_title_differs_from_description(course: &CourseForCreate) -> Result<(), ValidationError> {
    title_differs_from_description(course.title.as_deref(), course.description.as_deref())
}

fn upsert_title_differs_from_description(course: &CourseForUpsert) -> Result<(), ValidationError> {
    title_differs_from_description(course.title.as_deref(), course.description.as_deref())
}
