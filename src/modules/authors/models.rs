use std::borrow::Cow;

use chrono::{NaiveDate, Utc};
use courselib_store::{Author, AuthorFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::modules::courses::models::CourseForCreate;
use crate::utils;

/// Object name used to key author validation errors.
pub const AUTHOR_FOR_CREATE: &str = "AuthorForCreate";

/// Author as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: Uuid,
    /// `"{first} {last}"`
    pub name: String,
    pub age: i32,
    pub main_category: String,
}

impl AuthorDto {
    pub fn from_entity(author: &Author, today: NaiveDate) -> Self {
        Self {
            id: author.id,
            name: format!("{} {}", author.first_name, author.last_name),
            age: utils::age_on(author.date_of_birth, today),
            main_category: author.main_category.clone(),
        }
    }
}

impl From<&Author> for AuthorDto {
    fn from(author: &Author) -> Self {
        Self::from_entity(author, Utc::now().date_naive())
    }
}

fn not_in_future(date_of_birth: &NaiveDate) -> Result<(), ValidationError> {
    if *date_of_birth > Utc::now().date_naive() {
        return Err(ValidationError::new("date_of_birth_in_future")
            .with_message(Cow::Borrowed("The date of birth can't be in the future.")));
    }
    Ok(())
}

/// Payload for creating an author, optionally with courses.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthorForCreate {
    #[validate(length(
        min = 1,
        max = 50,
        message = "The first name should have between 1 and 50 characters."
    ))]
    pub first_name: String,

    #[validate(length(
        min = 1,
        max = 50,
        message = "The last name should have between 1 and 50 characters."
    ))]
    pub last_name: String,

    #[serde(alias = "dateOfBirthday")]
    #[validate(custom(function = "not_in_future"))]
    pub date_of_birth: NaiveDate,

    #[validate(length(
        min = 1,
        max = 50,
        message = "The main category should have between 1 and 50 characters."
    ))]
    pub main_category: String,

    #[serde(default)]
    #[validate(nested)]
    pub courses: Vec<CourseForCreate>,
}

impl From<AuthorForCreate> for Author {
    fn from(payload: AuthorForCreate) -> Self {
        payload.courses.into_iter().fold(
            Author::new(
                payload.first_name,
                payload.last_name,
                payload.date_of_birth,
                payload.main_category,
            ),
            |author, course| author.with_course(course.into_entity()),
        )
    }
}

/// Query string of `GET /api/authors`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorsQuery {
    #[serde(default, alias = "maincategory")]
    pub main_category: Option<String>,
    #[serde(default, alias = "searchquery")]
    pub search_query: Option<String>,
    #[serde(default, alias = "matchcase")]
    pub match_case: bool,
}

impl From<AuthorsQuery> for AuthorFilter {
    fn from(query: AuthorsQuery) -> Self {
        Self {
            main_category: query.main_category,
            search_query: query.search_query,
            match_case: query.match_case,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courselib_http::validation::field_errors;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dto_joins_name_and_computes_age() {
        let mut author = Author::new("Atherton", "Uldae", date(1999, 4, 3), "Rum");
        author.id = Uuid::new_v4();

        let dto = AuthorDto::from_entity(&author, date(2024, 4, 2));

        assert_eq!(dto.id, author.id);
        assert_eq!(dto.name, "Atherton Uldae");
        assert_eq!(dto.age, 24);
        assert_eq!(dto.main_category, "Rum");
    }

    #[test]
    fn create_payload_accepts_legacy_birthday_key() {
        let payload: AuthorForCreate = serde_json::from_str(
            r#"{
                "firstName": "Eva",
                "lastName": "Yneq",
                "dateOfBirthday": "1999-05-03",
                "mainCategory": "Rum",
                "courses": [{ "Title": "Cafe", "Description": "The best cafe ever" }]
            }"#,
        )
        .unwrap();

        assert_eq!(payload.date_of_birth, date(1999, 5, 3));
        assert!(payload.validate().is_ok());

        let author = Author::from(payload);
        assert_eq!(author.courses.len(), 1);
        assert_eq!(author.id, Uuid::nil());
    }

    #[test]
    fn nested_course_errors_are_indexed() {
        let payload: AuthorForCreate = serde_json::from_str(
            r#"{
                "firstName": "",
                "lastName": "Rye",
                "dateOfBirth": "1978-11-23",
                "mainCategory": "Singing",
                "courses": [
                    { "title": "Shanties", "description": "Songs" },
                    { "title": "Same", "description": "Same" }
                ]
            }"#,
        )
        .unwrap();

        let errors = field_errors(&payload.validate().unwrap_err(), AUTHOR_FOR_CREATE);

        assert_eq!(errors["firstName"].len(), 1);
        assert_eq!(
            errors["courses[1]"],
            vec!["The provided description should be different from the title."]
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn future_birth_date_is_rejected() {
        assert!(not_in_future(&date(1999, 4, 3)).is_ok());
        assert!(not_in_future(&date(9999, 1, 1)).is_err());
    }

    #[test]
    fn query_keys_bind_in_either_case() {
        let query: AuthorsQuery =
            serde_json::from_str(r#"{"maincategory":"Rum","searchQuery":"ev"}"#).unwrap();
        let filter = AuthorFilter::from(query);

        assert_eq!(filter.main_category(), Some("Rum"));
        assert_eq!(filter.search_query(), Some("ev"));
        assert!(!filter.match_case);
    }
}
