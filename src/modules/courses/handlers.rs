use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use courselib_http::{
    extract::{JsonBody, PathParams},
    validation::{validate_into, validate_payload},
    AppError, FieldErrors,
};
use courselib_store::{Course, LibraryStore, LibrarySession};
use serde::Deserialize;
use uuid::Uuid;

use super::models::{
    CourseDto, CourseForCreate, CourseForUpsert, COURSE_FOR_CREATE, COURSE_FOR_UPSERT,
};
use super::patch::{apply_patch, PatchOperation};
use crate::utils;

#[derive(Debug, Deserialize)]
pub struct AuthorPath {
    pub author_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CoursePath {
    pub author_id: Uuid,
    pub course_id: Uuid,
}

fn course_location(course: &Course) -> String {
    format!("/api/authors/{}/courses/{}", course.author_id, course.id)
}

async fn ensure_author(session: &LibrarySession, author_id: Uuid) -> Result<(), AppError> {
    if session.author_exists(author_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found(format!("author {author_id} was not found")))
    }
}

async fn find_course(
    session: &LibrarySession,
    author_id: Uuid,
    course_id: Uuid,
) -> Result<Course, AppError> {
    session
        .get_course(author_id, course_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("course {course_id} was not found")))
}

/// Store `fields` at `course_id`: replace the existing course, or create one
/// carrying that id. Returns 204 or 201 accordingly.
async fn replace_or_insert(
    mut session: LibrarySession,
    author_id: Uuid,
    course_id: Uuid,
    existing: Option<Course>,
    fields: CourseForUpsert,
) -> Result<Response, AppError> {
    match existing {
        Some(mut course) => {
            fields.apply_to(&mut course);
            session.update_course(&course)?;
            session.save().await?;

            tracing::info!(%author_id, %course_id, "course replaced");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        None => {
            if session.course_exists(course_id).await? {
                return Err(AppError::conflict(format!(
                    "course {course_id} belongs to another author"
                )));
            }

            let course = session.add_course(author_id, fields.into_entity(course_id))?;
            session.save().await?;

            tracing::info!(%author_id, %course_id, "course created through upsert");
            Ok(utils::created(course_location(&course), CourseDto::from(&course)))
        }
    }
}

pub async fn list_courses(
    State(store): State<LibraryStore>,
    PathParams(path): PathParams<AuthorPath>,
) -> Result<Json<Vec<CourseDto>>, AppError> {
    let session = store.session();
    ensure_author(&session, path.author_id).await?;

    let courses = session.get_courses(path.author_id).await?;
    tracing::debug!(author_id = %path.author_id, count = courses.len(), "courses listed");
    Ok(Json(courses.iter().map(CourseDto::from).collect()))
}

pub async fn get_course(
    State(store): State<LibraryStore>,
    PathParams(path): PathParams<CoursePath>,
) -> Result<Json<CourseDto>, AppError> {
    let session = store.session();
    ensure_author(&session, path.author_id).await?;

    let course = find_course(&session, path.author_id, path.course_id).await?;
    Ok(Json(CourseDto::from(&course)))
}

pub async fn create_course(
    State(store): State<LibraryStore>,
    PathParams(path): PathParams<AuthorPath>,
    OriginalUri(uri): OriginalUri,
    JsonBody(payload): JsonBody<CourseForCreate>,
) -> Result<Response, AppError> {
    let mut session = store.session();
    ensure_author(&session, path.author_id).await?;
    validate_payload(&payload, COURSE_FOR_CREATE, uri.path())?;

    let course = session.add_course(path.author_id, payload.into_entity())?;
    session.save().await?;

    tracing::info!(author_id = %path.author_id, course_id = %course.id, "course created");
    Ok(utils::created(course_location(&course), CourseDto::from(&course)))
}

pub async fn upsert_course(
    State(store): State<LibraryStore>,
    PathParams(path): PathParams<CoursePath>,
    OriginalUri(uri): OriginalUri,
    JsonBody(payload): JsonBody<CourseForUpsert>,
) -> Result<Response, AppError> {
    let session = store.session();
    ensure_author(&session, path.author_id).await?;
    validate_payload(&payload, COURSE_FOR_UPSERT, uri.path())?;

    let existing = session.get_course(path.author_id, path.course_id).await?;
    replace_or_insert(session, path.author_id, path.course_id, existing, payload).await
}

/// Apply the patch to the stored course, or to an empty one when the id is
/// new. The result is validated before anything is staged.
pub async fn patch_course(
    State(store): State<LibraryStore>,
    PathParams(path): PathParams<CoursePath>,
    OriginalUri(uri): OriginalUri,
    JsonBody(operations): JsonBody<Vec<PatchOperation>>,
) -> Result<Response, AppError> {
    let session = store.session();
    ensure_author(&session, path.author_id).await?;

    let existing = session.get_course(path.author_id, path.course_id).await?;
    let mut fields = existing.as_ref().map(CourseForUpsert::from).unwrap_or_default();

    let mut errors = FieldErrors::new();
    apply_patch(&operations, &mut fields, &mut errors);
    validate_into(&fields, COURSE_FOR_UPSERT, &mut errors);
    if !errors.is_empty() {
        return Err(AppError::validation_problem(uri.path(), errors));
    }

    replace_or_insert(session, path.author_id, path.course_id, existing, fields).await
}

pub async fn delete_course(
    State(store): State<LibraryStore>,
    PathParams(path): PathParams<CoursePath>,
) -> Result<StatusCode, AppError> {
    let mut session = store.session();
    ensure_author(&session, path.author_id).await?;

    let course = find_course(&session, path.author_id, path.course_id).await?;
    session.delete_course(&course)?;
    session.save().await?;

    tracing::info!(author_id = %path.author_id, course_id = %path.course_id, "course deleted");
    Ok(StatusCode::NO_CONTENT)
}
