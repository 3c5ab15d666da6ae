use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::{header::ALLOW, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use courselib_http::{
    extract::{JsonBody, PathParams},
    validation::validate_payload,
    AppError,
};
use courselib_store::{Author, AuthorFilter, LibraryStore};
use serde::Deserialize;
use uuid::Uuid;

use super::models::{AuthorDto, AuthorForCreate, AuthorsQuery, AUTHOR_FOR_CREATE};
use crate::utils;

/// Methods served at `/api/authors`.
pub const AUTHORS_ALLOW: &str = "GET, OPTIONS, HEAD, POST";

#[derive(Debug, Deserialize)]
pub struct AuthorPath {
    pub author_id: Uuid,
}

/// Map entities to DTOs against a single `today`.
pub fn author_dtos(authors: &[Author]) -> Vec<AuthorDto> {
    let today = Utc::now().date_naive();
    authors
        .iter()
        .map(|author| AuthorDto::from_entity(author, today))
        .collect()
}

/// Also answers `HEAD`; axum drops the body.
pub async fn list_authors(
    State(store): State<LibraryStore>,
    query: Result<Query<AuthorsQuery>, QueryRejection>,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let filter = AuthorFilter::from(query);

    let authors = store.session().get_authors_filtered(&filter).await;
    tracing::debug!(
        main_category = ?filter.main_category(),
        search_query = ?filter.search_query(),
        count = authors.len(),
        "authors listed"
    );
    Ok(Json(author_dtos(&authors)))
}

pub async fn get_author(
    State(store): State<LibraryStore>,
    PathParams(path): PathParams<AuthorPath>,
) -> Result<Json<AuthorDto>, AppError> {
    let author = store
        .session()
        .get_author(path.author_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("author {} was not found", path.author_id)))?;
    Ok(Json(AuthorDto::from(&author)))
}

pub async fn create_author(
    State(store): State<LibraryStore>,
    OriginalUri(uri): OriginalUri,
    JsonBody(payload): JsonBody<AuthorForCreate>,
) -> Result<Response, AppError> {
    validate_payload(&payload, AUTHOR_FOR_CREATE, uri.path())?;

    let mut session = store.session();
    let author = session.add_author(Author::from(payload));
    session.save().await?;

    tracing::info!(author_id = %author.id, courses = author.courses.len(), "author created");
    Ok(utils::created(
        format!("/api/authors/{}", author.id),
        AuthorDto::from(&author),
    ))
}

/// Removes the author together with its courses.
pub async fn delete_author(
    State(store): State<LibraryStore>,
    PathParams(path): PathParams<AuthorPath>,
) -> Result<StatusCode, AppError> {
    let mut session = store.session();
    let author = session
        .get_author(path.author_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("author {} was not found", path.author_id)))?;

    session.delete_author(&author)?;
    session.save().await?;

    tracing::info!(author_id = %author.id, courses = author.courses.len(), "author deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn authors_options() -> impl IntoResponse {
    (StatusCode::OK, [(ALLOW, AUTHORS_ALLOW)])
}
