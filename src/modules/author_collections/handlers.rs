use std::collections::HashSet;

use axum::{
    extract::{OriginalUri, State},
    response::Response,
    Json,
};
use courselib_http::{
    extract::{IdList, JsonBody},
    validation::validate_list,
    AppError,
};
use courselib_store::{Author, LibraryStore};
use uuid::Uuid;

use crate::modules::authors::handlers::author_dtos;
use crate::modules::authors::models::{AuthorDto, AuthorForCreate, AUTHOR_FOR_CREATE};
use crate::utils;

/// `/api/authorcollections/(id,id,...)` for the given ids.
pub fn collection_location(ids: &[Uuid]) -> String {
    let joined = ids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("/api/authorcollections/({joined})")
}

/// Every requested author, or 404 if any id is unknown.
pub async fn get_author_collection(
    State(store): State<LibraryStore>,
    IdList(ids): IdList<Uuid>,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    if ids.is_empty() {
        return Err(AppError::bad_request("at least one author id is required"));
    }

    let wanted: HashSet<Uuid> = ids.iter().copied().collect();
    let authors = store.session().get_authors_by_ids(&wanted).await;

    if authors.len() != ids.len() {
        tracing::debug!(requested = ids.len(), found = authors.len(), "author collection incomplete");
        return Err(AppError::not_found(format!(
            "{} of {} requested authors were found",
            authors.len(),
            ids.len()
        )));
    }

    Ok(Json(author_dtos(&authors)))
}

/// Create all authors in one commit. Any invalid entry rejects the batch.
pub async fn create_author_collection(
    State(store): State<LibraryStore>,
    OriginalUri(uri): OriginalUri,
    JsonBody(payloads): JsonBody<Vec<AuthorForCreate>>,
) -> Result<Response, AppError> {
    if payloads.is_empty() {
        return Err(AppError::bad_request("the author collection is empty"));
    }

    let errors = validate_list(&payloads, AUTHOR_FOR_CREATE);
    if !errors.is_empty() {
        return Err(AppError::validation_problem(uri.path(), errors));
    }

    let mut session = store.session();
    let authors: Vec<Author> = payloads
        .into_iter()
        .map(|payload| session.add_author(Author::from(payload)))
        .collect();
    session.save().await?;

    let ids: Vec<Uuid> = authors.iter().map(|author| author.id).collect();
    tracing::info!(count = ids.len(), "author collection created");
    Ok(utils::created(collection_location(&ids), author_dtos(&authors)))
}
