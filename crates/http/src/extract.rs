//! Request extractors that reject with [`AppError`].

use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::binding::{parse_id_list, unwrap_parenthesized};
use crate::error::AppError;

/// JSON request body. Bodies that cannot be read or bound are a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
        }
    }
}

/// Typed path parameters. Captures that fail to deserialize are a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParams<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))
    }
}

/// Identifier list from a single path segment shaped `({id},{id},...)`.
///
/// Elements are parsed with `T::from_str`. A segment without the surrounding
/// parentheses or with any malformed element is a 400. `()` yields an empty
/// list; the handler decides what that means.
#[derive(Debug, Clone)]
pub struct IdList<T>(pub Vec<T>);

impl<S, T> FromRequestParts<S> for IdList<T>
where
    T: FromStr + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(segment) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        let inner = unwrap_parenthesized(&segment).ok_or_else(|| {
            AppError::bad_request("identifier list must be wrapped in parentheses")
        })?;

        let ids = parse_id_list(inner, T::from_str)
            .map_err(|err| AppError::bad_request(err.to_string()))?;

        Ok(Self(ids))
    }
}
