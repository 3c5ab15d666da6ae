//! Error handling for the HTTP layer

use std::collections::BTreeMap;

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use courselib_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Field key (or object name for cross-field rules) to messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const PROBLEM_JSON: &str = "application/problem+json";
const VALIDATION_PROBLEM_TYPE: &str = "https://tools.ietf.org/html/rfc4918#section-11.2";
const VALIDATION_PROBLEM_TITLE: &str = "One or more validation errors occurred.";
const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// Standard error response format for non-validation errors
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    pub trace_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// RFC 7807 problem document returned for validation failures
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    pub trace_id: String,
    pub errors: FieldErrors,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed for {instance}: {} field(s)", .errors.len())]
    ValidationProblem {
        instance: String,
        errors: FieldErrors,
    },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error("conflict: {message}")]
    Conflict { message: String, code: String },

    #[error("not acceptable: {message}")]
    NotAcceptable { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation problem for the request at `instance`
    pub fn validation_problem(instance: impl Into<String>, errors: FieldErrors) -> Self {
        Self::ValidationProblem {
            instance: instance.into(),
            errors,
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            code: "conflict".to_string(),
        }
    }

    /// Create a not acceptable error
    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::NotAcceptable {
            message: message.into(),
            code: "not_acceptable".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationProblem { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidArgument(_) => AppError::bad_request(err.to_string()),
            StoreError::Persistence(_) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        let (error_code, message) = match self {
            AppError::ValidationProblem { instance, errors } => {
                tracing::info!(
                    error_id = %error_id,
                    %instance,
                    fields = ?errors.keys().collect::<Vec<_>>(),
                    "Validation failed"
                );

                let problem = ProblemDetails {
                    kind: VALIDATION_PROBLEM_TYPE.to_string(),
                    title: VALIDATION_PROBLEM_TITLE.to_string(),
                    status: status.as_u16(),
                    detail: "See the errors property for details.".to_string(),
                    instance,
                    trace_id: error_id.to_string(),
                    errors,
                };
                return (status, [(CONTENT_TYPE, PROBLEM_JSON)], Json(problem)).into_response();
            }
            AppError::NotFound { message, code } => (code, message),
            AppError::BadRequest { message, code } => (code, message),
            AppError::Conflict { message, code } => (code, message),
            AppError::NotAcceptable { message, code } => (code, message),
            AppError::Internal(e) => ("internal_error".to_string(), format!("{e:#}")),
        };

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                error = %message,
                "Request error"
            );
        } else {
            tracing::info!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                "Request error"
            );
        }

        let mut response = envelope_response(status, error_code, message, error_id);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            response.extensions_mut().insert(InternalErrorTrace { error_id });
        }
        response
    }
}

/// Marks a 500 rendered from [`AppError::Internal`] so [`redact_internal_errors`]
/// can swap its message.
#[derive(Debug, Clone, Copy)]
pub struct InternalErrorTrace {
    pub error_id: Uuid,
}

fn envelope_response(status: StatusCode, code: String, message: String, error_id: Uuid) -> Response {
    let envelope = ErrorEnvelope {
        error: ErrorBody {
            code,
            message,
            details: Vec::new(),
            trace_id: error_id.to_string(),
            timestamp: OffsetDateTime::now_utc().to_string(),
        },
    };

    (status, Json(envelope)).into_response()
}

/// Middleware replacing internal error chains with a generic message.
/// The full chain is already in the log under the same trace id.
pub async fn redact_internal_errors(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    match response.extensions().get::<InternalErrorTrace>() {
        Some(trace) => envelope_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error".to_string(),
            INTERNAL_ERROR_MESSAGE.to_string(),
            trace.error_id,
        ),
        None => response,
    }
}
