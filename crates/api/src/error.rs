use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use userdir_core::error::CoreError;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `userdir_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Request body failed field validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationErrors),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::InvalidCredentials => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_CREDENTIALS",
                    core.to_string(),
                ),
                CoreError::InvalidToken => {
                    (StatusCode::FORBIDDEN, "FORBIDDEN", core.to_string())
                }
                CoreError::Canceled | CoreError::DeadlineExceeded => (
                    StatusCode::REQUEST_TIMEOUT,
                    "REQUEST_TIMEOUT",
                    core.to_string(),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Validation errors carry a per-field breakdown ---
            AppError::InvalidInput(errors) => {
                let body = json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_ERROR",
                    "details": field_messages(errors),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Flatten validator output into `field -> first message`.
///
/// Rules without an explicit message fall back to a description built from
/// the rule code and its `min`/`max` parameters.
fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (field, kind) in errors.errors() {
        let ValidationErrorsKind::Field(list) = kind else {
            continue;
        };
        let Some(first) = list.first() else {
            continue;
        };
        let message = match &first.message {
            Some(msg) => msg.to_string(),
            None => describe_rule(field, first),
        };
        out.insert(field.to_string(), message);
    }
    out
}

fn describe_rule(field: &str, error: &validator::ValidationError) -> String {
    let min = error.params.get("min");
    let max = error.params.get("max");
    match (error.code.as_ref(), min, max) {
        ("length", Some(min), Some(max)) => {
            format!("{field} must be between {min} and {max} characters")
        }
        ("length", Some(min), None) => format!("{field} must be at least {min} characters"),
        ("length", None, Some(max)) => format!("{field} must be at most {max} characters"),
        (code, _, _) => format!("{field} is invalid ({code})"),
    }
}
