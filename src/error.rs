// src/error.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::assignment::AssignmentError;
use crate::repository::RepositoryError;

#[derive(Debug)]
pub enum AppError {
    RepositoryError(RepositoryError),
    NotFound(String),
    BadRequest(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    /// Fails with the list of required fields left empty, if any.
    pub fn check_required(missing: &[&str]) -> Result<(), Self> {
        if missing.is_empty() {
            return Ok(());
        }
        Err(AppError::bad_request(format!(
            "missing required field(s): {}",
            missing.join(", ")
        )))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::RepositoryError(e) => {
                tracing::error!(error = %e, "Repository error");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::RepositoryError(err)
    }
}

impl From<AssignmentError> for AppError {
    fn from(err: AssignmentError) -> Self {
        match err {
            AssignmentError::TruckNotFound => AppError::not_found(err.to_string()),
            AssignmentError::InvalidDriver => AppError::bad_request(err.to_string()),
            AssignmentError::Repository(e) => AppError::RepositoryError(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}
