// src/dtos/envelope.rs
use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppError;

/// Success body: `{"data": <payload>}`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

pub fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(DataResponse { data })).into_response()
}

/// `{"data": ""}`, used for deletes and empty lookups.
pub fn respond_empty(status: StatusCode) -> Response {
    respond(status, "")
}

/// JSON request body whose parse failures come back in the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
