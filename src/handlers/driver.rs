// src/handlers/driver.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::{info, instrument};

use crate::dtos::envelope::{respond, respond_empty, JsonBody};
use crate::error::AppError;
use crate::handlers::parse_id;
use crate::models::Driver;
use crate::repository::{Entity, Store};
use crate::state::AppState;

// GET /api/driver - List all drivers
#[instrument(skip(state))]
pub async fn list_drivers<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Response, AppError> {
    let drivers = state.repository::<Driver>(&[]).find_all(&[]).await?;

    if drivers.is_empty() {
        return Ok(respond_empty(StatusCode::NO_CONTENT));
    }
    Ok(respond(StatusCode::OK, drivers))
}

// GET /api/driver/{id} - Get single driver
#[instrument(skip(state))]
pub async fn get_driver<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id, "invalid id provided")?;
    let driver = state.repository::<Driver>(&[]).find_by_id(id, &[]).await?;

    if !driver.model.is_persisted() {
        return Ok(respond_empty(StatusCode::NO_CONTENT));
    }
    Ok(respond(StatusCode::OK, driver))
}

// POST /api/driver - Create new driver
#[instrument(skip(state, driver))]
pub async fn create_driver<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(mut driver): JsonBody<Driver>,
) -> Result<Response, AppError> {
    AppError::check_required(&driver.missing_required())?;

    state.repository::<Driver>(&[]).create(&mut driver).await?;
    info!(id = driver.model.id, "driver created");

    Ok(respond(StatusCode::CREATED, driver))
}

// PUT /api/driver - Update driver, only non-empty fields are written
#[instrument(skip(state, driver))]
pub async fn update_driver<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(mut driver): JsonBody<Driver>,
) -> Result<Response, AppError> {
    if !driver.model.is_persisted() {
        return Err(AppError::bad_request("id is required"));
    }

    state.repository::<Driver>(&[]).update(&mut driver).await?;

    Ok(respond(StatusCode::OK, driver))
}

// DELETE /api/driver/{id} - Delete driver
#[instrument(skip(state))]
pub async fn delete_driver<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id, "invalid id provided")?;
    state.repository::<Driver>(&[]).delete(id).await?;
    info!(id, "driver deleted");

    Ok(respond_empty(StatusCode::OK))
}
