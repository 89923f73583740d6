// src/handlers/truck.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use tracing::{info, instrument};

use crate::assignment::assign_driver;
use crate::dtos::envelope::{respond, respond_empty, JsonBody};
use crate::dtos::truck::AssignDriverQuery;
use crate::error::AppError;
use crate::handlers::parse_id;
use crate::models::truck::DRIVER;
use crate::models::Truck;
use crate::repository::{Entity, Store};
use crate::state::AppState;

// GET /api/truck - List all trucks with their drivers
#[instrument(skip(state))]
pub async fn list_trucks<S: Store>(State(state): State<AppState<S>>) -> Result<Response, AppError> {
    let trucks = state.repository::<Truck>(&[DRIVER]).find_all(&[DRIVER]).await?;

    if trucks.is_empty() {
        return Ok(respond_empty(StatusCode::NO_CONTENT));
    }
    Ok(respond(StatusCode::OK, trucks))
}

// GET /api/truck/{id} - Get single truck with its driver
#[instrument(skip(state))]
pub async fn get_truck<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id, "invalid id provided")?;
    let truck = state.repository::<Truck>(&[DRIVER]).find_by_id(id, &[DRIVER]).await?;

    if !truck.model.is_persisted() {
        return Ok(respond_empty(StatusCode::NO_CONTENT));
    }
    Ok(respond(StatusCode::OK, truck))
}

// POST /api/truck - Create new truck, never with a driver
#[instrument(skip(state, truck))]
pub async fn create_truck<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(mut truck): JsonBody<Truck>,
) -> Result<Response, AppError> {
    AppError::check_required(&truck.missing_required())?;

    if truck.driver_id.is_some() {
        return Err(AppError::bad_request("can't add driver directly to truck"));
    }
    truck.driver = None;

    state.repository::<Truck>(&[]).create(&mut truck).await?;
    info!(id = truck.model.id, "truck created");

    Ok(respond(StatusCode::CREATED, truck))
}

// PUT /api/truck - Update truck, the driver is only set via update-driver
#[instrument(skip(state, truck))]
pub async fn update_truck<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(mut truck): JsonBody<Truck>,
) -> Result<Response, AppError> {
    if !truck.model.is_persisted() {
        return Err(AppError::bad_request("id is required"));
    }

    if truck.driver_id.is_some() {
        return Err(AppError::bad_request("can't directly update driver id"));
    }

    state.repository::<Truck>(&[]).update(&mut truck).await?;

    let truck = state
        .repository::<Truck>(&[DRIVER])
        .find_by_id(truck.model.id, &[DRIVER])
        .await?;

    Ok(respond(StatusCode::OK, truck))
}

// DELETE /api/truck/{id} - Delete truck
#[instrument(skip(state))]
pub async fn delete_truck<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id, "invalid id provided")?;
    state.repository::<Truck>(&[]).delete(id).await?;
    info!(id, "truck deleted");

    Ok(respond_empty(StatusCode::OK))
}

// POST /api/truck/update-driver/{id}?driverId={n} - Assign an active driver
#[instrument(skip(state))]
pub async fn update_truck_driver<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Query(params): Query<AssignDriverQuery>,
) -> Result<Response, AppError> {
    let truck_id = parse_id(&id, "invalid truck id provided")?;
    let driver_id = parse_id(&params.driver_id, "invalid driver id provided")?;

    let truck = assign_driver(&state.store, truck_id, driver_id).await?;

    Ok(respond(StatusCode::OK, truck))
}
