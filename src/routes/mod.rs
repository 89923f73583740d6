pub mod drivers;
pub mod trucks;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::repository::Store;
use crate::state::AppState;

pub fn create_router<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .merge(drivers::routes::<S>())
        .merge(trucks::routes::<S>())
}

/// The full application: API under `/api`, health check, request logging and CORS.
pub fn app<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/api", create_router::<S>())
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}
