use axum::{
    routing::{get, post},
    Router,
};
use crate::handlers::truck::{
    create_truck, delete_truck, get_truck, list_trucks, update_truck, update_truck_driver,
};
use crate::repository::Store;
use crate::state::AppState;

pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/truck",
            get(list_trucks::<S>).post(create_truck::<S>).put(update_truck::<S>),
        )
        .route("/truck/{id}", get(get_truck::<S>).delete(delete_truck::<S>))
        .route("/truck/update-driver/{id}", post(update_truck_driver::<S>))
}
