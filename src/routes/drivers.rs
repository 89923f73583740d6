use axum::{
    routing::get,
    Router,
};
use crate::handlers::driver::{
    create_driver, delete_driver, get_driver, list_drivers, update_driver,
};
use crate::repository::Store;
use crate::state::AppState;

pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/driver",
            get(list_drivers::<S>).post(create_driver::<S>).put(update_driver::<S>),
        )
        .route("/driver/{id}", get(get_driver::<S>).delete(delete_driver::<S>))
}
