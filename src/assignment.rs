// src/assignment.rs
//! The only path that sets a truck's driver.
//!
//! The lookups and the write are separate store calls. Two concurrent
//! assignments of the same driver can both pass the active check; the unique
//! constraint on `trucks.driver_id` rejects the second write.

use thiserror::Error;
use tracing::{info, instrument};

use crate::models::truck::{DRIVER, DRIVER_ID};
use crate::models::{Driver, Truck};
use crate::repository::{Repository, RepositoryError, Store};

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("truck not found")]
    TruckNotFound,

    /// The driver does not exist or is not active.
    #[error("invalid driver provided")]
    InvalidDriver,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Assigns driver `driver_id` to truck `truck_id` and returns the truck with
/// its driver loaded. On failure the truck is left untouched.
#[instrument(skip(store))]
pub async fn assign_driver<S: Store>(
    store: &S,
    truck_id: i32,
    driver_id: i32,
) -> Result<Truck, AssignmentError> {
    let trucks = Repository::<Truck, S>::new(store.clone(), &[]);
    let drivers = Repository::<Driver, S>::new(store.clone(), &[]);

    let mut truck = trucks.find_by_id(truck_id, &[]).await?;
    if !truck.model.is_persisted() {
        return Err(AssignmentError::TruckNotFound);
    }

    let driver = drivers.find_by_id(driver_id, &[]).await?;
    if !driver.model.is_persisted() || !driver.is_active {
        return Err(AssignmentError::InvalidDriver);
    }

    trucks.update_column(&mut truck, DRIVER_ID, driver.model.id).await?;
    info!(truck_id, driver_id, "driver assigned to truck");

    let joined = Repository::<Truck, S>::new(store.clone(), &[DRIVER]);
    Ok(joined.find_by_id(truck_id, &[DRIVER]).await?)
}
