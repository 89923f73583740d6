// src/dtos/truck.rs
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AssignDriverQuery {
    #[serde(rename = "driverId", default)]
    pub driver_id: String,
}
