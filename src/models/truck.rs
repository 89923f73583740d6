// src/models/truck.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::driver::{Driver, DRIVERS};
use super::model::Model;
use crate::repository::schema::{Column, Kind, Relation, Row, Table, CREATED_AT, ID, UPDATED_AT};
use crate::repository::{Entity, StoreError};

pub const DRIVER: &str = "Driver";
pub const DRIVER_ID: &str = "driver_id";

pub static TRUCKS: Table = Table {
    name: "trucks",
    columns: &[
        Column::new(ID, Kind::Int),
        Column::new(CREATED_AT, Kind::Timestamp),
        Column::new(UPDATED_AT, Kind::Timestamp),
        Column::unique("license_plate", Kind::Text),
        Column::new("fuel_used", Kind::Decimal),
        Column::new("distance_traveled", Kind::Decimal),
        Column::unique(DRIVER_ID, Kind::Int),
    ],
    relations: &[Relation {
        name: DRIVER,
        foreign_key: DRIVER_ID,
        #[cfg(test)]
        constraint: "fk_trucks_driver",
        table: &DRIVERS,
    }],
};

/// A truck and, when assigned, the driver it belongs to.
///
/// `driver_id` is only ever written through the driver assignment; `driver` is
/// populated when the association is joined or preloaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Truck {
    #[serde(flatten)]
    pub model: Model,
    pub license_plate: String,
    pub fuel_used: Decimal,
    pub distance_traveled: Decimal,
    pub driver_id: Option<i32>,
    pub driver: Option<Driver>,
}

impl Entity for Truck {
    fn table() -> &'static Table {
        &TRUCKS
    }

    fn model(&self) -> &Model {
        &self.model
    }

    fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    fn to_row(&self) -> Row {
        self.model
            .write(Row::new())
            .with("license_plate", self.license_plate.as_str())
            .with("fuel_used", self.fuel_used)
            .with("distance_traveled", self.distance_traveled)
            .with(DRIVER_ID, self.driver_id)
    }

    fn changes(&self) -> Row {
        let mut row = Row::new();
        if !self.license_plate.is_empty() {
            row.set("license_plate", self.license_plate.as_str());
        }
        if !self.fuel_used.is_zero() {
            row.set("fuel_used", self.fuel_used);
        }
        if !self.distance_traveled.is_zero() {
            row.set("distance_traveled", self.distance_traveled);
        }
        if let Some(driver_id) = self.driver_id {
            row.set(DRIVER_ID, driver_id);
        }
        row
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            model: Model::read(row)?,
            license_plate: row.text("license_plate")?,
            fuel_used: row.decimal("fuel_used")?,
            distance_traveled: row.decimal("distance_traveled")?,
            driver_id: row.opt_int(DRIVER_ID)?,
            driver: row.association(DRIVER).map(Driver::from_row).transpose()?,
        })
    }

    fn missing_required(&self) -> Vec<&'static str> {
        if self.license_plate.trim().is_empty() {
            vec!["licensePlate"]
        } else {
            Vec::new()
        }
    }
}
