// src/models/driver.rs
use serde::{Deserialize, Serialize};

use super::model::Model;
use crate::repository::schema::{Column, Kind, Row, Table, CREATED_AT, ID, UPDATED_AT};
use crate::repository::{Entity, StoreError};

pub static DRIVERS: Table = Table {
    name: "drivers",
    columns: &[
        Column::new(ID, Kind::Int),
        Column::new(CREATED_AT, Kind::Timestamp),
        Column::new(UPDATED_AT, Kind::Timestamp),
        Column::new("name", Kind::Text),
        Column::unique("license_number", Kind::Text),
        Column::new("is_active", Kind::Bool),
    ],
    relations: &[],
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Driver {
    #[serde(flatten)]
    pub model: Model,
    pub name: String,
    pub license_number: String,
    pub is_active: bool,
}

impl Entity for Driver {
    fn table() -> &'static Table {
        &DRIVERS
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
            .with("name", self.name.as_str())
            .with("license_number", self.license_number.as_str())
            .with("is_active", self.is_active)
    }

    fn changes(&self) -> Row {
        let mut row = Row::new();
        if !self.name.is_empty() {
            row.set("name", self.name.as_str());
        }
        if !self.license_number.is_empty() {
            row.set("license_number", self.license_number.as_str());
        }
        if self.is_active {
            row.set("is_active", true);
        }
        row
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            model: Model::read(row)?,
            name: row.text("name")?,
            license_number: row.text("license_number")?,
            is_active: row.bool("is_active")?,
        })
    }

    fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.license_number.trim().is_empty() {
            missing.push("licenseNumber");
        }
        missing
    }
}
