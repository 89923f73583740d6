// src/models/model.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::schema::{Row, CREATED_AT, ID, UPDATED_AT};
use crate::repository::StoreError;

/// Identity block shared by every entity. An `id` of zero means the record
/// was never persisted, or a lookup did not find it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Model {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    pub(crate) fn write(&self, row: Row) -> Row {
        row.with(ID, self.id)
            .with(CREATED_AT, self.created_at)
            .with(UPDATED_AT, self.updated_at)
    }

    pub(crate) fn read(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.int(ID)?,
            created_at: row.timestamp(CREATED_AT)?,
            updated_at: row.timestamp(UPDATED_AT)?,
        })
    }
}
