// src/repository/mod.rs
//! Generic data access over any `Entity`, backed by a `Store`.
//!
//! Single-record lookups follow a "miss is not an error" convention: when
//! nothing matches, `find_by_id` hands back the entity's zero value and callers
//! test `model().is_persisted()` to tell the two cases apart. Updates and
//! deletes that touch no rows, on the other hand, fail with
//! `RepositoryError::NoRowsAffected`.

use std::collections::HashMap;
use std::marker::PhantomData;

use chrono::Utc;
use thiserror::Error;

use crate::models::Model;

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod schema;
pub mod store;

use schema::{Relation, Row, Table, Value, ID, UPDATED_AT};
pub use store::{Query, Store, StoreError};

/// A persisted record type.
pub trait Entity: Default + Send + Sync + 'static {
    fn table() -> &'static Table;

    fn model(&self) -> &Model;

    fn model_mut(&mut self) -> &mut Model;

    /// Every column, including identity and timestamps.
    fn to_row(&self) -> Row;

    /// Only the non-zero, non-identity columns; the input of a partial update.
    fn changes(&self) -> Row;

    fn from_row(row: &Row) -> Result<Self, StoreError>;

    /// JSON names of required fields that are empty, in declaration order.
    fn missing_required(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An update or delete matched no rows.
    #[error("record not found")]
    NoRowsAffected,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Swallows `StoreError::RecordNotFound`, surfacing every other store error.
pub fn handle_error<T>(result: Result<T, StoreError>) -> Result<Option<T>, RepositoryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::RecordNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub struct Repository<E, S> {
    store: S,
    default_joins: Vec<&'static str>,
    entity: PhantomData<fn() -> E>,
}

impl<E, S> Repository<E, S>
where
    E: Entity,
    S: Store,
{
    /// `default_joins` are association names joined into every read issued
    /// through this repository.
    pub fn new(store: S, default_joins: &[&'static str]) -> Self {
        Self {
            store,
            default_joins: default_joins.to_vec(),
            entity: PhantomData,
        }
    }

    /// Persists a new record and replaces `entity` with what the store saved,
    /// including its assigned id and timestamps.
    pub async fn create(&self, entity: &mut E) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let model = entity.model_mut();
        model.created_at = now;
        model.updated_at = now;

        let mut row = entity.to_row();
        row.remove(ID);

        if let Some(stored) = handle_error(self.store.insert(E::table(), row).await)? {
            *entity = E::from_row(&stored)?;
        }
        Ok(())
    }

    /// Loads the record with primary key `id`, eagerly loading `preloads`.
    ///
    /// Returns `E::default()` rather than an error when no record exists.
    pub async fn find_by_id(&self, id: i32, preloads: &[&str]) -> Result<E, RepositoryError> {
        let query = self.query()?;
        let relations = Self::relations(preloads)?;

        let Some(row) = handle_error(self.store.first(&query, id).await)? else {
            return Ok(E::default());
        };

        let mut rows = vec![row];
        self.preload(&mut rows, &relations).await?;
        Ok(E::from_row(&rows[0])?)
    }

    /// Loads every record, eagerly loading `preloads`. Empty when there are none.
    pub async fn find_all(&self, preloads: &[&str]) -> Result<Vec<E>, RepositoryError> {
        let query = self.query()?;
        let relations = Self::relations(preloads)?;

        let mut rows = handle_error(self.store.find(&query).await)?.unwrap_or_default();
        self.preload(&mut rows, &relations).await?;

        rows.iter()
            .map(|row| E::from_row(row).map_err(RepositoryError::from))
            .collect()
    }

    /// Writes the non-zero fields of `entity` to the record with the same id
    /// and replaces `entity` with the updated record.
    pub async fn update(&self, entity: &mut E) -> Result<(), RepositoryError> {
        let mut changes = entity.changes();
        changes.set(UPDATED_AT, Utc::now());

        let id = entity.model().id;
        match handle_error(self.store.update(E::table(), id, changes).await)?.flatten() {
            Some(row) => {
                *entity = E::from_row(&row)?;
                Ok(())
            }
            None => Err(RepositoryError::NoRowsAffected),
        }
    }

    /// Sets a single column on the record identified by `entity`, bypassing
    /// the field diffing done by `update`.
    pub async fn update_column(
        &self,
        entity: &mut E,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<(), RepositoryError> {
        let column = E::table()
            .column(column)
            .filter(|c| c.name != ID)
            .ok_or_else(|| StoreError::UnknownColumn(column.to_string()))?;

        let changes = Row::new()
            .with(UPDATED_AT, Utc::now())
            .with(column.name, value);

        let id = entity.model().id;
        let updated = handle_error(self.store.update(E::table(), id, changes).await)?;
        if let Some(row) = updated.flatten() {
            *entity = E::from_row(&row)?;
        }
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let affected = handle_error(self.store.delete(E::table(), id).await)?.unwrap_or(0);
        if affected == 0 {
            return Err(RepositoryError::NoRowsAffected);
        }
        Ok(())
    }

    fn query(&self) -> Result<Query, StoreError> {
        let relations = Self::relations(&self.default_joins)?;
        Ok(relations.into_iter().fold(Query::new(E::table()), Query::join))
    }

    fn relations(names: &[&str]) -> Result<Vec<&'static Relation>, StoreError> {
        names
            .iter()
            .map(|name| {
                E::table()
                    .relation(name)
                    .ok_or_else(|| StoreError::UnknownAssociation(name.to_string()))
            })
            .collect()
    }

    async fn preload(
        &self,
        rows: &mut [Row],
        relations: &[&'static Relation],
    ) -> Result<(), StoreError> {
        for relation in relations {
            let mut ids = Vec::new();
            for row in rows.iter() {
                if let Some(id) = row.opt_int(relation.foreign_key)? {
                    ids.push(id);
                }
            }
            ids.sort_unstable();
            ids.dedup();

            let mut related = HashMap::new();
            if !ids.is_empty() {
                for row in self.store.find_ids(relation.table, &ids).await? {
                    related.insert(row.int(ID)?, row);
                }
            }

            for row in rows.iter_mut() {
                let target = row
                    .opt_int(relation.foreign_key)?
                    .and_then(|id| related.get(&id).cloned());
                row.attach(relation.name, target);
            }
        }
        Ok(())
    }
}
