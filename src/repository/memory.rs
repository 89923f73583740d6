// src/repository/memory.rs
//! In-process `Store` used by the test suite. Enforces the same unique and
//! foreign-key constraints as the Postgres schema, with the same constraint
//! names, so error paths behave alike.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::schema::{Relation, Row, Table, Value, ID};
use super::store::{Query, Store, StoreError};
use crate::models::driver::DRIVERS;
use crate::models::truck::TRUCKS;

/// Tables whose rows may reference each other, in creation order.
static SCHEMA: [&Table; 2] = [&DRIVERS, &TRUCKS];

#[derive(Default)]
struct Tables {
    rows: HashMap<&'static str, BTreeMap<i32, Row>>,
    sequences: HashMap<&'static str, i32>,
}

impl Tables {
    fn rows(&self, table: &Table) -> impl Iterator<Item = &Row> {
        self.rows.get(table.name).into_iter().flat_map(|rows| rows.values())
    }

    fn get(&self, table: &Table, id: i32) -> Option<&Row> {
        self.rows.get(table.name).and_then(|rows| rows.get(&id))
    }

    fn check_unique(&self, table: &Table, id: i32, row: &Row) -> Result<(), StoreError> {
        for column in table.columns.iter().filter(|c| c.unique) {
            let value = match row.get(column.name) {
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };
            let taken = self.rows(table).any(|other| {
                other.get(ID) != Some(&Value::Int(id)) && other.get(column.name) == Some(value)
            });
            if taken {
                return Err(StoreError::Constraint(format!(
                    "duplicate key value violates unique constraint \"{}_{}_key\"",
                    table.name, column.name
                )));
            }
        }
        Ok(())
    }

    fn check_references(&self, table: &Table, row: &Row) -> Result<(), StoreError> {
        for relation in table.relations {
            if let Some(Value::Int(target)) = row.get(relation.foreign_key) {
                if self.get(relation.table, *target).is_none() {
                    return Err(StoreError::Constraint(format!(
                        "insert or update on table \"{}\" violates foreign key constraint \"{}\"",
                        table.name, relation.constraint
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_not_referenced(&self, table: &Table, id: i32) -> Result<(), StoreError> {
        for owner in SCHEMA {
            for relation in owner.relations.iter().filter(|r| r.table.name == table.name) {
                let referenced = self
                    .rows(owner)
                    .any(|row| row.get(relation.foreign_key) == Some(&Value::Int(id)));
                if referenced {
                    return Err(StoreError::Constraint(format!(
                        "update or delete on table \"{}\" violates foreign key constraint \"{}\" \
                         on table \"{}\"",
                        table.name, relation.constraint, owner.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn joined(&self, query: &Query, row: &Row) -> Result<Row, StoreError> {
        let mut row = row.clone();
        for relation in &query.joins {
            let target = self.association(relation, &row)?;
            row.attach(relation.name, target);
        }
        Ok(row)
    }

    fn association(&self, relation: &Relation, row: &Row) -> Result<Option<Row>, StoreError> {
        Ok(row
            .opt_int(relation.foreign_key)?
            .and_then(|id| self.get(relation.table, id).cloned()))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, table: &'static Table, mut row: Row) -> Result<Row, StoreError> {
        let mut tables = self.lock();

        let id = tables.sequences.get(table.name).copied().unwrap_or(0) + 1;
        row.set(ID, id);
        tables.check_unique(table, id, &row)?;
        tables.check_references(table, &row)?;

        tables.sequences.insert(table.name, id);
        tables.rows.entry(table.name).or_default().insert(id, row.clone());
        Ok(row)
    }

    async fn first(&self, query: &Query, id: i32) -> Result<Row, StoreError> {
        let tables = self.lock();
        match tables.get(query.table, id) {
            Some(row) => tables.joined(query, row),
            None => Err(StoreError::RecordNotFound),
        }
    }

    async fn find(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let tables = self.lock();
        tables.rows(query.table).map(|row| tables.joined(query, row)).collect()
    }

    async fn find_ids(&self, table: &'static Table, ids: &[i32]) -> Result<Vec<Row>, StoreError> {
        let tables = self.lock();
        Ok(ids.iter().filter_map(|id| tables.get(table, *id).cloned()).collect())
    }

    async fn update(
        &self,
        table: &'static Table,
        id: i32,
        changes: Row,
    ) -> Result<Option<Row>, StoreError> {
        let mut tables = self.lock();

        let Some(current) = tables.get(table, id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        for (column, value) in changes.values() {
            updated.set(column, value.clone());
        }
        tables.check_unique(table, id, &updated)?;
        tables.check_references(table, &updated)?;

        tables.rows.entry(table.name).or_default().insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, table: &'static Table, id: i32) -> Result<u64, StoreError> {
        let mut tables = self.lock();
        if tables.get(table, id).is_none() {
            return Ok(0);
        }
        tables.check_not_referenced(table, id)?;

        tables.rows.entry(table.name).or_default().remove(&id);
        Ok(1)
    }
}

mod tests {
    mod repository {
        crate::repository::tests::generate_repository_tests!(
            crate::repository::memory::MemoryStore::default()
        );
    }

    mod assignment {
        crate::assignment::tests::generate_assignment_tests!(
            crate::repository::memory::MemoryStore::default()
        );
    }
}
