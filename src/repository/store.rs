// src/repository/store.rs
use async_trait::async_trait;
use thiserror::Error;

use super::schema::{Relation, Row, Table};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A single-record lookup matched nothing.
    #[error("record not found")]
    RecordNotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Constraint violation raised by a store that enforces constraints itself.
    #[error("{0}")]
    Constraint(String),

    #[error("unsupported relations: {0}")]
    UnknownAssociation(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("column {column} is not a valid {expected}")]
    Decode {
        column: &'static str,
        expected: &'static str,
    },
}

/// A read against one table, with the associations to join into every row.
#[derive(Debug, Clone)]
pub struct Query {
    pub table: &'static Table,
    pub joins: Vec<&'static Relation>,
}

impl Query {
    pub fn new(table: &'static Table) -> Self {
        Self { table, joins: Vec::new() }
    }

    pub fn join(mut self, relation: &'static Relation) -> Self {
        self.joins.push(relation);
        self
    }
}

/// Persistence primitives the repository is built on.
///
/// Rows handed to `insert` and `update` are keyed by column name; the returned
/// rows carry every column of the table.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    async fn insert(&self, table: &'static Table, row: Row) -> Result<Row, StoreError>;

    /// Loads the row with primary key `id`, failing with
    /// `StoreError::RecordNotFound` when there is none.
    async fn first(&self, query: &Query, id: i32) -> Result<Row, StoreError>;

    /// Loads every row, ordered by primary key.
    async fn find(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Loads the rows whose primary key is in `ids`. Used for preloading.
    async fn find_ids(&self, table: &'static Table, ids: &[i32]) -> Result<Vec<Row>, StoreError>;

    /// Applies `changes` to the row with primary key `id` and returns the
    /// updated row, or `None` when no row matched.
    async fn update(
        &self,
        table: &'static Table,
        id: i32,
        changes: Row,
    ) -> Result<Option<Row>, StoreError>;

    /// Deletes the row with primary key `id`, returning the number of rows removed.
    async fn delete(&self, table: &'static Table, id: i32) -> Result<u64, StoreError>;
}
