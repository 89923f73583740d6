// src/repository/schema.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::store::StoreError;

/// Storage type of a column, used to decode rows and to type NULL binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Int,
    Text,
    Bool,
    Decimal,
    Timestamp,
}

#[derive(Debug)]
pub struct Column {
    pub name: &'static str,
    pub kind: Kind,
    /// Enforced by the migration in Postgres; the in-memory store checks it itself.
    #[cfg(test)]
    pub unique: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            #[cfg(test)]
            unique: false,
        }
    }

    pub const fn unique(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            #[cfg(test)]
            unique: true,
        }
    }
}

/// A belongs-to association: `foreign_key` on the owning table points at the
/// `id` of `table`.
#[derive(Debug)]
pub struct Relation {
    pub name: &'static str,
    pub foreign_key: &'static str,
    /// Name the in-memory store reports on violations, matching the migration.
    #[cfg(test)]
    pub constraint: &'static str,
    pub table: &'static Table,
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub relations: &'static [Relation],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&'static Relation> {
        self.relations.iter().find(|r| r.name == name)
    }
}

// Every entity table carries these three columns first.
pub const ID: &str = "id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i32),
    Text(String),
    Bool(bool),
    Decimal(Decimal),
    Timestamp(DateTime<Utc>),
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<Option<i32>> for Value {
    fn from(v: Option<i32>) -> Self {
        v.map_or(Value::Null, Value::Int)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

/// One stored record: column values plus any association rows loaded with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<&'static str, Value>,
    associations: BTreeMap<&'static str, Option<Row>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.values.insert(column, value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn values(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn attach(&mut self, name: &'static str, row: Option<Row>) {
        self.associations.insert(name, row);
    }

    pub fn association(&self, name: &str) -> Option<&Row> {
        self.associations.get(name).and_then(Option::as_ref)
    }

    pub fn int(&self, column: &'static str) -> Result<i32, StoreError> {
        match self.opt_int(column)? {
            Some(v) => Ok(v),
            None => Err(StoreError::Decode { column, expected: "integer" }),
        }
    }

    pub fn opt_int(&self, column: &'static str) -> Result<Option<i32>, StoreError> {
        match self.values.get(column) {
            Some(Value::Int(v)) => Ok(Some(*v)),
            Some(Value::Null) | None => Ok(None),
            Some(_) => Err(StoreError::Decode { column, expected: "integer" }),
        }
    }

    pub fn text(&self, column: &'static str) -> Result<String, StoreError> {
        match self.values.get(column) {
            Some(Value::Text(v)) => Ok(v.clone()),
            Some(Value::Null) | None => Ok(String::new()),
            Some(_) => Err(StoreError::Decode { column, expected: "text" }),
        }
    }

    pub fn bool(&self, column: &'static str) -> Result<bool, StoreError> {
        match self.values.get(column) {
            Some(Value::Bool(v)) => Ok(*v),
            Some(Value::Null) | None => Ok(false),
            Some(_) => Err(StoreError::Decode { column, expected: "boolean" }),
        }
    }

    pub fn decimal(&self, column: &'static str) -> Result<Decimal, StoreError> {
        match self.values.get(column) {
            Some(Value::Decimal(v)) => Ok(*v),
            Some(Value::Null) | None => Ok(Decimal::ZERO),
            Some(_) => Err(StoreError::Decode { column, expected: "numeric" }),
        }
    }

    pub fn timestamp(&self, column: &'static str) -> Result<DateTime<Utc>, StoreError> {
        match self.values.get(column) {
            Some(Value::Timestamp(v)) => Ok(*v),
            Some(Value::Null) | None => Ok(DateTime::<Utc>::default()),
            Some(_) => Err(StoreError::Decode { column, expected: "timestamp" }),
        }
    }
}
