// src/repository/postgres.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row as _};
use tracing::debug;

use super::schema::{Column, Kind, Row, Table, Value, ID};
use super::store::{Query, Store, StoreError};

/// Separator between an association name and its column in joined selects.
const ALIAS_SEPARATOR: &str = "__";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_columns(
    qb: &mut QueryBuilder<'_, Postgres>,
    table: &Table,
    source: &str,
    alias_prefix: &str,
) {
    let mut first = true;
    for column in table.columns {
        if !first {
            qb.push(", ");
        }
        first = false;
        qb.push(format!(
            "\"{source}\".\"{name}\" AS \"{alias_prefix}{name}\"",
            name = column.name
        ));
    }
}

fn select(query: &Query) -> QueryBuilder<'static, Postgres> {
    let table = query.table;
    let mut qb = QueryBuilder::new("SELECT ");
    push_columns(&mut qb, table, table.name, "");

    for relation in &query.joins {
        qb.push(", ");
        let prefix = format!("{}{ALIAS_SEPARATOR}", relation.name);
        push_columns(&mut qb, relation.table, relation.name, &prefix);
    }

    qb.push(format!(" FROM \"{}\"", table.name));
    for relation in &query.joins {
        qb.push(format!(
            " LEFT JOIN \"{target}\" \"{alias}\" ON \"{alias}\".\"{ID}\" = \"{owner}\".\"{fk}\"",
            target = relation.table.name,
            alias = relation.name,
            owner = table.name,
            fk = relation.foreign_key,
        ));
    }
    qb
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, column: &Column, value: &Value) {
    match value {
        Value::Int(v) => qb.push_bind(*v),
        Value::Text(v) => qb.push_bind(v.clone()),
        Value::Bool(v) => qb.push_bind(*v),
        Value::Decimal(v) => qb.push_bind(*v),
        Value::Timestamp(v) => qb.push_bind(*v),
        Value::Null => match column.kind {
            Kind::Int => qb.push_bind(None::<i32>),
            Kind::Text => qb.push_bind(None::<String>),
            Kind::Bool => qb.push_bind(None::<bool>),
            Kind::Decimal => qb.push_bind(None::<Decimal>),
            Kind::Timestamp => qb.push_bind(None::<DateTime<Utc>>),
        },
    };
}

fn column<'t>(table: &'t Table, name: &str) -> Result<&'t Column, StoreError> {
    table
        .column(name)
        .ok_or_else(|| StoreError::UnknownColumn(name.to_string()))
}

fn returning(qb: &mut QueryBuilder<'static, Postgres>, table: &Table) {
    qb.push(" RETURNING ");
    push_columns(qb, table, table.name, "");
}

fn insert(table: &Table, row: &Row) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO \"{}\" (", table.name));
    let names: Vec<String> = row.values().map(|(name, _)| format!("\"{name}\"")).collect();
    qb.push(names.join(", "));
    qb.push(") VALUES (");
    let mut first = true;
    for (name, value) in row.values() {
        if !first {
            qb.push(", ");
        }
        first = false;
        push_value(&mut qb, column(table, name)?, value);
    }
    qb.push(")");
    returning(&mut qb, table);
    Ok(qb)
}

fn update(
    table: &Table,
    id: i32,
    changes: &Row,
) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let mut qb = QueryBuilder::new(format!("UPDATE \"{}\" SET ", table.name));
    let mut first = true;
    for (name, value) in changes.values() {
        if !first {
            qb.push(", ");
        }
        first = false;
        qb.push(format!("\"{name}\" = "));
        push_value(&mut qb, column(table, name)?, value);
    }
    qb.push(format!(" WHERE \"{}\".\"{ID}\" = ", table.name));
    qb.push_bind(id);
    returning(&mut qb, table);
    Ok(qb)
}

/// Constraint violations keep the database's own message, which names the
/// constraint.
fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.constraint().is_some() {
            return StoreError::Constraint(db.message().to_string());
        }
    }
    StoreError::Database(e)
}

fn decode(pg_row: &PgRow, table: &Table, alias_prefix: &str) -> Result<Row, StoreError> {
    let mut row = Row::new();
    for column in table.columns {
        let alias = format!("{alias_prefix}{}", column.name);
        let alias = alias.as_str();
        let value = match column.kind {
            Kind::Int => pg_row.try_get::<Option<i32>, _>(alias)?.map(Value::Int),
            Kind::Text => pg_row.try_get::<Option<String>, _>(alias)?.map(Value::Text),
            Kind::Bool => pg_row.try_get::<Option<bool>, _>(alias)?.map(Value::Bool),
            Kind::Decimal => pg_row.try_get::<Option<Decimal>, _>(alias)?.map(Value::Decimal),
            Kind::Timestamp => pg_row
                .try_get::<Option<DateTime<Utc>>, _>(alias)?
                .map(Value::Timestamp),
        };
        row.set(column.name, value.unwrap_or(Value::Null));
    }
    Ok(row)
}

fn decode_joined(pg_row: &PgRow, query: &Query) -> Result<Row, StoreError> {
    let mut row = decode(pg_row, query.table, "")?;
    for relation in &query.joins {
        let prefix = format!("{}{ALIAS_SEPARATOR}", relation.name);
        let joined = decode(pg_row, relation.table, &prefix)?;
        // A LEFT JOIN that matched nothing yields a row of NULLs.
        let target = match joined.get(ID) {
            Some(Value::Int(_)) => Some(joined),
            _ => None,
        };
        row.attach(relation.name, target);
    }
    Ok(row)
}

#[async_trait]
impl Store for PgStore {
    async fn insert(&self, table: &'static Table, row: Row) -> Result<Row, StoreError> {
        let mut qb = insert(table, &row)?;
        debug!(sql = qb.sql(), "insert");
        let pg_row = qb.build().fetch_one(&self.pool).await.map_err(map_sqlx_error)?;
        decode(&pg_row, table, "")
    }

    async fn first(&self, query: &Query, id: i32) -> Result<Row, StoreError> {
        let mut qb = select(query);
        qb.push(format!(" WHERE \"{}\".\"{ID}\" = ", query.table.name));
        qb.push_bind(id);
        qb.push(format!(" ORDER BY \"{}\".\"{ID}\" LIMIT 1", query.table.name));
        debug!(sql = qb.sql(), "first");

        match qb.build().fetch_optional(&self.pool).await.map_err(map_sqlx_error)? {
            Some(pg_row) => decode_joined(&pg_row, query),
            None => Err(StoreError::RecordNotFound),
        }
    }

    async fn find(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut qb = select(query);
        qb.push(format!(" ORDER BY \"{}\".\"{ID}\"", query.table.name));
        debug!(sql = qb.sql(), "find");

        let pg_rows = qb.build().fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        pg_rows.iter().map(|pg_row| decode_joined(pg_row, query)).collect()
    }

    async fn find_ids(&self, table: &'static Table, ids: &[i32]) -> Result<Vec<Row>, StoreError> {
        let mut qb = select(&Query::new(table));
        qb.push(format!(" WHERE \"{}\".\"{ID}\" = ANY(", table.name));
        qb.push_bind(ids.to_vec());
        qb.push(")");
        debug!(sql = qb.sql(), "find_ids");

        let pg_rows = qb.build().fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        pg_rows.iter().map(|pg_row| decode(pg_row, table, "")).collect()
    }

    async fn update(
        &self,
        table: &'static Table,
        id: i32,
        changes: Row,
    ) -> Result<Option<Row>, StoreError> {
        let mut qb = update(table, id, &changes)?;
        debug!(sql = qb.sql(), "update");

        match qb.build().fetch_optional(&self.pool).await.map_err(map_sqlx_error)? {
            Some(pg_row) => Ok(Some(decode(&pg_row, table, "")?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, table: &'static Table, id: i32) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"{ID}\" = ", table.name);
        let mut qb = QueryBuilder::<Postgres>::new(sql);
        qb.push_bind(id);
        debug!(sql = qb.sql(), "delete");

        let result = qb.build().execute(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}

/// Test utilities for the PostgreSQL store.
#[cfg(test)]
pub mod testutils {
    use sqlx::postgres::PgPoolOptions;

    use super::PgStore;
    use crate::config::Config;
    use crate::database::{connect_options, migrate};

    /// Connects to the database configured by the `PGSQL_TEST_`-prefixed
    /// variables (`PGSQL_TEST_DATABASE_URL`, or `PGSQL_TEST_DB_HOST` and friends)
    /// and runs the migrations in the session's `pg_temp` schema.
    ///
    /// The tables go away with the connection, so the pool keeps exactly one open.
    /// Given that this is for testing purposes only, any errors will panic.
    pub async fn setup() -> PgStore {
        let config = Config::from_lookup(|key| std::env::var(format!("PGSQL_TEST_{key}")).ok())
            .unwrap();
        let options = connect_options(&config.database)
            .unwrap()
            .options([("search_path", "pg_temp")]);

        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .unwrap();
        migrate(&pool).await.unwrap();
        PgStore::new(pool)
    }
}
