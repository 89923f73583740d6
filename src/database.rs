// src/database.rs
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::{Config, DatabaseConfig};

pub fn connect_options(database: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    match database {
        DatabaseConfig::Url(url) => PgConnectOptions::from_str(url),
        DatabaseConfig::Parts { host, port, user, password, name } => Ok(PgConnectOptions::new()
            .host(host)
            .port(*port)
            .username(user)
            .password(password)
            .database(name)),
    }
}

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(&config.database)?;
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
}

/// Creates the `drivers` and `trucks` tables if they are not there yet.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
