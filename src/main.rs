// src/main.rs
mod assignment;
mod config;
mod database;
mod dtos;
mod error;
mod handlers;
mod models;
mod repository;
mod routes;
mod state;
#[cfg(test)]
mod testutils;

use dotenvy::dotenv;
use std::error::Error;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::repository::postgres::PgStore;

/// Binds the listen address named by the configuration. There is no fallback
/// to another port.
async fn bind(config: &Config) -> std::io::Result<(TcpListener, SocketAddr)> {
    let addr = SocketAddr::from((config.host, config.port));
    let listener = TcpListener::bind(addr).await?;
    Ok((listener, addr))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;

    // Create database pool and tables
    let db_pool = database::create_pool(&config)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to connect to database"))?;
    database::migrate(&db_pool)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to run migrations"))?;

    // Create application state
    let app_state = state::AppState::new(PgStore::new(db_pool));
    let app = routes::app(app_state);

    let (listener, addr) = bind(&config).await.inspect_err(|e| {
        tracing::error!(error = %e, host = %config.host, port = config.port, "Failed to bind")
    })?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Server error"))?;
    Ok(())
}
