//! Cronos API
//!
//! A user registry REST service:
//! - Create, list, fetch, update and delete user records
//! - PostgreSQL or in-memory storage
//! - Structured logging and Prometheus metrics

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use api::state::AppState;
use crate::config::{StorageBackend, StorageConfig};
use infrastructure::storage::{connect, run_storage_migrations};
use infrastructure::user::{InMemoryUserRepository, PostgresUserRepository};
use sqlx::PgPool;
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    info!(backend = ?config.storage.backend, "Storage backend selected");

    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage for users");
            Ok(AppState::with_repository(InMemoryUserRepository::new()))
        }
        StorageBackend::Postgres => {
            let pool = connect_postgres(&config.storage).await?;

            if config.storage.run_migrations {
                run_storage_migrations(&pool)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
            }

            Ok(AppState::with_repository(PostgresUserRepository::new(pool)))
        }
    }
}

/// Open the PostgreSQL pool described by the storage configuration
pub async fn connect_postgres(storage: &StorageConfig) -> anyhow::Result<PgPool> {
    let pg_config = storage.postgres().ok_or_else(|| {
        anyhow::anyhow!("storage.database_url or DATABASE_URL is required for the postgres backend")
    })?;

    connect(&pg_config)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
}
