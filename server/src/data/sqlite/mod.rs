//! SQLite database service
//!
//! Read-only access to a blog database file for local/embedded deployments.
//! The engine never writes, so the file is opened with `mode=ro` and is never
//! created on demand.
//!
//! For shared multi-user deployments, use PostgreSQL instead.

pub mod error;
pub mod repositories;
mod repository_impl;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
pub(crate) mod schema;

pub use error::SqliteError;
pub use sqlx::SqlitePool;

use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::log::LevelFilter;

use crate::core::config::SqliteConfig;
use crate::core::constants::{
    SQLITE_BUSY_TIMEOUT_SECS, SQLITE_CACHE_SIZE, SQLITE_MAX_CONNECTIONS,
};

/// SQLite database service
///
/// Handles connection pooling for the blog database.
/// Should be created once at server startup and shared across all modules.
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Open the blog database read-only
    ///
    /// Fails with [`SqliteError::MissingDatabase`] if the file does not exist.
    pub async fn init(config: &SqliteConfig) -> Result<Self, SqliteError> {
        let db_path = &config.path;
        if !db_path.exists() {
            return Err(SqliteError::MissingDatabase(db_path.clone()));
        }

        let max_connections = if config.max_connections > 0 {
            config.max_connections
        } else {
            SQLITE_MAX_CONNECTIONS
        };

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .read_only(true)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .pragma("cache_size", SQLITE_CACHE_SIZE)
            .pragma("temp_store", "MEMORY")
            .log_statements(LevelFilter::Trace);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        tracing::debug!(path = %db_path.display(), max_connections, "SqliteService initialized");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a SqliteService from an existing pool (primarily for testing)
    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }
}
