//! Data storage layer
//!
//! Read-only access to the blog database:
//! - `sqlite` - Embedded backend (default), database file opened read-only
//! - `postgres` - Pooled backend for shared deployments
//! - `types` - Aggregate request/row types and the blog table catalog
//! - `traits` - Repository traits consumed by the analytics engine
//! - `sql` - SQL dialects and the bucketed aggregate statement builder
//! - `error` - Unified error type for both backends
//!
//! ## Backend Support
//!
//! Both backends implement `AggregateRepository` and `ScopeRepository`.
//! `StorageService` selects one at startup and hands out trait objects.

pub mod error;
pub mod postgres;
pub mod sql;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export backend-specific services
pub use postgres::PostgresService;
pub use sqlite::SqliteService;

// Re-export unified error type
pub use error::DataError;

// Re-export repository traits
pub use traits::{AggregateRepository, ScopeRepository};

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::config::{DatabaseBackend, DatabaseConfig};

/// Blog database service enum
///
/// Wraps the underlying backend-specific service (SQLite or PostgreSQL).
/// Services are stored as Arc so repository handles can be shared with the
/// analytics engine.
pub enum StorageService {
    /// SQLite backend (default, embedded)
    Sqlite(Arc<SqliteService>),
    /// PostgreSQL backend (for shared deployments)
    Postgres(Arc<PostgresService>),
}

impl StorageService {
    /// Initialize the storage service based on configuration
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        match config.backend {
            DatabaseBackend::Sqlite => {
                let service = SqliteService::init(&config.sqlite).await?;
                Ok(Self::Sqlite(Arc::new(service)))
            }
            DatabaseBackend::Postgres => {
                let pg = config.postgres.as_ref().ok_or_else(|| {
                    DataError::Config("PostgreSQL configuration required".to_string())
                })?;
                let service = PostgresService::init(pg).await?;
                Ok(Self::Postgres(Arc::new(service)))
            }
        }
    }

    /// Aggregate repository handle for the analytics engine
    pub fn aggregates(&self) -> Arc<dyn AggregateRepository> {
        match self {
            Self::Sqlite(s) => Arc::new(Arc::clone(s)),
            Self::Postgres(p) => Arc::new(Arc::clone(p)),
        }
    }

    /// Scope repository handle for request validation
    pub fn scopes(&self) -> Arc<dyn ScopeRepository> {
        match self {
            Self::Sqlite(s) => Arc::new(Arc::clone(s)),
            Self::Postgres(p) => Arc::new(Arc::clone(p)),
        }
    }

    /// Get the backend type
    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Self::Sqlite(_) => DatabaseBackend::Sqlite,
            Self::Postgres(_) => DatabaseBackend::Postgres,
        }
    }

    /// Start the background health check (PostgreSQL only)
    pub fn start_health_check_task(
        &self,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Option<JoinHandle<()>> {
        match self {
            Self::Sqlite(_) => None,
            Self::Postgres(p) => Some(p.start_health_check_task(shutdown_rx)),
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
            Self::Postgres(p) => p.close().await,
        }
    }
}
