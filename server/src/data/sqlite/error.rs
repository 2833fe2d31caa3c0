//! SQLite error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("SQLite database not found at {}", .0.display())]
    MissingDatabase(PathBuf),
}
