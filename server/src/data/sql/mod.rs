//! SQL abstraction layer for multi-database support
//!
//! This module provides abstractions for generating SQL that works across
//! the supported backends (SQLite, PostgreSQL), plus the shared builder for
//! bucketed aggregate statements.

mod builder;
mod dialect;
mod postgres_dialect;
mod sqlite_dialect;

pub use builder::{AggregateStatement, BindParam, build_aggregate_statement};
pub use dialect::{SqlDialect, SqlType};
pub use postgres_dialect::PostgresDialect;
pub use sqlite_dialect::SqliteDialect;
