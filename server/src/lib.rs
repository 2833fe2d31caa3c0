//! Time-bucketed analytics for a blog platform
//!
//! - `core` - CLI, layered configuration, shutdown
//! - `data` - read-only SQLite/PostgreSQL access to the blog tables
//! - `domain` - bucket planning, aggregate queries, metric computation
//! - `api` - axum HTTP surface

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
