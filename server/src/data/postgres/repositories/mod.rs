//! PostgreSQL repositories
//!
//! Request/row types should be imported from `crate::data::types`.

pub mod aggregate;
pub mod scope;

pub use aggregate::fetch_aggregates;
pub use scope::scope_exists;
