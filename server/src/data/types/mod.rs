//! Shared data types for all database backends
//!
//! Request/row types for aggregate reads and the static catalog of blog
//! tables, used by both the SQLite and PostgreSQL repositories.

mod aggregate;
mod scope;
pub mod tables;

pub use aggregate::{
    AggregateRequest, AggregateRow, Dimension, LabelSource, Measure, Predicate, RankBy,
    RankLimit, ScopeBinding, ScopeCondition, SourceTable, TimeColumn, TimeWindow, Visibility,
};
pub use scope::{ScopeKind, ScopeRef};
