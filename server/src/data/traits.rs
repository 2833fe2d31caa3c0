//! Repository traits for database backends
//!
//! These traits are the only storage capability the analytics engine sees.
//! SQLite and PostgreSQL each implement them; tests substitute in-process
//! fakes.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{AggregateRequest, AggregateRow, ScopeRef};

// ============================================================================
// Aggregate Repository Trait
// ============================================================================

/// Read-only, time-bucketed aggregate fetches
#[async_trait]
pub trait AggregateRepository: Send + Sync {
    /// Run one grouped read. Every window of the request yields at least one
    /// row; a window with no matching source rows reports a zero count.
    async fn fetch_aggregates(
        &self,
        request: &AggregateRequest,
    ) -> Result<Vec<AggregateRow>, DataError>;
}

// ============================================================================
// Scope Repository Trait
// ============================================================================

/// Existence lookups for scope entities (category, tag, post)
#[async_trait]
pub trait ScopeRepository: Send + Sync {
    /// True when the entity exists and is not soft-deleted
    async fn scope_exists(&self, scope: ScopeRef) -> Result<bool, DataError>;
}
