//! Repository trait implementations for SQLite

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::{AggregateRepository, ScopeRepository};
use crate::data::types::{AggregateRequest, AggregateRow, ScopeRef};

use super::SqliteService;
use super::repositories::{aggregate, scope};

#[async_trait]
impl AggregateRepository for Arc<SqliteService> {
    async fn fetch_aggregates(
        &self,
        request: &AggregateRequest,
    ) -> Result<Vec<AggregateRow>, DataError> {
        aggregate::fetch_aggregates(self.pool(), request)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl ScopeRepository for Arc<SqliteService> {
    async fn scope_exists(&self, scope_ref: ScopeRef) -> Result<bool, DataError> {
        scope::scope_exists(self.pool(), scope_ref)
            .await
            .map_err(Into::into)
    }
}
