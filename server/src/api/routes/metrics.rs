//! Metric registry listing

use axum::Router;
use axum::routing::get;

use crate::api::types::ApiEnvelope;
use crate::domain::analytics::{DomainCatalog, catalog};

pub fn routes() -> Router<()> {
    Router::new().route("/metrics", get(list_metrics))
}

/// List every domain with its metrics, scopes and overview fields
#[utoipa::path(
    get,
    path = "/api/v1/metrics",
    tag = "metrics",
    responses(
        (status = 200, description = "Registered metrics per domain", body = Vec<DomainCatalog>)
    )
)]
pub async fn list_metrics() -> ApiEnvelope<Vec<DomainCatalog>> {
    ApiEnvelope::ok("Metric registry", catalog())
}
