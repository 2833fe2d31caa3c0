//! Health check endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::StorageService;

#[derive(Clone)]
pub struct HealthApiState {
    pub storage: Arc<StorageService>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Active database backend
    pub backend: String,
}

pub fn routes(storage: Arc<StorageService>) -> Router<()> {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthApiState { storage })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<HealthApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.storage.backend().to_string(),
    })
}
