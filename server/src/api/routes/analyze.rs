//! Analyze endpoints
//!
//! `GET|POST /api/v1/{audience}/{domain}/analyze/{metric}`. GET reads the
//! parameters from the query string, POST from a JSON body; both run the
//! same pipeline.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{AnalyzePath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiEnvelope, ApiError};
use crate::domain::analytics::{AnalysisResult, AnalyticsEngine, ScopeFilter, StatRequest};
use crate::utils::time::parse_ymd;

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct AnalyzeApiState {
    pub engine: Arc<AnalyticsEngine>,
    /// Process shutdown token; each request runs on a child of it
    pub shutdown: CancellationToken,
}

// ============================================================================
// Request DTOs
// ============================================================================

fn default_dt_type() -> String {
    "day".to_string()
}

/// Analyze parameters (query string for GET, JSON body for POST)
#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AnalyzeParams {
    /// Range start, `YYYY-MM-DD` or `YYYYMMDD`
    #[validate(length(min = 1, message = "strtYmd is required"))]
    pub strt_ymd: String,
    /// Range end (inclusive), `YYYY-MM-DD` or `YYYYMMDD`
    #[validate(length(min = 1, message = "endYmd is required"))]
    pub end_ymd: String,
    /// Bucket unit: day, week, month or year
    #[serde(default = "default_dt_type")]
    pub dt_type: String,
    /// Ranking length for `top` metrics
    pub limit: Option<i64>,
    /// Alias for the domain's primary scope
    #[validate(range(min = 1, message = "scopeNo must be positive"))]
    pub scope_no: Option<i64>,
    #[validate(range(min = 1, message = "ctgryNo must be positive"))]
    pub ctgry_no: Option<i64>,
    #[validate(range(min = 1, message = "tagNo must be positive"))]
    pub tag_no: Option<i64>,
    #[validate(range(min = 1, message = "pstNo must be positive"))]
    pub pst_no: Option<i64>,
}

impl AnalyzeParams {
    fn into_request(self, path: &AnalyzePath) -> Result<StatRequest, ApiError> {
        let start = parse_date("strtYmd", &self.strt_ymd)?;
        let end = parse_date("endYmd", &self.end_ymd)?;
        Ok(StatRequest {
            domain: path.domain,
            metric: path.metric,
            start,
            end,
            unit: self.dt_type,
            limit: self.limit,
            scope_no: self.scope_no,
            scope: ScopeFilter {
                ctgry_no: self.ctgry_no,
                tag_no: self.tag_no,
                pst_no: self.pst_no,
            },
        })
    }
}

fn parse_date(field: &str, raw: &str) -> Result<chrono::NaiveDate, ApiError> {
    parse_ymd(raw).ok_or_else(|| {
        ApiError::bad_request(
            "INVALID_DATE",
            format!("{} must be YYYY-MM-DD or YYYYMMDD, got '{}'", field, raw),
        )
    })
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(engine: Arc<AnalyticsEngine>, shutdown: CancellationToken) -> Router<()> {
    let state = AnalyzeApiState { engine, shutdown };
    Router::new()
        .route(
            "/{audience}/{domain}/analyze/{metric}",
            get(analyze_get).post(analyze_post),
        )
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Analyze one metric (or the overview) of a domain
#[utoipa::path(
    get,
    path = "/api/v1/{audience}/{domain}/analyze/{metric}",
    tag = "analyze",
    params(
        ("audience" = String, Path, description = "Audience segment (admin)"),
        ("domain" = String, Path, description = "users, posts, comments, tags, categories or subscriptions"),
        ("metric" = String, Path, description = "Metric slug, e.g. overview, count, growth-rate"),
        AnalyzeParams
    ),
    responses(
        (status = 200, description = "Metric or overview result in the standard envelope", body = AnalysisResult),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown domain, metric or scope"),
        (status = 500, description = "Storage failure"),
        (status = 503, description = "Request cancelled"),
        (status = 504, description = "Deadline exceeded")
    )
)]
pub async fn analyze_get(
    State(state): State<AnalyzeApiState>,
    path: AnalyzePath,
    ValidatedQuery(params): ValidatedQuery<AnalyzeParams>,
) -> Result<ApiEnvelope<AnalysisResult>, ApiError> {
    let request = params.into_request(&path)?;
    run_analysis(&state, request).await
}

/// Analyze with parameters in a JSON body
#[utoipa::path(
    post,
    path = "/api/v1/{audience}/{domain}/analyze/{metric}",
    tag = "analyze",
    params(
        ("audience" = String, Path, description = "Audience segment (admin)"),
        ("domain" = String, Path, description = "users, posts, comments, tags, categories or subscriptions"),
        ("metric" = String, Path, description = "Metric slug, e.g. overview, count, growth-rate")
    ),
    request_body = AnalyzeParams,
    responses(
        (status = 200, description = "Metric or overview result in the standard envelope", body = AnalysisResult),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown domain, metric or scope"),
        (status = 500, description = "Storage failure"),
        (status = 503, description = "Request cancelled"),
        (status = 504, description = "Deadline exceeded")
    )
)]
pub async fn analyze_post(
    State(state): State<AnalyzeApiState>,
    path: AnalyzePath,
    ValidatedJson(params): ValidatedJson<AnalyzeParams>,
) -> Result<ApiEnvelope<AnalysisResult>, ApiError> {
    let request = params.into_request(&path)?;
    run_analysis(&state, request).await
}

async fn run_analysis(
    state: &AnalyzeApiState,
    request: StatRequest,
) -> Result<ApiEnvelope<AnalysisResult>, ApiError> {
    // Dropping the handler future (client disconnect) cancels the request
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let message = format!("{} {} analyzed", request.domain, request.metric);
    let result = state.engine.analyze(request, cancel).await?;
    Ok(ApiEnvelope::ok(message, result))
}
