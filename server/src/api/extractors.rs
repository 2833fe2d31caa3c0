//! Path and validation extractors for API routes
//!
//! Rejections render the standard envelope so clients always see
//! `{ error, code, message, data }`.

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::api::types::ApiEnvelope;
use crate::domain::analytics::{DomainKind, MetricKind};

/// Audience segment served by this engine
pub const ADMIN_AUDIENCE: &str = "admin";

/// Raw path extractor for analyze routes (internal use)
#[derive(Debug, Deserialize)]
struct AnalyzePathRaw {
    audience: String,
    domain: String,
    metric: String,
}

/// Validated `/{audience}/{domain}/analyze/{metric}` path
///
/// Unknown segments are a 404: the route shape matched, but there is no
/// such resource.
#[derive(Debug)]
pub struct AnalyzePath {
    pub domain: DomainKind,
    pub metric: MetricKind,
}

impl<S> FromRequestParts<S> for AnalyzePath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<AnalyzePathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        if raw.audience != ADMIN_AUDIENCE {
            return Err(ValidationRejection::UnknownAudience(raw.audience));
        }
        let domain = DomainKind::from_slug(&raw.domain)
            .ok_or(ValidationRejection::UnknownDomain(raw.domain))?;
        let metric = MetricKind::from_slug(&raw.metric)
            .ok_or(ValidationRejection::UnknownMetric(raw.metric))?;

        Ok(Self { domain, metric })
    }
}

/// Validation rejection with structured error response
#[derive(Debug)]
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// Audience segment other than `admin`
    UnknownAudience(String),
    UnknownDomain(String),
    UnknownMetric(String),
    /// Failed to parse query string
    Query(QueryRejection),
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Path(rejection) => (
                StatusCode::BAD_REQUEST,
                "PATH_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::UnknownAudience(audience) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_AUDIENCE",
                format!("Unknown audience: {}", audience),
            ),
            Self::UnknownDomain(domain) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_DOMAIN",
                format!("Unknown domain: {}", domain),
            ),
            Self::UnknownMetric(metric) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_METRIC",
                format!("Unknown metric: {}", metric),
            ),
            Self::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                "QUERY_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                "JSON_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format_validation_errors(&errors),
            ),
        };
        let body: ApiEnvelope<()> = ApiEnvelope {
            error: true,
            code: code.to_string(),
            message,
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect();
    // field_errors() is a HashMap; keep the message stable
    messages.sort();
    messages.join("; ")
}

/// Query extractor with automatic validation.
///
/// Deserializes query parameters and validates them using the `validator` crate.
/// Returns a `ValidationRejection` on parse or validation failure.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

/// JSON body extractor with automatic validation.
///
/// Deserializes JSON body and validates it using the `validator` crate.
/// Returns a `ValidationRejection` on parse or validation failure.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}
