//! Shared API types
//!
//! Every response, success or failure, uses the same envelope:
//! `{ error, code, message, data }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::analytics::{AnalyticsError, ValidationError};

/// Response envelope
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub error: bool,
    pub code: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiEnvelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            code: "OK".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiEnvelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    ServiceUnavailable { code: String, message: String },
    GatewayTimeout { message: String },
    Internal { code: String, message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "INTERNAL".to_string(),
            message: message.into(),
        }
    }

    pub fn from_validation(e: ValidationError) -> Self {
        tracing::debug!(code = e.code(), error = %e, "Analyze request rejected");
        match e {
            ValidationError::ScopeNotFound(_) => Self::not_found(e.code(), e.to_string()),
            _ => Self::bad_request(e.code(), e.to_string()),
        }
    }

    pub fn from_analytics(e: AnalyticsError) -> Self {
        match e {
            AnalyticsError::Validation(v) => Self::from_validation(v),
            AnalyticsError::Storage { metric, source } => {
                tracing::error!(
                    metric,
                    backend = source.backend(),
                    transient = source.is_transient(),
                    error = %source,
                    "Storage error"
                );
                Self::Internal {
                    code: "STORAGE_ERROR".to_string(),
                    message: format!("Metric {} is unavailable", metric),
                }
            }
            AnalyticsError::Cancelled => Self::ServiceUnavailable {
                code: "CANCELLED".to_string(),
                message: "Request was cancelled".to_string(),
            },
            AnalyticsError::DeadlineExceeded { timeout_secs } => {
                tracing::warn!(timeout_secs, "Analyze request exceeded its deadline");
                Self::GatewayTimeout {
                    message: format!("Request exceeded its {}s deadline", timeout_secs),
                }
            }
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        Self::from_analytics(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, code, message),
            Self::ServiceUnavailable { code, message } => {
                (StatusCode::SERVICE_UNAVAILABLE, code, message)
            }
            Self::GatewayTimeout { message } => (
                StatusCode::GATEWAY_TIMEOUT,
                "DEADLINE_EXCEEDED".to_string(),
                message,
            ),
            Self::Internal { code, message } => (StatusCode::INTERNAL_SERVER_ERROR, code, message),
        };
        let body: ApiEnvelope<()> = ApiEnvelope {
            error: true,
            code,
            message,
            data: None,
        };
        (status, Json(body)).into_response()
    }
}
