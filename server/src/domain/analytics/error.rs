//! Analytics error types

use chrono::NaiveDate;
use thiserror::Error;

use super::types::{DomainKind, FieldError, MetricKind};
use crate::data::DataError;
use crate::data::types::{ScopeKind, ScopeRef};

/// Request rejected before any fetch is issued
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Bucket unit '{0}' is not enabled")]
    InvalidUnit(String),

    #[error("Limit must be a positive integer, got {0}")]
    InvalidLimit(i64),

    #[error("Range produces {buckets} buckets, more than the maximum of {max}")]
    RangeTooLarge { buckets: usize, max: usize },

    #[error("{domain}/{metric} cannot be filtered by {scope}")]
    ScopeUnsupported {
        domain: DomainKind,
        metric: MetricKind,
        scope: ScopeKind,
    },

    #[error("{0} has no primary scope for scopeNo")]
    NoPrimaryScope(DomainKind),

    #[error("scopeNo={alias} conflicts with {} {explicit}", .kind.param())]
    ScopeConflict {
        kind: ScopeKind,
        alias: i64,
        explicit: i64,
    },

    #[error("{0} does not exist")]
    ScopeNotFound(ScopeRef),

    #[error("{domain}/{metric} is not available")]
    MetricUnavailable {
        domain: DomainKind,
        metric: MetricKind,
    },
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::InvalidUnit(_) => "INVALID_UNIT",
            Self::InvalidLimit(_) => "INVALID_LIMIT",
            Self::RangeTooLarge { .. } => "RANGE_TOO_LARGE",
            Self::ScopeUnsupported { .. } | Self::NoPrimaryScope(_) => "SCOPE_UNSUPPORTED",
            Self::ScopeConflict { .. } => "SCOPE_CONFLICT",
            Self::ScopeNotFound(_) => "SCOPE_NOT_FOUND",
            Self::MetricUnavailable { .. } => "METRIC_UNAVAILABLE",
        }
    }
}

/// Failure of an analyze request
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to fetch aggregates for {metric}: {source}")]
    Storage {
        metric: &'static str,
        #[source]
        source: DataError,
    },

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Request exceeded its {timeout_secs}s deadline")]
    DeadlineExceeded { timeout_secs: u64 },
}

impl AnalyticsError {
    pub fn storage(metric: &'static str, source: DataError) -> Self {
        Self::Storage { metric, source }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
        }
    }

    /// Whether a lenient overview may report this as a per-field error
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }

    /// Per-field error for an overview; storage details stay in the logs
    pub fn to_field_error(&self) -> FieldError {
        let message = match self {
            Self::Storage { metric, .. } => format!("Metric {} is unavailable", metric),
            other => other.to_string(),
        };
        FieldError {
            code: self.code().to_string(),
            message,
        }
    }
}
