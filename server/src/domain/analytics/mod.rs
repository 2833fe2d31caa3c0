//! Time-bucketed blog analytics
//!
//! - `buckets` - Calendar bucket planning (`DateBucketPlanner`)
//! - `query` - Aggregate request building and zero-filling
//! - `compute` - Pure metric computers
//! - `validate` - Request validation (`StatRequestValidator`)
//! - `registry` - `(domain, metric)` to aggregate + computer table
//! - `orchestrator` - Per-request pipeline and overview fan-out

pub mod buckets;
pub mod compute;
pub mod error;
pub mod orchestrator;
pub mod query;
pub mod registry;
pub mod types;
pub mod validate;

pub use buckets::DateBucketPlanner;
pub use error::{AnalyticsError, ValidationError};
pub use orchestrator::AnalyticsEngine;
pub use query::AggregationQueryBuilder;
pub use registry::{DomainCatalog, MetricInfo, catalog};
pub use types::{
    AnalysisResult, BucketUnit, DomainKind, MetricKind, MetricResult, OverviewPolicy,
    OverviewResult, ScopeFilter, StatRequest, WeekAnchor,
};
pub use validate::StatRequestValidator;
