//! Analytics orchestrator
//!
//! Drives one request through `Validated -> Planned -> Fetching -> Computing
//! -> Composed -> Returned`. An overview fans out to one pipeline per field,
//! bounded per request by `request_concurrency` and across the process by a
//! shared semaphore of `global_concurrency` permits.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::buckets::DateBucketPlanner;
use super::compute::compute;
use super::error::{AnalyticsError, ValidationError};
use super::query::AggregationQueryBuilder;
use super::registry::{self, MetricSpec};
use super::types::{
    AnalysisResult, DomainKind, MetricKind, MetricResult, OverviewField, OverviewPolicy,
    OverviewResult, StatRequest,
};
use super::validate::StatRequestValidator;
use crate::core::config::AnalyticsConfig;
use crate::data::traits::{AggregateRepository, ScopeRepository};
use crate::data::types::{AggregateRequest, AggregateRow};

/// Process-wide analytics engine
///
/// Holds explicit storage handles and the shared fetch semaphore; cheap to
/// share behind an `Arc`.
pub struct AnalyticsEngine {
    aggregates: Arc<dyn AggregateRepository>,
    scopes: Arc<dyn ScopeRepository>,
    config: AnalyticsConfig,
    planner: DateBucketPlanner,
    permits: Arc<Semaphore>,
}

impl AnalyticsEngine {
    pub fn new(
        aggregates: Arc<dyn AggregateRepository>,
        scopes: Arc<dyn ScopeRepository>,
        config: AnalyticsConfig,
    ) -> Self {
        let planner = DateBucketPlanner::new(config.week_anchor, config.max_buckets);
        let permits = Arc::new(Semaphore::new(config.global_concurrency));
        Self {
            aggregates,
            scopes,
            config,
            planner,
            permits,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Run one analyze request under the configured deadline
    ///
    /// `cancel` stops all in-flight fetches when triggered; the token is also
    /// cancelled here when the deadline elapses.
    pub async fn analyze(
        &self,
        request: StatRequest,
        cancel: CancellationToken,
    ) -> Result<AnalysisResult, AnalyticsError> {
        let span = tracing::info_span!(
            "analyze",
            domain = %request.domain,
            metric = %request.metric,
            unit = %request.unit,
        );
        let timeout_secs = self.config.request_timeout_secs;

        let run = self.run(request, &cancel).instrument(span.clone());
        match tokio::time::timeout(Duration::from_secs(timeout_secs), run).await {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                span.in_scope(|| tracing::warn!(timeout_secs, "Analyze request timed out"));
                Err(AnalyticsError::DeadlineExceeded { timeout_secs })
            }
        }
    }

    async fn run(
        &self,
        request: StatRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AnalyticsError> {
        let validator = StatRequestValidator::new(self.scopes.as_ref(), &self.config);
        let query = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AnalyticsError::Cancelled),
            query = validator.validate(request) => query?,
        };
        tracing::debug!(stage = "validated", scopes = query.scope.len(), limit = ?query.limit);

        let plan = self.planner.plan(query.range, query.unit)?;
        tracing::debug!(stage = "planned", buckets = plan.buckets.len());

        let builder = AggregationQueryBuilder::new(&query, &plan, self.config.default_top_limit);
        let specs = registry::resolve(query.domain, query.metric)?;

        let result = match (query.metric, specs.as_slice()) {
            (MetricKind::Overview, _) => {
                AnalysisResult::Overview(self.overview(query.domain, &builder, &specs, cancel).await?)
            }
            (_, &[spec]) => {
                let value = self.run_metric(&builder, spec, cancel).await?;
                tracing::debug!(stage = "composed", field = spec.field);
                AnalysisResult::Metric(value)
            }
            _ => {
                return Err(ValidationError::MetricUnavailable {
                    domain: query.domain,
                    metric: query.metric,
                }
                .into());
            }
        };
        tracing::debug!(stage = "returned");
        Ok(result)
    }

    /// Fetch, zero-fill and compute one metric
    async fn run_metric(
        &self,
        builder: &AggregationQueryBuilder<'_>,
        spec: &'static MetricSpec,
        cancel: &CancellationToken,
    ) -> Result<MetricResult, AnalyticsError> {
        let request = builder.build(spec)?;
        tracing::debug!(
            stage = "fetching",
            field = spec.field,
            table = request.table.name,
            windows = request.windows.len()
        );
        let rows = self.fetch(spec, &request, cancel).await?;

        tracing::debug!(stage = "computing", field = spec.field, rows = rows.len());
        let raws = builder.materialize(spec, &rows);
        Ok(compute(spec.computer, &raws, builder.limit()))
    }

    /// One storage read, holding a process-wide permit and racing cancellation
    async fn fetch(
        &self,
        spec: &MetricSpec,
        request: &AggregateRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<AggregateRow>, AnalyticsError> {
        let _permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AnalyticsError::Cancelled),
            permit = self.permits.acquire() => permit.map_err(|_| AnalyticsError::Cancelled)?,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalyticsError::Cancelled),
            rows = self.aggregates.fetch_aggregates(request) => {
                rows.map_err(|e| AnalyticsError::storage(spec.field, e))
            }
        }
    }

    async fn overview(
        &self,
        domain: DomainKind,
        builder: &AggregationQueryBuilder<'_>,
        specs: &[&'static MetricSpec],
        cancel: &CancellationToken,
    ) -> Result<OverviewResult, AnalyticsError> {
        let policy = self.config.overview_policy;
        let mut outcomes: Vec<(usize, Result<MetricResult, AnalyticsError>)> =
            Vec::with_capacity(specs.len());

        // Built up front: a lazily mapped stream trips the higher-ranked Send
        // check on axum handlers
        let pipelines: Vec<_> = specs
            .iter()
            .copied()
            .enumerate()
            .map(|(idx, spec)| async move { (idx, self.run_metric(builder, spec, cancel).await) })
            .collect();
        let mut pipelines =
            futures::stream::iter(pipelines).buffer_unordered(self.config.request_concurrency);

        while let Some((idx, outcome)) = pipelines.next().await {
            let field = specs[idx].field;
            let outcome = match outcome {
                // Returning drops the stream and abandons the remaining pipelines
                Err(e) if policy == OverviewPolicy::Strict || !e.is_degradable() => {
                    tracing::debug!(field, error = %e, "Overview aborted");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(field, error = %e, "Overview field unavailable");
                    Err(e)
                }
                ok => ok,
            };
            outcomes.push((idx, outcome));
        }

        outcomes.sort_by_key(|(idx, _)| *idx);
        let fields: Vec<OverviewField> = outcomes
            .into_iter()
            .map(|(idx, outcome)| {
                let spec = specs[idx];
                let (value, error) = match outcome {
                    Ok(value) => (Some(value), None),
                    Err(e) => (None, Some(e.to_field_error())),
                };
                OverviewField {
                    name: spec.field.to_string(),
                    metric: spec.kind,
                    value,
                    error,
                }
            })
            .collect();

        let failed = fields.iter().filter(|f| f.error.is_some()).count();
        tracing::debug!(stage = "composed", fields = fields.len(), failed);

        Ok(OverviewResult {
            domain,
            policy,
            fields,
        })
    }
}
