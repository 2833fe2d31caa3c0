//! Request validation
//!
//! Checks run in a fixed order and stop at the first violation: range,
//! unit, limit, scope merging, scope applicability, then scope existence.
//! Only the last one touches storage.

use super::error::{AnalyticsError, ValidationError};
use super::registry;
use super::types::{BucketUnit, DateRange, DomainKind, ScopeFilter, StatQuery, StatRequest};
use crate::core::config::AnalyticsConfig;
use crate::core::constants::MAX_LIMIT;
use crate::data::traits::ScopeRepository;
use crate::data::types::ScopeRef;

/// Metric name attached to storage failures of the existence lookup
const SCOPE_LOOKUP: &str = "scope_lookup";

pub struct StatRequestValidator<'a> {
    scopes: &'a dyn ScopeRepository,
    config: &'a AnalyticsConfig,
}

impl<'a> StatRequestValidator<'a> {
    pub fn new(scopes: &'a dyn ScopeRepository, config: &'a AnalyticsConfig) -> Self {
        Self { scopes, config }
    }

    pub async fn validate(&self, request: StatRequest) -> Result<StatQuery, AnalyticsError> {
        let StatRequest {
            domain,
            metric,
            start,
            end,
            unit,
            limit,
            scope_no,
            scope,
        } = request;

        if start > end {
            return Err(ValidationError::InvalidRange { start, end }.into());
        }

        let unit = BucketUnit::parse_lenient(&unit);
        if !self.config.allowed_units.contains(&unit) {
            return Err(ValidationError::InvalidUnit(unit.to_string()).into());
        }

        let limit = check_limit(limit)?;
        let scope = merge_scope(domain, scope_no, scope)?;

        for spec in registry::resolve(domain, metric)? {
            for r in &scope {
                if spec.aggregate.table.scope_column(r.kind).is_none() {
                    return Err(ValidationError::ScopeUnsupported {
                        domain,
                        metric: spec.kind,
                        scope: r.kind,
                    }
                    .into());
                }
            }
        }

        for r in &scope {
            let exists = self
                .scopes
                .scope_exists(*r)
                .await
                .map_err(|e| AnalyticsError::storage(SCOPE_LOOKUP, e))?;
            if !exists {
                return Err(ValidationError::ScopeNotFound(*r).into());
            }
        }

        Ok(StatQuery {
            domain,
            metric,
            range: DateRange { start, end },
            unit,
            limit,
            scope,
        })
    }
}

/// Positive limits only; anything above the maximum is clamped
fn check_limit(limit: Option<i64>) -> Result<Option<u32>, ValidationError> {
    match limit {
        None => Ok(None),
        Some(n) if n <= 0 => Err(ValidationError::InvalidLimit(n)),
        Some(n) => Ok(Some(n.min(MAX_LIMIT as i64) as u32)),
    }
}

/// Fold the `scopeNo` alias into the domain's primary scope
fn merge_scope(
    domain: DomainKind,
    scope_no: Option<i64>,
    mut scope: ScopeFilter,
) -> Result<Vec<ScopeRef>, ValidationError> {
    if let Some(alias) = scope_no {
        let kind = domain
            .primary_scope()
            .ok_or(ValidationError::NoPrimaryScope(domain))?;
        match scope.get(kind) {
            Some(explicit) if explicit != alias => {
                return Err(ValidationError::ScopeConflict {
                    kind,
                    alias,
                    explicit,
                });
            }
            _ => scope.set(kind, alias),
        }
    }
    Ok(scope.refs())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::data::DataError;
    use crate::data::types::ScopeKind;
    use crate::domain::analytics::types::MetricKind;

    /// Knows a fixed set of live scopes and counts lookups
    struct FakeScopes {
        live: Vec<ScopeRef>,
        broken: bool,
        calls: AtomicUsize,
    }

    impl FakeScopes {
        fn new(live: Vec<ScopeRef>) -> Self {
            Self {
                live,
                broken: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ScopeRepository for FakeScopes {
        async fn scope_exists(&self, scope: ScopeRef) -> Result<bool, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(DataError::backend_unavailable("sqlite", "pool closed"));
            }
            Ok(self.live.contains(&scope))
        }
    }

    fn request(domain: DomainKind, metric: MetricKind) -> StatRequest {
        StatRequest {
            domain,
            metric,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            unit: "month".to_string(),
            limit: None,
            scope_no: None,
            scope: ScopeFilter::default(),
        }
    }

    async fn run(
        scopes: &FakeScopes,
        config: &AnalyticsConfig,
        req: StatRequest,
    ) -> Result<StatQuery, AnalyticsError> {
        StatRequestValidator::new(scopes, config).validate(req).await
    }

    fn validation(result: Result<StatQuery, AnalyticsError>) -> ValidationError {
        match result {
            Err(AnalyticsError::Validation(e)) => e,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_valid_request() {
        let scopes = FakeScopes::new(vec![ScopeRef::new(ScopeKind::Category, 1)]);
        let config = AnalyticsConfig::default();
        let mut req = request(DomainKind::Posts, MetricKind::Count);
        req.scope_no = Some(1);
        req.limit = Some(5);

        let query = run(&scopes, &config, req).await.unwrap();
        assert_eq!(query.unit, BucketUnit::Month);
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.scope, vec![ScopeRef::new(ScopeKind::Category, 1)]);
        assert_eq!(scopes.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_range_checked_before_storage() {
        let scopes = FakeScopes::new(Vec::new());
        let config = AnalyticsConfig::default();
        let mut req = request(DomainKind::Posts, MetricKind::Count);
        req.start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        req.scope_no = Some(1);

        let err = validation(run(&scopes, &config, req).await);
        assert_eq!(err.code(), "INVALID_RANGE");
        assert_eq!(scopes.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_unit_falls_back_to_day() {
        let scopes = FakeScopes::new(Vec::new());
        let config = AnalyticsConfig::default();
        let mut req = request(DomainKind::Users, MetricKind::Count);
        req.unit = "fortnight".to_string();

        let query = run(&scopes, &config, req).await.unwrap();
        assert_eq!(query.unit, BucketUnit::Day);
    }

    #[tokio::test]
    async fn test_disallowed_unit_rejected() {
        let scopes = FakeScopes::new(Vec::new());
        let config = AnalyticsConfig {
            allowed_units: vec![BucketUnit::Month, BucketUnit::Year],
            ..Default::default()
        };
        let mut req = request(DomainKind::Users, MetricKind::Count);
        req.unit = " Week ".to_string();

        let err = validation(run(&scopes, &config, req).await);
        assert_eq!(err, ValidationError::InvalidUnit("week".to_string()));
    }

    #[tokio::test]
    async fn test_limit_bounds() {
        let scopes = FakeScopes::new(Vec::new());
        let config = AnalyticsConfig::default();

        for bad in [0, -3] {
            let mut req = request(DomainKind::Users, MetricKind::Top);
            req.limit = Some(bad);
            let err = validation(run(&scopes, &config, req).await);
            assert_eq!(err, ValidationError::InvalidLimit(bad));
        }

        let mut req = request(DomainKind::Users, MetricKind::Top);
        req.limit = Some(5000);
        let query = run(&scopes, &config, req).await.unwrap();
        assert_eq!(query.limit, Some(MAX_LIMIT));
    }

    #[tokio::test]
    async fn test_scope_alias_conflict() {
        let scopes = FakeScopes::new(Vec::new());
        let config = AnalyticsConfig::default();
        let mut req = request(DomainKind::Posts, MetricKind::Count);
        req.scope_no = Some(1);
        req.scope.ctgry_no = Some(2);

        let err = validation(run(&scopes, &config, req).await);
        assert_eq!(
            err,
            ValidationError::ScopeConflict {
                kind: ScopeKind::Category,
                alias: 1,
                explicit: 2
            }
        );
    }

    #[tokio::test]
    async fn test_scope_alias_without_primary_scope() {
        let scopes = FakeScopes::new(Vec::new());
        let config = AnalyticsConfig::default();
        let mut req = request(DomainKind::Users, MetricKind::Count);
        req.scope_no = Some(1);

        let err = validation(run(&scopes, &config, req).await);
        assert_eq!(err, ValidationError::NoPrimaryScope(DomainKind::Users));
        assert_eq!(err.code(), "SCOPE_UNSUPPORTED");
    }

    #[tokio::test]
    async fn test_scope_not_applicable_to_overview_field() {
        let scopes = FakeScopes::new(vec![ScopeRef::new(ScopeKind::Tag, 1)]);
        let config = AnalyticsConfig::default();
        let mut req = request(DomainKind::Posts, MetricKind::Overview);
        req.scope.tag_no = Some(1);

        let err = validation(run(&scopes, &config, req).await);
        assert_eq!(err.code(), "SCOPE_UNSUPPORTED");
        assert_eq!(scopes.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_scope() {
        let scopes = FakeScopes::new(Vec::new());
        let config = AnalyticsConfig::default();
        let mut req = request(DomainKind::Comments, MetricKind::Count);
        req.scope_no = Some(16);

        let err = validation(run(&scopes, &config, req).await);
        assert_eq!(
            err,
            ValidationError::ScopeNotFound(ScopeRef::new(ScopeKind::Post, 16))
        );
    }

    #[tokio::test]
    async fn test_scope_lookup_failure_is_storage_error() {
        let mut scopes = FakeScopes::new(Vec::new());
        scopes.broken = true;
        let config = AnalyticsConfig::default();
        let mut req = request(DomainKind::Tags, MetricKind::Count);
        req.scope_no = Some(1);

        let err = run(&scopes, &config, req).await.unwrap_err();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}
