//! Aggregate request building and zero-filling
//!
//! [`AggregationQueryBuilder::build`] turns a registered metric into a storage
//! request; [`AggregationQueryBuilder::materialize`] maps the returned rows
//! back onto the bucket plan so that every bucket and every known group key
//! has an entry, with zeros where storage had nothing.

use std::collections::HashMap;

use chrono::NaiveTime;

use super::error::ValidationError;
use super::registry::{Computer, MetricSpec, Shape};
use super::types::{Bucket, BucketPlan, RawAggregate, StatQuery};
use crate::data::types::{AggregateRequest, AggregateRow, RankLimit, ScopeCondition, TimeWindow};

pub struct AggregationQueryBuilder<'a> {
    query: &'a StatQuery,
    plan: &'a BucketPlan,
    default_limit: u32,
}

impl<'a> AggregationQueryBuilder<'a> {
    pub fn new(query: &'a StatQuery, plan: &'a BucketPlan, default_limit: u32) -> Self {
        Self {
            query,
            plan,
            default_limit,
        }
    }

    /// Effective top-N limit of the request
    pub fn limit(&self) -> u32 {
        self.query.limit.unwrap_or(self.default_limit)
    }

    /// Scope conditions for a spec's source table
    pub fn scope_conditions(
        &self,
        spec: &MetricSpec,
    ) -> Result<Vec<ScopeCondition>, ValidationError> {
        self.query
            .scope
            .iter()
            .map(|scope| {
                spec.aggregate
                    .table
                    .scope_column(scope.kind)
                    .map(|column| ScopeCondition {
                        column,
                        value: scope.id,
                    })
                    .ok_or(ValidationError::ScopeUnsupported {
                        domain: self.query.domain,
                        metric: spec.kind,
                        scope: scope.kind,
                    })
            })
            .collect()
    }

    pub fn build(&self, spec: &MetricSpec) -> Result<AggregateRequest, ValidationError> {
        let aggregate = &spec.aggregate;
        let windows = self
            .buckets(aggregate.shape)
            .into_iter()
            .enumerate()
            .map(|(idx, bucket)| TimeWindow {
                idx: idx as i64,
                start: bucket.start.and_time(NaiveTime::MIN),
                end: bucket.end.and_time(NaiveTime::MIN),
            })
            .collect();

        let rank = match spec.computer {
            Computer::Ranking { by } => Some(RankLimit {
                by,
                limit: self.limit(),
            }),
            _ => None,
        };

        Ok(AggregateRequest {
            table: aggregate.table,
            time_column: aggregate.time,
            windows,
            visibility: aggregate.visibility,
            predicates: aggregate.predicates,
            scope: self.scope_conditions(spec)?,
            measure: aggregate.measure,
            dimension: aggregate.dimension,
            rank,
        })
    }

    /// Zero-filled aggregates: every window, and within it every known or
    /// observed group key
    pub fn materialize(&self, spec: &MetricSpec, rows: &[AggregateRow]) -> Vec<RawAggregate> {
        let buckets = self.buckets(spec.aggregate.shape);
        let has_measure = spec.aggregate.measure.is_some();
        let sum = |row: Option<&AggregateRow>| {
            has_measure.then(|| row.map(|r| r.total).unwrap_or(0.0))
        };

        let Some(dimension) = spec.aggregate.dimension else {
            return buckets
                .into_iter()
                .enumerate()
                .map(|(idx, bucket)| {
                    let row = rows.iter().find(|r| r.window_idx == idx as i64);
                    RawAggregate {
                        bucket,
                        group_key: None,
                        label: None,
                        count: row.map(|r| r.count).unwrap_or(0),
                        sum: sum(row),
                    }
                })
                .collect();
        };

        let mut keys: Vec<String> = dimension.known_keys.iter().map(|k| k.to_string()).collect();
        let mut labels: HashMap<&str, &str> = HashMap::new();
        let mut by_cell: HashMap<(i64, &str), &AggregateRow> = HashMap::new();
        for row in rows {
            let Some(key) = row.group_key.as_deref() else {
                continue;
            };
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
            if let Some(label) = row.label.as_deref() {
                labels.entry(key).or_insert(label);
            }
            by_cell.entry((row.window_idx, key)).or_insert(row);
        }

        let mut out = Vec::with_capacity(buckets.len() * keys.len().max(1));
        for (idx, bucket) in buckets.into_iter().enumerate() {
            if keys.is_empty() {
                out.push(RawAggregate {
                    bucket,
                    group_key: None,
                    label: None,
                    count: 0,
                    sum: sum(None),
                });
                continue;
            }
            for key in &keys {
                let row = by_cell.get(&(idx as i64, key.as_str())).copied();
                out.push(RawAggregate {
                    bucket,
                    group_key: Some(key.clone()),
                    label: labels.get(key.as_str()).map(|l| l.to_string()),
                    count: row.map(|r| r.count).unwrap_or(0),
                    sum: sum(row),
                });
            }
        }
        out
    }

    fn buckets(&self, shape: Shape) -> Vec<Bucket> {
        match shape {
            Shape::Series => self.plan.buckets.clone(),
            Shape::Totals => self.plan.span().into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::analytics::registry::lookup;
    use crate::domain::analytics::types::{BucketUnit, DateRange, DomainKind, MetricKind};
    use crate::data::types::{RankBy, ScopeKind, ScopeRef, Visibility};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn quarter_plan() -> BucketPlan {
        BucketPlan {
            unit: BucketUnit::Month,
            buckets: vec![
                Bucket {
                    start: d(1, 1),
                    end: d(2, 1),
                },
                Bucket {
                    start: d(2, 1),
                    end: d(3, 1),
                },
                Bucket {
                    start: d(3, 1),
                    end: d(4, 1),
                },
            ],
        }
    }

    fn query(domain: DomainKind, metric: MetricKind, scope: Vec<ScopeRef>) -> StatQuery {
        StatQuery {
            domain,
            metric,
            range: DateRange {
                start: d(1, 1),
                end: d(3, 31),
            },
            unit: BucketUnit::Month,
            limit: None,
            scope,
        }
    }

    fn row(idx: i64, key: Option<&str>, label: Option<&str>, count: i64, total: f64) -> AggregateRow {
        AggregateRow {
            window_idx: idx,
            group_key: key.map(str::to_string),
            label: label.map(str::to_string),
            count,
            total,
        }
    }

    #[test]
    fn test_series_request_has_one_window_per_bucket() {
        let plan = quarter_plan();
        let q = query(
            DomainKind::Posts,
            MetricKind::Count,
            vec![ScopeRef::new(ScopeKind::Category, 2)],
        );
        let builder = AggregationQueryBuilder::new(&q, &plan, 10);
        let spec = lookup(DomainKind::Posts, MetricKind::Count).unwrap();

        let req = builder.build(spec).unwrap();
        assert_eq!(req.windows.len(), 3);
        assert_eq!(req.windows[1].start, d(2, 1).and_time(NaiveTime::MIN));
        assert_eq!(req.windows[2].end, d(4, 1).and_time(NaiveTime::MIN));
        assert_eq!(req.scope[0].column, "ctgry_no");
        assert_eq!(req.scope[0].value, 2);
        assert_eq!(req.visibility, Visibility::ActiveOnly);
        assert!(req.rank.is_none());
    }

    #[test]
    fn test_ranking_request_spans_range_with_limit() {
        let plan = quarter_plan();
        let mut q = query(DomainKind::Users, MetricKind::Top, Vec::new());
        let builder = AggregationQueryBuilder::new(&q, &plan, 10);
        let spec = lookup(DomainKind::Users, MetricKind::Top).unwrap();

        let req = builder.build(spec).unwrap();
        assert_eq!(req.windows.len(), 1);
        assert_eq!(req.windows[0].start, d(1, 1).and_time(NaiveTime::MIN));
        assert_eq!(req.windows[0].end, d(4, 1).and_time(NaiveTime::MIN));
        assert_eq!(
            req.rank,
            Some(RankLimit {
                by: RankBy::Count,
                limit: 10
            })
        );

        q.limit = Some(3);
        let builder = AggregationQueryBuilder::new(&q, &plan, 10);
        assert_eq!(builder.build(spec).unwrap().rank.unwrap().limit, 3);
    }

    #[test]
    fn test_unsupported_scope_rejected() {
        let plan = quarter_plan();
        let q = query(
            DomainKind::Users,
            MetricKind::Count,
            vec![ScopeRef::new(ScopeKind::Tag, 1)],
        );
        let builder = AggregationQueryBuilder::new(&q, &plan, 10);
        let spec = lookup(DomainKind::Users, MetricKind::Count).unwrap();
        assert_eq!(
            builder.build(spec).unwrap_err(),
            ValidationError::ScopeUnsupported {
                domain: DomainKind::Users,
                metric: MetricKind::Count,
                scope: ScopeKind::Tag
            }
        );
    }

    #[test]
    fn test_materialize_fills_missing_buckets() {
        let plan = quarter_plan();
        let q = query(DomainKind::Posts, MetricKind::Count, Vec::new());
        let builder = AggregationQueryBuilder::new(&q, &plan, 10);
        let spec = lookup(DomainKind::Posts, MetricKind::Count).unwrap();

        let raws = builder.materialize(spec, &[row(0, None, None, 10, 0.0), row(2, None, None, 5, 0.0)]);
        let counts: Vec<i64> = raws.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![10, 0, 5]);
        assert_eq!(raws[1].bucket.start, d(2, 1));
        assert!(raws.iter().all(|r| r.sum.is_none()));
    }

    #[test]
    fn test_materialize_zero_fills_known_keys() {
        let plan = quarter_plan();
        let q = query(DomainKind::Posts, MetricKind::Distribution, Vec::new());
        let builder = AggregationQueryBuilder::new(&q, &plan, 10);
        let spec = lookup(DomainKind::Posts, MetricKind::Distribution).unwrap();

        let raws = builder.materialize(
            spec,
            &[
                row(0, Some("FINISHED"), None, 10, 0.0),
                row(0, Some("DRAFT"), None, 1, 0.0),
                row(0, None, None, 0, 0.0),
            ],
        );
        let keys: Vec<(&str, i64)> = raws
            .iter()
            .map(|r| (r.group_key.as_deref().unwrap(), r.count))
            .collect();
        assert_eq!(
            keys,
            vec![("EMPTY", 0), ("WRITING", 0), ("FINISHED", 10), ("DRAFT", 1)]
        );
        assert!(raws.iter().all(|r| r.bucket == plan.span().unwrap()));
    }

    #[test]
    fn test_materialize_without_any_group_keeps_bucket() {
        let plan = quarter_plan();
        let q = query(DomainKind::Tags, MetricKind::Top, Vec::new());
        let builder = AggregationQueryBuilder::new(&q, &plan, 10);
        let spec = lookup(DomainKind::Tags, MetricKind::Top).unwrap();

        let raws = builder.materialize(spec, &[row(0, None, None, 0, 0.0)]);
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].group_key, None);
        assert_eq!(raws[0].count, 0);
    }

    #[test]
    fn test_materialize_carries_labels_and_measure() {
        let plan = quarter_plan();
        let q = query(DomainKind::Posts, MetricKind::Top, Vec::new());
        let builder = AggregationQueryBuilder::new(&q, &plan, 10);
        let spec = lookup(DomainKind::Posts, MetricKind::Top).unwrap();

        let raws = builder.materialize(spec, &[row(0, Some("7"), Some("Post 7"), 1, 70.0)]);
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].label.as_deref(), Some("Post 7"));
        assert_eq!(raws[0].sum, Some(70.0));
    }
}
