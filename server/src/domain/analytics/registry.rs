//! Metric registry
//!
//! Every `(DomainKind, MetricKind)` pair resolves to a static [`MetricSpec`]:
//! the aggregate to fetch and the computer that turns it into a result.
//! Adding a metric means adding one entry here; nothing else is per-domain.

use serde::Serialize;
use utoipa::ToSchema;

use super::error::ValidationError;
use super::types::{DomainKind, MetricKind};
use crate::data::types::{
    Dimension, LabelSource, Measure, Predicate, RankBy, ScopeKind, SourceTable, TimeColumn,
    Visibility, tables,
};

// ============================================================================
// SPEC TYPES
// ============================================================================

/// Time layout of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One window per bucket
    Series,
    /// One window spanning the whole plan
    Totals,
}

/// Column of a raw aggregate a computer reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Row count
    Count,
    /// Measure value
    Total,
}

/// Pure transform applied to the fetched aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Computer {
    CountSeries,
    Growth,
    Ratio { part: Operand, whole: Operand },
    Average {
        numerator: Operand,
        denominator: Operand,
    },
    Ranking { by: RankBy },
    Distribution,
}

/// Aggregate fetched for a metric
#[derive(Debug, Clone, Copy)]
pub struct AggregateSpec {
    pub table: &'static SourceTable,
    pub time: TimeColumn,
    pub shape: Shape,
    pub visibility: Visibility,
    pub predicates: &'static [Predicate],
    pub measure: Option<Measure>,
    pub dimension: Option<&'static Dimension>,
}

/// Registered metric of one domain
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    pub kind: MetricKind,
    /// Field name inside an overview
    pub field: &'static str,
    pub aggregate: AggregateSpec,
    pub computer: Computer,
}

// ============================================================================
// BUILDING BLOCKS
// ============================================================================

const STILL_ACTIVE: &[Predicate] = &[Predicate::Eq("use_yn", "Y"), Predicate::Eq("del_yn", "N")];
const SOFT_DELETED: &[Predicate] = &[Predicate::Eq("del_yn", "Y")];

const COUNT_OVER_TOTAL: Computer = Computer::Average {
    numerator: Operand::Count,
    denominator: Operand::Total,
};
const TOTAL_OVER_COUNT: Computer = Computer::Ratio {
    part: Operand::Total,
    whole: Operand::Count,
};

/// Rows created per bucket (active only)
const fn created(table: &'static SourceTable) -> AggregateSpec {
    AggregateSpec {
        table,
        time: TimeColumn::Created,
        shape: Shape::Series,
        visibility: Visibility::ActiveOnly,
        predicates: &[],
        measure: None,
        dimension: None,
    }
}

/// Rows created per bucket with a measure
const fn measured(table: &'static SourceTable, measure: Measure) -> AggregateSpec {
    AggregateSpec {
        measure: Some(measure),
        ..created(table)
    }
}

/// All rows created per bucket, deleted included, measuring the survivors
const fn retained(table: &'static SourceTable) -> AggregateSpec {
    AggregateSpec {
        visibility: Visibility::IncludeDeleted,
        measure: Some(Measure::CountWhere(STILL_ACTIVE)),
        ..created(table)
    }
}

/// Rows soft-deleted per bucket
const fn removed(table: &'static SourceTable) -> AggregateSpec {
    AggregateSpec {
        time: TimeColumn::Updated,
        visibility: Visibility::IncludeDeleted,
        predicates: SOFT_DELETED,
        ..created(table)
    }
}

/// Whole-range totals grouped by a dimension
const fn grouped(table: &'static SourceTable, dimension: &'static Dimension) -> AggregateSpec {
    AggregateSpec {
        shape: Shape::Totals,
        dimension: Some(dimension),
        ..created(table)
    }
}

const fn spec(
    kind: MetricKind,
    field: &'static str,
    aggregate: AggregateSpec,
    computer: Computer,
) -> MetricSpec {
    MetricSpec {
        kind,
        field,
        aggregate,
        computer,
    }
}

// ============================================================================
// DIMENSIONS
// ============================================================================

static AUTHOR: Dimension = Dimension {
    column: "user_no",
    label: Some(LabelSource::Joined {
        table: "user_info",
        key_column: "user_no",
        label_column: "user_nm",
    }),
    known_keys: &[],
};

static USER_ROLE: Dimension = Dimension {
    column: "user_role",
    label: None,
    known_keys: &["ADMIN", "USER"],
};

static POST: Dimension = Dimension {
    column: "pst_no",
    label: Some(LabelSource::Own("pst_ttl")),
    known_keys: &[],
};

static POST_STATUS: Dimension = Dimension {
    column: "pst_stts",
    label: None,
    known_keys: &["EMPTY", "WRITING", "FINISHED"],
};

static COMMENTED_POST: Dimension = Dimension {
    column: "pst_no",
    label: Some(LabelSource::Joined {
        table: "pst_info",
        key_column: "pst_no",
        label_column: "pst_ttl",
    }),
    known_keys: &[],
};

static COMMENT_STATUS: Dimension = Dimension {
    column: "cmnt_stts",
    label: None,
    known_keys: &["PENDING", "APPROVED", "REJECTED", "SPAM"],
};

static TAG: Dimension = Dimension {
    column: "tag_no",
    label: Some(LabelSource::Joined {
        table: "tag_info",
        key_column: "tag_no",
        label_column: "tag_nm",
    }),
    known_keys: &[],
};

static CATEGORY: Dimension = Dimension {
    column: "ctgry_no",
    label: Some(LabelSource::Joined {
        table: "ctgry_info",
        key_column: "ctgry_no",
        label_column: "ctgry_nm",
    }),
    known_keys: &[],
};

static SUBSCRIPTION_TYPE: Dimension = Dimension {
    column: "sbcr_type",
    label: None,
    known_keys: &["CATEGORY", "TAG"],
};

// ============================================================================
// DOMAIN TABLES
// ============================================================================

static USERS: [MetricSpec; 8] = [
    spec(MetricKind::Count, "new_users", created(&tables::USER_INFO), Computer::CountSeries),
    spec(MetricKind::GrowthRate, "user_growth", created(&tables::USER_INFO), Computer::Growth),
    spec(MetricKind::RetentionRate, "user_retention", retained(&tables::USER_INFO), TOTAL_OVER_COUNT),
    spec(
        MetricKind::Top,
        "top_authors",
        grouped(&tables::PST_INFO, &AUTHOR),
        Computer::Ranking { by: RankBy::Count },
    ),
    spec(
        MetricKind::Distribution,
        "role_distribution",
        grouped(&tables::USER_INFO, &USER_ROLE),
        Computer::Distribution,
    ),
    spec(
        MetricKind::Average,
        "posts_per_user",
        measured(&tables::PST_INFO, Measure::Distinct("user_no")),
        COUNT_OVER_TOTAL,
    ),
    spec(
        MetricKind::Efficiency,
        "active_ratio",
        measured(&tables::USER_INFO, Measure::CountWhere(&[Predicate::NotNull("lst_lgn_dt")])),
        TOTAL_OVER_COUNT,
    ),
    spec(MetricKind::Lifecycle, "withdrawn_users", removed(&tables::USER_INFO), Computer::CountSeries),
];

static POSTS: [MetricSpec; 8] = [
    spec(MetricKind::Count, "new_posts", created(&tables::PST_INFO), Computer::CountSeries),
    spec(MetricKind::GrowthRate, "post_growth", created(&tables::PST_INFO), Computer::Growth),
    spec(MetricKind::RetentionRate, "post_retention", retained(&tables::PST_INFO), TOTAL_OVER_COUNT),
    spec(
        MetricKind::Top,
        "top_viewed",
        AggregateSpec {
            measure: Some(Measure::Sum("pst_view_cnt")),
            ..grouped(&tables::PST_INFO, &POST)
        },
        Computer::Ranking { by: RankBy::Total },
    ),
    spec(
        MetricKind::Distribution,
        "status_distribution",
        grouped(&tables::PST_INFO, &POST_STATUS),
        Computer::Distribution,
    ),
    spec(
        MetricKind::Average,
        "avg_views",
        measured(&tables::PST_INFO, Measure::Sum("pst_view_cnt")),
        Computer::Average {
            numerator: Operand::Total,
            denominator: Operand::Count,
        },
    ),
    spec(
        MetricKind::Efficiency,
        "publish_ratio",
        measured(&tables::PST_INFO, Measure::CountWhere(&[Predicate::Eq("pst_stts", "FINISHED")])),
        TOTAL_OVER_COUNT,
    ),
    spec(MetricKind::Lifecycle, "deleted_posts", removed(&tables::PST_INFO), Computer::CountSeries),
];

static COMMENTS: [MetricSpec; 8] = [
    spec(MetricKind::Count, "new_comments", created(&tables::CMNT_INFO), Computer::CountSeries),
    spec(MetricKind::GrowthRate, "comment_growth", created(&tables::CMNT_INFO), Computer::Growth),
    spec(
        MetricKind::RetentionRate,
        "comment_retention",
        retained(&tables::CMNT_INFO),
        TOTAL_OVER_COUNT,
    ),
    spec(
        MetricKind::Top,
        "most_commented_posts",
        grouped(&tables::CMNT_INFO, &COMMENTED_POST),
        Computer::Ranking { by: RankBy::Count },
    ),
    spec(
        MetricKind::Distribution,
        "status_distribution",
        grouped(&tables::CMNT_INFO, &COMMENT_STATUS),
        Computer::Distribution,
    ),
    spec(
        MetricKind::Average,
        "comments_per_post",
        measured(&tables::CMNT_INFO, Measure::Distinct("pst_no")),
        COUNT_OVER_TOTAL,
    ),
    spec(
        MetricKind::Efficiency,
        "approval_ratio",
        measured(&tables::CMNT_INFO, Measure::CountWhere(&[Predicate::Eq("cmnt_stts", "APPROVED")])),
        TOTAL_OVER_COUNT,
    ),
    spec(MetricKind::Lifecycle, "deleted_comments", removed(&tables::CMNT_INFO), Computer::CountSeries),
];

static TAGS: [MetricSpec; 8] = [
    spec(MetricKind::Count, "new_tags", created(&tables::TAG_INFO), Computer::CountSeries),
    spec(MetricKind::GrowthRate, "tag_growth", created(&tables::TAG_INFO), Computer::Growth),
    spec(MetricKind::RetentionRate, "tag_retention", retained(&tables::TAG_INFO), TOTAL_OVER_COUNT),
    spec(
        MetricKind::Top,
        "top_tags",
        grouped(&tables::PST_TAG_MAP, &TAG),
        Computer::Ranking { by: RankBy::Count },
    ),
    spec(
        MetricKind::Distribution,
        "usage_distribution",
        grouped(&tables::PST_TAG_MAP, &TAG),
        Computer::Distribution,
    ),
    spec(
        MetricKind::Average,
        "tags_per_post",
        measured(&tables::PST_TAG_MAP, Measure::Distinct("pst_no")),
        COUNT_OVER_TOTAL,
    ),
    spec(
        MetricKind::Efficiency,
        "diversity_ratio",
        measured(&tables::PST_TAG_MAP, Measure::Distinct("tag_no")),
        TOTAL_OVER_COUNT,
    ),
    spec(MetricKind::Lifecycle, "deleted_tags", removed(&tables::TAG_INFO), Computer::CountSeries),
];

static CATEGORIES: [MetricSpec; 8] = [
    spec(MetricKind::Count, "new_categories", created(&tables::CTGRY_INFO), Computer::CountSeries),
    spec(MetricKind::GrowthRate, "category_growth", created(&tables::CTGRY_INFO), Computer::Growth),
    spec(
        MetricKind::RetentionRate,
        "category_retention",
        retained(&tables::CTGRY_INFO),
        TOTAL_OVER_COUNT,
    ),
    spec(
        MetricKind::Top,
        "top_categories",
        grouped(&tables::PST_INFO, &CATEGORY),
        Computer::Ranking { by: RankBy::Count },
    ),
    spec(
        MetricKind::Distribution,
        "post_distribution",
        grouped(&tables::PST_INFO, &CATEGORY),
        Computer::Distribution,
    ),
    spec(
        MetricKind::Average,
        "posts_per_category",
        measured(&tables::PST_INFO, Measure::Distinct("ctgry_no")),
        COUNT_OVER_TOTAL,
    ),
    spec(
        MetricKind::Efficiency,
        "subcategory_ratio",
        measured(&tables::CTGRY_INFO, Measure::CountWhere(&[Predicate::NotNull("up_ctgry_no")])),
        TOTAL_OVER_COUNT,
    ),
    spec(
        MetricKind::Lifecycle,
        "deleted_categories",
        removed(&tables::CTGRY_INFO),
        Computer::CountSeries,
    ),
];

static SUBSCRIPTIONS: [MetricSpec; 8] = [
    spec(MetricKind::Count, "new_subscriptions", created(&tables::SBCR_INFO), Computer::CountSeries),
    spec(
        MetricKind::GrowthRate,
        "subscription_growth",
        created(&tables::SBCR_INFO),
        Computer::Growth,
    ),
    spec(
        MetricKind::RetentionRate,
        "subscription_retention",
        retained(&tables::SBCR_INFO),
        TOTAL_OVER_COUNT,
    ),
    spec(
        MetricKind::Top,
        "top_subscribed_categories",
        grouped(&tables::SBCR_INFO, &CATEGORY),
        Computer::Ranking { by: RankBy::Count },
    ),
    spec(
        MetricKind::Distribution,
        "type_distribution",
        grouped(&tables::SBCR_INFO, &SUBSCRIPTION_TYPE),
        Computer::Distribution,
    ),
    spec(
        MetricKind::Average,
        "subscriptions_per_user",
        measured(&tables::SBCR_INFO, Measure::Distinct("user_no")),
        COUNT_OVER_TOTAL,
    ),
    spec(
        MetricKind::Efficiency,
        "category_ratio",
        measured(&tables::SBCR_INFO, Measure::CountWhere(&[Predicate::Eq("sbcr_type", "CATEGORY")])),
        TOTAL_OVER_COUNT,
    ),
    spec(
        MetricKind::Lifecycle,
        "cancelled_subscriptions",
        removed(&tables::SBCR_INFO),
        Computer::CountSeries,
    ),
];

// ============================================================================
// LOOKUP
// ============================================================================

/// All registered metrics of a domain, in overview field order
pub fn metrics(domain: DomainKind) -> &'static [MetricSpec] {
    match domain {
        DomainKind::Users => &USERS,
        DomainKind::Posts => &POSTS,
        DomainKind::Comments => &COMMENTS,
        DomainKind::Tags => &TAGS,
        DomainKind::Categories => &CATEGORIES,
        DomainKind::Subscriptions => &SUBSCRIPTIONS,
    }
}

/// Single metric of a domain (`overview` is not a single metric)
pub fn lookup(domain: DomainKind, kind: MetricKind) -> Option<&'static MetricSpec> {
    metrics(domain).iter().find(|spec| spec.kind == kind)
}

/// Fields composed into a domain's overview: every kind except `count`
pub fn overview_fields(domain: DomainKind) -> impl Iterator<Item = &'static MetricSpec> {
    metrics(domain)
        .iter()
        .filter(|spec| spec.kind != MetricKind::Count)
}

/// Specs a request for `(domain, kind)` will run
pub fn resolve(
    domain: DomainKind,
    kind: MetricKind,
) -> Result<Vec<&'static MetricSpec>, ValidationError> {
    if kind == MetricKind::Overview {
        return Ok(overview_fields(domain).collect());
    }
    lookup(domain, kind)
        .map(|spec| vec![spec])
        .ok_or(ValidationError::MetricUnavailable {
            domain,
            metric: kind,
        })
}

// ============================================================================
// CATALOG
// ============================================================================

/// Registered metric as listed by the catalog
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricInfo {
    pub metric: MetricKind,
    pub field: String,
    pub table: String,
    /// Scope filters the metric honors
    pub scopes: Vec<ScopeKind>,
}

/// Registered metrics of one domain
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainCatalog {
    pub domain: DomainKind,
    /// Scope kind addressed by `scopeNo`
    pub primary_scope: Option<ScopeKind>,
    pub metrics: Vec<MetricInfo>,
    pub overview_fields: Vec<String>,
}

/// Full registry listing for discovery endpoints and the CLI
pub fn catalog() -> Vec<DomainCatalog> {
    DomainKind::ALL
        .into_iter()
        .map(|domain| DomainCatalog {
            domain,
            primary_scope: domain.primary_scope(),
            metrics: metrics(domain)
                .iter()
                .map(|spec| MetricInfo {
                    metric: spec.kind,
                    field: spec.field.to_string(),
                    table: spec.aggregate.table.name.to_string(),
                    scopes: spec.aggregate.table.scopes.iter().map(|b| b.kind).collect(),
                })
                .collect(),
            overview_fields: overview_fields(domain)
                .map(|spec| spec.field.to_string())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_domain_registers_each_kind_once() {
        for domain in DomainKind::ALL {
            let kinds: HashSet<MetricKind> = metrics(domain).iter().map(|s| s.kind).collect();
            assert_eq!(kinds.len(), 8, "{domain}");
            assert!(!kinds.contains(&MetricKind::Overview));

            let fields: HashSet<&str> = metrics(domain).iter().map(|s| s.field).collect();
            assert_eq!(fields.len(), 8, "{domain} has duplicate field names");
        }
    }

    #[test]
    fn test_overview_has_seven_fields_without_count() {
        for domain in DomainKind::ALL {
            let specs = resolve(domain, MetricKind::Overview).unwrap();
            assert_eq!(specs.len(), 7);
            assert!(specs.iter().all(|s| s.kind != MetricKind::Count));
        }
    }

    #[test]
    fn test_resolve_single_metric() {
        let specs = resolve(DomainKind::Posts, MetricKind::Top).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].field, "top_viewed");
        assert_eq!(specs[0].computer, Computer::Ranking { by: RankBy::Total });
        assert!(lookup(DomainKind::Posts, MetricKind::Overview).is_none());
    }

    #[test]
    fn test_shapes_match_computers() {
        for domain in DomainKind::ALL {
            for spec in metrics(domain) {
                let totals = matches!(
                    spec.computer,
                    Computer::Ranking { .. } | Computer::Distribution
                );
                assert_eq!(
                    spec.aggregate.shape == Shape::Totals,
                    totals,
                    "{} {}",
                    domain,
                    spec.field
                );
                assert_eq!(spec.aggregate.dimension.is_some(), totals);
            }
        }
    }

    #[test]
    fn test_deleted_rows_only_for_retention_and_lifecycle() {
        for domain in DomainKind::ALL {
            for spec in metrics(domain) {
                let sees_deleted = spec.aggregate.visibility == Visibility::IncludeDeleted;
                let expected = matches!(
                    spec.kind,
                    MetricKind::RetentionRate | MetricKind::Lifecycle
                );
                assert_eq!(sees_deleted, expected, "{} {}", domain, spec.field);
            }
        }
    }

    #[test]
    fn test_catalog_lists_all_domains() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 6);
        let users = &catalog[0];
        assert_eq!(users.domain, DomainKind::Users);
        assert_eq!(users.primary_scope, None);
        assert_eq!(users.overview_fields.len(), 7);
        let top = users
            .metrics
            .iter()
            .find(|m| m.metric == MetricKind::Top)
            .unwrap();
        assert_eq!(top.table, "pst_info");
        assert_eq!(top.scopes, vec![ScopeKind::Category, ScopeKind::Post]);
    }
}
