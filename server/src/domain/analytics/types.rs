//! Analytics request, plan and result types

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::types::{ScopeKind, ScopeRef};

// ============================================================================
// DOMAIN AND METRIC KINDS
// ============================================================================

/// Entity type an analysis runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    Users,
    Posts,
    Comments,
    Tags,
    Categories,
    Subscriptions,
}

impl DomainKind {
    pub const ALL: [DomainKind; 6] = [
        DomainKind::Users,
        DomainKind::Posts,
        DomainKind::Comments,
        DomainKind::Tags,
        DomainKind::Categories,
        DomainKind::Subscriptions,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            DomainKind::Users => "users",
            DomainKind::Posts => "posts",
            DomainKind::Comments => "comments",
            DomainKind::Tags => "tags",
            DomainKind::Categories => "categories",
            DomainKind::Subscriptions => "subscriptions",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.slug() == slug)
    }

    /// Scope kind that the generic `scopeNo` parameter refers to
    pub fn primary_scope(&self) -> Option<ScopeKind> {
        match self {
            DomainKind::Users => None,
            DomainKind::Posts | DomainKind::Categories | DomainKind::Subscriptions => {
                Some(ScopeKind::Category)
            }
            DomainKind::Comments => Some(ScopeKind::Post),
            DomainKind::Tags => Some(ScopeKind::Tag),
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Metric shape requested from a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    Overview,
    Count,
    GrowthRate,
    RetentionRate,
    Top,
    Distribution,
    Average,
    Efficiency,
    Lifecycle,
}

impl MetricKind {
    pub const ALL: [MetricKind; 9] = [
        MetricKind::Overview,
        MetricKind::Count,
        MetricKind::GrowthRate,
        MetricKind::RetentionRate,
        MetricKind::Top,
        MetricKind::Distribution,
        MetricKind::Average,
        MetricKind::Efficiency,
        MetricKind::Lifecycle,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            MetricKind::Overview => "overview",
            MetricKind::Count => "count",
            MetricKind::GrowthRate => "growth-rate",
            MetricKind::RetentionRate => "retention-rate",
            MetricKind::Top => "top",
            MetricKind::Distribution => "distribution",
            MetricKind::Average => "average",
            MetricKind::Efficiency => "efficiency",
            MetricKind::Lifecycle => "lifecycle",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.slug() == slug)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// ============================================================================
// BUCKETING AND POLICIES
// ============================================================================

/// Bucket granularity (`dtType`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BucketUnit {
    Day,
    Week,
    Month,
    Year,
}

impl BucketUnit {
    pub const ALL: [BucketUnit; 4] = [
        BucketUnit::Day,
        BucketUnit::Week,
        BucketUnit::Month,
        BucketUnit::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketUnit::Day => "day",
            BucketUnit::Week => "week",
            BucketUnit::Month => "month",
            BucketUnit::Year => "year",
        }
    }

    /// Parse a request unit, falling back to `Day` for anything unrecognized
    ///
    /// Mirrors the platform's historical `CASE ... ELSE 'day'` handling of
    /// `dtType`; the fallback is logged so it stays visible.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(dt_type = raw, "Unrecognized bucket unit, falling back to day");
            BucketUnit::Day
        })
    }
}

impl FromStr for BucketUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(BucketUnit::Day),
            "week" => Ok(BucketUnit::Week),
            "month" => Ok(BucketUnit::Month),
            "year" => Ok(BucketUnit::Year),
            _ => Err(format!("Unknown bucket unit '{}'", s)),
        }
    }
}

impl fmt::Display for BucketUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alignment of week buckets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeekAnchor {
    /// Weeks start on Monday (ISO 8601)
    #[default]
    IsoMonday,
    /// Weeks are consecutive 7-day windows starting at the range start
    RangeStart,
}

impl fmt::Display for WeekAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekAnchor::IsoMonday => write!(f, "iso_monday"),
            WeekAnchor::RangeStart => write!(f, "range_start"),
        }
    }
}

/// How an overview reacts to a failing sub-metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverviewPolicy {
    /// First storage failure fails the whole overview
    Strict,
    /// Failed fields are `null` with a per-field error
    #[default]
    Lenient,
}

impl fmt::Display for OverviewPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverviewPolicy::Strict => write!(f, "strict"),
            OverviewPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

// ============================================================================
// REQUESTS
// ============================================================================

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Explicit scope parameters of a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    pub ctgry_no: Option<i64>,
    pub tag_no: Option<i64>,
    pub pst_no: Option<i64>,
}

impl ScopeFilter {
    pub fn get(&self, kind: ScopeKind) -> Option<i64> {
        match kind {
            ScopeKind::Category => self.ctgry_no,
            ScopeKind::Tag => self.tag_no,
            ScopeKind::Post => self.pst_no,
        }
    }

    pub fn set(&mut self, kind: ScopeKind, id: i64) {
        match kind {
            ScopeKind::Category => self.ctgry_no = Some(id),
            ScopeKind::Tag => self.tag_no = Some(id),
            ScopeKind::Post => self.pst_no = Some(id),
        }
    }

    /// Scope references in a fixed kind order
    pub fn refs(&self) -> Vec<ScopeRef> {
        [ScopeKind::Category, ScopeKind::Tag, ScopeKind::Post]
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|id| ScopeRef::new(kind, id)))
            .collect()
    }
}

/// Unvalidated analysis request as received from a caller
#[derive(Debug, Clone)]
pub struct StatRequest {
    pub domain: DomainKind,
    pub metric: MetricKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Raw `dtType`
    pub unit: String,
    pub limit: Option<i64>,
    /// Alias for the domain's primary scope
    pub scope_no: Option<i64>,
    pub scope: ScopeFilter,
}

/// Validated analysis request
#[derive(Debug, Clone)]
pub struct StatQuery {
    pub domain: DomainKind,
    pub metric: MetricKind,
    pub range: DateRange,
    pub unit: BucketUnit,
    /// Clamped to `[1, 100]` when present
    pub limit: Option<u32>,
    pub scope: Vec<ScopeRef>,
}

// ============================================================================
// BUCKET PLAN AND RAW AGGREGATES
// ============================================================================

/// Half-open date interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Ordered, contiguous buckets covering a date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPlan {
    pub unit: BucketUnit,
    pub buckets: Vec<Bucket>,
}

impl BucketPlan {
    /// Single bucket spanning the whole plan
    pub fn span(&self) -> Option<Bucket> {
        match (self.buckets.first(), self.buckets.last()) {
            (Some(first), Some(last)) => Some(Bucket {
                start: first.start,
                end: last.end,
            }),
            _ => None,
        }
    }
}

/// Zero-filled aggregate for one bucket (and optional group)
#[derive(Debug, Clone, PartialEq)]
pub struct RawAggregate {
    pub bucket: Bucket,
    pub group_key: Option<String>,
    pub label: Option<String>,
    pub count: i64,
    pub sum: Option<f64>,
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountPoint {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatioPoint {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub part: f64,
    pub whole: f64,
    /// Percentage in `[0, 100]`
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AveragePoint {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub numerator: f64,
    pub denominator: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: i64,
    /// Percent change from the previous bucket; `null` when undefined
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingItem {
    pub id: i64,
    pub label: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionItem {
    pub key: String,
    pub label: Option<String>,
    pub count: i64,
    pub pct: f64,
}

/// Computed metric
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricResult {
    CountSeries { points: Vec<CountPoint> },
    RatioSeries { points: Vec<RatioPoint> },
    AverageSeries { points: Vec<AveragePoint> },
    GrowthRateSeries { points: Vec<GrowthPoint> },
    RankingList { limit: u32, items: Vec<RankingItem> },
    DistributionList { total: i64, items: Vec<DistributionItem> },
}

/// Why an overview field has no value
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub code: String,
    pub message: String,
}

/// One named overview entry
///
/// Exactly one of `value` and `error` is set: a missing value is always
/// explained, so "unavailable" never reads as "zero".
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewField {
    pub name: String,
    pub metric: MetricKind,
    pub value: Option<MetricResult>,
    pub error: Option<FieldError>,
}

/// Composite result of an `overview` request
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResult {
    pub domain: DomainKind,
    pub policy: OverviewPolicy,
    pub fields: Vec<OverviewField>,
}

impl OverviewResult {
    pub fn field(&self, name: &str) -> Option<&OverviewField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Payload of a successful analyze call
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum AnalysisResult {
    Metric(MetricResult),
    Overview(OverviewResult),
}
