//! Aggregate fetch request and row types
//!
//! An `AggregateRequest` describes one grouped, time-windowed read against a
//! single blog table. Identifiers inside it are `&'static str` taken from the
//! static table catalog and metric registry, never from request input; every
//! request-derived value travels as a bound parameter.

use chrono::NaiveDateTime;

use super::scope::ScopeKind;

/// Static description of a blog table the engine reads
#[derive(Debug)]
pub struct SourceTable {
    pub name: &'static str,
    /// Primary key column, counted for row totals
    pub key_column: &'static str,
    /// Scope filters this table can honor
    pub scopes: &'static [ScopeBinding],
}

impl SourceTable {
    /// Column that restricts this table to one scope entity, if supported
    pub fn scope_column(&self, kind: ScopeKind) -> Option<&'static str> {
        self.scopes
            .iter()
            .find(|binding| binding.kind == kind)
            .map(|binding| binding.column)
    }
}

/// Mapping from a scope kind to the column that references it
#[derive(Debug, Clone, Copy)]
pub struct ScopeBinding {
    pub kind: ScopeKind,
    pub column: &'static str,
}

/// Audit timestamp used to place rows into buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeColumn {
    Created,
    Updated,
}

impl TimeColumn {
    pub fn column(&self) -> &'static str {
        match self {
            TimeColumn::Created => "crt_dt",
            TimeColumn::Updated => "updt_dt",
        }
    }
}

/// Soft-delete handling for a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only rows with `del_yn = 'N'`
    ActiveOnly,
    /// Deleted rows are visible (retention and lifecycle metrics)
    IncludeDeleted,
}

/// Row filter applied to the source table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Eq(&'static str, &'static str),
    NotNull(&'static str),
}

/// Per-group numeric aggregate reported as `total` next to the row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// `SUM(column)`
    Sum(&'static str),
    /// Number of rows matching every predicate
    CountWhere(&'static [Predicate]),
    /// `COUNT(DISTINCT column)`
    Distinct(&'static str),
}

/// Where a group's display label comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// A column on the source table itself
    Own(&'static str),
    /// A name column on a referenced table
    Joined {
        table: &'static str,
        key_column: &'static str,
        label_column: &'static str,
    },
}

/// Secondary group-by column (status, role, entity id)
#[derive(Debug)]
pub struct Dimension {
    pub column: &'static str,
    pub label: Option<LabelSource>,
    /// Categories that are always reported, zero-filled when absent
    pub known_keys: &'static [&'static str],
}

/// Half-open `[start, end)` interval with its position in the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub idx: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Equality filter on a scope column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeCondition {
    pub column: &'static str,
    pub value: i64,
}

/// Value a ranked fetch is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Count,
    Total,
}

/// Top-N ordering pushed down to storage (single-window requests only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankLimit {
    pub by: RankBy,
    pub limit: u32,
}

/// One grouped aggregate read
#[derive(Debug, Clone)]
pub struct AggregateRequest {
    pub table: &'static SourceTable,
    pub time_column: TimeColumn,
    pub windows: Vec<TimeWindow>,
    pub visibility: Visibility,
    pub predicates: &'static [Predicate],
    pub scope: Vec<ScopeCondition>,
    pub measure: Option<Measure>,
    pub dimension: Option<&'static Dimension>,
    pub rank: Option<RankLimit>,
}

/// One result row: a window (and optional group) with its aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub window_idx: i64,
    pub group_key: Option<String>,
    pub label: Option<String>,
    pub count: i64,
    /// Measure value, `0.0` when the request has no measure
    pub total: f64,
}
