//! Bucketed aggregate statement builder
//!
//! Renders an [`AggregateRequest`] into a single statement: the time windows
//! become a `VALUES` CTE that is LEFT JOINed against the source table, so every
//! window yields at least one row even when nothing matches. Identifiers come
//! from static catalog entries; all values are bound in text order.

use chrono::NaiveDateTime;

use super::{SqlDialect, SqlType};
use crate::data::types::{
    AggregateRequest, LabelSource, Measure, Predicate, RankBy, Visibility,
};

/// Value bound to a statement placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum BindParam {
    Int(i64),
    Text(&'static str),
    Timestamp(NaiveDateTime),
}

/// Rendered statement with its binds in placeholder order
#[derive(Debug, Clone)]
pub struct AggregateStatement {
    pub sql: String,
    pub binds: Vec<BindParam>,
}

/// Hands out placeholders while recording binds in the same order
struct Binder<'a> {
    dialect: &'a dyn SqlDialect,
    binds: Vec<BindParam>,
}

impl<'a> Binder<'a> {
    fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self {
            dialect,
            binds: Vec::new(),
        }
    }

    fn bind(&mut self, value: BindParam) -> String {
        self.binds.push(value);
        self.dialect.placeholder(self.binds.len())
    }

    fn bind_typed(&mut self, value: BindParam, ty: SqlType) -> String {
        self.binds.push(value);
        self.dialect.typed_placeholder(self.binds.len(), ty)
    }

    fn predicate(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Eq(column, value) => {
                format!("t.{} = {}", column, self.bind(BindParam::Text(value)))
            }
            Predicate::NotNull(column) => format!("t.{} IS NOT NULL", column),
        }
    }
}

/// Render the aggregate statement for `req` in the given dialect
pub fn build_aggregate_statement(
    dialect: &dyn SqlDialect,
    req: &AggregateRequest,
) -> AggregateStatement {
    let mut binder = Binder::new(dialect);

    // Bucket windows
    let rows: Vec<String> = req
        .windows
        .iter()
        .map(|w| {
            format!(
                "({}, {}, {})",
                binder.bind_typed(BindParam::Int(w.idx), SqlType::BigInt),
                binder.bind_typed(BindParam::Timestamp(w.start), SqlType::Timestamp),
                binder.bind_typed(BindParam::Timestamp(w.end), SqlType::Timestamp),
            )
        })
        .collect();

    // Select list
    let (group_key, group_label) = match req.dimension {
        Some(dim) => {
            let key = dialect.cast_to_string(&format!("t.{}", dim.column));
            let label = match dim.label {
                Some(LabelSource::Own(column)) => format!("MAX(t.{})", column),
                Some(LabelSource::Joined { label_column, .. }) => {
                    format!("MAX(l.{})", label_column)
                }
                None => dialect.cast_to_string("NULL"),
            };
            (key, label)
        }
        None => (dialect.cast_to_string("NULL"), dialect.cast_to_string("NULL")),
    };

    let measure = match req.measure {
        Some(Measure::Sum(column)) => format!("SUM(t.{})", column),
        Some(Measure::CountWhere(predicates)) => {
            let conds: Vec<String> = predicates.iter().map(|p| binder.predicate(p)).collect();
            format!("SUM(CASE WHEN {} THEN 1 ELSE 0 END)", conds.join(" AND "))
        }
        Some(Measure::Distinct(column)) => format!("COUNT(DISTINCT t.{})", column),
        None => "0".to_string(),
    };
    let total = dialect.cast_to_double(&format!("COALESCE({}, 0)", measure));

    // Join conditions
    let time = req.time_column.column();
    let mut conditions = vec![
        format!("t.{} >= b.bucket_start", time),
        format!("t.{} < b.bucket_end", time),
    ];
    if req.visibility == Visibility::ActiveOnly {
        conditions.push("t.del_yn = 'N'".to_string());
    }
    for predicate in req.predicates {
        conditions.push(binder.predicate(predicate));
    }
    for scope in &req.scope {
        conditions.push(format!(
            "t.{} = {}",
            scope.column,
            binder.bind(BindParam::Int(scope.value))
        ));
    }
    if let Some(dim) = req.dimension {
        conditions.push(format!("t.{} IS NOT NULL", dim.column));
    }

    let label_join = match req.dimension.and_then(|d| d.label.map(|l| (d.column, l))) {
        Some((
            column,
            LabelSource::Joined {
                table, key_column, ..
            },
        )) => format!(
            " LEFT JOIN {} l ON l.{} = t.{}",
            table, key_column, column
        ),
        _ => String::new(),
    };

    let group_by = match req.dimension {
        Some(dim) => format!("b.bucket_idx, t.{}", dim.column),
        None => "b.bucket_idx".to_string(),
    };

    let order_by = match (req.rank, req.dimension) {
        (Some(rank), Some(dim)) => {
            let by = match rank.by {
                RankBy::Count => "row_count",
                RankBy::Total => "total",
            };
            format!(
                "{} DESC, t.{} ASC {}",
                by,
                dim.column,
                dialect.limit(rank.limit)
            )
        }
        (_, Some(dim)) => format!("b.bucket_idx ASC, t.{} ASC", dim.column),
        (_, None) => "b.bucket_idx ASC".to_string(),
    };

    let sql = format!(
        "WITH buckets (bucket_idx, bucket_start, bucket_end) AS (VALUES {values}) \
         SELECT b.bucket_idx AS bucket_idx, {group_key} AS group_key, {group_label} AS group_label, \
         COUNT(t.{key}) AS row_count, {total} AS total \
         FROM buckets b \
         LEFT JOIN {table} t ON {conditions}{label_join} \
         GROUP BY {group_by} \
         ORDER BY {order_by}",
        values = rows.join(", "),
        key = req.table.key_column,
        table = req.table.name,
        conditions = conditions.join(" AND "),
    );

    tracing::trace!(
        dialect = dialect.name(),
        table = req.table.name,
        binds = binder.binds.len(),
        sql = %sql,
        "Rendered aggregate statement"
    );

    AggregateStatement {
        sql,
        binds: binder.binds,
    }
}
