//! Bucketed aggregate reads for PostgreSQL

use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::sql::{BindParam, PostgresDialect, build_aggregate_statement};
use crate::data::types::{AggregateRequest, AggregateRow};

type RawRow = (i64, Option<String>, Option<String>, i64, f64);

/// Run one aggregate request, returning rows ordered by window (or rank)
pub async fn fetch_aggregates(
    pool: &PgPool,
    req: &AggregateRequest,
) -> Result<Vec<AggregateRow>, PostgresError> {
    if req.windows.is_empty() {
        return Ok(Vec::new());
    }

    let stmt = build_aggregate_statement(&PostgresDialect, req);

    let mut query = sqlx::query_as::<_, RawRow>(&stmt.sql);
    for param in &stmt.binds {
        query = match param {
            BindParam::Int(v) => query.bind(*v),
            BindParam::Text(s) => query.bind(*s),
            BindParam::Timestamp(ts) => query.bind(*ts),
        };
    }

    let rows = query.fetch_all(pool).await?;
    tracing::trace!(
        table = req.table.name,
        windows = req.windows.len(),
        rows = rows.len(),
        "Fetched aggregates"
    );

    Ok(rows
        .into_iter()
        .map(|(window_idx, group_key, label, count, total)| AggregateRow {
            window_idx,
            group_key,
            label,
            count,
            total,
        })
        .collect())
}
