//! Bucketed aggregate reads for SQLite

use sqlx::SqlitePool;

use crate::data::sql::{BindParam, SqliteDialect, build_aggregate_statement};
use crate::data::sqlite::SqliteError;
use crate::data::types::{AggregateRequest, AggregateRow};

/// Text layout of `crt_dt` / `updt_dt` in the blog tables
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

type RawRow = (i64, Option<String>, Option<String>, i64, f64);

/// Run one aggregate request, returning rows ordered by window (or rank)
pub async fn fetch_aggregates(
    pool: &SqlitePool,
    req: &AggregateRequest,
) -> Result<Vec<AggregateRow>, SqliteError> {
    if req.windows.is_empty() {
        return Ok(Vec::new());
    }

    let stmt = build_aggregate_statement(&SqliteDialect, req);

    let mut query = sqlx::query_as::<_, RawRow>(&stmt.sql);
    for param in &stmt.binds {
        query = match param {
            BindParam::Int(v) => query.bind(*v),
            BindParam::Text(s) => query.bind(*s),
            BindParam::Timestamp(ts) => query.bind(ts.format(TIMESTAMP_FORMAT).to_string()),
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

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::data::sqlite::fixtures::seeded_pool;
    use crate::data::types::{
        Dimension, LabelSource, Measure, RankBy, RankLimit, ScopeCondition, TimeColumn,
        TimeWindow, Visibility, tables,
    };

    static AUTHOR_DIM: Dimension = Dimension {
        column: "user_no",
        label: Some(LabelSource::Joined {
            table: "user_info",
            key_column: "user_no",
            label_column: "user_nm",
        }),
        known_keys: &[],
    };

    static STATUS_DIM: Dimension = Dimension {
        column: "pst_stts",
        label: None,
        known_keys: &["EMPTY", "WRITING", "FINISHED"],
    };

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn q1_months() -> Vec<TimeWindow> {
        vec![
            TimeWindow {
                idx: 0,
                start: ts(2024, 1, 1),
                end: ts(2024, 2, 1),
            },
            TimeWindow {
                idx: 1,
                start: ts(2024, 2, 1),
                end: ts(2024, 3, 1),
            },
            TimeWindow {
                idx: 2,
                start: ts(2024, 3, 1),
                end: ts(2024, 4, 1),
            },
        ]
    }

    fn whole_q1() -> Vec<TimeWindow> {
        vec![TimeWindow {
            idx: 0,
            start: ts(2024, 1, 1),
            end: ts(2024, 4, 1),
        }]
    }

    fn post_request(windows: Vec<TimeWindow>) -> AggregateRequest {
        AggregateRequest {
            table: &tables::PST_INFO,
            time_column: TimeColumn::Created,
            windows,
            visibility: Visibility::ActiveOnly,
            predicates: &[],
            scope: Vec::new(),
            measure: None,
            dimension: None,
            rank: None,
        }
    }

    fn counts(rows: &[AggregateRow]) -> Vec<(i64, i64)> {
        rows.iter().map(|r| (r.window_idx, r.count)).collect()
    }

    #[tokio::test]
    async fn test_monthly_series_includes_empty_month() {
        let pool = seeded_pool().await;
        let rows = fetch_aggregates(&pool, &post_request(q1_months()))
            .await
            .unwrap();
        assert_eq!(counts(&rows), vec![(0, 10), (1, 0), (2, 5)]);
        assert!(rows.iter().all(|r| r.group_key.is_none()));
    }

    #[tokio::test]
    async fn test_deleted_rows_visible_only_when_requested() {
        let pool = seeded_pool().await;
        let mut req = post_request(q1_months());
        req.visibility = Visibility::IncludeDeleted;
        let rows = fetch_aggregates(&pool, &req).await.unwrap();
        assert_eq!(counts(&rows), vec![(0, 11), (1, 0), (2, 5)]);
    }

    #[tokio::test]
    async fn test_scope_condition_restricts_rows() {
        let pool = seeded_pool().await;
        let mut req = post_request(q1_months());
        req.scope.push(ScopeCondition {
            column: "ctgry_no",
            value: 2,
        });
        let rows = fetch_aggregates(&pool, &req).await.unwrap();
        assert_eq!(counts(&rows), vec![(0, 3), (1, 0), (2, 5)]);
    }

    #[tokio::test]
    async fn test_sum_measure() {
        let pool = seeded_pool().await;
        let mut req = post_request(q1_months());
        req.measure = Some(Measure::Sum("pst_view_cnt"));
        let rows = fetch_aggregates(&pool, &req).await.unwrap();
        let totals: Vec<f64> = rows.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![550.0, 0.0, 25.0]);
    }

    #[tokio::test]
    async fn test_ranked_dimension_with_joined_label() {
        let pool = seeded_pool().await;
        let mut req = post_request(whole_q1());
        req.dimension = Some(&AUTHOR_DIM);
        req.rank = Some(RankLimit {
            by: RankBy::Count,
            limit: 2,
        });
        let rows = fetch_aggregates(&pool, &req).await.unwrap();
        let ranked: Vec<(Option<&str>, Option<&str>, i64)> = rows
            .iter()
            .map(|r| (r.group_key.as_deref(), r.label.as_deref(), r.count))
            .collect();
        assert_eq!(
            ranked,
            vec![(Some("1"), Some("alice"), 6), (Some("3"), Some("carol"), 5)]
        );
    }

    #[tokio::test]
    async fn test_status_dimension_counts() {
        let pool = seeded_pool().await;
        let mut req = post_request(whole_q1());
        req.dimension = Some(&STATUS_DIM);
        let rows = fetch_aggregates(&pool, &req).await.unwrap();
        let groups: Vec<(Option<&str>, i64)> = rows
            .iter()
            .map(|r| (r.group_key.as_deref(), r.count))
            .collect();
        assert_eq!(groups, vec![(Some("FINISHED"), 10), (Some("WRITING"), 5)]);
    }

    #[tokio::test]
    async fn test_no_windows_returns_nothing() {
        let pool = seeded_pool().await;
        let rows = fetch_aggregates(&pool, &post_request(Vec::new()))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
