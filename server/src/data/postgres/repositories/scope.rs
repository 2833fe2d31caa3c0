//! Scope entity existence checks for PostgreSQL

use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::types::ScopeRef;

fn exists_sql(scope: ScopeRef) -> String {
    format!(
        "SELECT 1 FROM {} WHERE {} = $1 AND del_yn = 'N' LIMIT 1",
        scope.kind.table(),
        scope.kind.key_column()
    )
}

/// True when the referenced category/tag/post exists and is not soft-deleted
pub async fn scope_exists(pool: &PgPool, scope: ScopeRef) -> Result<bool, PostgresError> {
    let row: Option<(i32,)> = sqlx::query_as(&exists_sql(scope))
        .bind(scope.id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}
