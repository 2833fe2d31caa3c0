//! Scope entity existence checks for SQLite

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::ScopeRef;

/// True when the referenced category/tag/post exists and is not soft-deleted
pub async fn scope_exists(pool: &SqlitePool, scope: ScopeRef) -> Result<bool, SqliteError> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} = ? AND del_yn = 'N' LIMIT 1",
        scope.kind.table(),
        scope.kind.key_column()
    );
    let row: Option<(i64,)> = sqlx::query_as(&sql)
        .bind(scope.id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}
