//! PostgreSQL SQL dialect implementation

use super::{SqlDialect, SqlType};

/// PostgreSQL SQL dialect
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn typed_placeholder(&self, index: usize, ty: SqlType) -> String {
        let ty = match ty {
            SqlType::BigInt => "BIGINT",
            SqlType::Timestamp => "TIMESTAMP",
        };
        format!("${}::{}", index, ty)
    }

    fn cast_to_string(&self, col: &str) -> String {
        format!("{}::TEXT", col)
    }

    fn cast_to_double(&self, expr: &str) -> String {
        format!("({})::DOUBLE PRECISION", expr)
    }
}
