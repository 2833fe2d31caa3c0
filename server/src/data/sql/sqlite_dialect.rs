//! SQLite SQL dialect implementation

use super::{SqlDialect, SqlType};

/// SQLite SQL dialect
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn typed_placeholder(&self, index: usize, _ty: SqlType) -> String {
        // Timestamps are bound as 'YYYY-MM-DD HH:MM:SS' text and compare lexically
        self.placeholder(index)
    }

    fn cast_to_string(&self, col: &str) -> String {
        format!("CAST({} AS TEXT)", col)
    }

    fn cast_to_double(&self, expr: &str) -> String {
        format!("CAST({} AS REAL)", expr)
    }
}
