//! SQL dialect trait for multi-database support
//!
//! This trait defines the interface for generating database-specific SQL syntax.

/// Declared type of a bound parameter
///
/// Needed where the database cannot infer a parameter type from context,
/// such as the columns of a `VALUES` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Timestamp,
}

/// SQL dialect trait for generating database-specific SQL
///
/// Different databases have different syntax for:
/// - Parameter placeholders (? vs $1)
/// - Type casting
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Generate a placeholder carrying an explicit type
    ///
    /// - SQLite: "?" (dynamic typing)
    /// - PostgreSQL: "$1::BIGINT", "$2::TIMESTAMP"
    fn typed_placeholder(&self, index: usize, ty: SqlType) -> String;

    /// Cast a column to string type
    ///
    /// - SQLite: `CAST(col AS TEXT)`
    /// - PostgreSQL: `col::TEXT`
    fn cast_to_string(&self, col: &str) -> String;

    /// Cast an expression to a double precision float
    ///
    /// - SQLite: `CAST(expr AS REAL)`
    /// - PostgreSQL: `(expr)::DOUBLE PRECISION`
    fn cast_to_double(&self, expr: &str) -> String;

    /// Generate LIMIT clause
    fn limit(&self, limit: u32) -> String {
        format!("LIMIT {}", limit)
    }
}
