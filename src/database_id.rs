//! Database ID type definition.

/// Alias for the integer type SQLite assigns to `INTEGER PRIMARY KEY` columns.
pub type DatabaseId = i64;
