//! Table column metadata.
//!
//! The generated-keys processor resolves column names through a
//! [`MetadataSource`]. Table names are passed as catalog patterns (LIKE
//! semantics, `\` escape), produced by [`normalize_object_name`].
//!
//! Two sources are provided: [`Catalog`], an in-memory set of table
//! definitions that can be loaded from JSON, and [`SqliteCatalog`], which
//! reads a live SQLite database.

mod catalog;
mod sqlite;

pub use catalog::{Catalog, CatalogError, TableDef};
pub use sqlite::SqliteCatalog;

use serde::{Deserialize, Serialize};

/// A column as reported by a metadata source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name as stored in the catalog.
    pub name: String,
    /// 1-based position of the column in its table.
    pub ordinal_position: i32,
}

impl ColumnInfo {
    /// Creates a column description.
    #[must_use]
    pub fn new(name: impl Into<String>, ordinal_position: i32) -> Self {
        Self {
            name: name.into(),
            ordinal_position,
        }
    }
}

/// Provides the columns of a table.
///
/// Lookups may block (for example on a network round trip).
pub trait MetadataSource {
    /// Error type for lookup failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the columns of the tables matching `table_name_pattern`.
    ///
    /// The pattern uses catalog LIKE semantics: `%` and `_` are wildcards and
    /// `\` escapes the next character. Columns are returned in the source's
    /// natural order.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the metadata cannot be read.
    fn columns(&self, table_name_pattern: &str) -> Result<Vec<ColumnInfo>, Self::Error>;
}

impl<M: MetadataSource + ?Sized> MetadataSource for &M {
    type Error = M::Error;

    fn columns(&self, table_name_pattern: &str) -> Result<Vec<ColumnInfo>, Self::Error> {
        (**self).columns(table_name_pattern)
    }
}

/// Escapes the LIKE wildcards `\`, `_` and `%` with a backslash.
#[must_use]
pub fn escape_wildcards(object_name: &str) -> String {
    let mut escaped = String::with_capacity(object_name.len());
    for c in object_name.chars() {
        if matches!(c, '\\' | '_' | '%') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Turns a table name as written in a statement into a catalog pattern.
///
/// The name is trimmed and its wildcards escaped. A double-quoted name
/// (at least three characters including the quotes) loses its quotes and
/// keeps its case; any other name is upper-cased.
#[must_use]
pub fn normalize_object_name(object_name: &str) -> String {
    let escaped = escape_wildcards(object_name.trim());
    if escaped.len() > 2 && escaped.starts_with('"') && escaped.ends_with('"') {
        return escaped[1..escaped.len() - 1].to_string();
    }
    escaped.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_wildcards() {
        assert_eq!(escape_wildcards("ORDERS"), "ORDERS");
        assert_eq!(escape_wildcards("MY_TABLE"), "MY\\_TABLE");
        assert_eq!(escape_wildcards("100%\\x"), "100\\%\\\\x");
    }

    #[test]
    fn test_normalize_unquoted_is_uppercased() {
        assert_eq!(normalize_object_name("  customer "), "CUSTOMER");
        assert_eq!(normalize_object_name("order_line"), "ORDER\\_LINE");
    }

    #[test]
    fn test_normalize_quoted_keeps_case() {
        assert_eq!(normalize_object_name("\"MixedCase\""), "MixedCase");
        assert_eq!(normalize_object_name(" \"a_b\" "), "a\\_b");
        assert_eq!(normalize_object_name("\"x\""), "x");
    }

    #[test]
    fn test_normalize_short_or_unbalanced_quotes() {
        assert_eq!(normalize_object_name("\"\""), "\"\"");
        assert_eq!(normalize_object_name("\"abc"), "\"ABC");
    }
}
