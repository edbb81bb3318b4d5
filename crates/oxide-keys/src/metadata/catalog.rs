//! In-memory table catalog.

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;

use serde::Deserialize;

use super::{ColumnInfo, MetadataSource};

/// Errors loading or querying a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Reading a catalog file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catalog file is not valid JSON for the expected format.
    #[error("invalid catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// The database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A column position is not a positive integer.
    #[error("column '{column}' of table '{table}' has invalid position {position}")]
    InvalidPosition {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// The rejected position.
        position: i32,
    },
}

/// A table known to a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    /// Table name as stored in the catalog.
    pub name: String,
    /// Columns in catalog order.
    pub columns: Vec<ColumnInfo>,
}

impl TableDef {
    /// Creates a table whose columns are numbered 1, 2, 3... in the given order.
    #[must_use]
    pub fn new<S: AsRef<str>>(name: impl Into<String>, columns: &[S]) -> Self {
        Self {
            name: name.into(),
            columns: columns
                .iter()
                .zip(1..)
                .map(|(column, position)| ColumnInfo::new(column.as_ref(), position))
                .collect(),
        }
    }

    /// Creates a table from explicit column descriptions, kept in the given order.
    #[must_use]
    pub fn with_columns(name: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// A [`MetadataSource`] over table definitions held in memory.
///
/// Tables are matched against the requested pattern with LIKE semantics and
/// are searched in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: Vec<TableDef>,
}

#[derive(Deserialize)]
struct CatalogFile {
    tables: Vec<TableFile>,
}

#[derive(Deserialize)]
struct TableFile {
    name: String,
    columns: Vec<ColumnFile>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnFile {
    Name(String),
    Detailed { name: String, position: Option<i32> },
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table whose columns are numbered in the given order.
    #[must_use]
    pub fn with_table<S: AsRef<str>>(mut self, name: impl Into<String>, columns: &[S]) -> Self {
        self.tables.push(TableDef::new(name, columns));
        self
    }

    /// Adds a table definition.
    pub fn add_table(&mut self, table: TableDef) {
        self.tables.push(table);
    }

    /// Returns the tables in insertion order.
    #[must_use]
    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    /// Parses a catalog from JSON.
    ///
    /// ```json
    /// {"tables": [{"name": "CUSTOMER", "columns": ["ID", {"name": "NAME", "position": 3}]}]}
    /// ```
    ///
    /// Columns given as plain strings, or without a position, take their
    /// 1-based index in the list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` for malformed input and
    /// `CatalogError::InvalidPosition` for positions below 1.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for table in file.tables {
            let mut columns = Vec::with_capacity(table.columns.len());
            for (column, index) in table.columns.into_iter().zip(1..) {
                let (name, position) = match column {
                    ColumnFile::Name(name) => (name, index),
                    ColumnFile::Detailed { name, position } => (name, position.unwrap_or(index)),
                };
                if position < 1 {
                    return Err(CatalogError::InvalidPosition {
                        table: table.name,
                        column: name,
                        position,
                    });
                }
                columns.push(ColumnInfo::new(name, position));
            }
            catalog.add_table(TableDef::with_columns(table.name, columns));
        }
        Ok(catalog)
    }

    /// Reads a JSON catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl MetadataSource for Catalog {
    type Error = Infallible;

    fn columns(&self, table_name_pattern: &str) -> Result<Vec<ColumnInfo>, Self::Error> {
        Ok(self
            .tables
            .iter()
            .filter(|table| like_match(&table.name, table_name_pattern))
            .flat_map(|table| table.columns.iter().cloned())
            .collect())
    }
}

/// Matches `value` against a LIKE pattern with `\` as escape character.
fn like_match(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let mut memo = HashMap::new();
    like_match_from(&value, &pattern, 0, 0, &mut memo)
}

fn like_match_from(
    value: &[char],
    pattern: &[char],
    vi: usize,
    pi: usize,
    memo: &mut HashMap<(usize, usize), bool>,
) -> bool {
    if let Some(&cached) = memo.get(&(vi, pi)) {
        return cached;
    }

    let result = match pattern.get(pi) {
        None => vi == value.len(),
        Some('%') => (vi..=value.len()).any(|i| like_match_from(value, pattern, i, pi + 1, memo)),
        Some('_') => vi < value.len() && like_match_from(value, pattern, vi + 1, pi + 1, memo),
        Some('\\') => {
            // A trailing escape matches a literal backslash
            let (literal, next) = pattern.get(pi + 1).map_or(('\\', pi + 1), |&c| (c, pi + 2));
            value.get(vi) == Some(&literal) && like_match_from(value, pattern, vi + 1, next, memo)
        }
        Some(&c) => {
            value.get(vi) == Some(&c) && like_match_from(value, pattern, vi + 1, pi + 1, memo)
        }
    };

    memo.insert((vi, pi), result);
    result
}
