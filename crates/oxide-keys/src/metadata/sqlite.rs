//! SQLite-backed column metadata.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tokio::runtime::Runtime;
use tracing::debug;

use super::{CatalogError, ColumnInfo, MetadataSource};

/// A [`MetadataSource`] reading `sqlite_master` and `pragma_table_info`.
///
/// Lookups block the calling thread on a private current-thread runtime, so
/// this type must not be used from within another tokio runtime. SQLite's
/// LIKE is case-insensitive for ASCII, so upper-cased patterns produced by
/// [`normalize_object_name`](super::normalize_object_name) still find tables
/// created with lower-case names.
pub struct SqliteCatalog {
    pool: SqlitePool,
    runtime: Runtime,
}

impl SqliteCatalog {
    /// Connects to the database at `url` (e.g. `sqlite:app.db` or `sqlite::memory:`).
    ///
    /// A single connection is used so in-memory databases stay visible
    /// across calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be built or the connection fails.
    pub fn connect(url: &str) -> Result<Self, CatalogError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let pool = runtime.block_on(SqlitePoolOptions::new().max_connections(1).connect(url))?;
        debug!(url = %url, "Connected SQLite catalog");
        Ok(Self { pool, runtime })
    }

    /// Executes a statement, typically DDL to set up a schema.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Database` if execution fails.
    pub fn execute(&self, sql: &str) -> Result<(), CatalogError> {
        self.runtime.block_on(sqlx::query(sql).execute(&self.pool))?;
        Ok(())
    }

    async fn fetch_columns(&self, pattern: &str) -> Result<Vec<ColumnInfo>, sqlx::Error> {
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name LIKE ?1 ESCAPE '\\' \
             ORDER BY name",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        let mut columns = Vec::new();
        for table in &tables {
            let rows = sqlx::query(
                "SELECT cid + 1 AS position, name FROM pragma_table_info(?1) ORDER BY cid",
            )
            .bind(table)
            .fetch_all(&self.pool)
            .await?;
            for row in rows {
                columns.push(ColumnInfo::new(
                    row.try_get::<String, _>("name")?,
                    row.try_get::<i32, _>("position")?,
                ));
            }
        }
        Ok(columns)
    }
}

impl MetadataSource for SqliteCatalog {
    type Error = CatalogError;

    fn columns(&self, table_name_pattern: &str) -> Result<Vec<ColumnInfo>, Self::Error> {
        let columns = self
            .runtime
            .block_on(self.fetch_columns(table_name_pattern))?;
        Ok(columns)
    }
}
