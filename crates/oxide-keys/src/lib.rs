//! # oxide-keys
//!
//! Generated-keys retrieval for databases that return generated values
//! through a `RETURNING` clause instead of a dedicated driver API.
//!
//! This crate provides:
//! - [`GeneratedKeysQuery`], which appends a `RETURNING` clause to INSERT,
//!   UPDATE, DELETE and UPDATE OR INSERT statements on demand
//! - A hand-written statement parser that finds the target table and detects
//!   an existing `RETURNING` clause
//! - Column metadata sources: an in-memory [`Catalog`] and a SQLite-backed
//!   [`SqliteCatalog`]
//!
//! ## Returning all columns
//!
//! ```rust
//! use oxide_keys::{AutoGeneratedKeys, Catalog, GeneratedKeysQuery, GeneratedKeysSupport};
//!
//! let catalog = Catalog::new().with_table("CUSTOMER", &["ID", "NAME"]);
//! let mut query = GeneratedKeysQuery::with_mode(
//!     "INSERT INTO customer (name) VALUES (?)",
//!     AutoGeneratedKeys::ReturnGeneratedKeys,
//!     GeneratedKeysSupport::global(),
//!     &catalog,
//! )?;
//!
//! assert!(query.generates_keys()?);
//! assert_eq!(
//!     query.query_string()?,
//!     "INSERT INTO customer (name) VALUES (?)\nRETURNING \"ID\",\"NAME\""
//! );
//! # Ok::<(), oxide_keys::KeysError>(())
//! ```
//!
//! ## Graceful degradation
//!
//! Statements that cannot return keys are passed through untouched:
//!
//! ```rust
//! use oxide_keys::{AutoGeneratedKeys, Catalog, GeneratedKeysQuery, GeneratedKeysSupport};
//!
//! let mut query = GeneratedKeysQuery::with_mode(
//!     "SELECT * FROM customer",
//!     AutoGeneratedKeys::ReturnGeneratedKeys,
//!     GeneratedKeysSupport::global(),
//!     Catalog::new(),
//! )?;
//!
//! assert!(!query.generates_keys()?);
//! assert_eq!(query.query_string()?, "SELECT * FROM customer");
//! # Ok::<(), oxide_keys::KeysError>(())
//! ```

pub mod error;
pub mod lexer;
pub mod metadata;
pub mod parser;
pub mod query;
pub mod statement;
pub mod support;

pub use error::{KeysError, Result};
pub use metadata::{Catalog, ColumnInfo, MetadataSource, SqliteCatalog};
pub use parser::{DmlParser, ParseError, StatementParser};
pub use query::{AutoGeneratedKeys, GeneratedKeysQuery, KeySelection, ProcessedResult, QueryMode};
pub use statement::{StatementKind, StatementModel};
pub use support::{is_generated_keys_support_loaded, GeneratedKeysSupport};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{KeysError, Result};
    pub use crate::metadata::{Catalog, ColumnInfo, MetadataSource, SqliteCatalog, TableDef};
    pub use crate::parser::{DmlParser, StatementParser};
    pub use crate::query::{AutoGeneratedKeys, GeneratedKeysQuery, KeySelection, QueryMode};
    pub use crate::statement::StatementModel;
    pub use crate::support::GeneratedKeysSupport;
}
