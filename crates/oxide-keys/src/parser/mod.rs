//! Statement parsing
//!
//! The generated-keys processor only depends on the [`StatementParser`]
//! trait. [`DmlParser`] is the implementation shipped with this crate: a
//! hand-written head parser that classifies INSERT, UPDATE, DELETE and
//! UPDATE OR INSERT statements, keeps the target table name as written, and
//! detects an existing top-level `RETURNING` clause.

mod error;
#[allow(clippy::module_inception)]
mod parser;

pub use error::ParseError;
pub use parser::Parser;

use crate::statement::StatementModel;

/// Turns statement text into a [`StatementModel`].
pub trait StatementParser: Send + Sync {
    /// Parses an INSERT, UPDATE, DELETE or UPDATE OR INSERT statement.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` when the text is not one of the supported
    /// data-modifying statement forms.
    fn parse_insert_statement(&self, sql: &str) -> Result<StatementModel, ParseError>;
}

/// The built-in [`StatementParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DmlParser;

impl DmlParser {
    /// Creates the parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl StatementParser for DmlParser {
    fn parse_insert_statement(&self, sql: &str) -> Result<StatementModel, ParseError> {
        Parser::new(sql).parse_statement()
    }
}
