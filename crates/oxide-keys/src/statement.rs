//! Statement model produced by a [`StatementParser`](crate::parser::StatementParser).

/// The data-modifying statement forms that can return generated keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `INSERT INTO ...`
    Insert,
    /// `UPDATE ... SET ...`
    Update,
    /// `DELETE FROM ...`
    Delete,
    /// `UPDATE OR INSERT INTO ...`
    UpdateOrInsert,
}

/// What the generated-keys processor needs to know about a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementModel {
    kind: StatementKind,
    schema: Option<String>,
    table_name: String,
    has_returning: bool,
}

impl StatementModel {
    /// Creates a statement model.
    ///
    /// `table_name` is kept as written in the statement, including any
    /// surrounding double quotes.
    #[must_use]
    pub fn new(kind: StatementKind, table_name: impl Into<String>, has_returning: bool) -> Self {
        Self {
            kind,
            schema: None,
            table_name: table_name.into(),
            has_returning,
        }
    }

    /// Sets the schema qualifier (as written).
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// The statement form.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The schema qualifier, if the table name was qualified.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// The raw target table name, possibly quoted.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Whether the statement already carries a RETURNING clause.
    #[must_use]
    pub const fn has_returning(&self) -> bool {
        self.has_returning
    }
}
