//! Generated-keys query processing.
//!
//! A [`GeneratedKeysQuery`] wraps one statement and decides, on first use,
//! whether a `RETURNING` clause must be appended so the server hands back
//! generated key values. The decision is computed at most once and then
//! memoized; the instance is meant to be owned by a single prepared
//! statement, and its `&mut self` accessors are not a synchronization
//! mechanism.

use tracing::{debug, trace};

use crate::error::{KeysError, Result};
use crate::metadata::{normalize_object_name, ColumnInfo, MetadataSource};
use crate::statement::StatementModel;
use crate::support::GeneratedKeysSupport;

/// The two accepted `autoGeneratedKeys` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoGeneratedKeys {
    /// Return the generated keys (all columns of the target table).
    ReturnGeneratedKeys,
    /// Leave the statement alone.
    NoGeneratedKeys,
}

impl AutoGeneratedKeys {
    /// Flag value requesting generated keys.
    pub const RETURN_GENERATED_KEYS: i32 = 1;
    /// Flag value declining generated keys.
    pub const NO_GENERATED_KEYS: i32 = 2;

    /// Converts a numeric flag.
    ///
    /// # Errors
    ///
    /// Returns `KeysError::InvalidConfiguration` for any value other than
    /// [`Self::RETURN_GENERATED_KEYS`] and [`Self::NO_GENERATED_KEYS`].
    pub fn from_flag(flag: i32) -> Result<Self> {
        match flag {
            Self::RETURN_GENERATED_KEYS => Ok(Self::ReturnGeneratedKeys),
            Self::NO_GENERATED_KEYS => Ok(Self::NoGeneratedKeys),
            other => Err(KeysError::InvalidConfiguration(format!(
                "Supplied value for autoGeneratedKeys is invalid: {other}"
            ))),
        }
    }

    /// Returns the numeric flag.
    #[must_use]
    pub const fn flag(self) -> i32 {
        match self {
            Self::ReturnGeneratedKeys => Self::RETURN_GENERATED_KEYS,
            Self::NoGeneratedKeys => Self::NO_GENERATED_KEYS,
        }
    }
}

/// Which columns the caller wants back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelection {
    /// Do not alter the query.
    None,
    /// Every column of the target table.
    AllColumns,
    /// Columns whose ordinal position is listed.
    ByOrdinal(Vec<i32>),
    /// Caller-supplied column names, used verbatim.
    ByName(Vec<String>),
}

/// How the query is (or will be) rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Return the original text unchanged.
    KeepUnmodified,
    /// Append every column of the target table.
    AddAllColumns,
    /// Append the columns selected by ordinal position.
    AddIndexed,
    /// Append the caller-supplied names.
    AddNamed,
    /// The statement already has a RETURNING clause.
    AlreadyHasReturning,
}

impl From<&KeySelection> for QueryMode {
    fn from(selection: &KeySelection) -> Self {
        match selection {
            KeySelection::None => Self::KeepUnmodified,
            KeySelection::AllColumns => Self::AddAllColumns,
            KeySelection::ByOrdinal(_) => Self::AddIndexed,
            KeySelection::ByName(_) => Self::AddNamed,
        }
    }
}

/// The memoized outcome of processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResult {
    generates_keys: bool,
    final_sql: String,
}

impl ProcessedResult {
    /// Whether executing `final_sql` returns generated keys.
    #[must_use]
    pub const fn generates_keys(&self) -> bool {
        self.generates_keys
    }

    /// The statement text to execute.
    #[must_use]
    pub fn final_sql(&self) -> &str {
        &self.final_sql
    }
}

/// Lifecycle of a [`GeneratedKeysQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProcessingState {
    Unprocessed,
    /// `None` when processing failed.
    Processed(Option<ProcessedResult>),
}

/// A statement prepared for generated-keys retrieval.
///
/// Construction validates the request eagerly; parsing and metadata lookups
/// happen on the first call to [`generates_keys`](Self::generates_keys) or
/// [`query_string`](Self::query_string).
#[derive(Debug)]
pub struct GeneratedKeysQuery<M> {
    original_sql: String,
    selection: KeySelection,
    mode: QueryMode,
    statement_model: Option<StatementModel>,
    support: GeneratedKeysSupport,
    metadata: M,
    state: ProcessingState,
}

impl<M: MetadataSource> GeneratedKeysQuery<M> {
    fn new(
        sql: impl Into<String>,
        selection: KeySelection,
        support: &GeneratedKeysSupport,
        metadata: M,
    ) -> Self {
        let mode = QueryMode::from(&selection);
        Self {
            original_sql: sql.into(),
            selection,
            mode,
            statement_model: None,
            support: support.clone(),
            metadata,
            state: ProcessingState::Unprocessed,
        }
    }

    /// Prepares `sql` according to an `autoGeneratedKeys` value.
    ///
    /// `ReturnGeneratedKeys` selects all columns of the target table;
    /// `NoGeneratedKeys` keeps the statement unmodified.
    ///
    /// # Errors
    ///
    /// Returns `KeysError::FeatureUnavailable` when keys are requested and
    /// `support` has no parser.
    pub fn with_mode(
        sql: impl Into<String>,
        mode: AutoGeneratedKeys,
        support: &GeneratedKeysSupport,
        metadata: M,
    ) -> Result<Self> {
        let selection = match mode {
            AutoGeneratedKeys::ReturnGeneratedKeys => {
                if !support.is_loaded() {
                    return Err(KeysError::FeatureUnavailable);
                }
                KeySelection::AllColumns
            }
            AutoGeneratedKeys::NoGeneratedKeys => KeySelection::None,
        };
        Ok(Self::new(sql, selection, support, metadata))
    }

    /// Prepares `sql` according to a numeric `autoGeneratedKeys` flag.
    ///
    /// # Errors
    ///
    /// Returns `KeysError::InvalidConfiguration` for an unknown flag, and
    /// `KeysError::FeatureUnavailable` as for [`with_mode`](Self::with_mode).
    pub fn with_mode_flag(
        sql: impl Into<String>,
        flag: i32,
        support: &GeneratedKeysSupport,
        metadata: M,
    ) -> Result<Self> {
        Self::with_mode(sql, AutoGeneratedKeys::from_flag(flag)?, support, metadata)
    }

    /// Prepares `sql` to return the columns at the given ordinal positions.
    ///
    /// Columns are appended in ascending ordinal order, whatever the order of
    /// `column_indexes`. Positions missing from the table are dropped. An
    /// empty or absent list keeps the statement unmodified.
    ///
    /// # Errors
    ///
    /// Returns `KeysError::FeatureUnavailable` when `support` has no parser.
    pub fn with_column_indexes(
        sql: impl Into<String>,
        column_indexes: Option<&[i32]>,
        support: &GeneratedKeysSupport,
        metadata: M,
    ) -> Result<Self> {
        if !support.is_loaded() {
            return Err(KeysError::FeatureUnavailable);
        }
        let selection = match column_indexes {
            Some(indexes) if !indexes.is_empty() => KeySelection::ByOrdinal(indexes.to_vec()),
            _ => KeySelection::None,
        };
        Ok(Self::new(sql, selection, support, metadata))
    }

    /// Prepares `sql` to return the named columns.
    ///
    /// Names are appended as given: they are neither quoted nor checked for
    /// existence. An empty or absent list keeps the statement unmodified.
    ///
    /// # Errors
    ///
    /// Returns `KeysError::FeatureUnavailable` when `support` has no parser.
    pub fn with_column_names<S: AsRef<str>>(
        sql: impl Into<String>,
        column_names: Option<&[S]>,
        support: &GeneratedKeysSupport,
        metadata: M,
    ) -> Result<Self> {
        if !support.is_loaded() {
            return Err(KeysError::FeatureUnavailable);
        }
        let selection = match column_names {
            Some(names) if !names.is_empty() => {
                KeySelection::ByName(names.iter().map(|n| n.as_ref().to_string()).collect())
            }
            _ => KeySelection::None,
        };
        Ok(Self::new(sql, selection, support, metadata))
    }

    /// The statement text as supplied.
    #[must_use]
    pub fn original_sql(&self) -> &str {
        &self.original_sql
    }

    /// The requested key selection.
    #[must_use]
    pub const fn selection(&self) -> &KeySelection {
        &self.selection
    }

    /// The current query mode; after processing, the mode that survived.
    #[must_use]
    pub const fn query_mode(&self) -> QueryMode {
        self.mode
    }

    /// The parsed statement, once processing has parsed it.
    #[must_use]
    pub const fn statement_model(&self) -> Option<&StatementModel> {
        self.statement_model.as_ref()
    }

    /// Whether the query will return generated keys.
    ///
    /// # Errors
    ///
    /// Returns `KeysError::Metadata` if the column lookup fails.
    pub fn generates_keys(&mut self) -> Result<bool> {
        Ok(self.process()?.generates_keys)
    }

    /// The statement text to execute.
    ///
    /// Use [`generates_keys`](Self::generates_keys) to find out whether it
    /// returns generated keys.
    ///
    /// # Errors
    ///
    /// Returns `KeysError::Metadata` if the column lookup fails.
    pub fn query_string(&mut self) -> Result<&str> {
        Ok(&self.process()?.final_sql)
    }

    /// Processes the query and returns the result.
    ///
    /// # Errors
    ///
    /// As for [`query_string`](Self::query_string).
    pub fn into_result(mut self) -> Result<ProcessedResult> {
        self.process()?;
        match self.state {
            ProcessingState::Processed(Some(result)) => Ok(result),
            ProcessingState::Processed(None) | ProcessingState::Unprocessed => {
                Err(KeysError::PreviouslyFailed)
            }
        }
    }

    /// Runs parsing and rewriting once; later calls return the memoized result.
    fn process(&mut self) -> Result<&ProcessedResult> {
        if self.state == ProcessingState::Unprocessed {
            let outcome = self
                .process_statement_model()
                .and_then(|()| self.update_query());
            match outcome {
                Ok(result) => self.state = ProcessingState::Processed(Some(result)),
                Err(e) => {
                    self.state = ProcessingState::Processed(None);
                    return Err(e);
                }
            }
        }

        match &self.state {
            ProcessingState::Processed(Some(result)) => Ok(result),
            ProcessingState::Processed(None) | ProcessingState::Unprocessed => {
                Err(KeysError::PreviouslyFailed)
            }
        }
    }

    /// Parses the statement and detects an existing RETURNING clause.
    fn process_statement_model(&mut self) -> Result<()> {
        let Some(parser) = self.support.parser() else {
            // Not requesting keys must never fail, even without a parser
            if self.mode == QueryMode::KeepUnmodified {
                return Ok(());
            }
            return Err(KeysError::InvalidConfiguration(format!(
                "query mode {:?} requires a statement parser; {}",
                self.mode,
                crate::error::GENERATED_KEYS_NOT_AVAILABLE
            )));
        };

        match parser.parse_insert_statement(&self.original_sql) {
            Ok(model) => {
                if model.has_returning() {
                    self.mode = QueryMode::AlreadyHasReturning;
                }
                self.statement_model = Some(model);
            }
            Err(e) => {
                debug!(
                    sql = %self.original_sql,
                    error = %e,
                    "Statement not recognized, keeping it unmodified"
                );
                self.mode = QueryMode::KeepUnmodified;
            }
        }
        Ok(())
    }

    /// Builds the final statement text for the current mode.
    fn update_query(&mut self) -> Result<ProcessedResult> {
        let mut generates_keys = false;
        let columns = match self.mode {
            QueryMode::AddAllColumns => Some(self.resolve_columns(|_| true)?),
            QueryMode::AddIndexed => {
                let mut indexes = match &self.selection {
                    KeySelection::ByOrdinal(indexes) => indexes.clone(),
                    _ => Vec::new(),
                };
                indexes.sort_unstable();
                Some(self.resolve_columns(|position| indexes.binary_search(&position).is_ok())?)
            }
            QueryMode::AddNamed => Some(match &self.selection {
                KeySelection::ByName(names) => names.clone(),
                _ => Vec::new(),
            }),
            QueryMode::AlreadyHasReturning => {
                generates_keys = true;
                self.mode = QueryMode::KeepUnmodified;
                None
            }
            QueryMode::KeepUnmodified => None,
        };

        let mut final_sql = None;
        if let Some(columns) = columns {
            if columns.is_empty() {
                self.mode = QueryMode::KeepUnmodified;
            } else {
                generates_keys = true;
                final_sql = Some(add_returning_clause(&self.original_sql, &columns));
            }
        }

        debug!(mode = ?self.mode, generates_keys, "Processed generated keys query");
        Ok(ProcessedResult {
            generates_keys,
            final_sql: final_sql.unwrap_or_else(|| self.original_sql.clone()),
        })
    }

    /// Looks up the target table's columns and quotes those accepted by `keep`.
    ///
    /// Columns stay in the order the metadata source returns them.
    fn resolve_columns(&self, keep: impl Fn(i32) -> bool) -> Result<Vec<String>> {
        let table_name = self
            .statement_model
            .as_ref()
            .map(StatementModel::table_name)
            .ok_or_else(|| {
                KeysError::InvalidConfiguration(String::from(
                    "column lookup requires a parsed statement",
                ))
            })?;
        let pattern = normalize_object_name(table_name);

        let columns: Vec<ColumnInfo> = self
            .metadata
            .columns(&pattern)
            .map_err(|e| KeysError::Metadata(Box::new(e)))?;
        let names: Vec<String> = columns
            .into_iter()
            .filter(|column| keep(column.ordinal_position))
            // Quote to preserve mixed-case names
            .map(|column| format!("\"{}\"", column.name))
            .collect();

        trace!(table = %pattern, columns = ?names, "Resolved generated key columns");
        Ok(names)
    }
}

/// Appends `RETURNING` with `columns` to `sql`, dropping one trailing semicolon.
fn add_returning_clause(sql: &str, columns: &[String]) -> String {
    let statement = sql.strip_suffix(';').unwrap_or(sql);
    format!("{statement}\nRETURNING {}", columns.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Catalog;
    use crate::parser::DmlParser;

    fn support() -> GeneratedKeysSupport {
        GeneratedKeysSupport::with_parser(DmlParser::new())
    }

    #[test]
    fn test_from_flag() {
        assert_eq!(
            AutoGeneratedKeys::from_flag(1).unwrap(),
            AutoGeneratedKeys::ReturnGeneratedKeys
        );
        assert_eq!(
            AutoGeneratedKeys::from_flag(AutoGeneratedKeys::NoGeneratedKeys.flag()).unwrap(),
            AutoGeneratedKeys::NoGeneratedKeys
        );
        assert!(matches!(
            AutoGeneratedKeys::from_flag(42),
            Err(KeysError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_add_returning_clause() {
        let columns = vec![String::from("\"ID\""), String::from("\"NAME\"")];
        assert_eq!(
            add_returning_clause("DELETE FROM T;", &columns),
            "DELETE FROM T\nRETURNING \"ID\",\"NAME\""
        );
        assert_eq!(
            add_returning_clause("DELETE FROM T;;", &columns[..1]),
            "DELETE FROM T;\nRETURNING \"ID\""
        );
    }

    #[test]
    fn test_initial_mode_follows_selection() {
        let catalog = Catalog::new();
        let query = GeneratedKeysQuery::with_column_indexes(
            "DELETE FROM T",
            Some(&[2][..]),
            &support(),
            &catalog,
        )
        .unwrap();
        assert_eq!(query.query_mode(), QueryMode::AddIndexed);
        assert_eq!(query.selection(), &KeySelection::ByOrdinal(vec![2]));
        assert!(query.statement_model().is_none());
    }

    #[test]
    fn test_mode_after_processing() {
        let catalog = Catalog::new().with_table("T", &["ID"]);
        let mut query = GeneratedKeysQuery::with_mode(
            "INSERT INTO t (a) VALUES (1) RETURNING id",
            AutoGeneratedKeys::ReturnGeneratedKeys,
            &support(),
            &catalog,
        )
        .unwrap();
        assert!(query.generates_keys().unwrap());
        assert_eq!(query.query_mode(), QueryMode::KeepUnmodified);
        assert_eq!(query.statement_model().map(StatementModel::table_name), Some("t"));
    }

    #[test]
    fn test_into_result() {
        let catalog = Catalog::new().with_table("T", &["ID", "A"]);
        let result = GeneratedKeysQuery::with_column_names(
            "INSERT INTO t (a) VALUES (1)",
            Some(&["id"][..]),
            &support(),
            &catalog,
        )
        .unwrap()
        .into_result()
        .unwrap();
        assert!(result.generates_keys());
        assert_eq!(result.final_sql(), "INSERT INTO t (a) VALUES (1)\nRETURNING id");
    }
}
