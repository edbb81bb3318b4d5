#![allow(dead_code)]

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use oxide_keys::metadata::TableDef;
use oxide_keys::{
    Catalog, ColumnInfo, DmlParser, GeneratedKeysSupport, MetadataSource, ParseError,
    StatementModel, StatementParser,
};

/// CUSTOMER (ID, NAME, AGE), T (ID), ORDER_LINE (ID, QTY) and a column-less EMPTY.
pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new()
        .with_table("CUSTOMER", &["ID", "NAME", "AGE"])
        .with_table("T", &["ID"])
        .with_table("ORDER_LINE", &["ID", "QTY"])
        .with_table("Mixed", &["Id", "Label"]);
    catalog.add_table(TableDef::with_columns("EMPTY", Vec::new()));
    catalog
}

pub fn support() -> GeneratedKeysSupport {
    GeneratedKeysSupport::with_parser(DmlParser::new())
}

/// Wraps [`DmlParser`] and counts calls.
pub struct CountingParser {
    calls: Arc<AtomicUsize>,
}

impl StatementParser for CountingParser {
    fn parse_insert_statement(&self, sql: &str) -> Result<StatementModel, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DmlParser::new().parse_insert_statement(sql)
    }
}

/// Support backed by a [`CountingParser`], plus its call counter.
pub fn counting_support() -> (GeneratedKeysSupport, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let parser = CountingParser {
        calls: Arc::clone(&calls),
    };
    (GeneratedKeysSupport::with_parser(parser), calls)
}

/// Returns the same model for every statement.
pub struct FixedParser(pub StatementModel);

impl StatementParser for FixedParser {
    fn parse_insert_statement(&self, _sql: &str) -> Result<StatementModel, ParseError> {
        Ok(self.0.clone())
    }
}

/// Wraps a [`Catalog`] and counts lookups.
#[derive(Debug)]
pub struct CountingSource {
    catalog: Catalog,
    calls: Cell<usize>,
}

impl CountingSource {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl MetadataSource for CountingSource {
    type Error = std::convert::Infallible;

    fn columns(&self, table_name_pattern: &str) -> Result<Vec<ColumnInfo>, Self::Error> {
        self.calls.set(self.calls.get() + 1);
        self.catalog.columns(table_name_pattern)
    }
}

/// A metadata source whose lookups always fail.
#[derive(Debug)]
pub struct FailingSource;

impl MetadataSource for FailingSource {
    type Error = std::io::Error;

    fn columns(&self, _table_name_pattern: &str) -> Result<Vec<ColumnInfo>, Self::Error> {
        Err(std::io::Error::other("connection reset"))
    }
}
