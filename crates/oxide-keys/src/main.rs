//! oxide-keys CLI
//!
//! Command-line tool that shows how a statement is rewritten to return
//! generated keys.

use std::convert::Infallible;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_keys::metadata::CatalogError;
use oxide_keys::prelude::*;

/// Rewrites INSERT/UPDATE/DELETE statements to return generated keys.
#[derive(Parser)]
#[command(name = "oxide-keys")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON catalog describing table columns.
    #[arg(short, long, env = "OXIDE_KEYS_CATALOG", conflicts_with = "database")]
    catalog: Option<PathBuf>,

    /// SQLite database URL to read table columns from.
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// Statement to rewrite (read from stdin when omitted).
    #[arg(short, long, global = true)]
    sql: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the statement unmodified.
    #[command(name = "none")]
    NoKeys,

    /// Return all columns of the target table.
    All,

    /// Return the columns at the given ordinal positions.
    Indexes {
        /// 1-based column positions.
        #[arg(required = true)]
        indexes: Vec<i32>,
    },

    /// Return the given columns, verbatim.
    Names {
        /// Column names or expressions.
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Use a numeric autoGeneratedKeys flag (1 = return keys, 2 = no keys).
    Flag {
        /// Flag value.
        value: i32,
    },
}

/// The metadata source selected on the command line.
enum Source {
    Catalog(Catalog),
    Sqlite(SqliteCatalog),
}

impl MetadataSource for Source {
    type Error = CatalogError;

    fn columns(
        &self,
        table_name_pattern: &str,
    ) -> std::result::Result<Vec<ColumnInfo>, Self::Error> {
        match self {
            Self::Catalog(catalog) => catalog
                .columns(table_name_pattern)
                .map_err(|e: Infallible| match e {}),
            Self::Sqlite(catalog) => catalog.columns(table_name_pattern),
        }
    }
}

fn load_source(cli: &Cli) -> anyhow::Result<Source> {
    if let Some(path) = &cli.catalog {
        let catalog = Catalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?;
        return Ok(Source::Catalog(catalog));
    }
    if let Some(url) = &cli.database {
        let catalog =
            SqliteCatalog::connect(url).with_context(|| format!("connecting to {url}"))?;
        return Ok(Source::Sqlite(catalog));
    }
    Ok(Source::Catalog(Catalog::new()))
}

fn read_sql(cli: &Cli) -> anyhow::Result<String> {
    if let Some(sql) = &cli.sql {
        return Ok(sql.clone());
    }
    let mut sql = String::new();
    std::io::stdin()
        .read_to_string(&mut sql)
        .context("reading statement from stdin")?;
    Ok(sql.trim_end().to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let source = load_source(&cli)?;
    let sql = read_sql(&cli)?;
    let support = GeneratedKeysSupport::global();

    let query = match &cli.command {
        Commands::NoKeys => {
            GeneratedKeysQuery::with_mode(sql, AutoGeneratedKeys::NoGeneratedKeys, support, source)
        }
        Commands::All => GeneratedKeysQuery::with_mode(
            sql,
            AutoGeneratedKeys::ReturnGeneratedKeys,
            support,
            source,
        ),
        Commands::Indexes { indexes } => {
            GeneratedKeysQuery::with_column_indexes(sql, Some(indexes.as_slice()), support, source)
        }
        Commands::Names { names } => {
            GeneratedKeysQuery::with_column_names(sql, Some(names.as_slice()), support, source)
        }
        Commands::Flag { value } => {
            GeneratedKeysQuery::with_mode_flag(sql, *value, support, source)
        }
    }?;

    let result = query.into_result()?;
    info!(generates_keys = result.generates_keys(), "Processed statement");
    println!("{}", result.final_sql());
    Ok(())
}
