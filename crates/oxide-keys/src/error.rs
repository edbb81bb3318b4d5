//! Error types for generated-keys processing.

use crate::parser::ParseError;

/// Message used whenever key generation is requested without a statement parser.
pub const GENERATED_KEYS_NOT_AVAILABLE: &str =
    "Generated keys functionality not available, no statement parser was loaded";

/// Errors raised while preparing a generated-keys query.
#[derive(Debug, thiserror::Error)]
pub enum KeysError {
    /// Invalid option value, or an internal state that should be unreachable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Generated keys were requested but no statement parser is available.
    #[error("{}", GENERATED_KEYS_NOT_AVAILABLE)]
    FeatureUnavailable,

    /// The statement parser rejected the statement text.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Looking up table columns failed.
    #[error("metadata error: {0}")]
    Metadata(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An earlier attempt to process the query failed; processing is not retried.
    #[error("generated keys processing already failed for this query")]
    PreviouslyFailed,
}

/// Result type for generated-keys operations.
pub type Result<T> = std::result::Result<T, KeysError>;
