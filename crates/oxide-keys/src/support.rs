//! Optional statement-parser capability.
//!
//! Generated keys can only be emulated when a [`StatementParser`] is
//! available. The process-wide capability is resolved once, on first use:
//! with the `parser` feature (enabled by default) it holds a [`DmlParser`],
//! without it the capability is permanently absent. Callers that need a
//! different parser, or want to simulate its absence, construct their own
//! [`GeneratedKeysSupport`] and pass it to the query constructors.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::parser::StatementParser;

/// Shared handle to an optional [`StatementParser`].
#[derive(Clone, Default)]
pub struct GeneratedKeysSupport {
    parser: Option<Arc<dyn StatementParser>>,
}

impl GeneratedKeysSupport {
    /// Support backed by the given parser.
    #[must_use]
    pub fn with_parser(parser: impl StatementParser + 'static) -> Self {
        Self {
            parser: Some(Arc::new(parser)),
        }
    }

    /// Support without a parser: only `NO_GENERATED_KEYS` queries are accepted.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { parser: None }
    }

    /// The process-wide capability, initialized on first call.
    #[must_use]
    pub fn global() -> &'static Self {
        static SUPPORT: OnceLock<GeneratedKeysSupport> = OnceLock::new();
        SUPPORT.get_or_init(Self::load)
    }

    #[cfg(feature = "parser")]
    fn load() -> Self {
        tracing::debug!("Loaded generated keys statement parser");
        Self::with_parser(crate::parser::DmlParser::new())
    }

    #[cfg(not(feature = "parser"))]
    fn load() -> Self {
        tracing::error!(
            "Unable to load generated key parser. {}",
            crate::error::GENERATED_KEYS_NOT_AVAILABLE
        );
        Self::unavailable()
    }

    /// Whether a statement parser is available.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.parser.is_some()
    }

    /// The statement parser, if available.
    #[must_use]
    pub fn parser(&self) -> Option<&dyn StatementParser> {
        self.parser.as_deref()
    }
}

impl fmt::Debug for GeneratedKeysSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedKeysSupport")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Whether the process-wide generated keys support was loaded.
#[must_use]
pub fn is_generated_keys_support_loaded() -> bool {
    GeneratedKeysSupport::global().is_loaded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DmlParser;

    #[test]
    fn test_injected_support() {
        assert!(GeneratedKeysSupport::with_parser(DmlParser::new()).is_loaded());
        assert!(!GeneratedKeysSupport::unavailable().is_loaded());
        assert!(GeneratedKeysSupport::unavailable().parser().is_none());
    }

    #[test]
    fn test_global_is_stable() {
        let first = is_generated_keys_support_loaded();
        assert_eq!(first, cfg!(feature = "parser"));
        assert_eq!(is_generated_keys_support_loaded(), first);
        assert!(std::ptr::eq(
            GeneratedKeysSupport::global(),
            GeneratedKeysSupport::global()
        ));
    }
}
