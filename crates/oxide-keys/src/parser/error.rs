//! Parser error types.

use crate::lexer::{Span, TokenKind};

/// Raised when statement text is not a recognized data-modifying statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected: String = expected.into();
        let message = match &found {
            TokenKind::Eof => format!("Unexpected end of input: expected {expected}"),
            TokenKind::Error(lexical) => format!("{lexical} (expected {expected})"),
            other => format!("Unexpected token: expected {expected}, found {other:?}"),
        };
        Self {
            message,
            span,
            expected: Some(expected),
            found: Some(found),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at position {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Keyword;

    #[test]
    fn test_unexpected_messages() {
        let err = ParseError::unexpected(
            "INSERT, UPDATE, or DELETE",
            TokenKind::Keyword(Keyword::Select),
            Span::new(0, 6),
        );
        assert_eq!(err.expected.as_deref(), Some("INSERT, UPDATE, or DELETE"));
        assert!(err.to_string().ends_with("at position 0..6"));

        let eof = ParseError::unexpected("table name", TokenKind::Eof, Span::new(11, 11));
        assert!(eof.message.starts_with("Unexpected end of input"));
    }
}
