//! Token types for the DML lexer.

use super::Span;

/// Keywords that shape the head of a data-modifying statement.
///
/// Every other word is lexed as an identifier; the statement parser only
/// needs enough vocabulary to classify a statement and find its target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Statement heads
    Insert,
    Update,
    Delete,
    Merge,
    Select,
    With,

    // Clauses
    Into,
    Values,
    Default,
    Set,
    From,
    Where,
    Or,
    As,
    Matching,
    Returning,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "MERGE" => Some(Self::Merge),
            "SELECT" => Some(Self::Select),
            "WITH" => Some(Self::With),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "DEFAULT" => Some(Self::Default),
            "SET" => Some(Self::Set),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "OR" => Some(Self::Or),
            "AS" => Some(Self::As),
            "MATCHING" => Some(Self::Matching),
            "RETURNING" => Some(Self::Returning),
            _ => None,
        }
    }

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::Select => "SELECT",
            Self::With => "WITH",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Default => "DEFAULT",
            Self::Set => "SET",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Or => "OR",
            Self::As => "AS",
            Self::Matching => "MATCHING",
            Self::Returning => "RETURNING",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal as written (e.g., 42, 3.14, 1e10)
    Number(String),
    /// String literal (e.g., 'hello'), unescaped
    String(String),

    // Identifiers and keywords
    /// Regular identifier (e.g., `customer_id`)
    Identifier(String),
    /// Double-quoted identifier, unescaped and without its quotes
    QuotedIdentifier(String),
    /// Keyword
    Keyword(Keyword),

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// =
    Eq,
    /// ?
    Question,
    /// :
    Colon,

    /// Any other operator (`+`, `<>`, `||`, ...)
    Operator(String),

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// A token with its span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true for regular and quoted identifiers.
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("RETURNING"), Some(Keyword::Returning));
        assert_eq!(Keyword::from_str("returning"), Some(Keyword::Returning));
        assert_eq!(Keyword::from_str("MaTcHiNg"), Some(Keyword::Matching));
        assert_eq!(Keyword::from_str("customer"), None);
    }

    #[test]
    fn test_keyword_round_trip() {
        for kw in [Keyword::Insert, Keyword::Or, Keyword::Returning] {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_token_predicates() {
        let ident = Token::new(TokenKind::QuotedIdentifier("Id".into()), Span::new(0, 4));
        let into = Token::new(TokenKind::Keyword(Keyword::Into), Span::new(0, 4));
        assert!(ident.is_identifier());
        assert!(!into.is_identifier());
        assert_eq!(into.as_keyword(), Some(Keyword::Into));
        assert!(Token::new(TokenKind::Eof, Span::default()).is_eof());
    }
}
