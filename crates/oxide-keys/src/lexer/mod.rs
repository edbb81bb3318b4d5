//! DML Lexer/Tokenizer
//!
//! A hand-written lexer that turns statement text into tokens. Comments are
//! skipped, string literals and quoted identifiers are unescaped, and every
//! token keeps its byte span so callers can recover the raw source text.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
