//! DML head parser implementation.

use super::error::ParseError;
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::statement::{StatementKind, StatementModel};

/// Parser for the head of INSERT, UPDATE, DELETE and UPDATE OR INSERT statements.
///
/// The statement head (keyword, target table, the clause that must follow the
/// table) is parsed strictly. The remainder is only checked for lexical
/// validity and balanced parentheses while looking for a `RETURNING` keyword
/// at nesting depth zero.
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
}

/// A table reference as written in the statement.
struct TableName {
    schema: Option<String>,
    name: String,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            input,
            lexer,
            current,
            previous: Token::new(TokenKind::Eof, Span::new(0, 0)),
        }
    }

    /// Parses a single data-modifying statement.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not an INSERT, UPDATE, DELETE or
    /// UPDATE OR INSERT statement, or if it is lexically malformed.
    pub fn parse_statement(&mut self) -> Result<StatementModel, ParseError> {
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Insert) => self.parse_insert_statement(),
            TokenKind::Keyword(Keyword::Update) => {
                self.advance();
                if self.check_keyword(Keyword::Or) {
                    self.parse_update_or_insert_statement()
                } else {
                    self.parse_update_statement()
                }
            }
            TokenKind::Keyword(Keyword::Delete) => self.parse_delete_statement(),
            TokenKind::Keyword(Keyword::Merge) => Err(ParseError::new(
                "MERGE statements are not supported",
                self.current.span,
            )),
            _ => Err(ParseError::unexpected(
                "INSERT, UPDATE, DELETE, or UPDATE OR INSERT",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }

    /// Parses `INSERT INTO table [(columns)] {VALUES | SELECT | DEFAULT VALUES} ...`.
    fn parse_insert_statement(&mut self) -> Result<StatementModel, ParseError> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;
        let table = self.parse_table_name()?;
        self.parse_optional_column_list()?;

        if self.check_keyword(Keyword::Values) {
            self.advance();
            self.expect(&TokenKind::LeftParen)?;
            self.finish(StatementKind::Insert, table, 1)
        } else if self.check_keyword(Keyword::Default) {
            self.advance();
            self.expect_keyword(Keyword::Values)?;
            self.finish(StatementKind::Insert, table, 0)
        } else if self.check_keyword(Keyword::Select) || self.check_keyword(Keyword::With) {
            self.finish(StatementKind::Insert, table, 0)
        } else {
            Err(ParseError::unexpected(
                "VALUES, SELECT, or DEFAULT VALUES",
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    /// Parses `UPDATE OR INSERT INTO table [(columns)] VALUES (...) ...`.
    ///
    /// The leading `UPDATE` has already been consumed.
    fn parse_update_or_insert_statement(&mut self) -> Result<StatementModel, ParseError> {
        self.expect_keyword(Keyword::Or)?;
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;
        let table = self.parse_table_name()?;
        self.parse_optional_column_list()?;
        self.expect_keyword(Keyword::Values)?;
        self.expect(&TokenKind::LeftParen)?;
        self.finish(StatementKind::UpdateOrInsert, table, 1)
    }

    /// Parses `UPDATE table [[AS] alias] SET column = ...`.
    ///
    /// The leading `UPDATE` has already been consumed.
    fn parse_update_statement(&mut self) -> Result<StatementModel, ParseError> {
        let table = self.parse_table_name()?;
        self.parse_optional_alias()?;
        self.expect_keyword(Keyword::Set)?;
        self.expect_identifier()?;
        // Column may be qualified by the table alias
        if self.check(&TokenKind::Dot) {
            self.advance();
            self.expect_identifier()?;
        }
        self.expect(&TokenKind::Eq)?;
        self.finish(StatementKind::Update, table, 0)
    }

    /// Parses `DELETE FROM table [[AS] alias] ...`.
    fn parse_delete_statement(&mut self) -> Result<StatementModel, ParseError> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;
        let table = self.parse_table_name()?;
        self.parse_optional_alias()?;
        self.finish(StatementKind::Delete, table, 0)
    }

    /// Parses `[schema.]table`, keeping each part as written.
    fn parse_table_name(&mut self) -> Result<TableName, ParseError> {
        let first = self.expect_identifier()?;
        if self.check(&TokenKind::Dot) {
            self.advance();
            let name = self.expect_identifier()?;
            Ok(TableName {
                schema: Some(first),
                name,
            })
        } else {
            Ok(TableName {
                schema: None,
                name: first,
            })
        }
    }

    /// Parses an optional parenthesized column list.
    fn parse_optional_column_list(&mut self) -> Result<(), ParseError> {
        if !self.check(&TokenKind::LeftParen) {
            return Ok(());
        }
        self.advance();
        loop {
            self.expect_identifier()?;
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(&TokenKind::RightParen)
    }

    /// Parses an optional table alias.
    fn parse_optional_alias(&mut self) -> Result<(), ParseError> {
        if self.check_keyword(Keyword::As) {
            self.advance();
            self.expect_identifier()?;
        } else if self.current.is_identifier() {
            self.advance();
        }
        Ok(())
    }

    /// Scans the statement body up to the end of input.
    ///
    /// `depth` is the parenthesis nesting level already opened by the head.
    fn finish(
        &mut self,
        kind: StatementKind,
        table: TableName,
        mut depth: usize,
    ) -> Result<StatementModel, ParseError> {
        let mut has_returning = false;

        loop {
            match &self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Error(_) => {
                    return Err(ParseError::unexpected(
                        "a valid token",
                        self.current.kind.clone(),
                        self.current.span,
                    ));
                }
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        ParseError::new("Unbalanced closing parenthesis", self.current.span)
                    })?;
                }
                TokenKind::Keyword(Keyword::Returning) if depth == 0 => has_returning = true,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    if !self.current.is_eof() {
                        return Err(ParseError::new(
                            "Only a single statement is supported",
                            self.current.span,
                        ));
                    }
                    break;
                }
                _ => {}
            }
            self.advance();
        }

        if depth > 0 {
            return Err(ParseError::unexpected(
                "RightParen",
                TokenKind::Eof,
                self.current.span,
            ));
        }

        let model = StatementModel::new(kind, table.name, has_returning);
        Ok(match table.schema {
            Some(schema) => model.with_schema(schema),
            None => model,
        })
    }

    // --- Helper methods ---

    /// Advances to the next token.
    fn advance(&mut self) {
        self.previous = core::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current.kind) == core::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Expects the current token to be the given kind.
    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                format!("{kind:?}"),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    /// Expects the current token to be the given keyword.
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                keyword.as_str(),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    /// Expects an identifier and returns it as written, quotes included.
    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if self.current.is_identifier() {
            self.advance();
            Ok(self.previous.span.slice(self.input).to_string())
        } else {
            Err(ParseError::unexpected(
                "identifier",
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Result<StatementModel, ParseError> {
        Parser::new(sql).parse_statement()
    }

    #[test]
    fn test_insert_values() {
        let stmt = parse("INSERT INTO customer (name, email) VALUES ('Alice', ?)").unwrap();
        assert_eq!(stmt.kind(), StatementKind::Insert);
        assert_eq!(stmt.table_name(), "customer");
        assert!(!stmt.has_returning());
    }

    #[test]
    fn test_quoted_table_kept_raw() {
        let stmt = parse("INSERT INTO \"Customer\" DEFAULT VALUES").unwrap();
        assert_eq!(stmt.table_name(), "\"Customer\"");
    }

    #[test]
    fn test_update_with_alias_and_returning() {
        let stmt = parse("UPDATE orders o SET o.total = 10 WHERE o.id = 1 RETURNING o.id").unwrap();
        assert_eq!(stmt.kind(), StatementKind::Update);
        assert_eq!(stmt.table_name(), "orders");
        assert!(stmt.has_returning());
    }

    #[test]
    fn test_update_or_insert() {
        let stmt =
            parse("UPDATE OR INSERT INTO t (id, v) VALUES (1, 2) MATCHING (id)").unwrap();
        assert_eq!(stmt.kind(), StatementKind::UpdateOrInsert);
        assert_eq!(stmt.table_name(), "t");
    }

    #[test]
    fn test_delete() {
        let stmt = parse("DELETE FROM t WHERE id = 1;").unwrap();
        assert_eq!(stmt.kind(), StatementKind::Delete);
        assert!(!stmt.has_returning());
    }

    #[test]
    fn test_nested_returning_is_ignored() {
        let stmt = parse("INSERT INTO t (a) SELECT (RETURNING) FROM u").unwrap();
        assert!(!stmt.has_returning());
    }

    #[test]
    fn test_rejections() {
        assert!(parse("SELECT * FROM t").is_err());
        assert!(parse("MERGE INTO t USING u ON 1 = 1").is_err());
        assert!(parse("INSERT INTO t VALUES (1").is_err());
        assert!(parse("DELETE FROM t WHERE a = 1)").is_err());
        assert!(parse("DELETE FROM t; DELETE FROM u").is_err());
        assert!(parse("UPDATE t WHERE id = 1").is_err());
    }
}
