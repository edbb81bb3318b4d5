//! DML tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes statement text.
pub struct Lexer<'a> {
    /// The input statement text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            // -- line comment
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // /* block comment */
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    /// Creates a token spanning from the token start to the current position.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        Keyword::from_str(text).map_or_else(
            || self.make_token(TokenKind::Identifier(text.to_string())),
            |keyword| self.make_token(TokenKind::Keyword(keyword)),
        )
    }

    /// Scans text enclosed in `quote`, where a doubled quote escapes itself.
    ///
    /// Returns `None` when the closing quote is missing.
    fn scan_quoted(&mut self, quote: char) -> Option<String> {
        self.advance();
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        value.push(quote);
                        self.advance();
                    } else {
                        return Some(value);
                    }
                }
                Some(c) => value.push(c),
                None => return None,
            }
        }
    }

    /// Scans a numeric literal, keeping its text.
    ///
    /// Values are not converted, so literals of any precision are accepted.
    fn scan_number(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];
        self.make_token(TokenKind::Number(text.to_string()))
    }

    /// Returns a one- or two-character operator, consuming one of `seconds` if next.
    fn operator(&mut self, first: char, seconds: &[char]) -> Token {
        let mut op = String::from(first);
        if let Some(next) = self.peek().filter(|c| seconds.contains(c)) {
            self.advance();
            op.push(next);
        }
        self.make_token(TokenKind::Operator(op))
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '.' => self.make_token(TokenKind::Dot),
            '=' => self.make_token(TokenKind::Eq),
            '?' => self.make_token(TokenKind::Question),
            ':' => self.make_token(TokenKind::Colon),
            '+' | '-' | '*' | '/' | '%' => self.make_token(TokenKind::Operator(c.to_string())),
            '<' => self.operator(c, &['=', '>']),
            '>' => self.operator(c, &['=']),
            '|' => self.operator(c, &['|']),
            // Negated comparisons: !=, !<, !>, ^=, ~< ...
            '!' | '^' | '~' => {
                if self.peek().is_some_and(|next| matches!(next, '=' | '<' | '>')) {
                    self.operator(c, &['=', '<', '>'])
                } else {
                    self.make_token(TokenKind::Error(format!("Unexpected character: {c}")))
                }
            }

            '\'' => {
                self.pos = self.start;
                match self.scan_quoted('\'') {
                    Some(value) => self.make_token(TokenKind::String(value)),
                    None => self.make_token(TokenKind::Error(String::from(
                        "Unterminated string literal",
                    ))),
                }
            }

            '"' => {
                self.pos = self.start;
                match self.scan_quoted('"') {
                    Some(name) if name.is_empty() => self.make_token(TokenKind::Error(
                        String::from("Empty quoted identifier"),
                    )),
                    Some(name) => self.make_token(TokenKind::QuotedIdentifier(name)),
                    None => self.make_token(TokenKind::Error(String::from(
                        "Unterminated quoted identifier",
                    ))),
                }
            }

            c if c.is_ascii_digit() => {
                self.pos = self.start;
                self.scan_number()
            }

            c if c.is_alphabetic() || c == '_' => {
                self.pos = self.start;
                self.scan_identifier()
            }

            _ => self.make_token(TokenKind::Error(format!("Unexpected character: {c}"))),
        }
    }

    /// Tokenizes the entire input and returns all tokens, ending with `Eof`.
    #[cfg(test)]
    fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
