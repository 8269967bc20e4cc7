use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

/// Characters that can be part of a multi-character operator
const OPERATOR_CHARS: &str = "+-/%&|^<>=!:~";

/// Scanner for Go source text
pub struct GoScanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Start position of current token
    start: usize,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Line and column where the current token started
    start_line: usize,
    start_column: usize,
}

impl GoScanner {
    /// Creates a new scanner from source code
    pub fn new(source: &str) -> Self {
        GoScanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scans all tokens from source code and returns them as a vector
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token()?;
        }

        // A file may end without a trailing newline
        self.insert_semicolon();
        self.tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            self.line,
            self.column,
        ));

        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.advance();

        match c {
            ' ' | '\r' | '\t' => {}
            '\n' => {
                self.insert_semicolon();
                self.line += 1;
                self.column = 1;
            }

            '/' if self.peek() == '/' => self.scan_line_comment(),
            '/' if self.peek() == '*' => self.scan_block_comment()?,

            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),
            ',' => self.add_token(TokenKind::Comma),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::Operator("*=".into()));
                } else {
                    self.add_token(TokenKind::Star);
                }
            }

            '.' => {
                if self.peek().is_ascii_digit() {
                    self.scan_number()?;
                } else if self.peek() == '.' && self.peek_next() == '.' {
                    self.advance();
                    self.advance();
                    self.add_token(TokenKind::Ellipsis);
                } else {
                    self.add_token(TokenKind::Dot);
                }
            }

            '"' => self.scan_string()?,
            '`' => self.scan_raw_string()?,
            '\'' => self.scan_rune()?,

            c if c.is_ascii_digit() => self.scan_number()?,

            c if c.is_alphabetic() || c == '_' => self.scan_identifier_or_keyword(),

            c if OPERATOR_CHARS.contains(c) => self.scan_operator(),

            _ => {
                return Err(Error::syntax(
                    self.start_line,
                    self.start_column,
                    format!("Unexpected character '{}'", c),
                ));
            }
        }

        Ok(())
    }

    /// Emits a semicolon if the previous token can end a statement
    fn insert_semicolon(&mut self) {
        let needed = self
            .tokens
            .iter()
            .rev()
            .find(|t| !matches!(t.kind, TokenKind::Comment(_)))
            .map(|t| t.kind.ends_statement())
            .unwrap_or(false);
        if needed {
            let comments_at_end = self
                .tokens
                .iter()
                .rev()
                .take_while(|t| matches!(t.kind, TokenKind::Comment(_)))
                .count();
            // Inserted before trailing comments so a comment stays next to the
            // statement it annotates
            let at = self.tokens.len() - comments_at_end;
            let (line, column) = match self.tokens.get(at) {
                Some(t) => (t.line, t.column),
                None => (self.line, self.column),
            };
            self.tokens.insert(
                at,
                Token::new(TokenKind::Semicolon, "\n".to_string(), line, column),
            );
        }
    }

    fn scan_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        let text = text.trim_end_matches('\r').to_string();
        self.add_token(TokenKind::Comment(text));
    }

    fn scan_block_comment(&mut self) -> Result<()> {
        self.advance(); // *
        let mut spans_lines = false;
        loop {
            if self.is_at_end() {
                return Err(Error::syntax(
                    self.start_line,
                    self.start_column,
                    "Unterminated block comment",
                ));
            }
            let c = self.advance();
            if c == '\n' {
                if !spans_lines {
                    // Go treats a multi-line comment like a newline
                    self.insert_semicolon();
                    spans_lines = true;
                }
                self.line += 1;
                self.column = 1;
            } else if c == '*' && self.peek() == '/' {
                self.advance();
                break;
            }
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        self.add_token(TokenKind::Comment(text));
        Ok(())
    }

    fn scan_string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != '"' {
            match self.peek() {
                '\n' => break,
                '\\' => {
                    self.advance();
                    if !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }

        if self.is_at_end() || self.peek() != '"' {
            return Err(Error::syntax(
                self.start_line,
                self.start_column,
                "Unterminated string",
            ));
        }

        self.advance(); // Closing "
        let text: String = self.source[self.start..self.current].iter().collect();
        self.add_token(TokenKind::String(text));
        Ok(())
    }

    fn scan_raw_string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != '`' {
            if self.advance() == '\n' {
                self.line += 1;
                self.column = 1;
            }
        }

        if self.is_at_end() {
            return Err(Error::syntax(
                self.start_line,
                self.start_column,
                "Unterminated raw string",
            ));
        }

        self.advance(); // Closing `
        let text: String = self.source[self.start..self.current].iter().collect();
        self.add_token(TokenKind::String(text));
        Ok(())
    }

    fn scan_rune(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != '\'' && self.peek() != '\n' {
            if self.advance() == '\\' && !self.is_at_end() {
                self.advance();
            }
        }

        if self.is_at_end() || self.peek() != '\'' {
            return Err(Error::syntax(
                self.start_line,
                self.start_column,
                "Unterminated rune literal",
            ));
        }

        self.advance();
        let text: String = self.source[self.start..self.current].iter().collect();
        self.add_token(TokenKind::Char(text));
        Ok(())
    }

    fn scan_number(&mut self) -> Result<()> {
        let first = self.source[self.start];
        let hex = first == '0' && matches!(self.peek(), 'x' | 'X');
        let mut is_float = first == '.';

        loop {
            let c = self.peek();
            if c.is_ascii_alphanumeric() || c == '_' {
                let prev = self.advance();
                let exponent = if hex {
                    matches!(prev, 'p' | 'P')
                } else {
                    matches!(prev, 'e' | 'E')
                };
                if exponent {
                    is_float = true;
                    if matches!(self.peek(), '+' | '-') {
                        self.advance();
                    }
                }
                if prev == 'i' {
                    is_float = true;
                }
            } else if c == '.' && self.peek_next() != '.' {
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        if text.ends_with('_') {
            return Err(Error::syntax(
                self.start_line,
                self.start_column,
                format!("Invalid number: {}", text),
            ));
        }

        if is_float {
            self.add_token(TokenKind::Float(text));
        } else {
            self.add_token(TokenKind::Int(text));
        }
        Ok(())
    }

    fn scan_identifier_or_keyword(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier(text));
        self.add_token(kind);
    }

    fn scan_operator(&mut self) {
        // `a=-1` and friends produce a single odd operator token; that only
        // happens inside expressions the parser skips anyway
        while OPERATOR_CHARS.contains(self.peek()) && self.peek() != '\0' {
            if self.peek() == '/' && matches!(self.peek_next(), '/' | '*') {
                break;
            }
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = match text.as_str() {
            "=" => TokenKind::Assign,
            "<-" => TokenKind::Arrow,
            _ => TokenKind::Operator(text),
        };
        self.add_token(kind);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        self.column += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.current += 1;
            self.column += 1;
            true
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(
            kind,
            lexeme,
            self.start_line,
            self.start_column,
        ));
    }
}
