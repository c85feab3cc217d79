//! Lexer for tokenizing preference manifests
//!
//! This module converts manifest text into tokens. It handles the JavaScript
//! escape sequences Gecko accepts in string literals, tracks line/column
//! numbers for error reporting, and remembers the comment block that directly
//! precedes each token so declarations can keep their annotations.

use crate::error::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (e.g. pref, sticky_pref, lock_pref)
    Identifier(String),
    /// String value with escape sequences already processed
    String(String),
    /// Integer literal, range-checked by the parser
    Integer(i64),
    /// Boolean value
    Boolean(bool),
    /// Left parenthesis
    LeftParen,
    /// Right parenthesis
    RightParen,
    /// Comma
    Comma,
    /// Semicolon
    Semicolon,
    /// End of input
    Eof,
}

/// Lexer for tokenizing preference manifests
pub struct Lexer<'a> {
    /// Input character iterator
    chars: Peekable<Chars<'a>>,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Line where the last returned token started
    token_line: usize,
    /// Column where the last returned token started
    token_column: usize,
    /// Comment lines seen since the previous token
    comment_lines: Vec<String>,
    /// Whether any token has been returned yet
    seen_token: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
            comment_lines: Vec::new(),
            seen_token: false,
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.comment_lines.clear();
        self.skip_whitespace_and_comments()?;

        self.token_line = self.line;
        self.token_column = self.column;
        self.seen_token = true;

        let c = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ';' => {
                self.advance();
                Ok(Token::Semicolon)
            }
            '"' | '\'' => self.lex_string(c),
            '-' | '+' | '0'..='9' => self.lex_integer(),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.lex_identifier()),
            _ => Err(self.error(format!("Unexpected character: '{}'", c))),
        }
    }

    /// Position (line, column) where the last returned token started
    pub fn token_position(&self) -> (usize, usize) {
        (self.token_line, self.token_column)
    }

    /// Comment block that preceded the last returned token, joined by newlines
    pub fn take_comment(&mut self) -> Option<String> {
        if self.comment_lines.is_empty() {
            return None;
        }
        let text = self.comment_lines.join("\n");
        self.comment_lines.clear();
        Some(text)
    }

    /// Discard the remainder of `line` if the lexer is still on it
    ///
    /// The newline itself is left in place so line tracking stays correct.
    pub fn skip_line(&mut self, line: usize) {
        if self.line != line {
            return;
        }
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn error(&self, message: String) -> Error {
        Error::Lexer {
            line: self.line,
            column: self.column,
            message,
        }
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skip whitespace and comments, collecting comment text
    ///
    /// A blank line detaches any comment collected so far from the next token.
    /// Comments on the same line as the previous token belong to that token
    /// and are dropped.
    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        let mut newlines = 0;
        let mut trailing = self.seen_token;
        loop {
            match self.chars.peek() {
                Some(&'\n') => {
                    self.advance();
                    trailing = false;
                    newlines += 1;
                    if newlines >= 2 {
                        self.comment_lines.clear();
                    }
                }
                Some(&c) if c.is_whitespace() => {
                    self.advance();
                }
                Some(&'/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.next() {
                        Some('/') => {
                            self.advance();
                            self.advance();
                            let mut text = String::new();
                            while let Some(&c) = self.chars.peek() {
                                if c == '\n' {
                                    break;
                                }
                                text.push(c);
                                self.advance();
                            }
                            if !trailing {
                                self.push_comment(&text);
                            }
                            newlines = 0;
                        }
                        Some('*') => {
                            let start_line = self.line;
                            self.skip_block_comment(!trailing)?;
                            if self.line > start_line {
                                trailing = false;
                            }
                            newlines = 0;
                        }
                        // A lone slash is not valid; let next_token report it
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Skip a `/* ... */` comment, collecting its text when `keep` is set
    fn skip_block_comment(&mut self, keep: bool) -> Result<()> {
        let start_line = self.line;
        let start_column = self.column;
        self.advance();
        self.advance();

        let mut text = String::new();
        loop {
            match self.advance() {
                Some('*') if self.chars.peek() == Some(&'/') => {
                    self.advance();
                    break;
                }
                Some(c) => text.push(c),
                None => {
                    return Err(Error::Lexer {
                        line: start_line,
                        column: start_column,
                        message: "Unterminated block comment".to_string(),
                    });
                }
            }
        }

        if keep {
            for line in text.lines() {
                self.push_comment(line);
            }
        }
        Ok(())
    }

    fn push_comment(&mut self, text: &str) {
        let cleaned = text.trim().trim_matches('*').trim();
        if !cleaned.is_empty() {
            self.comment_lines.push(cleaned.to_string());
        }
    }

    /// Lex an identifier (e.g. pref, true, false)
    fn lex_identifier(&mut self) -> Token {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            _ => Token::Identifier(ident),
        }
    }

    /// Lex a string literal delimited by `quote`
    ///
    /// Literals may not span lines; hitting a newline means the quote was
    /// never closed.
    fn lex_string(&mut self, quote: char) -> Result<Token> {
        let start_column = self.column;

        // Skip opening quote
        self.advance();

        let mut result = String::new();

        loop {
            match self.chars.peek().copied() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(Token::String(result));
                }
                Some('\\') => {
                    self.advance();
                    result.push(self.lex_escape()?);
                }
                Some('\n') | None => {
                    return Err(Error::Lexer {
                        line: self.line,
                        column: start_column,
                        message: "Unterminated string literal".to_string(),
                    });
                }
                Some(c) => {
                    self.advance();
                    result.push(c);
                }
            }
        }
    }

    /// Decode the escape sequence following a backslash
    fn lex_escape(&mut self) -> Result<char> {
        let c = match self.chars.peek().copied() {
            Some('\n') | None => {
                return Err(self.error("Unexpected end of line in escape sequence".to_string()));
            }
            Some(c) => c,
        };
        self.advance();

        match c {
            '"' => Ok('"'),
            '\'' => Ok('\''),
            '\\' => Ok('\\'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'b' => Ok('\x08'),
            'f' => Ok('\x0c'),
            '0' => {
                if self.chars.peek() == Some(&'0') {
                    return Err(self.error(
                        "Octal escape sequences are not supported. Use \\x00 instead.".to_string(),
                    ));
                }
                Ok('\0')
            }
            'x' => {
                let code = self.lex_hex_digits(2, "hex")?;
                Ok(char::from(code as u8))
            }
            'u' => {
                let code = self.lex_hex_digits(4, "unicode")?;
                match code {
                    0xD800..=0xDBFF => self.lex_low_surrogate(code),
                    0xDC00..=0xDFFF => {
                        Err(self.error(format!("Unpaired low surrogate: \\u{:04X}", code)))
                    }
                    _ => char::from_u32(code).ok_or_else(|| {
                        self.error(format!("Invalid unicode escape: \\u{:04X}", code))
                    }),
                }
            }
            other => Err(self.error(format!("Invalid escape sequence: \\{}", other))),
        }
    }

    /// Read the `\uXXXX` low half of a surrogate pair and combine it with `high`
    fn lex_low_surrogate(&mut self, high: u32) -> Result<char> {
        let mut ahead = self.chars.clone();
        if ahead.next() != Some('\\') || ahead.next() != Some('u') {
            return Err(self.error(format!("Unpaired high surrogate: \\u{:04X}", high)));
        }
        self.advance();
        self.advance();

        let low = self.lex_hex_digits(4, "unicode")?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(self.error(format!(
                "High surrogate \\u{:04X} followed by \\u{:04X}, expected a low surrogate",
                high, low
            )));
        }

        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| {
            self.error(format!(
                "Invalid surrogate pair: \\u{:04X}\\u{:04X}",
                high, low
            ))
        })
    }

    fn lex_hex_digits(&mut self, count: usize, name: &str) -> Result<u32> {
        let mut hex = String::new();
        for _ in 0..count {
            match self.chars.peek() {
                Some(&c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        if hex.len() != count {
            return Err(self.error(format!("Incomplete {} escape: {}", name, hex)));
        }
        u32::from_str_radix(&hex, 16)
            .map_err(|_| self.error(format!("Invalid {} escape: {}", name, hex)))
    }

    /// Lex a signed decimal integer
    ///
    /// Fractions and exponents are rejected: preference defaults have no
    /// floating-point type.
    fn lex_integer(&mut self) -> Result<Token> {
        let start_column = self.column;
        let mut num_str = String::new();

        if let Some(&sign) = self.chars.peek() {
            if sign == '-' || sign == '+' {
                if sign == '-' {
                    num_str.push(sign);
                }
                self.advance();
            }
        }

        let mut digits = 0;
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                num_str.push(c);
                self.advance();
                digits += 1;
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(self.error("Expected digits after sign".to_string()));
        }

        if let Some(&c) = self.chars.peek() {
            if c == '.' || c == 'e' || c == 'E' {
                return Err(self.error(format!(
                    "Non-integer number literal starting with {}{}",
                    num_str, c
                )));
            }
            if c.is_alphanumeric() || c == '_' {
                return Err(self.error(format!("Invalid number literal: {}{}", num_str, c)));
            }
        }

        num_str.parse::<i64>().map(Token::Integer).map_err(|_| Error::Lexer {
            line: self.line,
            column: start_column,
            message: format!("Integer literal out of range: {}", num_str),
        })
    }
}
