//! Parser for default preference manifests
//!
//! This module provides a recursive descent parser that turns Gecko's
//! `pref()` declaration syntax into typed [`PrefEntry`] values.
//!
//! # Format
//!
//! ```text
//! pref("preference.name", value);           // default
//! sticky_pref("preference.name", value);    // sticky
//! lock_pref("preference.name", value);      // locked
//! ```
//!
//! The value type is inferred from the literal: `true`/`false` are booleans,
//! bare signed integers are integers, quoted text is a string.
//!
//! Parsing never stops at the first problem. After a malformed statement the
//! rest of its line is discarded and parsing resumes, so a single pass
//! reports every broken declaration.
//!
//! # Example
//!
//! ```rust
//! use gecko_prefs::{parse_prefs, PrefValue};
//!
//! let content = r#"
//!     // Never go offline
//!     pref("offline.autoDetect", false);
//!     pref("app.update.mode", two);
//! "#;
//!
//! let parsed = parse_prefs(content);
//! assert_eq!(parsed.entries.len(), 1);
//! assert_eq!(parsed.entries[0].value, PrefValue::Bool(false));
//! assert_eq!(parsed.entries[0].comment.as_deref(), Some("Never go offline"));
//! assert_eq!(parsed.errors.len(), 1);
//! assert_eq!(parsed.errors[0].key.as_deref(), Some("app.update.mode"));
//! ```

use crate::error::{Error, ParseError, Result};
use crate::lexer::{Lexer, Token};
use crate::types::{PrefEntry, PrefKind, PrefValue};
use log::{debug, warn};
use std::path::Path;

/// Outcome of parsing a manifest: every well-formed entry plus every error
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParseOutput {
    /// Well-formed declarations in source order, duplicates included
    pub entries: Vec<PrefEntry>,
    /// Malformed declarations in source order
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse manifest text into entries and errors
pub fn parse_prefs(content: &str) -> ParseOutput {
    let output = Parser::new(content).parse();
    debug!(
        "Parsed {} declarations with {} errors",
        output.entries.len(),
        output.errors.len()
    );
    output
}

/// Parse a manifest file directly from a path
pub fn parse_prefs_file(path: &Path) -> Result<ParseOutput> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_prefs(&content))
}

/// Parse exactly one declaration, e.g. a single manifest line
///
/// # Example
///
/// ```rust
/// use gecko_prefs::{parse_declaration, PrefType};
///
/// let entry = parse_declaration(r#"pref("app.update.interval", 86400);"#)?;
/// assert_eq!(entry.key, "app.update.interval");
/// assert_eq!(entry.pref_type(), PrefType::Int);
/// # Ok::<(), gecko_prefs::Error>(())
/// ```
pub fn parse_declaration(line: &str) -> Result<PrefEntry> {
    let mut output = parse_prefs(line);
    if let Some(error) = output.errors.into_iter().next() {
        return Err(Error::Parse(error));
    }
    if output.entries.len() != 1 {
        return Err(Error::Parse(ParseError {
            line: 1,
            column: 1,
            key: None,
            raw: line.trim().to_string(),
            message: format!(
                "Expected exactly one declaration, found {}",
                output.entries.len()
            ),
        }));
    }
    Ok(output.entries.remove(0))
}

/// Where a statement failed and how to resume
struct Failure {
    line: usize,
    column: usize,
    message: String,
    /// Line whose remainder belongs to the broken statement, `None` when the
    /// current token begins the next statement
    skip_line: Option<usize>,
}

/// Parser for preference manifests
struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    /// Current lookahead token, `None` after a lexer error
    current: Option<Token>,
    /// Message of the pending lexer error
    lex_error: Option<String>,
    /// Comment block attached to the lookahead token
    current_comment: Option<String>,
    /// Position of the lookahead token or lexer error
    current_line: usize,
    current_column: usize,
    /// Position of the last consumed token
    last_line: usize,
    last_column: usize,
    /// Whether the statement being parsed has consumed any token
    in_statement: bool,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    fn new(input: &'a str) -> Self {
        let mut parser = Parser {
            source: input,
            lexer: Lexer::new(input),
            current: None,
            lex_error: None,
            current_comment: None,
            current_line: 1,
            current_column: 1,
            last_line: 1,
            last_column: 1,
            in_statement: false,
        };
        // Prime the pump by getting the first token
        parser.advance();
        parser
    }

    /// Parse the entire input, recovering after each malformed statement
    fn parse(mut self) -> ParseOutput {
        let mut output = ParseOutput::default();

        loop {
            if self.current == Some(Token::Eof) {
                break;
            }

            let comment = self.current_comment.take();
            let line = self.current_line;
            let mut key = None;
            self.in_statement = false;

            match self.parse_statement(&mut key) {
                Ok((kind, key, value)) => output.entries.push(PrefEntry {
                    key,
                    value,
                    kind,
                    comment,
                    line: Some(line),
                }),
                Err(failure) => {
                    let error = self.recover(failure, key);
                    warn!("Skipping malformed declaration: {}", error);
                    output.errors.push(error);
                }
            }
        }

        output
    }

    /// Parse a single statement: function "(" key "," value ")" ";"
    ///
    /// `key` is filled in as soon as it is read so failures can name it.
    fn parse_statement(
        &mut self,
        key: &mut Option<String>,
    ) -> std::result::Result<(PrefKind, String, PrefValue), Failure> {
        let kind = self.parse_function_name()?;
        self.expect_token(Token::LeftParen)?;

        let name = self.expect_key()?;
        *key = Some(name.clone());

        self.expect_token(Token::Comma)?;
        let value = self.parse_value()?;
        self.expect_token(Token::RightParen)?;
        self.expect_token(Token::Semicolon)?;

        Ok((kind, name, value))
    }

    /// Parse the declaration function name and return its [`PrefKind`]
    fn parse_function_name(&mut self) -> std::result::Result<PrefKind, Failure> {
        let kind = match &self.current {
            Some(Token::Identifier(ident)) => match ident.as_str() {
                "pref" => PrefKind::Default,
                "sticky_pref" => PrefKind::Sticky,
                "lock_pref" => PrefKind::Locked,
                "user_pref" => {
                    return Err(self.fail(
                        "user_pref() is not allowed in a defaults manifest".to_string(),
                    ))
                }
                _ => {
                    return Err(self.fail(format!(
                        "Unknown pref function '{}'. Expected pref, sticky_pref, or lock_pref",
                        ident
                    )))
                }
            },
            other => {
                let message = format!("Expected pref function name, got {}", describe(other));
                return Err(self.fail(message));
            }
        };
        self.advance();
        Ok(kind)
    }

    /// Parse a literal and infer its type
    fn parse_value(&mut self) -> std::result::Result<PrefValue, Failure> {
        let value = match &self.current {
            Some(Token::Boolean(b)) => PrefValue::Bool(*b),
            Some(Token::Integer(n)) => match i32::try_from(*n) {
                Ok(n) => PrefValue::Int(n),
                Err(_) => {
                    return Err(self.fail(format!("Integer literal {} is out of range", n)));
                }
            },
            Some(Token::String(_)) => match self.take_current() {
                Some(Token::String(s)) => {
                    self.advance();
                    return Ok(PrefValue::String(s));
                }
                _ => unreachable!(),
            },
            Some(Token::Identifier(ident)) => {
                let message = format!(
                    "Expected value (true, false, integer, or string), got '{}'",
                    ident
                );
                return Err(self.fail(message));
            }
            other => {
                let message = format!("Expected value, got {}", describe(other));
                return Err(self.fail(message));
            }
        };
        self.advance();
        Ok(value)
    }

    /// Expect the preference name string and return it
    fn expect_key(&mut self) -> std::result::Result<String, Failure> {
        match &self.current {
            Some(Token::String(s)) if s.is_empty() => {
                Err(self.fail("Preference name must not be empty".to_string()))
            }
            Some(Token::String(_)) => match self.take_current() {
                Some(Token::String(s)) => {
                    self.advance();
                    Ok(s)
                }
                _ => unreachable!(),
            },
            other => {
                let message = format!("Expected preference name string, got {}", describe(other));
                Err(self.fail(message))
            }
        }
    }

    /// Expect a specific token and consume it
    fn expect_token(&mut self, expected: Token) -> std::result::Result<(), Failure> {
        match &self.current {
            Some(token) if *token == expected => {
                self.advance();
                Ok(())
            }
            other => {
                let message = format!("Expected {:?}, got {}", expected, describe(other));
                Err(self.fail(message))
            }
        }
    }

    /// Take the lookahead token, leaving the position untouched
    fn take_current(&mut self) -> Option<Token> {
        self.current.take()
    }

    /// Describe why the statement failed at the current position
    fn fail(&self, message: String) -> Failure {
        if let Some(lex_message) = &self.lex_error {
            return Failure {
                line: self.current_line,
                column: self.current_column,
                message: lex_message.clone(),
                skip_line: Some(self.current_line),
            };
        }

        // The statement ran onto a later line; blame its unfinished part.
        // Keep the current token only if it can open the next statement.
        if self.in_statement && self.current_line > self.last_line {
            let skip_line = if self.current_starts_statement() {
                None
            } else {
                Some(self.current_line)
            };
            return Failure {
                line: self.last_line,
                column: self.last_column,
                message: format!("{} before end of line", message),
                skip_line,
            };
        }

        Failure {
            line: self.current_line,
            column: self.current_column,
            message,
            skip_line: Some(self.current_line),
        }
    }

    fn current_starts_statement(&self) -> bool {
        match &self.current {
            Some(Token::Eof) => true,
            Some(Token::Identifier(ident)) => matches!(
                ident.as_str(),
                "pref" | "sticky_pref" | "lock_pref" | "user_pref"
            ),
            _ => false,
        }
    }

    /// Turn a failure into a [`ParseError`] and move past the broken text
    fn recover(&mut self, failure: Failure, key: Option<String>) -> ParseError {
        let error = ParseError {
            line: failure.line,
            column: failure.column,
            key,
            raw: self.raw_line(failure.line),
            message: failure.message,
        };

        if let Some(line) = failure.skip_line {
            self.lexer.skip_line(line);
            self.advance_raw();
        }

        error
    }

    fn raw_line(&self, line: usize) -> String {
        self.source
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Consume the lookahead token and fetch the next one
    fn advance(&mut self) {
        self.last_line = self.current_line;
        self.last_column = self.current_column;
        self.in_statement = true;
        self.advance_raw();
    }

    /// Fetch the next token without marking the current one as consumed
    fn advance_raw(&mut self) {
        match self.lexer.next_token() {
            Ok(token) => {
                let (line, column) = self.lexer.token_position();
                self.current = Some(token);
                self.lex_error = None;
                self.current_line = line;
                self.current_column = column;
                self.current_comment = self.lexer.take_comment();
            }
            Err(Error::Lexer {
                line,
                column,
                message,
            }) => {
                self.current = None;
                self.lex_error = Some(message);
                self.current_line = line;
                self.current_column = column;
                self.current_comment = None;
            }
            Err(other) => {
                self.current = None;
                self.lex_error = Some(other.to_string());
                self.current_comment = None;
            }
        }
    }
}

fn describe(token: &Option<Token>) -> String {
    match token {
        Some(Token::Eof) => "end of input".to_string(),
        Some(token) => format!("{:?}", token),
        None => "invalid token".to_string(),
    }
}
