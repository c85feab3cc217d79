//! Error types for preference manifest parsing and registry operations
//!
//! All public functions return [`Result<T, Error>`] for consistent error handling.
//! Malformed declarations are described by [`ParseError`]; a load pass collects
//! every one of them into [`Error::Load`].

use crate::types::PrefType;

/// A malformed declaration found while parsing a manifest
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "line {line}, column {column}: {message} (key: {}) in `{raw}`",
    .key.as_deref().unwrap_or("<unknown>")
)]
pub struct ParseError {
    /// 1-based line of the offending statement
    pub line: usize,
    /// 1-based column where the problem was detected
    pub column: usize,
    /// Preference name, when it was read before the error
    pub key: Option<String>,
    /// The offending source line, trimmed
    pub raw: String,
    pub message: String,
}

/// Errors that can occur while loading or querying preference defaults
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lexer error during tokenization
    #[error("Lexer error at line {line}, column {column}: {message}")]
    Lexer {
        line: usize,
        column: usize,
        message: String,
    },

    /// A single malformed declaration
    #[error("Parse error at {0}")]
    Parse(#[from] ParseError),

    /// Every malformed declaration found in a load pass
    #[error("{} malformed preference declaration(s); first at {}", .0.len(), first_error(.0))]
    Load(Vec<ParseError>),

    /// No entry for the requested key
    #[error("Preference '{0}' not found")]
    NotFound(String),

    /// Mutation attempted on a frozen registry
    #[error("Invalid registry state: {0}")]
    InvalidState(String),

    /// Value type differs from the declared or requested type
    #[error("Type mismatch for '{key}': expected {expected}, found {actual}")]
    TypeMismatch {
        key: String,
        expected: PrefType,
        actual: PrefType,
    },

    /// Invalid preference declaration
    #[error("Invalid preference: {0}")]
    InvalidPreference(String),

    /// Invalid glob pattern in query
    #[error("Invalid glob pattern: {0}")]
    InvalidGlobPattern(String),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn first_error(errors: &[ParseError]) -> String {
    errors
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "<none>".to_string())
}

/// Result type alias for convenience
///
/// # Example
///
/// ```rust
/// use gecko_prefs::{Registry, Result};
///
/// fn load_defaults(content: &str) -> Result<Registry> {
///     let registry = Registry::from_manifest(content)?;
///     Ok(registry)
/// }
/// # load_defaults(r#"pref("a.b", 1);"#).unwrap();
/// ```
pub type Result<T> = std::result::Result<T, Error>;
