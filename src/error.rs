//! Error types for the go2rs translator

use thiserror::Error;

/// Translation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Source errors
    /// Syntax error encountered while scanning Go source
    ///
    /// **Triggered by:** Unterminated strings or comments, stray characters
    /// **Example:** `type X struct { Name string "json:\"name }` (missing closing quote)
    #[error("Syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    /// Unexpected end of file during parsing
    #[error("Unexpected end of file")]
    UnexpectedEof,

    /// Unexpected token encountered during parsing
    #[error("Unexpected token at line {line}: expected {expected}, got {got}")]
    UnexpectedToken {
        /// Expected token description
        expected: String,
        /// Actual token received
        got: String,
        /// Line of the offending token
        line: usize,
    },

    // Type expression errors
    /// Qualified type that has no mapping in the target
    ///
    /// **Triggered by:** Any `pkg.Name` other than `time.Time`
    /// **Example:** `Created sql.NullTime`
    #[error("unknown selector {namespace}.{selector}")]
    UnknownSelector {
        /// Package qualifier
        namespace: String,
        /// Selected name
        selector: String,
    },

    /// Type expression shape the renderer has no rule for
    ///
    /// **Triggered by:** Inline structs, func types, channels, non-empty interfaces
    #[error("unknown type {shape}")]
    UnsupportedType {
        /// Short description of the shape (`func`, `chan`, ...)
        shape: String,
    },

    /// Embedded field whose type cannot name a field
    #[error("cannot derive field name from embedded {shape}")]
    UnsupportedEmbed {
        /// Short description of the embedded type
        shape: String,
    },

    // Metadata errors
    /// Struct tag that is present but cannot be read
    ///
    /// **Triggered by:** A tag literal that does not unquote, or a `json` value with bad quoting
    /// **Example:** `json:"name` (unterminated value)
    #[error("malformed tag {tag}: {reason}")]
    MalformedTag {
        /// Raw tag text
        tag: String,
        /// Why it could not be read
        reason: String,
    },

    // Environment errors
    /// Invalid ruleset configuration
    #[error("Config error: {0}")]
    Config(String),

    /// File could not be read or written
    #[error("{path}: {message}")]
    Io {
        /// Path of the file involved
        path: String,
        /// Underlying error message
        message: String,
    },
}

impl Error {
    /// Create a syntax error at a position
    pub fn syntax(line: usize, col: usize, message: impl Into<String>) -> Self {
        Error::SyntaxError {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create a configuration error with a message
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Wrap an I/O failure with the path it happened on
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// True for errors raised by the scanner or parser
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Error::SyntaxError { .. } | Error::UnexpectedEof | Error::UnexpectedToken { .. }
        )
    }
}

/// Result type for go2rs operations
pub type Result<T> = std::result::Result<T, Error>;
