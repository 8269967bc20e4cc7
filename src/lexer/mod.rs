//! Lexical analysis for Go source
//!
//! Converts Go source text into a stream of tokens. Comments are kept as
//! tokens and newline-terminated statements get an automatic semicolon, so
//! the parser sees the same statement boundaries the Go compiler does.

mod go_scanner;
mod token;

pub use go_scanner::GoScanner;
pub use token::{Token, TokenKind};
