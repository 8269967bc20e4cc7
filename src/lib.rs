//! # go2rs - Go type declarations to Rust serde types
//!
//! Translates the type declarations of Go source files (structs, named
//! types, aliases) into Rust declarations that serialize the same way. Field
//! names are snake-cased, `json` struct tags become `#[serde(...)]`
//! attributes, and Go's builtin and composite types map to their Rust
//! counterparts. Everything else in a Go file (functions, variables,
//! constants) is skipped.
//!
//! ## Quick Start
//!
//! ```rust
//! use go2rs::{translate_source, Ruleset};
//!
//! # fn main() -> go2rs::Result<()> {
//! let go = r#"
//! package models
//!
//! // User of the forge
//! type User struct {
//!     ID       int64  `json:"id"`
//!     UserName string `json:"login,omitempty"`
//! }
//! "#;
//!
//! let translation = translate_source(go, &Ruleset::current())?;
//! assert!(translation.output.starts_with("/// User of the forge\n"));
//! assert!(translation.output.contains("pub struct User {"));
//! assert!(translation.output.contains("    #[serde(default, rename = \"id\")]\n    pub id: i64,"));
//! assert!(translation.output.contains("    pub user_name: Option<String>,"));
//! assert!(translation.diagnostics.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Go source → GoScanner → Tokens → GoParser → Nodes → Driver → DeclAssembler → Rust text
//!                                                              ├─ Renamer      (naming)
//!                                                              ├─ tags         (json tags)
//!                                                              └─ TypeRenderer (render)
//! ```
//!
//! ### Main Components
//!
//! - [`GoScanner`] - Tokenizes Go source, keeping comments
//! - [`GoParser`] - Parses type declarations, skips everything else
//! - [`Ruleset`] - Naming, pointer and dynamic-type rules for one run
//! - [`TypeRenderer`] - Renders a [`TypeExpr`] to a Rust type
//! - [`DeclAssembler`] - Renders whole declarations, dropping broken fields
//! - [`Driver`] - Walks nodes and files, attaching leading comments
//!
//! ## Failure model
//!
//! Source errors (unreadable file, syntax error) fail a whole file. Render
//! errors (unknown `pkg.Type`, `chan`, a malformed tag) only drop the field
//! or alias they occur in and are reported as [`Diagnostic`]s; the rest of
//! the output is still produced.
//!
//! ## Rulesets
//!
//! Two presets exist. [`Ruleset::current`] boxes pointers, knows the
//! acronyms `ID URL HTML SHA SSH` and maps `interface{}` to
//! `serde_json::Value`. [`Ruleset::legacy`] strips pointers and knows only
//! `ID URL`. A ruleset can also be loaded from JSON:
//!
//! ```rust
//! use go2rs::{PointerPolicy, Ruleset};
//!
//! let ruleset = Ruleset::from_json_str(r#"{ "pointer_policy": "strip" }"#).unwrap();
//! assert_eq!(ruleset.pointer_policy, PointerPolicy::Strip);
//! ```

/// Version of go2rs
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assembler;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod naming;
pub mod parser;
pub mod render;
pub mod ruleset;
pub mod tags;

// Re-export main types
pub use assembler::DeclAssembler;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, WriterSink};
pub use driver::{BatchSummary, CommentBuffer, Driver};
pub use error::{Error, Result};
pub use lexer::{GoScanner, Token, TokenKind};
pub use naming::Renamer;
pub use parser::{AliasDecl, Comment, FieldDecl, GoParser, Node, RecordDecl, TypeDecl, TypeExpr};
pub use render::TypeRenderer;
pub use ruleset::{PointerPolicy, Preset, Ruleset};

/// Result of translating one source text in memory
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Translation {
    /// Rendered declarations, each followed by a blank line
    pub output: String,
    /// Fields and declarations that were dropped
    pub diagnostics: Vec<Diagnostic>,
}

/// Translates Go source text under `ruleset`
///
/// Fails only when the source cannot be scanned or parsed.
pub fn translate_source(source: &str, ruleset: &Ruleset) -> Result<Translation> {
    let nodes = driver::parse_source(source)?;
    let mut diagnostics = Vec::new();
    let mut output = String::new();

    for text in Driver::new(ruleset).render_nodes(nodes, &mut diagnostics) {
        output.push_str(&text);
        output.push('\n');
    }

    Ok(Translation {
        output,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_source_empty_file() {
        let translation = translate_source("package empty\n", &Ruleset::current()).unwrap();
        assert_eq!(translation, Translation::default());
    }

    #[test]
    fn test_translate_source_syntax_error() {
        let err = translate_source("package p\ntype A struct {", &Ruleset::current()).unwrap_err();
        assert!(err.is_source_error());
    }
}
