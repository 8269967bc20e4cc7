//! Go declaration parser
//!
//! Turns scanned tokens into the ordered node stream the driver walks:
//! comments, type declarations, and opaque markers for everything else.

mod ast;
mod go_parser;

pub use ast::{AliasDecl, Comment, FieldDecl, Node, RecordDecl, TypeDecl, TypeExpr};
pub use go_parser::GoParser;
