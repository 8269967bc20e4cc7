//! # Declaration stream driver
//!
//! Walks top-level nodes in source order and hands each type declaration to
//! the [`DeclAssembler`]. Comments are collected by a [`CommentBuffer`]:
//! adjacent comments accumulate, the next type declaration claims them when
//! they end on the line right above it, and any other node discards them.
//! A blank line detaches everything before it.
//!
//! Files are independent. A file that cannot be read or parsed is reported
//! through the [`DiagnosticSink`] and skipped; the batch goes on.

use crate::assembler::DeclAssembler;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Error, Result};
use crate::lexer::GoScanner;
use crate::parser::{Comment, GoParser, Node};
use crate::ruleset::Ruleset;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const OUTPUT: &str = "<output>";

/// Pending leading comments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommentBuffer {
    /// Nothing pending
    #[default]
    Idle,
    /// Comments seen since the last non-comment node
    Collecting(Vec<Comment>),
}

impl CommentBuffer {
    /// Creates an idle buffer
    pub fn new() -> Self {
        CommentBuffer::Idle
    }

    /// Appends a comment, starting a new block when idle or when a blank
    /// line separates it from the pending block
    pub fn push(&mut self, comment: Comment) {
        if self.ends_before(comment.line) {
            self.reset();
        }
        match self {
            CommentBuffer::Idle => *self = CommentBuffer::Collecting(vec![comment]),
            CommentBuffer::Collecting(pending) => pending.push(comment),
        }
    }

    /// Hands the pending block to a declaration and goes idle
    pub fn take(&mut self) -> Vec<Comment> {
        match std::mem::take(self) {
            CommentBuffer::Idle => Vec::new(),
            CommentBuffer::Collecting(pending) => pending,
        }
    }

    /// Like [`take`](Self::take), but only a block ending on the line
    /// right above `line` is handed over
    pub fn take_for(&mut self, line: usize) -> Vec<Comment> {
        if self.ends_before(line) {
            self.reset();
        }
        self.take()
    }

    /// Drops the pending block
    pub fn reset(&mut self) {
        if let CommentBuffer::Collecting(pending) = self {
            tracing::trace!("discarding {} detached comments", pending.len());
        }
        *self = CommentBuffer::Idle;
    }

    /// Whether comments are pending
    pub fn is_collecting(&self) -> bool {
        matches!(self, CommentBuffer::Collecting(_))
    }

    /// True when at least one blank line lies between the pending block
    /// and `line`
    fn ends_before(&self, line: usize) -> bool {
        match self {
            CommentBuffer::Idle => false,
            CommentBuffer::Collecting(pending) => pending
                .last()
                .map_or(false, |last| line > last.end_line() + 1),
        }
    }
}

/// Counts for one batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Files translated
    pub files: usize,
    /// Files skipped after a read or parse failure
    pub skipped: usize,
    /// Declarations written
    pub declarations: usize,
}

/// Scans and parses Go source into top-level nodes
pub fn parse_source(source: &str) -> Result<Vec<Node>> {
    let tokens = GoScanner::new(source).scan_tokens()?;
    GoParser::new(tokens).parse()
}

/// Drives nodes through the assembler and writes the results
pub struct Driver<'a> {
    assembler: DeclAssembler<'a>,
}

impl<'a> Driver<'a> {
    /// Creates a driver for `ruleset`
    pub fn new(ruleset: &'a Ruleset) -> Self {
        Driver {
            assembler: DeclAssembler::new(ruleset),
        }
    }

    /// Renders every type declaration in `nodes`, in order
    pub fn render_nodes(
        &self,
        nodes: impl IntoIterator<Item = Node>,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<String> {
        let mut buffer = CommentBuffer::new();
        let mut rendered = Vec::new();

        for node in nodes {
            match node {
                Node::Comment(comment) => buffer.push(comment),
                Node::Type(mut decl) => {
                    decl.set_comments(buffer.take_for(decl.line()));
                    tracing::debug!("translating type {}", decl.name());
                    if let Some(text) = self.assembler.render(&decl, sink) {
                        rendered.push(text);
                    }
                }
                Node::Other(what) => {
                    tracing::trace!("skipping {}", what);
                    buffer.reset();
                }
            }
        }

        rendered
    }

    /// Writes every type declaration in `nodes`; returns how many were written
    pub fn translate_nodes<W: Write>(
        &self,
        nodes: impl IntoIterator<Item = Node>,
        out: &mut W,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize> {
        let rendered = self.render_nodes(nodes, sink);
        for text in &rendered {
            writeln!(out, "{}", text).map_err(|e| Error::io(OUTPUT, e))?;
        }
        Ok(rendered.len())
    }

    /// Parses and translates one source text; parse errors are returned
    pub fn translate_source<W: Write>(
        &self,
        source: &str,
        out: &mut W,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize> {
        let nodes = parse_source(source)?;
        self.translate_nodes(nodes, out, sink)
    }

    /// Translates one file
    ///
    /// Read and parse failures are reported to `sink` and yield `Ok(None)`;
    /// only output failures are errors.
    pub fn translate_file<W: Write>(
        &self,
        path: &Path,
        out: &mut W,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Option<usize>> {
        tracing::debug!("translating file {}", path.display());
        let nodes = fs::read_to_string(path)
            .map_err(|e| Error::io(path, e))
            .and_then(|source| parse_source(&source));

        match nodes {
            Ok(nodes) => self.translate_nodes(nodes, out, sink).map(Some),
            Err(err) => {
                tracing::debug!("skipping {}: {}", path.display(), err);
                sink.report(Diagnostic::file(path.display().to_string(), err));
                Ok(None)
            }
        }
    }

    /// Translates files in argument order; directories expand to their
    /// `*.go` files in name order
    pub fn translate_paths<W: Write>(
        &self,
        paths: &[PathBuf],
        out: &mut W,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for path in paths {
            let files = if path.is_dir() {
                match go_files(path) {
                    Ok(files) => files,
                    Err(err) => {
                        summary.skipped += 1;
                        sink.report(Diagnostic::file(path.display().to_string(), err));
                        continue;
                    }
                }
            } else {
                vec![path.clone()]
            };

            for file in &files {
                match self.translate_file(file, out, sink)? {
                    Some(count) => {
                        summary.files += 1;
                        summary.declarations += count;
                    }
                    None => summary.skipped += 1,
                }
            }
        }

        tracing::debug!(
            "translated {} files ({} skipped), {} declarations",
            summary.files,
            summary.skipped,
            summary.declarations
        );
        Ok(summary)
    }
}

/// `*.go` files directly inside `dir`, sorted
fn go_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "go") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::parser::{AliasDecl, TypeDecl, TypeExpr};

    fn alias(name: &str) -> Node {
        Node::Type(TypeDecl::Alias(AliasDecl {
            name: name.to_string(),
            line: 2,
            ty: TypeExpr::named("int64"),
            comments: Vec::new(),
            trailing: None,
        }))
    }

    fn comment(text: &str) -> Node {
        Node::Comment(Comment::new(text, 1))
    }

    #[test]
    fn test_comment_buffer_transitions() {
        let mut buffer = CommentBuffer::new();
        assert!(!buffer.is_collecting());
        assert!(buffer.take().is_empty());

        buffer.push(Comment::new("// a", 1));
        buffer.push(Comment::new("// b", 2));
        assert!(buffer.is_collecting());
        assert_eq!(buffer.take().len(), 2);
        assert_eq!(buffer, CommentBuffer::Idle);

        buffer.push(Comment::new("// c", 3));
        buffer.reset();
        assert!(buffer.take().is_empty());
    }

    #[test]
    fn test_blank_line_detaches_comments() {
        let mut buffer = CommentBuffer::new();
        buffer.push(Comment::new("// ---- section ----", 1));
        buffer.push(Comment::new("// B doc", 3));
        assert_eq!(buffer.take_for(4), vec![Comment::new("// B doc", 3)]);

        buffer.push(Comment::new("// orphan", 1));
        assert!(buffer.take_for(3).is_empty());
        assert_eq!(buffer, CommentBuffer::Idle);

        buffer.push(Comment::new("/* spans\n   two lines */", 1));
        buffer.push(Comment::new("// adjacent", 3));
        assert_eq!(buffer.take_for(4).len(), 2);
    }

    #[test]
    fn test_detached_comment_before_type_is_dropped() {
        let ruleset = Ruleset::current();
        let driver = Driver::new(&ruleset);
        let mut diagnostics = Vec::new();

        let mut later = alias("Id");
        if let Node::Type(TypeDecl::Alias(decl)) = &mut later {
            decl.line = 3;
        }
        let out = driver.render_nodes(vec![comment("// banner"), later], &mut diagnostics);
        assert_eq!(out, vec!["pub type Id = i64;\n".to_string()]);
    }

    #[test]
    fn test_comments_attach_to_next_type() {
        let ruleset = Ruleset::current();
        let driver = Driver::new(&ruleset);
        let mut diagnostics = Vec::new();

        let out = driver.render_nodes(
            vec![comment("// Id of a thing"), comment("// never zero"), alias("Id")],
            &mut diagnostics,
        );
        assert_eq!(
            out,
            vec!["/// Id of a thing\n/// never zero\npub type Id = i64;\n".to_string()]
        );
    }

    #[test]
    fn test_other_node_discards_comments() {
        let ruleset = Ruleset::current();
        let driver = Driver::new(&ruleset);
        let mut diagnostics = Vec::new();

        let out = driver.render_nodes(
            vec![
                comment("// Package models"),
                Node::Other("package models".into()),
                alias("Id"),
                comment("// dangling"),
            ],
            &mut diagnostics,
        );
        assert_eq!(out, vec!["pub type Id = i64;\n".to_string()]);
    }

    #[test]
    fn test_translate_source_separates_declarations() {
        let ruleset = Ruleset::current();
        let driver = Driver::new(&ruleset);
        let mut out = Vec::new();
        let mut diagnostics = Vec::new();

        let count = driver
            .translate_source(
                "package m\n\ntype A int\ntype B = string\n",
                &mut out,
                &mut diagnostics,
            )
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "pub type A = i32;\n\npub type B = String;\n\n"
        );
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let ruleset = Ruleset::current();
        let driver = Driver::new(&ruleset);
        let mut out = Vec::new();
        let mut diagnostics = Vec::new();

        let result = driver
            .translate_file(Path::new("/nonexistent/go2rs/input.go"), &mut out, &mut diagnostics)
            .unwrap();

        assert_eq!(result, None);
        assert!(out.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::File);
    }

    #[test]
    fn test_directory_expands_to_sorted_go_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.go"), "package m\ntype B int\n").unwrap();
        fs::write(dir.path().join("a.go"), "package m\ntype A int\n").unwrap();
        fs::write(dir.path().join("broken.go"), "package m\ntype C struct {\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "type D int\n").unwrap();

        let ruleset = Ruleset::current();
        let driver = Driver::new(&ruleset);
        let mut out = Vec::new();
        let mut diagnostics = Vec::new();

        let summary = driver
            .translate_paths(&[dir.path().to_path_buf()], &mut out, &mut diagnostics)
            .unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                files: 2,
                skipped: 1,
                declarations: 2
            }
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "pub type A = i32;\n\npub type B = i32;\n\n"
        );
        assert_eq!(diagnostics.len(), 1);
    }
}
