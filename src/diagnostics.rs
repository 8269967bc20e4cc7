//! Non-fatal failures reported while translating

use crate::error::Error;
use std::fmt;
use std::io::Write;

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A struct field was dropped
    Field,
    /// A whole type declaration was dropped
    Type,
    /// A whole input file was skipped
    File,
}

/// One dropped field, declaration or file
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Kind of item that was dropped
    pub kind: DiagnosticKind,
    /// `Record.Field`, type name, or file path
    pub context: String,
    /// Why it was dropped
    pub error: Error,
}

impl Diagnostic {
    /// A field that failed to render
    pub fn field(context: impl Into<String>, error: Error) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Field,
            context: context.into(),
            error,
        }
    }

    /// A type declaration that failed to render
    pub fn type_decl(context: impl Into<String>, error: Error) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Type,
            context: context.into(),
            error,
        }
    }

    /// A file that could not be read or parsed
    pub fn file(context: impl Into<String>, error: Error) -> Self {
        Diagnostic {
            kind: DiagnosticKind::File,
            context: context.into(),
            error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            DiagnosticKind::Field => {
                write!(f, "failed to render field {}: {}", self.context, self.error)
            }
            DiagnosticKind::Type => {
                write!(f, "failed to render type {}: {}", self.context, self.error)
            }
            DiagnosticKind::File => write!(f, "failed to translate {}: {}", self.context, self.error),
        }
    }
}

/// Destination for diagnostics
pub trait DiagnosticSink {
    /// Records one diagnostic; never fails the run
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Writes one line per diagnostic, typically to stderr
pub struct WriterSink<W: Write> {
    writer: W,
    reported: usize,
}

impl<W: Write> WriterSink<W> {
    /// Wraps a writer
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer,
            reported: 0,
        }
    }

    /// Number of diagnostics reported so far
    pub fn reported(&self) -> usize {
        self.reported
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.reported += 1;
        if let Err(e) = writeln!(self.writer, "{}", diagnostic) {
            tracing::error!("could not write diagnostic: {}", e);
        }
    }
}
