//! # Declaration assembly
//!
//! Combines renamed identifiers, rendered types and struct tag metadata into
//! complete Rust declarations. This is the one place where errors are
//! downgraded: a field that fails to render is dropped and reported, the
//! rest of its struct is still emitted.
//!
//! ```
//! use go2rs::{DeclAssembler, FieldDecl, RecordDecl, Ruleset, TypeExpr};
//!
//! let record = RecordDecl {
//!     name: "user".to_string(),
//!     line: 1,
//!     fields: vec![FieldDecl::new("UserID", TypeExpr::named("int64"))
//!         .with_tag("`json:\"user_id,omitempty\"`")],
//!     comments: vec![],
//!     trailing: None,
//! };
//! let ruleset = Ruleset::current();
//! let mut diagnostics = Vec::new();
//! let rust = DeclAssembler::new(&ruleset).render_record(&record, &mut diagnostics);
//! assert!(rust.contains("pub struct User {"));
//! assert!(rust.contains("    #[serde(default, rename = \"user_id\")]\n    pub user_id: Option<i64>,"));
//! assert!(diagnostics.is_empty());
//! ```

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::Result;
use crate::naming::Renamer;
use crate::parser::{AliasDecl, Comment, FieldDecl, RecordDecl, TypeDecl};
use crate::render::{embedded_type_name, TypeRenderer};
use crate::ruleset::Ruleset;
use crate::tags;

/// Derives attached to every generated struct
pub const RECORD_DERIVES: &str =
    "#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]";

const FIELD_INDENT: &str = "    ";

/// A field ready to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    /// `///` lines above the field
    pub doc: Vec<String>,
    /// `#[serde(...)]` line, if any
    pub annotation: Option<String>,
    /// Rust field name
    pub ident: String,
    /// Rust type
    pub ty: String,
}

/// Output line(s) for one declared field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutput {
    /// A real struct field
    Active(RenderedField),
    /// A field tagged `-`, kept only as a comment
    Omitted(String),
}

impl FieldOutput {
    fn write_to(&self, out: &mut String) {
        match self {
            FieldOutput::Active(field) => {
                for line in &field.doc {
                    out.push_str(FIELD_INDENT);
                    out.push_str(line);
                    out.push('\n');
                }
                if let Some(annotation) = &field.annotation {
                    out.push_str(FIELD_INDENT);
                    out.push_str(annotation);
                    out.push('\n');
                }
                out.push_str(&format!("{}pub {}: {},\n", FIELD_INDENT, field.ident, field.ty));
            }
            FieldOutput::Omitted(ident) => {
                out.push_str(&format!("{}// field {} is omitted\n", FIELD_INDENT, ident));
            }
        }
    }
}

/// Renders type declarations under one ruleset
pub struct DeclAssembler<'a> {
    ruleset: &'a Ruleset,
    renderer: TypeRenderer<'a>,
    renamer: Renamer<'a>,
}

impl<'a> DeclAssembler<'a> {
    /// Creates an assembler for `ruleset`
    pub fn new(ruleset: &'a Ruleset) -> Self {
        DeclAssembler {
            ruleset,
            renderer: TypeRenderer::new(ruleset),
            renamer: Renamer::new(ruleset),
        }
    }

    /// Renders any type declaration; `None` when nothing should be emitted
    pub fn render(&self, decl: &TypeDecl, sink: &mut dyn DiagnosticSink) -> Option<String> {
        match decl {
            TypeDecl::Record(record) => Some(self.render_record(record, sink)),
            TypeDecl::Alias(alias) => self.render_alias(alias, sink),
        }
    }

    /// Renders a struct, dropping and reporting fields that fail
    pub fn render_record(&self, record: &RecordDecl, sink: &mut dyn DiagnosticSink) -> String {
        let name = self.renamer.rename_type(&record.name);
        let mut out = String::new();

        for line in doc_lines(&record.comments, record.trailing.as_ref()) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(RECORD_DERIVES);
        out.push('\n');
        out.push_str(&format!("pub struct {} {{\n", name));

        for field in &record.fields {
            match self.render_field(field) {
                Ok(outputs) => {
                    for output in &outputs {
                        output.write_to(&mut out);
                    }
                }
                Err(err) => {
                    let context = format!("{}.{}", record.name, field_label(field));
                    tracing::debug!("dropping field {}: {}", context, err);
                    sink.report(Diagnostic::field(context, err));
                }
            }
        }

        out.push_str("}\n");
        tracing::debug!("rendered struct {} ({} fields)", name, record.fields.len());
        out
    }

    /// Renders a type alias; on failure reports it and emits nothing
    pub fn render_alias(&self, alias: &AliasDecl, sink: &mut dyn DiagnosticSink) -> Option<String> {
        let name = self.renamer.rename_type(&alias.name);
        let ty = match self.renderer.render(&alias.ty) {
            Ok(ty) => ty,
            Err(err) => {
                tracing::debug!("dropping type {}: {}", alias.name, err);
                sink.report(Diagnostic::type_decl(alias.name.clone(), err));
                return None;
            }
        };

        let mut out = String::new();
        for line in doc_lines(&alias.comments, alias.trailing.as_ref()) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&format!("pub type {} = {};\n", name, ty));
        tracing::debug!("rendered alias {} = {}", name, ty);
        Some(out)
    }

    /// Renders one field declaration, one output per declared name
    pub fn render_field(&self, field: &FieldDecl) -> Result<Vec<FieldOutput>> {
        let doc = doc_lines(&field.doc, None);

        if field.is_embedded() {
            let (ident, rename) =
                escape_reserved(self.renamer.rename_field(embedded_type_name(&field.ty)?), None);
            let ty = self.renderer.render(&field.ty)?;
            return Ok(vec![FieldOutput::Active(RenderedField {
                doc,
                annotation: rename.map(|wire| format!("#[serde(default, rename = {:?})]", wire)),
                ident,
                ty,
            })]);
        }

        let tag = tags::field_tag(field.tag.as_deref(), &self.ruleset.tag_key)?;
        if tag.as_ref().map(|t| t.skip).unwrap_or(false) {
            return Ok(field
                .names
                .iter()
                .map(|name| FieldOutput::Omitted(self.renamer.rename_field(name)))
                .collect());
        }

        let mut ty = self.renderer.render(&field.ty)?;
        let mut rename = None;
        if let Some(tag) = &tag {
            if tag.omit_empty {
                ty = format!("Option<{}>", ty);
            }
            if !tag.flags.is_empty() {
                tracing::debug!("ignoring tag flags {:?} on {}", tag.flags, field_label(field));
            }
            rename = tag.name.clone();
        }

        let outputs = field
            .names
            .iter()
            .map(|name| {
                let (ident, rename) =
                    escape_reserved(self.renamer.rename_field(name), rename.clone());
                let annotation = match rename {
                    Some(wire) => format!("#[serde(default, rename = {:?})]", wire),
                    None => "#[serde(default)]".to_string(),
                };
                tracing::trace!("field {} -> {}: {}", name, ident, ty);
                FieldOutput::Active(RenderedField {
                    doc: doc.clone(),
                    annotation: Some(annotation),
                    ident,
                    ty: ty.clone(),
                })
            })
            .collect();

        Ok(outputs)
    }
}

/// Keywords that cannot be field names, not even as raw identifiers
const RESERVED_FIELD_NAMES: &[&str] = &["self", "crate", "super"];

/// Appends `_` to a reserved field name and keeps the bare word on the wire
fn escape_reserved(ident: String, rename: Option<String>) -> (String, Option<String>) {
    if RESERVED_FIELD_NAMES.contains(&ident.as_str()) {
        let escaped = format!("{}_", ident);
        return (escaped, rename.or(Some(ident)));
    }
    (ident, rename)
}

/// Source comments as `///` lines, one per comment line, trailing comment last
pub fn doc_lines(comments: &[Comment], trailing: Option<&Comment>) -> Vec<String> {
    let mut lines = Vec::new();
    for comment in comments.iter().chain(trailing) {
        let text = comment.text.as_str();
        if let Some(body) = text.strip_prefix("//") {
            lines.push(format!("///{}", body));
            continue;
        }

        let body = text
            .strip_prefix("/*")
            .and_then(|t| t.strip_suffix("*/"))
            .unwrap_or(text);
        let body_lines: Vec<&str> = body.lines().map(str::trim).collect();
        let start = body_lines.iter().position(|l| !l.is_empty());
        let end = body_lines.iter().rposition(|l| !l.is_empty());
        if let (Some(start), Some(end)) = (start, end) {
            for line in &body_lines[start..=end] {
                if line.is_empty() {
                    lines.push("///".to_string());
                } else {
                    lines.push(format!("/// {}", line));
                }
            }
        }
    }
    lines
}

fn field_label(field: &FieldDecl) -> String {
    if field.is_embedded() {
        field.ty.to_string()
    } else {
        field.names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::parser::TypeExpr;
    use crate::Error;

    fn record(name: &str, fields: Vec<FieldDecl>) -> RecordDecl {
        RecordDecl {
            name: name.to_string(),
            line: 1,
            fields,
            comments: Vec::new(),
            trailing: None,
        }
    }

    fn render_one(field: FieldDecl) -> Vec<FieldOutput> {
        let ruleset = Ruleset::current();
        DeclAssembler::new(&ruleset).render_field(&field).unwrap()
    }

    #[test]
    fn test_untagged_field_gets_default() {
        let outputs = render_one(FieldDecl::new("FullName", TypeExpr::named("string")));
        assert_eq!(
            outputs,
            vec![FieldOutput::Active(RenderedField {
                doc: vec![],
                annotation: Some("#[serde(default)]".into()),
                ident: "full_name".into(),
                ty: "String".into(),
            })]
        );
    }

    #[test]
    fn test_omitempty_wraps_in_option() {
        let outputs = render_one(
            FieldDecl::new("Name", TypeExpr::named("string"))
                .with_tag("`json:\"name,omitempty\"`"),
        );
        let FieldOutput::Active(field) = &outputs[0] else {
            panic!("expected active field");
        };
        assert_eq!(field.ty, "Option<String>");
        assert_eq!(
            field.annotation.as_deref(),
            Some("#[serde(default, rename = \"name\")]")
        );
    }

    #[test]
    fn test_dash_tag_omits_field() {
        let outputs = render_one(
            FieldDecl::new("Password", TypeExpr::Unsupported("chan".into()))
                .with_tag("`json:\"-\"`"),
        );
        assert_eq!(outputs, vec![FieldOutput::Omitted("password".into())]);
    }

    #[test]
    fn test_self_field_is_escaped() {
        let outputs = render_one(FieldDecl::new("Self", TypeExpr::named("string")));
        let FieldOutput::Active(field) = &outputs[0] else {
            panic!("expected active field");
        };
        assert_eq!(field.ident, "self_");
        assert_eq!(
            field.annotation.as_deref(),
            Some("#[serde(default, rename = \"self\")]")
        );

        // An explicit tag name wins
        let outputs = render_one(
            FieldDecl::new("Self", TypeExpr::named("string")).with_tag("`json:\"me\"`"),
        );
        let FieldOutput::Active(field) = &outputs[0] else {
            panic!("expected active field");
        };
        assert_eq!(
            field.annotation.as_deref(),
            Some("#[serde(default, rename = \"me\")]")
        );
    }

    #[test]
    fn test_embedded_self_is_escaped() {
        let outputs = render_one(FieldDecl::embedded(TypeExpr::named("Self")));
        assert_eq!(
            outputs,
            vec![FieldOutput::Active(RenderedField {
                doc: vec![],
                annotation: Some("#[serde(default, rename = \"self\")]".into()),
                ident: "self_".into(),
                ty: "Self".into(),
            })]
        );
    }

    #[test]
    fn test_crate_and_super_are_escaped() {
        for (go, wire) in [("Crate", "crate"), ("Super", "super")] {
            let outputs = render_one(FieldDecl::new(go, TypeExpr::named("string")));
            let FieldOutput::Active(field) = &outputs[0] else {
                panic!("expected active field");
            };
            assert_eq!(field.ident, format!("{}_", wire));
            assert_eq!(
                field.annotation,
                Some(format!("#[serde(default, rename = \"{}\")]", wire))
            );
        }
    }

    #[test]
    fn test_embedded_field_named_after_type() {
        let outputs = render_one(FieldDecl::embedded(TypeExpr::pointer(TypeExpr::named(
            "PayloadUser",
        ))));
        assert_eq!(
            outputs,
            vec![FieldOutput::Active(RenderedField {
                doc: vec![],
                annotation: None,
                ident: "payload_user".into(),
                ty: "Box<PayloadUser>".into(),
            })]
        );
    }

    #[test]
    fn test_multi_name_field_expands() {
        let mut field = FieldDecl::new("X", TypeExpr::named("float64"));
        field.names.push("Y".into());
        let outputs = render_one(field);
        assert_eq!(outputs.len(), 2);
    }

    #[test]
    fn test_record_drops_failed_field() {
        let ruleset = Ruleset::current();
        let assembler = DeclAssembler::new(&ruleset);
        let mut diagnostics = Vec::new();

        let rec = record(
            "Commit",
            vec![
                FieldDecl::new("SHA", TypeExpr::named("string")),
                FieldDecl::new("Created", TypeExpr::qualified("sql", "NullTime")),
            ],
        );
        let out = assembler.render_record(&rec, &mut diagnostics);

        assert_eq!(
            out,
            "#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]\n\
             pub struct Commit {\n    #[serde(default)]\n    pub sha: String,\n}\n"
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Field);
        assert_eq!(diagnostics[0].context, "Commit.Created");
    }

    #[test]
    fn test_malformed_tag_drops_field() {
        let ruleset = Ruleset::current();
        let assembler = DeclAssembler::new(&ruleset);
        let field = FieldDecl::new("Name", TypeExpr::named("string")).with_tag(r#""json:\q""#);

        let err = assembler.render_field(&field).unwrap_err();
        assert!(matches!(err, Error::MalformedTag { .. }));
    }

    #[test]
    fn test_failed_alias_emits_nothing() {
        let ruleset = Ruleset::current();
        let assembler = DeclAssembler::new(&ruleset);
        let mut diagnostics = Vec::new();

        let alias = AliasDecl {
            name: "Handler".into(),
            line: 1,
            ty: TypeExpr::Unsupported("func".into()),
            comments: vec![],
            trailing: None,
        };
        assert_eq!(assembler.render_alias(&alias, &mut diagnostics), None);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Type);
    }

    #[test]
    fn test_alias_with_comments() {
        let ruleset = Ruleset::current();
        let assembler = DeclAssembler::new(&ruleset);
        let mut diagnostics = Vec::new();

        let alias = AliasDecl {
            name: "stateType".into(),
            line: 2,
            ty: TypeExpr::named("string"),
            comments: vec![Comment::new("// StateType issue state type", 1)],
            trailing: Some(Comment::new("// open or closed", 2)),
        };
        assert_eq!(
            assembler.render_alias(&alias, &mut diagnostics).unwrap(),
            "/// StateType issue state type\n/// open or closed\npub type StateType = String;\n"
        );
    }

    #[test]
    fn test_block_comment_lines() {
        let lines = doc_lines(
            &[Comment::new("/*\n  First line\n\n  Second line\n*/", 1)],
            None,
        );
        assert_eq!(lines, vec!["/// First line", "///", "/// Second line"]);
    }
}
