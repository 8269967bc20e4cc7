use super::ast::{AliasDecl, Comment, FieldDecl, Node, RecordDecl, TypeDecl, TypeExpr};
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

/// Declaration-level parser for Go source
///
/// Only type declarations are parsed in full. Every other top-level
/// declaration is skipped by delimiter balancing and reported as
/// [`Node::Other`], so function bodies never need to be understood.
pub struct GoParser {
    tokens: Vec<Token>,
    current: usize,
}

impl GoParser {
    /// Creates a new parser over scanned tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        GoParser { tokens, current: 0 }
    }

    /// Parses the tokens into top-level nodes in source order
    pub fn parse(&mut self) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        while !self.is_at_end() {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Comment(ref text) => {
                    let comment = Comment::new(text.clone(), self.peek().line);
                    self.advance();
                    nodes.push(Node::Comment(comment));
                }
                TokenKind::Package => {
                    self.advance();
                    let name = self.expect_identifier()?;
                    nodes.push(Node::Other(format!("package {}", name)));
                }
                TokenKind::Type => self.parse_type_decl(&mut nodes)?,
                TokenKind::Import | TokenKind::Func | TokenKind::Var | TokenKind::Const => {
                    let keyword = self.advance().lexeme;
                    self.skip_declaration()?;
                    nodes.push(Node::Other(keyword));
                }
                _ => return Err(self.unexpected("top-level declaration")),
            }
        }

        Ok(nodes)
    }

    /// `type Spec` or `type ( Spec; Spec; ... )`
    ///
    /// A single spec, and the first spec of a group with no comment of its
    /// own, is anchored on the `type` keyword so the doc above it attaches.
    fn parse_type_decl(&mut self, nodes: &mut Vec<Node>) -> Result<()> {
        let keyword_line = self.consume(TokenKind::Type)?.line;

        if !self.check(&TokenKind::LeftParen) {
            nodes.push(self.parse_type_spec(keyword_line)?);
            return Ok(());
        }

        self.advance();
        let mut first = true;
        loop {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Comment(ref text) => {
                    let comment = Comment::new(text.clone(), self.peek().line);
                    self.advance();
                    nodes.push(Node::Comment(comment));
                    first = false;
                }
                TokenKind::RightParen => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::Eof => return Err(Error::UnexpectedEof),
                _ => {
                    let line = if first { keyword_line } else { self.peek().line };
                    nodes.push(self.parse_type_spec(line)?);
                    first = false;
                }
            }
        }
    }

    fn parse_type_spec(&mut self, line: usize) -> Result<Node> {
        let name = self.expect_identifier()?;

        if self.check(&TokenKind::LeftBracket) && self.at_type_parameters() {
            self.skip_declaration()?;
            return Ok(Node::Other(format!("generic type {}", name)));
        }

        // `type A = B` renders the same as `type A B`
        if self.check(&TokenKind::Assign) {
            self.advance();
        }

        let mut decl = if self.check(&TokenKind::Struct) {
            TypeDecl::Record(RecordDecl {
                name,
                line,
                fields: self.parse_struct_fields()?,
                comments: Vec::new(),
                trailing: None,
            })
        } else {
            TypeDecl::Alias(AliasDecl {
                name,
                line,
                ty: self.parse_type()?,
                comments: Vec::new(),
                trailing: None,
            })
        };

        if !matches!(
            self.peek().kind,
            TokenKind::Semicolon | TokenKind::RightParen | TokenKind::Comment(_) | TokenKind::Eof
        ) {
            return Err(self.unexpected("end of type declaration"));
        }

        let trailing = self.trailing_comment();
        match &mut decl {
            TypeDecl::Record(record) => record.trailing = trailing,
            TypeDecl::Alias(alias) => alias.trailing = trailing,
        }

        Ok(Node::Type(decl))
    }

    /// `[T any]` after a type name, as opposed to an array length `[N]`
    ///
    /// `[P C]`, `[P ~C]`, `[P, Q C]` and `[P *C,]` are parameter lists.
    /// Anything else after the first name (`]`, `.`, `*2`, `+ 1`) is an
    /// array length, as Go resolves `[P *C]` too.
    fn at_type_parameters(&self) -> bool {
        let kind = |offset: usize| self.tokens.get(self.current + offset).map(|t| &t.kind);

        if !matches!(kind(1), Some(TokenKind::Identifier(_))) {
            return false;
        }
        match kind(2) {
            Some(TokenKind::Identifier(_))
            | Some(TokenKind::Interface)
            | Some(TokenKind::Map)
            | Some(TokenKind::Chan)
            | Some(TokenKind::Func)
            | Some(TokenKind::LeftBracket)
            | Some(TokenKind::Comma) => true,
            Some(TokenKind::Operator(op)) => op == "~",
            Some(TokenKind::Star) => {
                matches!(kind(3), Some(TokenKind::Identifier(_)))
                    && matches!(kind(4), Some(TokenKind::Comma))
            }
            _ => false,
        }
    }

    /// Takes a comment that sits on the line the last token ended on
    fn trailing_comment(&mut self) -> Option<Comment> {
        let last_line = self.previous().line;
        let mut idx = self.current;
        if self.tokens.get(idx).map(Token::is_auto_semicolon) == Some(true) {
            idx += 1;
        }

        let token = self.tokens.get(idx)?;
        match &token.kind {
            TokenKind::Comment(text) if token.line == last_line => {
                let comment = Comment::new(text.clone(), token.line);
                self.current = idx + 1;
                Some(comment)
            }
            _ => None,
        }
    }

    fn parse_struct_fields(&mut self) -> Result<Vec<FieldDecl>> {
        self.consume(TokenKind::Struct)?;
        self.consume(TokenKind::LeftBrace)?;

        let mut fields = Vec::new();
        let mut doc = Vec::new();
        let mut last_field_line = 0;

        loop {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Comment(ref text) => {
                    let comment = Comment::new(text.clone(), self.peek().line);
                    self.advance();
                    // Same-line comments trail the previous field and are dropped
                    if comment.line != last_field_line {
                        doc.push(comment);
                    }
                }
                TokenKind::RightBrace => {
                    self.advance();
                    return Ok(fields);
                }
                TokenKind::Eof => return Err(Error::UnexpectedEof),
                _ => {
                    let mut field = self.parse_field()?;
                    field.doc = std::mem::take(&mut doc);
                    last_field_line = self.previous().line;
                    fields.push(field);
                }
            }
        }
    }

    fn parse_field(&mut self) -> Result<FieldDecl> {
        // Embedded pointer: `*Base` or `*pkg.Base`
        if self.check(&TokenKind::Star) {
            let ty = self.parse_type()?;
            return self.finish_field(Vec::new(), ty);
        }

        let first = self.expect_identifier()?;
        let names = match self.peek().kind {
            TokenKind::Dot => {
                self.advance();
                let selector = self.expect_identifier()?;
                return self.finish_field(Vec::new(), TypeExpr::qualified(first, selector));
            }
            TokenKind::Semicolon
            | TokenKind::RightBrace
            | TokenKind::String(_)
            | TokenKind::Comment(_) => {
                return self.finish_field(Vec::new(), TypeExpr::Named(first));
            }
            TokenKind::Comma => {
                let mut names = vec![first];
                while self.check(&TokenKind::Comma) {
                    self.advance();
                    names.push(self.expect_identifier()?);
                }
                names
            }
            _ => vec![first],
        };

        let ty = self.parse_type()?;
        self.finish_field(names, ty)
    }

    fn finish_field(&mut self, names: Vec<String>, ty: TypeExpr) -> Result<FieldDecl> {
        let tag = match self.peek().kind {
            TokenKind::String(ref raw) => {
                let raw = raw.clone();
                self.advance();
                Some(raw)
            }
            _ => None,
        };

        if !matches!(
            self.peek().kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Comment(_)
        ) {
            return Err(self.unexpected("end of field"));
        }

        Ok(FieldDecl {
            names,
            ty,
            tag,
            doc: Vec::new(),
        })
    }

    /// Parses one type expression
    pub fn parse_type(&mut self) -> Result<TypeExpr> {
        match self.peek().kind {
            TokenKind::Identifier(ref name) => {
                let name = name.clone();
                self.advance();
                if self.check(&TokenKind::Dot) {
                    self.advance();
                    let selector = self.expect_identifier()?;
                    Ok(TypeExpr::qualified(name, selector))
                } else {
                    Ok(TypeExpr::Named(name))
                }
            }
            TokenKind::Star => {
                self.advance();
                Ok(TypeExpr::pointer(self.parse_type()?))
            }
            TokenKind::LeftBracket => {
                self.advance();
                if self.check(&TokenKind::RightBracket) {
                    self.advance();
                    return Ok(TypeExpr::slice(self.parse_type()?));
                }
                let len = self.parse_array_len()?;
                Ok(TypeExpr::array(self.parse_type()?, len))
            }
            TokenKind::Map => {
                self.advance();
                self.consume(TokenKind::LeftBracket)?;
                let key = self.parse_type()?;
                self.consume(TokenKind::RightBracket)?;
                let value = self.parse_type()?;
                Ok(TypeExpr::map(key, value))
            }
            TokenKind::Interface => {
                self.advance();
                let empty = self.check(&TokenKind::LeftBrace)
                    && matches!(
                        self.tokens.get(self.current + 1).map(|t| &t.kind),
                        Some(TokenKind::RightBrace)
                    );
                if empty {
                    self.advance();
                    self.advance();
                    return Ok(TypeExpr::Dynamic);
                }
                self.skip_balanced()?;
                Ok(TypeExpr::Unsupported("interface".into()))
            }
            TokenKind::Struct => {
                self.advance();
                self.skip_balanced()?;
                Ok(TypeExpr::Unsupported("struct".into()))
            }
            TokenKind::Func => {
                self.advance();
                self.skip_signature()?;
                Ok(TypeExpr::Unsupported("func".into()))
            }
            TokenKind::Chan => {
                self.advance();
                if self.check(&TokenKind::Arrow) {
                    self.advance();
                }
                self.parse_type()?;
                Ok(TypeExpr::Unsupported("chan".into()))
            }
            TokenKind::Arrow => {
                self.advance();
                self.consume(TokenKind::Chan)?;
                self.parse_type()?;
                Ok(TypeExpr::Unsupported("chan".into()))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.consume(TokenKind::RightParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected("type")),
        }
    }

    /// Length inside `[...]`, consuming the closing bracket
    fn parse_array_len(&mut self) -> Result<TypeExpr> {
        let mut len = match self.peek().kind {
            TokenKind::Int(ref text) => {
                let text = text.clone();
                self.advance();
                TypeExpr::Named(text)
            }
            TokenKind::Identifier(ref name) => {
                let name = name.clone();
                self.advance();
                if self.check(&TokenKind::Dot) {
                    self.advance();
                    TypeExpr::qualified(name, self.expect_identifier()?)
                } else {
                    TypeExpr::Named(name)
                }
            }
            TokenKind::Ellipsis => {
                self.advance();
                TypeExpr::Unsupported("[...] array".into())
            }
            _ => TypeExpr::Unsupported("array length expression".into()),
        };

        if !self.check(&TokenKind::RightBracket) {
            // `[N + 1]T` and other constant expressions
            let mut depth = 0usize;
            loop {
                match self.peek().kind {
                    TokenKind::RightBracket if depth == 0 => break,
                    TokenKind::LeftBracket | TokenKind::LeftParen | TokenKind::LeftBrace => {
                        depth += 1
                    }
                    TokenKind::RightBracket | TokenKind::RightParen | TokenKind::RightBrace => {
                        depth = depth.saturating_sub(1)
                    }
                    TokenKind::Eof => return Err(Error::UnexpectedEof),
                    _ => {}
                }
                self.advance();
            }
            len = TypeExpr::Unsupported("array length expression".into());
        }

        self.consume(TokenKind::RightBracket)?;
        Ok(len)
    }

    /// Parameters and results of a func type
    fn skip_signature(&mut self) -> Result<()> {
        if !self.check(&TokenKind::LeftParen) {
            return Err(self.unexpected("'('"));
        }
        self.skip_balanced()?;

        if self.check(&TokenKind::LeftParen) {
            self.skip_balanced()?;
        } else if self.at_type_start() {
            self.parse_type()?;
        }
        Ok(())
    }

    fn at_type_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Identifier(_)
                | TokenKind::Star
                | TokenKind::LeftBracket
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Func
                | TokenKind::Interface
                | TokenKind::Struct
                | TokenKind::Arrow
                | TokenKind::LeftParen
        )
    }

    /// Consumes an opening delimiter and everything up to its match
    fn skip_balanced(&mut self) -> Result<()> {
        if !matches!(
            self.peek().kind,
            TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace
        ) {
            return Err(self.unexpected("'{', '(' or '['"));
        }

        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                }
                TokenKind::Eof => return Err(Error::UnexpectedEof),
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips to the end of the current declaration
    ///
    /// Stops after a semicolon at nesting depth zero, or before a `)` that
    /// closes an enclosing group.
    fn skip_declaration(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    // Helper methods

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.peek().kind {
            TokenKind::Identifier(ref name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            return Error::UnexpectedEof;
        }
        Error::UnexpectedToken {
            expected: expected.to_string(),
            got: token.kind.describe(),
            line: token.line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::GoScanner;

    fn parse(source: &str) -> Vec<Node> {
        let mut scanner = GoScanner::new(source);
        let tokens = scanner.scan_tokens().unwrap();
        let mut parser = GoParser::new(tokens);
        parser.parse().unwrap()
    }

    fn only_type(source: &str) -> TypeDecl {
        parse(source)
            .into_iter()
            .find_map(|n| match n {
                Node::Type(decl) => Some(decl),
                _ => None,
            })
            .expect("a type declaration")
    }

    #[test]
    fn test_struct_with_tags() {
        let decl = only_type(
            r#"
package api

type User struct {
    ID    int64  `json:"id"`
    Name  string `json:"name,omitempty"`
    Admin bool
}
"#,
        );

        let TypeDecl::Record(record) = decl else {
            panic!("expected record");
        };
        assert_eq!(record.name, "User");
        assert_eq!(record.fields.len(), 3);
        assert_eq!(record.fields[0].names, vec!["ID".to_string()]);
        assert_eq!(record.fields[0].ty, TypeExpr::named("int64"));
        assert_eq!(record.fields[0].tag.as_deref(), Some("`json:\"id\"`"));
        assert_eq!(record.fields[2].tag, None);
    }

    #[test]
    fn test_embedded_fields() {
        let decl = only_type("type Repo struct {\n\tBase\n\t*Owner\n\ttime.Time\n\tName string\n}\n");

        let TypeDecl::Record(record) = decl else {
            panic!("expected record");
        };
        assert!(record.fields[0].is_embedded());
        assert_eq!(record.fields[0].ty, TypeExpr::named("Base"));
        assert_eq!(
            record.fields[1].ty,
            TypeExpr::pointer(TypeExpr::named("Owner"))
        );
        assert_eq!(record.fields[2].ty, TypeExpr::qualified("time", "Time"));
        assert!(!record.fields[3].is_embedded());
    }

    #[test]
    fn test_multi_name_field() {
        let decl = only_type("type P struct { X, Y float64 }");

        let TypeDecl::Record(record) = decl else {
            panic!("expected record");
        };
        assert_eq!(record.fields[0].names, vec!["X".to_string(), "Y".to_string()]);
    }

    #[test]
    fn test_composite_types() {
        let decl = only_type("type T map[string][]*[16]byte");

        let TypeDecl::Alias(alias) = decl else {
            panic!("expected alias");
        };
        assert_eq!(
            alias.ty,
            TypeExpr::map(
                TypeExpr::named("string"),
                TypeExpr::slice(TypeExpr::pointer(TypeExpr::array(
                    TypeExpr::named("byte"),
                    TypeExpr::named("16")
                )))
            )
        );
    }

    #[test]
    fn test_unsupported_shapes() {
        let decl = only_type("type Handler func(w Writer, r *Request) error");
        let TypeDecl::Alias(alias) = decl else {
            panic!("expected alias");
        };
        assert_eq!(alias.ty, TypeExpr::Unsupported("func".into()));

        let decl = only_type("type Any interface{}");
        let TypeDecl::Alias(alias) = decl else {
            panic!("expected alias");
        };
        assert_eq!(alias.ty, TypeExpr::Dynamic);
    }

    #[test]
    fn test_grouped_declarations_and_comments() {
        let nodes = parse(
            r#"
// Package doc
package api

import (
    "time"
)

type (
    // State of a thing
    State string // trailing
    Count = int
)
"#,
        );

        assert_eq!(nodes[0], Node::Comment(Comment::new("// Package doc", 2)));
        assert_eq!(nodes[1], Node::Other("package api".into()));
        assert_eq!(nodes[2], Node::Other("import".into()));
        assert_eq!(
            nodes[3],
            Node::Comment(Comment::new("// State of a thing", 10))
        );
        let Node::Type(TypeDecl::Alias(state)) = &nodes[4] else {
            panic!("expected alias");
        };
        assert_eq!(state.name, "State");
        assert_eq!(state.trailing, Some(Comment::new("// trailing", 11)));
        let Node::Type(TypeDecl::Alias(count)) = &nodes[5] else {
            panic!("expected alias");
        };
        assert_eq!(count.ty, TypeExpr::named("int"));
    }

    #[test]
    fn test_functions_are_skipped() {
        let nodes = parse(
            r#"
package api

func (u *User) Name() string {
    type local struct{}
    return u.name
}

var x = map[string]int{"a": 1}

type User struct{}
"#,
        );

        assert_eq!(nodes[1], Node::Other("func".into()));
        assert_eq!(nodes[2], Node::Other("var".into()));
        assert!(matches!(nodes[3], Node::Type(TypeDecl::Record(_))));
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn test_generic_type_is_skipped() {
        let nodes = parse("type List[T any] struct { items []T }\ntype Arr [4]int\n");

        assert_eq!(nodes[0], Node::Other("generic type List".into()));
        let Node::Type(TypeDecl::Alias(arr)) = &nodes[1] else {
            panic!("expected alias");
        };
        assert_eq!(
            arr.ty,
            TypeExpr::array(TypeExpr::named("int"), TypeExpr::named("4"))
        );
    }

    #[test]
    fn test_type_parameter_forms() {
        let nodes = parse(
            "type A[K comparable, V any] map[K]V\ntype B[T ~int | ~string] []T\ntype C[P *Q,] []P\ntype D[P, Q any] struct{}\n",
        );
        assert_eq!(
            nodes,
            vec![
                Node::Other("generic type A".into()),
                Node::Other("generic type B".into()),
                Node::Other("generic type C".into()),
                Node::Other("generic type D".into()),
            ]
        );
    }

    #[test]
    fn test_array_length_expressions_are_not_type_parameters() {
        for source in ["type A [N*2]int", "type A [N * M]int", "type A [N + 1]int"] {
            let TypeDecl::Alias(alias) = only_type(source) else {
                panic!("expected alias for {}", source);
            };
            assert_eq!(
                alias.ty,
                TypeExpr::array(
                    TypeExpr::named("int"),
                    TypeExpr::Unsupported("array length expression".into())
                ),
                "{}",
                source
            );
        }
    }

    #[test]
    fn test_declaration_lines() {
        let nodes = parse("package p\n\ntype A int\n\ntype (\n    B int\n\n    C int\n    // D doc\n    D int\n)\n");
        let lines: Vec<(String, usize)> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::Type(decl) => Some((decl.name().to_string(), decl.line())),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                ("A".to_string(), 3),
                ("B".to_string(), 5),
                ("C".to_string(), 8),
                ("D".to_string(), 10),
            ]
        );
    }

    #[test]
    fn test_field_doc_comments() {
        let decl = only_type(
            "type C struct {\n\t// Host name\n\tHost string // inline\n\t// Port number\n\tPort int\n}\n",
        );

        let TypeDecl::Record(record) = decl else {
            panic!("expected record");
        };
        assert_eq!(record.fields[0].doc, vec![Comment::new("// Host name", 2)]);
        assert_eq!(record.fields[1].doc, vec![Comment::new("// Port number", 4)]);
    }

    #[test]
    fn test_missing_brace_is_an_error() {
        let mut scanner = GoScanner::new("type X struct {\n Name string\n");
        let tokens = scanner.scan_tokens().unwrap();
        let err = GoParser::new(tokens).parse().unwrap_err();
        assert_eq!(err, Error::UnexpectedEof);
    }
}
