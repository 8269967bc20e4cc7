use serde::{Deserialize, Serialize};
use std::fmt;

/// Type expression of a field or type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// Plain identifier: `int`, `string`, `User`
    Named(String),
    /// Pointer: `*T`
    Pointer(Box<TypeExpr>),
    /// Slice `[]T` when `len` is `None`, array `[N]T` otherwise
    Sequence {
        /// Element type
        elem: Box<TypeExpr>,
        /// Array length, itself rendered as a type expression
        len: Option<Box<TypeExpr>>,
    },
    /// Map: `map[K]V`
    Map {
        /// Key type
        key: Box<TypeExpr>,
        /// Value type
        value: Box<TypeExpr>,
    },
    /// Package-qualified name: `time.Time`
    Qualified {
        /// Package qualifier
        namespace: String,
        /// Selected name
        name: String,
    },
    /// `interface{}`
    Dynamic,
    /// A shape that has no translation (`func`, `chan`, inline `struct`, ...)
    Unsupported(String),
}

impl TypeExpr {
    /// `Named` from anything string-like
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    /// `*inner`
    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    /// `[]elem`
    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Sequence {
            elem: Box::new(elem),
            len: None,
        }
    }

    /// `[len]elem`
    pub fn array(elem: TypeExpr, len: TypeExpr) -> Self {
        TypeExpr::Sequence {
            elem: Box::new(elem),
            len: Some(Box::new(len)),
        }
    }

    /// `map[key]value`
    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// `namespace.name`
    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Qualified {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeExpr {
    /// Go surface syntax, used in diagnostics
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => write!(f, "{}", name),
            TypeExpr::Pointer(inner) => write!(f, "*{}", inner),
            TypeExpr::Sequence { elem, len: None } => write!(f, "[]{}", elem),
            TypeExpr::Sequence {
                elem,
                len: Some(len),
            } => write!(f, "[{}]{}", len, elem),
            TypeExpr::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Qualified { namespace, name } => write!(f, "{}.{}", namespace, name),
            TypeExpr::Dynamic => write!(f, "interface{{}}"),
            TypeExpr::Unsupported(shape) => write!(f, "<{}>", shape),
        }
    }
}

/// A source comment, delimiters included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// `// text` or `/* text */`
    pub text: String,
    /// Line the comment starts on
    pub line: usize,
}

impl Comment {
    /// Creates a comment starting at `line`
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Comment {
            text: text.into(),
            line,
        }
    }

    /// Line the comment ends on; block comments may span several
    pub fn end_line(&self) -> usize {
        self.line + self.text.matches('\n').count()
    }
}

/// One field of a struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Declared names; empty for an embedded field
    pub names: Vec<String>,
    /// Field type
    pub ty: TypeExpr,
    /// Raw struct tag literal, quotes included
    pub tag: Option<String>,
    /// Comments directly above the field
    pub doc: Vec<Comment>,
}

impl FieldDecl {
    /// A named field without tag or docs
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        FieldDecl {
            names: vec![name.into()],
            ty,
            tag: None,
            doc: Vec::new(),
        }
    }

    /// An embedded field
    pub fn embedded(ty: TypeExpr) -> Self {
        FieldDecl {
            names: Vec::new(),
            ty,
            tag: None,
            doc: Vec::new(),
        }
    }

    /// Same field with a raw tag literal attached
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// True when the field has no declared name
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// `type Name struct { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDecl {
    /// Declared type name
    pub name: String,
    /// Line a leading comment block must end right above
    pub line: usize,
    /// Fields in source order
    pub fields: Vec<FieldDecl>,
    /// Leading comment block
    pub comments: Vec<Comment>,
    /// Comment on the same line as the end of the declaration
    pub trailing: Option<Comment>,
}

/// `type Name Other`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDecl {
    /// Declared type name
    pub name: String,
    /// Line a leading comment block must end right above
    pub line: usize,
    /// Underlying type
    pub ty: TypeExpr,
    /// Leading comment block
    pub comments: Vec<Comment>,
    /// Comment on the same line as the end of the declaration
    pub trailing: Option<Comment>,
}

/// A single type specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDecl {
    /// Struct type
    Record(RecordDecl),
    /// Any other type definition
    Alias(AliasDecl),
}

impl TypeDecl {
    /// Declared name
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Record(record) => &record.name,
            TypeDecl::Alias(alias) => &alias.name,
        }
    }

    /// Replaces the leading comment block
    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        match self {
            TypeDecl::Record(record) => record.comments = comments,
            TypeDecl::Alias(alias) => alias.comments = comments,
        }
    }

    /// Line a leading comment block must end right above
    pub fn line(&self) -> usize {
        match self {
            TypeDecl::Record(record) => record.line,
            TypeDecl::Alias(alias) => alias.line,
        }
    }
}

/// Top-level item of a Go file, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// A comment outside any declaration
    Comment(Comment),
    /// A type specification
    Type(TypeDecl),
    /// Anything else (package clause, imports, funcs, vars, consts)
    Other(String),
}
