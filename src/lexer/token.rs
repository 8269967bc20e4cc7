use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }

    /// True for a semicolon the scanner inserted at a line end
    pub fn is_auto_semicolon(&self) -> bool {
        self.kind == TokenKind::Semicolon && self.lexeme == "\n"
    }
}

/// Token types of the Go subset the translator reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal, kept as written (`16`, `0x10`, `1_000`)
    Int(String),
    /// Floating-point or imaginary literal, kept as written
    Float(String),
    /// Rune literal, quotes included
    Char(String),
    /// String literal, quotes or backticks included
    String(String),

    // Identifiers
    /// Identifier, including predeclared names like `int` or `any`
    Identifier(String),

    // Keywords the declaration parser cares about
    /// `package`
    Package,
    /// `import`
    Import,
    /// `type`
    Type,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `map`
    Map,
    /// `chan`
    Chan,
    /// `func`
    Func,
    /// `var`
    Var,
    /// `const`
    Const,

    // Delimiters
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `;`, explicit or inserted at a line end
    Semicolon,

    // Operators
    /// `*`
    Star,
    /// `=`
    Assign,
    /// `<-`
    Arrow,
    /// Any other operator sequence (`+`, `:=`, `&&`, ...)
    Operator(String),

    /// `// ...` or `/* ... */`, delimiters included
    Comment(String),

    /// End of file
    Eof,
}

impl TokenKind {
    /// Maps a word to its keyword kind, if it is one the parser uses
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "package" => TokenKind::Package,
            "import" => TokenKind::Import,
            "type" => TokenKind::Type,
            "struct" => TokenKind::Struct,
            "interface" => TokenKind::Interface,
            "map" => TokenKind::Map,
            "chan" => TokenKind::Chan,
            "func" => TokenKind::Func,
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether a newline after this token ends the statement
    ///
    /// Mirrors Go's semicolon insertion rule. Keywords like `return` or
    /// `break` scan as identifiers here, so they are covered by the first arm.
    pub fn ends_statement(&self) -> bool {
        match self {
            TokenKind::Identifier(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Char(_)
            | TokenKind::String(_)
            | TokenKind::RightParen
            | TokenKind::RightBracket
            | TokenKind::RightBrace => true,
            TokenKind::Operator(op) => op == "++" || op == "--",
            _ => false,
        }
    }

    /// Human readable name used in parse errors
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(s) | TokenKind::Float(s) => format!("number {}", s),
            TokenKind::Char(s) | TokenKind::String(s) => format!("literal {}", s),
            TokenKind::Identifier(s) => format!("identifier '{}'", s),
            TokenKind::Operator(s) => format!("'{}'", s),
            TokenKind::Comment(_) => "comment".to_string(),
            TokenKind::Package => "'package'".to_string(),
            TokenKind::Import => "'import'".to_string(),
            TokenKind::Type => "'type'".to_string(),
            TokenKind::Struct => "'struct'".to_string(),
            TokenKind::Interface => "'interface'".to_string(),
            TokenKind::Map => "'map'".to_string(),
            TokenKind::Chan => "'chan'".to_string(),
            TokenKind::Func => "'func'".to_string(),
            TokenKind::Var => "'var'".to_string(),
            TokenKind::Const => "'const'".to_string(),
            TokenKind::LeftParen => "'('".to_string(),
            TokenKind::RightParen => "')'".to_string(),
            TokenKind::LeftBrace => "'{'".to_string(),
            TokenKind::RightBrace => "'}'".to_string(),
            TokenKind::LeftBracket => "'['".to_string(),
            TokenKind::RightBracket => "']'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::Ellipsis => "'...'".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Assign => "'='".to_string(),
            TokenKind::Arrow => "'<-'".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}
