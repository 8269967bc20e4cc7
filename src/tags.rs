//! # Struct tag extraction
//!
//! Go struct tags are string literals holding space separated `key:"value"`
//! pairs. Only one key matters for serialization (`json` by default); its
//! value is a comma separated list whose first entry is the wire name and
//! whose remaining entries are flags:
//!
//! ```
//! use go2rs::tags::{extract, JsonTag};
//!
//! let value = extract("`json:\"login,omitempty\" xorm:\"UNIQUE\"`", "json").unwrap();
//! let tag = JsonTag::parse(&value);
//! assert_eq!(tag.name.as_deref(), Some("login"));
//! assert!(tag.omit_empty);
//! ```

use std::fmt;

/// Failure to read a struct tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The tag has no entry for the requested key; defaults apply
    NotFound {
        /// Raw tag text
        tag: String,
    },
    /// The tag or the requested entry cannot be decoded
    Malformed {
        /// Raw tag text
        tag: String,
        /// Why decoding failed
        reason: String,
    },
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TagError::NotFound { tag } => write!(f, "failed to lookup json tag in {}", tag),
            TagError::Malformed { tag, reason } => write!(f, "malformed tag {}: {}", tag, reason),
        }
    }
}

impl std::error::Error for TagError {}

impl From<TagError> for crate::Error {
    fn from(err: TagError) -> Self {
        match err {
            TagError::NotFound { tag } => crate::Error::MalformedTag {
                tag,
                reason: "no serialization key".to_string(),
            },
            TagError::Malformed { tag, reason } => crate::Error::MalformedTag { tag, reason },
        }
    }
}

/// Parsed value of the serialization key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonTag {
    /// Wire name override; `None` when the first entry is empty
    pub name: Option<String>,
    /// `omitempty` was present
    pub omit_empty: bool,
    /// The value is exactly `-`: the field is never serialized
    pub skip: bool,
    /// Remaining flags in order, `omitempty` removed
    pub flags: Vec<String>,
}

impl JsonTag {
    /// Splits a tag value such as `name,omitempty,string`
    pub fn parse(value: &str) -> Self {
        if value == "-" {
            return JsonTag {
                skip: true,
                ..JsonTag::default()
            };
        }

        let mut entries = value.split(',');
        let name = entries
            .next()
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let mut tag = JsonTag {
            name,
            ..JsonTag::default()
        };
        for flag in entries {
            if flag == "omitempty" {
                tag.omit_empty = true;
            } else {
                tag.flags.push(flag.to_string());
            }
        }
        tag
    }
}

/// Looks up `key` in a raw struct tag literal and returns its unquoted value
pub fn extract(raw: &str, key: &str) -> Result<String, TagError> {
    let tag = unquote(raw).map_err(|reason| TagError::Malformed {
        tag: raw.to_string(),
        reason,
    })?;

    match lookup(&tag, key) {
        Lookup::Found(value) => Ok(value),
        Lookup::Missing => Err(TagError::NotFound {
            tag: raw.to_string(),
        }),
        Lookup::Invalid(reason) => Err(TagError::Malformed {
            tag: raw.to_string(),
            reason,
        }),
    }
}

/// Reads the serialization entry of an optional raw tag
///
/// A missing tag and a tag without the key both yield `Ok(None)`.
pub fn field_tag(raw: Option<&str>, key: &str) -> Result<Option<JsonTag>, TagError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match extract(raw, key) {
        Ok(value) => Ok(Some(JsonTag::parse(&value))),
        Err(TagError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

enum Lookup {
    Found(String),
    Missing,
    Invalid(String),
}

/// Walks `key:"value"` pairs the way Go's `reflect.StructTag.Lookup` does
///
/// Syntax errors in unrelated pairs end the walk quietly; only the entry for
/// `key` itself is reported as invalid.
fn lookup(tag: &str, key: &str) -> Lookup {
    let bytes = tag.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len()
            && bytes[i] > b' '
            && bytes[i] != b':'
            && bytes[i] != b'"'
            && bytes[i] != 0x7f
        {
            i += 1;
        }
        if i == name_start || i + 1 >= bytes.len() || bytes[i] != b':' || bytes[i + 1] != b'"' {
            break;
        }
        let name = &tag[name_start..i];
        i += 1;

        let value_start = i;
        i += 1;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            if name == key {
                return Lookup::Invalid(format!("unterminated value for key {}", key));
            }
            break;
        }
        let quoted = &tag[value_start..=i];
        i += 1;

        if name == key {
            return match unquote(quoted) {
                Ok(value) => Lookup::Found(value),
                Err(reason) => Lookup::Invalid(reason),
            };
        }
    }

    Lookup::Missing
}

/// Decodes a Go string literal, interpreted (`"..."`) or raw (`` `...` ``)
pub fn unquote(literal: &str) -> Result<String, String> {
    if literal.len() >= 2 && literal.starts_with('`') && literal.ends_with('`') {
        let body = &literal[1..literal.len() - 1];
        if body.contains('`') {
            return Err("backtick inside raw string".to_string());
        }
        return Ok(body.replace('\r', ""));
    }

    if literal.len() < 2 || !literal.starts_with('"') || !literal.ends_with('"') {
        return Err(format!("not a string literal: {}", literal));
    }

    let body = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => return Err("unescaped quote".to_string()),
            '\n' => return Err("newline in string".to_string()),
            '\\' => {
                let escaped = chars.next().ok_or("trailing backslash")?;
                match escaped {
                    'a' => out.push('\x07'),
                    'b' => out.push('\x08'),
                    'f' => out.push('\x0c'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'v' => out.push('\x0b'),
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'x' => out.push(hex_escape(&mut chars, 2)?),
                    'u' => out.push(hex_escape(&mut chars, 4)?),
                    'U' => out.push(hex_escape(&mut chars, 8)?),
                    '0'..='7' => {
                        let mut value = escaped.to_digit(8).unwrap_or(0);
                        for _ in 0..2 {
                            let digit = chars
                                .next()
                                .and_then(|d| d.to_digit(8))
                                .ok_or("invalid octal escape")?;
                            value = value * 8 + digit;
                        }
                        let c = char::from_u32(value)
                            .filter(|_| value <= 0xff)
                            .ok_or("octal escape out of range")?;
                        out.push(c);
                    }
                    other => return Err(format!("invalid escape sequence \\{}", other)),
                }
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, String> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or("invalid hex escape")?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| format!("invalid code point {:#x}", value))
}
