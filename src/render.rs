//! Type expression rendering

use crate::error::{Error, Result};
use crate::naming::capitalize;
use crate::parser::TypeExpr;
use crate::ruleset::{PointerPolicy, Ruleset};

/// Rust type for a predeclared Go type name
///
/// `any` is absent on purpose: its rendering depends on the ruleset.
pub fn primitive(name: &str) -> Option<&'static str> {
    let mapped = match name {
        "int" => "i32",
        "int8" => "i8",
        "int16" => "i16",
        "int32" => "i32",
        "int64" => "i64",
        "uint" => "u32",
        "uint8" => "u8",
        "uint16" => "u16",
        "uint32" => "u32",
        "uint64" => "u64",
        "uintptr" => "usize",
        "byte" => "u8",
        "rune" => "i32",
        "float32" => "f32",
        "float64" => "f64",
        "string" => "String",
        "bool" => "bool",
        _ => return None,
    };
    Some(mapped)
}

/// Renders type expressions to Rust type syntax
pub struct TypeRenderer<'a> {
    ruleset: &'a Ruleset,
}

impl<'a> TypeRenderer<'a> {
    /// Creates a renderer for `ruleset`
    pub fn new(ruleset: &'a Ruleset) -> Self {
        TypeRenderer { ruleset }
    }

    /// Renders one type expression
    pub fn render(&self, expr: &TypeExpr) -> Result<String> {
        match expr {
            TypeExpr::Named(name) => Ok(self.render_name(name)),
            TypeExpr::Pointer(inner) => {
                let inner = self.render(inner)?;
                match self.ruleset.pointer_policy {
                    PointerPolicy::Box => Ok(format!("Box<{}>", inner)),
                    PointerPolicy::Strip => Ok(inner),
                }
            }
            TypeExpr::Sequence { elem, len: None } => Ok(format!("Vec<{}>", self.render(elem)?)),
            TypeExpr::Sequence {
                elem,
                len: Some(len),
            } => {
                let elem = self.render(elem)?;
                let len = self.render(len)?;
                Ok(format!("[{}; {}]", elem, len))
            }
            TypeExpr::Map { key, value } => {
                let key = self.render(key)?;
                let value = self.render(value)?;
                Ok(format!("HashMap<{}, {}>", key, value))
            }
            TypeExpr::Qualified { namespace, name } => {
                // Timestamps travel as their RFC 3339 text
                if namespace == "time" && name == "Time" {
                    return Ok("String".to_string());
                }
                Err(Error::UnknownSelector {
                    namespace: namespace.clone(),
                    selector: name.clone(),
                })
            }
            TypeExpr::Dynamic => Ok(self
                .ruleset
                .dynamic_type
                .clone()
                .unwrap_or_else(|| "any".to_string())),
            TypeExpr::Unsupported(shape) => Err(Error::UnsupportedType {
                shape: shape.clone(),
            }),
        }
    }

    fn render_name(&self, name: &str) -> String {
        if let Some(mapped) = primitive(name) {
            return mapped.to_string();
        }
        if name == "any" {
            if let Some(dynamic) = &self.ruleset.dynamic_type {
                return dynamic.clone();
            }
        }
        capitalize(name)
    }
}

/// The Go type name an embedded field is named after
///
/// `Base`, `*Base` and `pkg.Base` all embed `Base`.
pub fn embedded_type_name(expr: &TypeExpr) -> Result<&str> {
    match expr {
        TypeExpr::Named(name) => Ok(name.as_str()),
        TypeExpr::Pointer(inner) => match inner.as_ref() {
            TypeExpr::Named(name) => Ok(name.as_str()),
            TypeExpr::Qualified { name, .. } => Ok(name.as_str()),
            other => Err(Error::UnsupportedEmbed {
                shape: other.to_string(),
            }),
        },
        TypeExpr::Qualified { name, .. } => Ok(name.as_str()),
        other => Err(Error::UnsupportedEmbed {
            shape: other.to_string(),
        }),
    }
}
