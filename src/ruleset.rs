//! # Translation rulesets
//!
//! The translator has grown a few behavioral variants over time: whether
//! pointers become `Box<T>` or disappear, which acronyms are normalized,
//! which field names collide with Rust keywords, and what `any` becomes.
//! A [`Ruleset`] pins all of them down so a run is a pure function of the
//! input declarations and the ruleset.
//!
//! ```
//! use go2rs::{PointerPolicy, Ruleset};
//!
//! let ruleset = Ruleset::from_json_str(r#"{ "pointer_policy": "strip" }"#).unwrap();
//! assert_eq!(ruleset.pointer_policy, PointerPolicy::Strip);
//! // Unset keys keep the current defaults
//! assert_eq!(ruleset.dynamic_type.as_deref(), Some("serde_json::Value"));
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How `*T` is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerPolicy {
    /// `*T` becomes `Box<T>`
    #[default]
    Box,
    /// `*T` becomes `T`
    Strip,
}

/// Named ruleset presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// [`Ruleset::current`]
    Current,
    /// [`Ruleset::legacy`]
    Legacy,
}

/// The full set of knobs one translation run uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    /// Rendering of pointer types
    pub pointer_policy: PointerPolicy,
    /// Upper-case acronyms rewritten to `Xyz` form before snake-casing, in order
    pub acronyms: Vec<String>,
    /// Exact field names replaced verbatim, e.g. `type` -> `r#type`
    pub keyword_overrides: BTreeMap<String, String>,
    /// Target type for `any` / `interface{}`; `None` leaves the name alone
    pub dynamic_type: Option<String>,
    /// Struct tag key carrying the serialization name and flags
    pub tag_key: String,
}

/// Rust keywords that can be written as raw identifiers
///
/// `self`, `super` and `crate` cannot be raw; the assembler renames those
/// fields to `self_`, `super_` and `crate_` instead.
const RAW_KEYWORDS: &[&str] = &[
    "type", "ref", "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum",
    "extern", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "return", "static", "struct", "trait", "unsafe", "use", "where", "while",
];

fn keyword_overrides(words: &[&str]) -> BTreeMap<String, String> {
    let mut overrides = BTreeMap::new();
    for word in words {
        let escaped = format!("r#{}", word);
        overrides.insert(word.to_string(), escaped.clone());
        overrides.insert(crate::naming::capitalize(word), escaped);
    }
    overrides
}

impl Ruleset {
    /// Boxed pointers, the full acronym table, `serde_json::Value` for `any`
    pub fn current() -> Self {
        Ruleset {
            pointer_policy: PointerPolicy::Box,
            acronyms: ["ID", "URL", "HTML", "SHA", "SSH"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            keyword_overrides: keyword_overrides(RAW_KEYWORDS),
            dynamic_type: Some("serde_json::Value".to_string()),
            tag_key: "json".to_string(),
        }
    }

    /// Transparent pointers, `ID`/`URL` only, `type`/`ref` overrides, no dynamic type
    pub fn legacy() -> Self {
        Ruleset {
            pointer_policy: PointerPolicy::Strip,
            acronyms: vec!["ID".to_string(), "URL".to_string()],
            keyword_overrides: keyword_overrides(&["type", "ref"]),
            dynamic_type: None,
            tag_key: "json".to_string(),
        }
    }

    /// Ruleset for a preset
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Current => Ruleset::current(),
            Preset::Legacy => Ruleset::legacy(),
        }
    }

    /// Parses a ruleset from JSON; missing keys take their [`Ruleset::current`] value
    pub fn from_json_str(json: &str) -> Result<Self> {
        let ruleset: Ruleset = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("invalid ruleset: {}", e)))?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    /// Reads and parses a JSON ruleset file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&json).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.tag_key.is_empty() || self.tag_key.contains([' ', ':', '"']) {
            return Err(Error::config(format!(
                "tag_key {:?} is not a valid struct tag key",
                self.tag_key
            )));
        }
        if let Some(acronym) = self.acronyms.iter().find(|a| a.is_empty()) {
            return Err(Error::config(format!("empty acronym {:?}", acronym)));
        }
        Ok(())
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Ruleset::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ() {
        let current = Ruleset::current();
        let legacy = Ruleset::legacy();

        assert_eq!(current.pointer_policy, PointerPolicy::Box);
        assert_eq!(legacy.pointer_policy, PointerPolicy::Strip);
        assert!(current.acronyms.len() > legacy.acronyms.len());
        assert_eq!(legacy.dynamic_type, None);
        assert_eq!(Ruleset::default(), current);
    }

    #[test]
    fn test_keyword_overrides_cover_both_cases() {
        let legacy = Ruleset::legacy();
        assert_eq!(legacy.keyword_overrides["type"], "r#type");
        assert_eq!(legacy.keyword_overrides["Type"], "r#type");
        assert_eq!(legacy.keyword_overrides["Ref"], "r#ref");
        assert!(!legacy.keyword_overrides.contains_key("match"));

        let current = Ruleset::current();
        assert_eq!(current.keyword_overrides["Match"], "r#match");
        // `self` cannot be a raw identifier
        assert!(!current.keyword_overrides.contains_key("self"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let ruleset =
            Ruleset::from_json_str(r#"{"acronyms": ["ID", "API"], "dynamic_type": null}"#)
                .unwrap();

        assert_eq!(ruleset.acronyms, vec!["ID".to_string(), "API".to_string()]);
        assert_eq!(ruleset.dynamic_type, None);
        assert_eq!(ruleset.pointer_policy, PointerPolicy::Box);
        assert_eq!(ruleset.tag_key, "json");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = Ruleset::from_json_str(r#"{"pointer_policy": "weak"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Ruleset::from_json_str(r#"{"tag_key": "a b"}"#).unwrap_err();
        assert!(err.to_string().contains("tag_key"));
    }
}
