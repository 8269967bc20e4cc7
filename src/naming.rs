//! Identifier renaming: Go names to Rust field and type names

use crate::ruleset::Ruleset;

/// Renames Go identifiers under a ruleset
pub struct Renamer<'a> {
    ruleset: &'a Ruleset,
}

impl<'a> Renamer<'a> {
    /// Creates a renamer for `ruleset`
    pub fn new(ruleset: &'a Ruleset) -> Self {
        Renamer { ruleset }
    }

    /// Go field name to a snake_case Rust field name
    ///
    /// Keyword overrides are matched against the name exactly as written.
    /// Otherwise underscores are dropped, known acronyms are normalized and
    /// the result is snake-cased, so `HTMLURL` becomes `html_url`. The
    /// snake-cased result is checked against the overrides once more, so
    /// `Async_` still comes out as `r#async`.
    pub fn rename_field(&self, name: &str) -> String {
        let overrides = &self.ruleset.keyword_overrides;
        if let Some(escaped) = overrides.get(name) {
            return escaped.clone();
        }

        let stripped = name.replace('_', "");
        let normalized = normalize_acronyms(&stripped, &self.ruleset.acronyms);
        let snake = to_snake_case(&normalized);
        match overrides.get(&snake) {
            Some(escaped) => escaped.clone(),
            None => snake,
        }
    }

    /// Go type name to a Rust type name
    pub fn rename_type(&self, name: &str) -> String {
        capitalize(name)
    }
}

/// Rewrites every occurrence of each acronym to `Xyz` form, in table order
pub fn normalize_acronyms(name: &str, acronyms: &[String]) -> String {
    acronyms.iter().fold(name.to_string(), |acc, acronym| {
        acc.replace(acronym.as_str(), &title_case(acronym))
    })
}

/// Lowercases the first character and puts `_` before every later uppercase one
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_lowercase());
        } else if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Uppercases the first character, leaving the rest untouched
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
