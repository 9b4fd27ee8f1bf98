//! Ordered marker substitution.
//!
//! The table is applied as a single pass over its entries in registration order.
//! Each entry rewrites every occurrence in the output of the previous entry, so a
//! replacement that contains a later entry's marker is rewritten again.

use regex::{bytes, NoExpand, Regex};

use crate::error::Result;

/// What a substitution looks for.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Plain text such as `%NAME%`
    Literal(String),
    /// Unanchored regular expression
    Regex(Regex),
}

impl Pattern {
    /// Source text of the pattern.
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Literal(text) => text,
            Pattern::Regex(regex) => regex.as_str(),
        }
    }
}

/// A single (pattern, replacement) pair.
#[derive(Debug, Clone)]
pub struct Substitution {
    pub pattern: Pattern,
    pub replacement: String,
    /// Byte-level twin of a regex pattern, for file contents
    bytes_regex: Option<bytes::Regex>,
}

impl Substitution {
    pub fn is_literal(&self) -> bool {
        matches!(self.pattern, Pattern::Literal(_))
    }

    fn apply(&self, text: &str) -> String {
        match &self.pattern {
            Pattern::Literal(marker) if marker.is_empty() => text.to_string(),
            Pattern::Literal(marker) => text.replace(marker.as_str(), &self.replacement),
            Pattern::Regex(regex) => {
                regex.replace_all(text, NoExpand(&self.replacement)).into_owned()
            }
        }
    }

    fn apply_bytes(&self, text: &[u8]) -> Vec<u8> {
        let replacement = self.replacement.as_bytes();
        match (&self.pattern, &self.bytes_regex) {
            (Pattern::Regex(_), Some(regex)) => {
                regex.replace_all(text, bytes::NoExpand(replacement)).into_owned()
            }
            (pattern, _) => replace_bytes(text, pattern.as_str().as_bytes(), replacement),
        }
    }
}

/// Replaces every occurrence of `marker` in `text`, left to right.
fn replace_bytes(text: &[u8], marker: &[u8], replacement: &[u8]) -> Vec<u8> {
    if marker.is_empty() {
        return text.to_vec();
    }
    let mut output = Vec::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.windows(marker.len()).position(|window| window == marker) {
        output.extend_from_slice(&rest[..pos]);
        output.extend_from_slice(replacement);
        rest = &rest[pos + marker.len()..];
    }
    output.extend_from_slice(rest);
    output
}

/// Ordered list of substitutions.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    entries: Vec<Substitution>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a literal marker substitution.
    pub fn add<P: Into<String>, R: Into<String>>(&mut self, pattern: P, replacement: R) {
        self.entries.push(Substitution {
            pattern: Pattern::Literal(pattern.into()),
            replacement: replacement.into(),
            bytes_regex: None,
        });
    }

    /// Appends a regular expression substitution. The replacement is inserted
    /// verbatim, `$1` style references are not expanded.
    ///
    /// # Errors
    /// * `Error::PatternError` if the expression does not compile
    pub fn add_regex<R: Into<String>>(&mut self, pattern: &str, replacement: R) -> Result<()> {
        let regex = Regex::new(pattern)?;
        let bytes_regex = bytes::Regex::new(pattern)?;
        self.entries.push(Substitution {
            pattern: Pattern::Regex(regex),
            replacement: replacement.into(),
            bytes_regex: Some(bytes_regex),
        });
        Ok(())
    }

    /// Applies every entry, in order, to `text`.
    pub fn apply(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |current, entry| entry.apply(&current))
    }

    /// Byte-level [`apply`](Self::apply) for file contents that need not be UTF-8.
    pub fn apply_bytes(&self, text: &[u8]) -> Vec<u8> {
        self.entries
            .iter()
            .fold(text.to_vec(), |current, entry| entry.apply_bytes(&current))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Substitution> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Environment exported to the external generator.
    ///
    /// Only literal entries qualify. The marker must contain a letter or an
    /// underscore and the value must contain something other than single quotes.
    /// Variable names are the bare marker names, see [`bare_name`].
    pub fn environment(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter(|entry| entry.is_literal())
            .filter(|entry| {
                entry
                    .pattern
                    .as_str()
                    .chars()
                    .any(|c| c.is_ascii_alphabetic() || c == '_')
            })
            .filter(|entry| entry.replacement.chars().any(|c| c != '\''))
            .map(|entry| (bare_name(entry.pattern.as_str()), entry.replacement.clone()))
            .filter(|(name, _)| !name.is_empty())
            .collect()
    }
}

impl<'a> IntoIterator for &'a SubstitutionTable {
    type Item = &'a Substitution;
    type IntoIter = std::slice::Iter<'a, Substitution>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Strips one leading and one trailing delimiter character: `%NAME%` becomes `NAME`.
pub fn bare_name(marker: &str) -> String {
    let mut chars = marker.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}
