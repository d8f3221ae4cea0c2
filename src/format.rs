//! Format identifiers: normalised file-extension tokens.
//!
//! A [`Format`] is always lower-case, never empty and never carries a
//! leading dot, so `"DOCX"`, `".docx"` and `"docx"` are the same value.
//! A couple of long-form aliases (`latex`, `markdown`) normalise to the
//! extension they are written with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A normalised, dot-free, lower-case file-extension token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Format(String);

const ALIASES: &[(&str, &str)] = &[("latex", "tex"), ("markdown", "md")];

impl Format {
    /// Parse and normalise a token. Returns `None` for empty tokens or
    /// tokens containing separators or whitespace.
    pub fn parse(token: &str) -> Option<Format> {
        let token = token.trim();
        let token = token.strip_prefix('.').unwrap_or(token);
        if token.is_empty()
            || token
                .chars()
                .any(|c| c == '.' || c == '/' || c == '\\' || c.is_whitespace())
        {
            return None;
        }

        let lower = token.to_ascii_lowercase();
        let normalised = ALIASES
            .iter()
            .find(|(alias, _)| *alias == lower)
            .map(|(_, canonical)| (*canonical).to_string())
            .unwrap_or(lower);
        Some(Format(normalised))
    }

    /// The format of `path`, derived from its extension.
    ///
    /// `REPORT.DOCX` and `report.docx` both give `docx`; a path without an
    /// extension gives `None`.
    pub fn from_path(path: &Path) -> Option<Format> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension written for outputs of this format.
    pub fn extension(&self) -> &str {
        &self.0
    }

    /// Upper-case label used in menus ("PDF", "DOCX").
    pub fn label(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when a string is not a valid format token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid format (expected an extension such as pdf or docx)")]
pub struct InvalidFormat(pub String);

impl FromStr for Format {
    type Err = InvalidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::parse(s).ok_or_else(|| InvalidFormat(s.to_string()))
    }
}

impl TryFrom<String> for Format {
    type Error = InvalidFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Format> for String {
    fn from(f: Format) -> Self {
        f.0
    }
}
