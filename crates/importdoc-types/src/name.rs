use crate::{Error, Result};
use std::fmt;

/// Dotted Python module name with pre-split segments.
///
/// `"pkg.sub.leaf"` keeps the full name plus `["pkg", "sub", "leaf"]` so
/// lookups can walk the namespace without re-splitting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName {
    full: String,
    segments: Vec<String>,
}

impl ModuleName {
    /// Parse a dotted module name.
    ///
    /// Every segment must be an identifier. Empty segments (`".os"`, `"os."`)
    /// and path-like input (`"a/b"`, `"/etc"`, `"a-b"`) are rejected, so a
    /// segment can never escape a search location when joined onto it.
    pub fn parse(name: &str) -> Result<Self> {
        let segments: Vec<String> = name.split('.').map(str::to_string).collect();
        if !segments.iter().all(|s| is_identifier(s)) {
            return Err(Error::InvalidModuleName(name.to_string()));
        }

        Ok(Self {
            full: name.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment (`"leaf"` for `"pkg.sub.leaf"`).
    pub fn last(&self) -> &str {
        // parse() guarantees at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_top_level(&self) -> bool {
        self.segments.len() == 1
    }

    /// Containing package, or `None` for a top-level name.
    pub fn parent(&self) -> Option<ModuleName> {
        if self.is_top_level() {
            return None;
        }
        let segments = self.segments[..self.segments.len() - 1].to_vec();
        Some(Self {
            full: segments.join("."),
            segments,
        })
    }

    /// Append one child segment (`"pkg"` + `"sub"` → `"pkg.sub"`).
    pub fn child(&self, segment: &str) -> Result<ModuleName> {
        Self::parse(&format!("{}.{}", self.full, segment))
    }

    /// Every dotted prefix from the top-level package down to the name itself.
    ///
    /// `"a.b.c"` yields `"a"`, `"a.b"`, `"a.b.c"`.
    pub fn prefixes(&self) -> Vec<ModuleName> {
        (1..=self.segments.len())
            .map(|depth| {
                let segments = self.segments[..depth].to_vec();
                Self {
                    full: segments.join("."),
                    segments,
                }
            })
            .collect()
    }
}

/// Whether `segment` is a valid identifier (`pkg`, `_private2`; not `2fast` or `a-b`).
pub fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.full
    }
}

impl std::str::FromStr for ModuleName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
