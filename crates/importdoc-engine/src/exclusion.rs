use crate::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

/// Skips module names matching any configured pattern during discovery.
///
/// Patterns use search semantics (`re.search`, not a full match) and are
/// checked in configuration order. Every skipped name is remembered.
#[derive(Debug, Default)]
pub struct ExclusionFilter {
    patterns: Vec<Regex>,
    skipped: BTreeSet<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| Error::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            skipped: BTreeSet::new(),
        })
    }

    /// True when `name` matches a pattern; the name is then recorded as skipped.
    pub fn should_skip_module(&mut self, name: &str) -> bool {
        let Some(pattern) = self.matching_pattern(name) else {
            return false;
        };

        debug!(module = name, pattern, "excluded by pattern");
        self.skipped.insert(name.to_string());
        true
    }

    /// First pattern matching `name`, without recording anything.
    pub fn matching_pattern(&self, name: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|pattern| pattern.is_match(name))
            .map(Regex::as_str)
    }

    pub fn skipped_modules(&self) -> &BTreeSet<String> {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_patterns_never_skips() {
        let mut filter = ExclusionFilter::new(Vec::<String>::new()).unwrap();
        assert!(!filter.should_skip_module("my_module"));
        assert!(filter.skipped_modules().is_empty());
    }

    #[test]
    fn test_matching_pattern_records_name() {
        let mut filter = ExclusionFilter::new(["^_private"]).unwrap();
        assert!(filter.should_skip_module("_private_module"));
        assert!(filter.skipped_modules().contains("_private_module"));

        assert!(!filter.should_skip_module("public_module"));
        assert!(!filter.skipped_modules().contains("public_module"));
    }

    #[test]
    fn test_search_semantics_not_full_match() {
        let mut filter = ExclusionFilter::new(["tests"]).unwrap();
        assert!(filter.should_skip_module("pkg.tests.test_io"));
        assert!(!filter.should_skip_module("pkg.io"));
    }

    #[test]
    fn test_first_matching_pattern_reported() {
        let filter = ExclusionFilter::new(["^pkg\\.", "vendor"]).unwrap();
        assert_eq!(filter.matching_pattern("pkg.vendor"), Some("^pkg\\."));
        assert_eq!(filter.matching_pattern("other.vendor"), Some("vendor"));
        assert_eq!(filter.matching_pattern("other"), None);
    }

    #[test]
    fn test_repeated_calls_are_idempotent() {
        let mut filter = ExclusionFilter::new(["^_"]).unwrap();
        assert!(filter.should_skip_module("_x"));
        assert!(filter.should_skip_module("_x"));
        assert_eq!(filter.skipped_modules().len(), 1);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let err = ExclusionFilter::new(["(unclosed"]).unwrap_err();
        assert!(matches!(err, Error::Pattern { ref pattern, .. } if pattern == "(unclosed"));
        assert!(err.to_string().contains("Invalid exclusion pattern '(unclosed'"));
    }
}
