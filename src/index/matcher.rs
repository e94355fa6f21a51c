//! Name predicates deciding index membership
//!
//! A matcher is a pure, immutable predicate over a metric name. Matchers are
//! consulted once per metric, at `try_add` time; they hold no state beyond
//! their own parameters and are safe for unsynchronized concurrent reads.

use regex::Regex;

use crate::index::config::ConfigError;
use crate::symbol::{StatName, SymbolTable};

/// Predicate deciding whether a metric belongs in an index.
///
/// Unlike an admission filter (which rejects stats from being created at
/// all), an `IndexMatcher` decides inclusion in a secondary index used for
/// lookup and aggregation.
pub trait IndexMatcher: Send + Sync + std::fmt::Debug {
    /// Match against the full stat name as a string.
    fn matches(&self, name: &str) -> bool;

    /// Match against an interned name.
    ///
    /// Fast path for callers that already hold a `StatName`. The default
    /// implementation resolves the name and delegates to [`matches`]; it is
    /// semantically equivalent to the string path by construction.
    ///
    /// [`matches`]: IndexMatcher::matches
    fn matches_stat_name(&self, name: StatName, symbols: &SymbolTable) -> bool {
        self.matches(&symbols.resolve(name))
    }

    /// Human-readable description of the match criteria, for debugging and
    /// admin output.
    fn describe(&self) -> String;
}

/// Matches on a prefix and/or suffix of the stat name.
///
/// Either component may be empty, meaning "don't care"; both empty matches
/// every name. O(1) relative to name length.
#[derive(Debug)]
pub struct PrefixSuffixMatcher {
    prefix: String,
    suffix: String,
}

impl PrefixSuffixMatcher {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        PrefixSuffixMatcher {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl IndexMatcher for PrefixSuffixMatcher {
    fn matches(&self, name: &str) -> bool {
        if !self.prefix.is_empty() && !name.starts_with(&self.prefix) {
            return false;
        }
        if !self.suffix.is_empty() && !name.ends_with(&self.suffix) {
            return false;
        }
        true
    }

    fn describe(&self) -> String {
        match (self.prefix.is_empty(), self.suffix.is_empty()) {
            (false, false) => format!("prefix='{}' AND suffix='{}'", self.prefix, self.suffix),
            (false, true) => format!("prefix='{}'", self.prefix),
            (true, false) => format!("suffix='{}'", self.suffix),
            (true, true) => "all".to_string(),
        }
    }
}

/// Matches when the full name matches a compiled regex.
///
/// The pattern is implicitly anchored: `cluster\..*` matches
/// "cluster.a.total" but not "xcluster.a.total". Construction is the only
/// fallible point.
#[derive(Debug)]
pub struct RegexMatcher {
    pattern: String,
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex =
            Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| ConfigError::InvalidRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
        Ok(RegexMatcher {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl IndexMatcher for RegexMatcher {
    fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    fn describe(&self) -> String {
        format!("regex='{}'", self.pattern)
    }
}

/// Combines child matchers with OR semantics.
///
/// Children are consulted in registration order and the first match wins.
/// An `OrMatcher` with no children matches nothing.
#[derive(Debug)]
pub struct OrMatcher {
    matchers: Vec<Box<dyn IndexMatcher>>,
}

impl OrMatcher {
    pub fn new(matchers: Vec<Box<dyn IndexMatcher>>) -> Self {
        OrMatcher { matchers }
    }

    pub fn matcher_count(&self) -> usize {
        self.matchers.len()
    }
}

impl IndexMatcher for OrMatcher {
    fn matches(&self, name: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(name))
    }

    fn matches_stat_name(&self, name: StatName, symbols: &SymbolTable) -> bool {
        // Fan out to the children's fast paths rather than resolving here.
        self.matchers
            .iter()
            .any(|m| m.matches_stat_name(name, symbols))
    }

    fn describe(&self) -> String {
        let descriptions: Vec<String> = self.matchers.iter().map(|m| m.describe()).collect();
        format!("({})", descriptions.join(" OR "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_suffix_both_empty_matches_everything() {
        let matcher = PrefixSuffixMatcher::new("", "");
        assert!(matcher.matches("anything.at.all"));
        assert!(matcher.matches(""));
        assert_eq!(matcher.describe(), "all");
    }

    #[test]
    fn test_prefix_only() {
        let matcher = PrefixSuffixMatcher::new("cluster.", "");
        assert!(matcher.matches("cluster.a.total"));
        assert!(!matcher.matches("listener.a.total"));
        assert_eq!(matcher.describe(), "prefix='cluster.'");
    }

    #[test]
    fn test_suffix_only() {
        let matcher = PrefixSuffixMatcher::new("", ".active_connections");
        assert!(matcher.matches("cluster.a.active_connections"));
        assert!(!matcher.matches("cluster.a.total_connections"));
        assert_eq!(matcher.describe(), "suffix='.active_connections'");
    }

    #[test]
    fn test_overlapping_prefix_and_suffix() {
        let matcher = PrefixSuffixMatcher::new("abc", "bcd");
        assert!(matcher.matches("abcd"));
        assert!(matcher.matches("abcXbcd"));
        assert!(!matcher.matches("abc"));
        assert!(!matcher.matches("bcd"));
        assert_eq!(matcher.describe(), "prefix='abc' AND suffix='bcd'");
    }

    #[test]
    fn test_regex_matches_full_name_only() {
        let matcher = RegexMatcher::new(r"cluster\..*\.active_connections").unwrap();
        assert!(matcher.matches("cluster.a.active_connections"));
        assert!(!matcher.matches("xcluster.a.active_connections"));
        assert!(!matcher.matches("cluster.a.active_connections.total"));
        assert_eq!(
            matcher.describe(),
            r"regex='cluster\..*\.active_connections'"
        );
    }

    #[test]
    fn test_invalid_regex_is_a_construction_error() {
        let err = RegexMatcher::new("(unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
    }

    #[test]
    fn test_or_with_no_children_matches_nothing() {
        let matcher = OrMatcher::new(Vec::new());
        assert!(!matcher.matches("anything"));
        assert!(!matcher.matches(""));
        assert_eq!(matcher.matcher_count(), 0);
    }

    #[test]
    fn test_or_first_match_wins() {
        let matcher = OrMatcher::new(vec![
            Box::new(PrefixSuffixMatcher::new("cluster.", "")),
            Box::new(PrefixSuffixMatcher::new("", ".total")),
        ]);
        assert!(matcher.matches("cluster.a.anything"));
        assert!(matcher.matches("listener.a.total"));
        assert!(!matcher.matches("listener.a.active"));
    }

    #[test]
    fn test_or_describe_renders_children_in_order() {
        let matcher = OrMatcher::new(vec![
            Box::new(PrefixSuffixMatcher::new("a.", "")),
            Box::new(PrefixSuffixMatcher::new("", ".b")),
        ]);
        assert_eq!(matcher.describe(), "(prefix='a.' OR suffix='.b')");
    }

    #[test]
    fn test_fast_path_agrees_with_string_path() {
        let symbols = SymbolTable::new();
        let hit = symbols.intern("cluster.a.active_connections");
        let miss = symbols.intern("cluster.a.total_connections");

        let matcher = PrefixSuffixMatcher::new("", ".active_connections");
        assert!(matcher.matches_stat_name(hit, &symbols));
        assert!(!matcher.matches_stat_name(miss, &symbols));

        let or = OrMatcher::new(vec![Box::new(PrefixSuffixMatcher::new(
            "",
            ".active_connections",
        ))]);
        assert!(or.matches_stat_name(hit, &symbols));
        assert!(!or.matches_stat_name(miss, &symbols));
    }

    #[test]
    fn test_matches_is_deterministic() {
        let matcher = RegexMatcher::new(r".*\.active").unwrap();
        for _ in 0..3 {
            assert!(matcher.matches("pool.active"));
            assert!(!matcher.matches("pool.total"));
        }
    }
}
