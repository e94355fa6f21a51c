//! Config-driven index construction
//!
//! `StatsIndexFactory` translates declarative configuration into matcher and
//! index instances and bulk-registers them. Two entry points exist for the
//! two deployment moments: `create_indices_from_config` at bootstrap, before
//! any metric is created, and the `_with_existing` variant at runtime, which
//! additionally backfills each new index against the current population.

use crate::index::config::{
    ConfigError, MatcherConfig, PrefixSuffixConfig, StatsIndexConfig, StatsIndicesConfig,
    StringMatcherConfig,
};
use crate::index::matcher::{IndexMatcher, PrefixSuffixMatcher, RegexMatcher};
use crate::index::registry::IndexRegistry;
use crate::stats::{MetricKind, MetricSource};

pub struct StatsIndexFactory;

impl StatsIndexFactory {
    /// Build the matcher declared by an index config.
    pub fn create_matcher(
        config: &StatsIndexConfig,
    ) -> Result<Box<dyn IndexMatcher>, ConfigError> {
        match &config.matcher {
            Some(MatcherConfig::PrefixSuffix(ps)) => Ok(Self::create_prefix_suffix_matcher(ps)),
            Some(MatcherConfig::StringMatcher(sm)) => Self::create_string_matcher(sm),
            None => Err(ConfigError::MatcherNotSet {
                index: config.name.clone(),
            }),
        }
    }

    pub fn create_prefix_suffix_matcher(config: &PrefixSuffixConfig) -> Box<dyn IndexMatcher> {
        Box::new(PrefixSuffixMatcher::new(
            config.prefix.clone(),
            config.suffix.clone(),
        ))
    }

    /// Translate a generic string matcher into an index matcher.
    ///
    /// `exact` and `contains` have no direct matcher kind; both are realized
    /// as regexes over the escaped literal.
    pub fn create_string_matcher(
        config: &StringMatcherConfig,
    ) -> Result<Box<dyn IndexMatcher>, ConfigError> {
        match config {
            StringMatcherConfig::Exact(value) => Ok(Box::new(RegexMatcher::new(&format!(
                "^{}$",
                regex::escape(value)
            ))?)),
            StringMatcherConfig::Prefix(prefix) => {
                Ok(Box::new(PrefixSuffixMatcher::new(prefix.clone(), "")))
            }
            StringMatcherConfig::Suffix(suffix) => {
                Ok(Box::new(PrefixSuffixMatcher::new("", suffix.clone())))
            }
            StringMatcherConfig::Regex(pattern) => Ok(Box::new(RegexMatcher::new(pattern)?)),
            StringMatcherConfig::Contains(value) => Ok(Box::new(RegexMatcher::new(&format!(
                ".*{}.*",
                regex::escape(value)
            ))?)),
        }
    }

    /// Build and register every declared index. Bootstrap path: indices are
    /// created empty and fill up as metrics are created.
    ///
    /// Stops at the first invalid declaration; indices registered before the
    /// failure remain registered, and the caller is expected to treat the
    /// whole config as rejected.
    pub fn create_indices_from_config(
        registry: &IndexRegistry,
        config: &StatsIndicesConfig,
    ) -> Result<(), ConfigError> {
        for index_config in &config.indices {
            let matcher = Self::create_matcher(index_config)?;
            match Self::metric_kind(index_config)? {
                MetricKind::Gauge => {
                    registry.register_gauge_index(index_config.name.as_str(), matcher);
                }
                MetricKind::Counter => {
                    registry.register_counter_index(index_config.name.as_str(), matcher);
                }
            }
        }
        Ok(())
    }

    /// Build and register every declared index, backfilling each against the
    /// source's current population. Runtime path for post-bootstrap
    /// registration.
    pub fn create_indices_from_config_with_existing(
        registry: &IndexRegistry,
        config: &StatsIndicesConfig,
        source: &dyn MetricSource,
    ) -> Result<(), ConfigError> {
        for index_config in &config.indices {
            let matcher = Self::create_matcher(index_config)?;
            match Self::metric_kind(index_config)? {
                MetricKind::Gauge => {
                    registry.register_gauge_index_with_existing(
                        index_config.name.as_str(),
                        matcher,
                        source,
                    );
                }
                MetricKind::Counter => {
                    registry.register_counter_index_with_existing(
                        index_config.name.as_str(),
                        matcher,
                        source,
                    );
                }
            }
        }
        Ok(())
    }

    fn metric_kind(config: &StatsIndexConfig) -> Result<MetricKind, ConfigError> {
        config
            .metric_type
            .ok_or_else(|| ConfigError::MetricTypeUnspecified {
                index: config.name.clone(),
            })
    }
}
