//! Declarative index configuration
//!
//! The config surface mirrors what a hosting system would carry in its
//! bootstrap file. Both JSON and TOML bindings are supported:
//!
//! ```toml
//! [[indices]]
//! name = "active_connections"
//! metric_type = "GAUGE"
//! [indices.matcher.prefix_suffix]
//! suffix = ".active_connections"
//! ```
//!
//! Validation that cannot be expressed in the schema (unset matcher, unset
//! metric type) happens in the factory, so a freshly deserialized config may
//! still be rejected at index-construction time.

use serde::{Deserialize, Serialize};

use crate::stats::MetricKind;

/// Top-level configuration: a list of index declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsIndicesConfig {
    #[serde(default)]
    pub indices: Vec<StatsIndexConfig>,
}

impl StatsIndicesConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// One named index declaration.
///
/// `metric_type` and `matcher` are optional at the schema level but required
/// by the factory; leaving either unset is a configuration error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsIndexConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<MetricKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<MatcherConfig>,
}

/// Matcher declaration: either a direct prefix/suffix pair or one of the
/// generic string-matcher forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherConfig {
    PrefixSuffix(PrefixSuffixConfig),
    StringMatcher(StringMatcherConfig),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefixSuffixConfig {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

/// Generic string matcher, translated by the factory: `exact` becomes an
/// anchored regex, `contains` a wildcard-wrapped regex, the rest map onto
/// the corresponding matcher kind directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringMatcherConfig {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Regex(String),
    Contains(String),
}

/// Configuration errors, surfaced synchronously at construction time.
///
/// These are recoverable: a bootstrap or reload path rejects the offending
/// config and keeps running. Contract violations (duplicate index names) are
/// not represented here; those panic.
#[derive(Debug)]
pub enum ConfigError {
    /// Regex pattern failed to compile.
    InvalidRegex { pattern: String, message: String },
    /// An index declaration carries no matcher.
    MatcherNotSet { index: String },
    /// An index declaration carries no metric type.
    MetricTypeUnspecified { index: String },
    /// The raw config text failed to deserialize.
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidRegex { pattern, message } => {
                write!(f, "invalid regex '{}': {}", pattern, message)
            }
            ConfigError::MatcherNotSet { index } => {
                write!(f, "index '{}' has no matcher configured", index)
            }
            ConfigError::MetricTypeUnspecified { index } => {
                write!(f, "index '{}' has unspecified metric_type", index)
            }
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
