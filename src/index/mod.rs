//! Secondary indices over the metric population
//!
//! In a process with tens of thousands of live metrics, answering "sum all
//! gauges ending in `.active_connections`" by scanning the whole population
//! is an O(n) cost paid on every query. An index pays the membership cost
//! once, at metric creation, and turns each query into O(k) over the
//! matching subset:
//!
//! - **`IndexMatcher`** - immutable name predicates (prefix/suffix, regex, OR)
//! - **`StatsIndex`** - a thread-safe named set of weak metric references
//! - **`AggregatedStatsIndex`** - sum/min/max/average/fold over the members
//! - **`IndexRegistry`** - owns all named indices, partitioned by metric
//!   kind, and fans out the store's creation/deletion notifications
//! - **`StatsIndexFactory`** - builds matchers and indices from declarative
//!   configuration

mod aggregated;
mod config;
mod factory;
mod matcher;
mod observer;
mod registry;
mod stats_index;

pub use aggregated::{AggregatedStatsIndex, IndexStats};
pub use config::{
    ConfigError, MatcherConfig, PrefixSuffixConfig, StatsIndexConfig, StatsIndicesConfig,
    StringMatcherConfig,
};
pub use factory::StatsIndexFactory;
pub use matcher::{IndexMatcher, OrMatcher, PrefixSuffixMatcher, RegexMatcher};
pub use observer::MetricAggregationObserver;
pub use registry::{CounterIndex, GaugeIndex, IndexRegistry};
pub use stats_index::StatsIndex;
