//! Secondary indices over a live metric population
//!
//! With tens of thousands of metrics in a process, every admin query or
//! health check that scans the full population pays O(n). This crate keeps
//! named secondary indices synchronized with metric creation and deletion so
//! those queries become O(k) over the matching subset:
//!
//! ```
//! use std::sync::Arc;
//! use stats_index::{IndexRegistry, PrefixSuffixMatcher, StatsStore, SymbolTable};
//!
//! let registry = Arc::new(IndexRegistry::new());
//! let store = StatsStore::new(Arc::new(SymbolTable::new()), registry.clone());
//!
//! let active = registry.register_gauge_index(
//!     "active_connections",
//!     Box::new(PrefixSuffixMatcher::new("", ".active_connections")),
//! );
//!
//! store.gauge("cluster.a.active_connections").set(100);
//! store.gauge("cluster.b.active_connections").set(200);
//! store.gauge("cluster.a.total_connections").set(1000);
//!
//! assert_eq!(active.count(), 2);
//! assert_eq!(active.sum(), 300);
//! ```
//!
//! Indices hold weak references only: they never extend a metric's lifetime,
//! and a deletion the store failed to announce degrades to a stale handle
//! that iteration detects and prunes.

pub mod index;
pub mod stats;
pub mod symbol;

pub use index::{
    AggregatedStatsIndex, ConfigError, CounterIndex, GaugeIndex, IndexMatcher, IndexRegistry,
    IndexStats, MatcherConfig, MetricAggregationObserver, OrMatcher, PrefixSuffixConfig,
    PrefixSuffixMatcher, RegexMatcher, StatsIndex, StatsIndexConfig, StatsIndexFactory,
    StatsIndicesConfig, StringMatcherConfig,
};
pub use stats::{Counter, Gauge, Metric, MetricKind, MetricSource, StatsStore};
pub use symbol::{StatName, SymbolTable};
