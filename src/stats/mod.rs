//! Metric primitives and the store boundary
//!
//! This module holds the pieces the indexing engine shares with the rest of
//! the host system:
//!
//! - **`Metric`** - the read-only view an index needs of any metric
//! - **`Counter` / `Gauge`** - atomic metric implementations
//! - **`MetricSource`** - enumeration over the existing population, used by
//!   the backfill registration path
//! - **`StatsStore`** - a minimal owning store wired to an `IndexRegistry`,
//!   driving the creation/deletion lifecycle hooks

mod store;
mod types;

pub use store::{MetricSource, StatsStore};
pub use types::{Counter, Gauge, Metric, MetricKind};
