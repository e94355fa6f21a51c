//! Core metric types
//!
//! Counters are monotonically increasing accumulators; gauges hold an
//! arbitrary current value. Both are backed by an `AtomicU64` so a single
//! read is always atomic, but no snapshot isolation exists across metrics:
//! an aggregation over many metrics observes each value live at read time.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::symbol::StatName;

/// Kind of metric being indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricKind {
    /// Monotonically increasing counter
    /// Use for: request counts, error counts
    Counter,

    /// Point-in-time value
    /// Use for: active connections, queue depth, memory usage
    Gauge,
}

/// Read-only view of a metric, as seen by an index.
///
/// The indexing engine never owns a metric; it holds weak references to
/// objects owned elsewhere. Names are immutable after creation and unique
/// within a metric kind.
pub trait Metric: Send + Sync {
    /// Full dotted metric name (e.g. "cluster.a.active_connections").
    fn name(&self) -> &str;

    /// Interned form of the name, for fast-path matching.
    fn stat_name(&self) -> StatName;

    /// Current numeric reading. A single call is atomic.
    fn value(&self) -> u64;
}

/// Monotonically increasing counter.
pub struct Counter {
    name: String,
    stat_name: StatName,
    value: AtomicU64,
}

impl Counter {
    pub fn new(name: impl Into<String>, stat_name: StatName) -> Self {
        Counter {
            name: name.into(),
            stat_name,
            value: AtomicU64::new(0),
        }
    }

    /// Increment by one.
    pub fn inc(&self) {
        self.add(1);
    }

    /// Increment by `delta`.
    pub fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    /// Read the accumulated value and reset it to zero.
    ///
    /// Used by periodic flush paths that report deltas per interval.
    pub fn latch(&self) -> u64 {
        self.value.swap(0, Ordering::Relaxed)
    }
}

impl Metric for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn stat_name(&self) -> StatName {
        self.stat_name
    }

    fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauge holding an arbitrary current value.
pub struct Gauge {
    name: String,
    stat_name: StatName,
    value: AtomicU64,
}

impl Gauge {
    pub fn new(name: impl Into<String>, stat_name: StatName) -> Self {
        Gauge {
            name: name.into(),
            stat_name,
            value: AtomicU64::new(0),
        }
    }

    /// Set the value directly.
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Increase by `delta`.
    pub fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    /// Decrease by `delta`, saturating at zero.
    pub fn sub(&self, delta: u64) {
        let mut current = self.value.load(Ordering::Relaxed);
        loop {
            let next = current.saturating_sub(delta);
            match self.value.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }
}

impl Metric for Gauge {
    fn name(&self) -> &str {
        &self.name
    }

    fn stat_name(&self) -> StatName {
        self.stat_name
    }

    fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}
