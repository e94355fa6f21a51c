//! Named index registry
//!
//! The registry owns every live index, partitioned by metric kind. Gauge and
//! counter indices are independent namespaces: the same name may exist in
//! both, but registering a duplicate within one partition is a programming
//! bug and panics.
//!
//! Locking: the registry's mutex guards only the name-to-index maps. A
//! lifecycle fan-out snapshots the partition under that mutex, releases it,
//! then takes each index's own lock in turn. Two indices can therefore be
//! updated concurrently by different notification threads, and no lock is
//! ever held across a call into another index.

use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::index::aggregated::AggregatedStatsIndex;
use crate::index::matcher::IndexMatcher;
use crate::stats::{Counter, Gauge, MetricSource};

pub type GaugeIndex = AggregatedStatsIndex<Gauge>;
pub type CounterIndex = AggregatedStatsIndex<Counter>;

/// Owner of all named indices, synchronized with the store's lifecycle.
///
/// One long-lived instance per process, constructed at startup and threaded
/// through as an `Arc` rather than held in a global.
#[derive(Default)]
pub struct IndexRegistry {
    gauge_indices: Mutex<HashMap<String, Arc<GaugeIndex>, RandomState>>,
    counter_indices: Mutex<HashMap<String, Arc<CounterIndex>, RandomState>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty gauge index.
    ///
    /// Panics if a gauge index with this name already exists; index names
    /// are statically known at configuration time, so a duplicate is a bug,
    /// not a runtime condition.
    pub fn register_gauge_index(
        &self,
        name: impl Into<String>,
        matcher: Box<dyn IndexMatcher>,
    ) -> Arc<GaugeIndex> {
        let name = name.into();
        let mut indices = self.gauge_indices.lock();
        if indices.contains_key(&name) {
            panic!("gauge index '{}' already exists", name);
        }
        let index = Arc::new(AggregatedStatsIndex::new(name.clone(), matcher));
        indices.insert(name.clone(), index.clone());
        info!(index = %name, matcher = %index.matcher().describe(), "registered gauge index");
        index
    }

    /// Register a gauge index and backfill it from the current population.
    ///
    /// For indices registered after metrics already exist, e.g. on a config
    /// reload.
    pub fn register_gauge_index_with_existing(
        &self,
        name: impl Into<String>,
        matcher: Box<dyn IndexMatcher>,
        source: &dyn MetricSource,
    ) -> Arc<GaugeIndex> {
        let index = self.register_gauge_index(name, matcher);
        source.for_each_gauge(&mut |gauge| {
            index.try_add(gauge);
        });
        index
    }

    /// Register an empty counter index.
    ///
    /// Panics on a duplicate name within the counter partition.
    pub fn register_counter_index(
        &self,
        name: impl Into<String>,
        matcher: Box<dyn IndexMatcher>,
    ) -> Arc<CounterIndex> {
        let name = name.into();
        let mut indices = self.counter_indices.lock();
        if indices.contains_key(&name) {
            panic!("counter index '{}' already exists", name);
        }
        let index = Arc::new(AggregatedStatsIndex::new(name.clone(), matcher));
        indices.insert(name.clone(), index.clone());
        info!(index = %name, matcher = %index.matcher().describe(), "registered counter index");
        index
    }

    /// Register a counter index and backfill it from the current population.
    pub fn register_counter_index_with_existing(
        &self,
        name: impl Into<String>,
        matcher: Box<dyn IndexMatcher>,
        source: &dyn MetricSource,
    ) -> Arc<CounterIndex> {
        let index = self.register_counter_index(name, matcher);
        source.for_each_counter(&mut |counter| {
            index.try_add(counter);
        });
        index
    }

    /// Look up a gauge index by name.
    pub fn gauge_index(&self, name: &str) -> Option<Arc<GaugeIndex>> {
        self.gauge_indices.lock().get(name).cloned()
    }

    /// Look up a counter index by name.
    pub fn counter_index(&self, name: &str) -> Option<Arc<CounterIndex>> {
        self.counter_indices.lock().get(name).cloned()
    }

    /// Remove a gauge index; returns whether one was present.
    pub fn remove_gauge_index(&self, name: &str) -> bool {
        let removed = self.gauge_indices.lock().remove(name).is_some();
        if removed {
            info!(index = name, "removed gauge index");
        }
        removed
    }

    /// Remove a counter index; returns whether one was present.
    pub fn remove_counter_index(&self, name: &str) -> bool {
        let removed = self.counter_indices.lock().remove(name).is_some();
        if removed {
            info!(index = name, "removed counter index");
        }
        removed
    }

    /// Offer a newly created gauge to every gauge index.
    ///
    /// No short-circuit: a metric may belong to several indices.
    pub fn on_gauge_created(&self, gauge: &Arc<Gauge>) {
        for index in self.gauge_partition() {
            index.try_add(gauge);
        }
    }

    /// Offer a newly created counter to every counter index.
    pub fn on_counter_created(&self, counter: &Arc<Counter>) {
        for index in self.counter_partition() {
            index.try_add(counter);
        }
    }

    /// Remove a gauge being deleted from every gauge index.
    pub fn on_gauge_deleted(&self, gauge: &Gauge) {
        for index in self.gauge_partition() {
            index.remove(gauge);
        }
    }

    /// Remove a counter being deleted from every counter index.
    pub fn on_counter_deleted(&self, counter: &Counter) {
        for index in self.counter_partition() {
            index.remove(counter);
        }
    }

    pub fn gauge_index_count(&self) -> usize {
        self.gauge_indices.lock().len()
    }

    pub fn counter_index_count(&self) -> usize {
        self.counter_indices.lock().len()
    }

    /// Visit every `(name, index)` pair of the gauge partition under the
    /// registry lock. Returning false from the callback stops early.
    pub fn for_each_gauge_index(&self, mut f: impl FnMut(&str, &Arc<GaugeIndex>) -> bool) {
        let indices = self.gauge_indices.lock();
        for (name, index) in indices.iter() {
            if !f(name, index) {
                return;
            }
        }
    }

    /// Counter-partition twin of [`for_each_gauge_index`].
    ///
    /// [`for_each_gauge_index`]: IndexRegistry::for_each_gauge_index
    pub fn for_each_counter_index(&self, mut f: impl FnMut(&str, &Arc<CounterIndex>) -> bool) {
        let indices = self.counter_indices.lock();
        for (name, index) in indices.iter() {
            if !f(name, index) {
                return;
            }
        }
    }

    // Snapshot a partition so fan-out takes each index's lock with the
    // registry lock already released.
    fn gauge_partition(&self) -> Vec<Arc<GaugeIndex>> {
        self.gauge_indices.lock().values().cloned().collect()
    }

    fn counter_partition(&self) -> Vec<Arc<CounterIndex>> {
        self.counter_indices.lock().values().cloned().collect()
    }
}
