//! Owning metric store wired to the index registry
//!
//! `StatsStore` is the minimal collaborator the indexing engine needs on the
//! other side of its boundary: it owns the `Arc<Counter>` / `Arc<Gauge>`
//! population, fires the registry's lifecycle hooks synchronously on
//! creation and deletion, and implements `MetricSource` so indices
//! registered late can backfill against the current population.

use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::index::IndexRegistry;
use crate::stats::{Counter, Gauge};
use crate::symbol::SymbolTable;

/// Enumeration over an existing metric population.
///
/// This is the backfill boundary: `IndexRegistry` uses it to populate an
/// index registered after metrics already exist.
pub trait MetricSource {
    fn for_each_counter(&self, f: &mut dyn FnMut(&Arc<Counter>));
    fn for_each_gauge(&self, f: &mut dyn FnMut(&Arc<Gauge>));
}

/// A store owning counters and gauges by name.
///
/// Metrics are created on first access and removed explicitly. The attached
/// `IndexRegistry` is notified synchronously on both paths, on whichever
/// thread performs the mutation; deletion is announced before the store's
/// strong reference is dropped.
pub struct StatsStore {
    symbols: Arc<SymbolTable>,
    registry: Arc<IndexRegistry>,
    counters: Mutex<HashMap<String, Arc<Counter>, RandomState>>,
    gauges: Mutex<HashMap<String, Arc<Gauge>, RandomState>>,
}

impl StatsStore {
    pub fn new(symbols: Arc<SymbolTable>, registry: Arc<IndexRegistry>) -> Self {
        StatsStore {
            symbols,
            registry,
            counters: Mutex::new(HashMap::default()),
            gauges: Mutex::new(HashMap::default()),
        }
    }

    pub fn symbols(&self) -> &Arc<SymbolTable> {
        &self.symbols
    }

    pub fn registry(&self) -> &Arc<IndexRegistry> {
        &self.registry
    }

    /// Get or create a counter.
    ///
    /// Creation fires `on_counter_created` after the store lock is released,
    /// so the registry fan-out never nests inside the store's map lock.
    pub fn counter(&self, name: &str) -> Arc<Counter> {
        let (counter, created) = {
            let mut counters = self.counters.lock();
            match counters.get(name) {
                Some(existing) => (existing.clone(), false),
                None => {
                    let counter = Arc::new(Counter::new(name, self.symbols.intern(name)));
                    counters.insert(name.to_string(), counter.clone());
                    (counter, true)
                }
            }
        };
        if created {
            debug!(metric = name, "counter created");
            self.registry.on_counter_created(&counter);
        }
        counter
    }

    /// Get or create a gauge.
    pub fn gauge(&self, name: &str) -> Arc<Gauge> {
        let (gauge, created) = {
            let mut gauges = self.gauges.lock();
            match gauges.get(name) {
                Some(existing) => (existing.clone(), false),
                None => {
                    let gauge = Arc::new(Gauge::new(name, self.symbols.intern(name)));
                    gauges.insert(name.to_string(), gauge.clone());
                    (gauge, true)
                }
            }
        };
        if created {
            debug!(metric = name, "gauge created");
            self.registry.on_gauge_created(&gauge);
        }
        gauge
    }

    /// Remove a counter, notifying indices before the reference is dropped.
    pub fn remove_counter(&self, name: &str) -> bool {
        let removed = self.counters.lock().remove(name);
        match removed {
            Some(counter) => {
                self.registry.on_counter_deleted(&counter);
                true
            }
            None => false,
        }
    }

    /// Remove a gauge, notifying indices before the reference is dropped.
    pub fn remove_gauge(&self, name: &str) -> bool {
        let removed = self.gauges.lock().remove(name);
        match removed {
            Some(gauge) => {
                self.registry.on_gauge_deleted(&gauge);
                true
            }
            None => false,
        }
    }

    pub fn counter_count(&self) -> usize {
        self.counters.lock().len()
    }

    pub fn gauge_count(&self) -> usize {
        self.gauges.lock().len()
    }
}

impl MetricSource for StatsStore {
    fn for_each_counter(&self, f: &mut dyn FnMut(&Arc<Counter>)) {
        // Snapshot so the callback runs without the store lock held.
        let counters: Vec<Arc<Counter>> = self.counters.lock().values().cloned().collect();
        for counter in &counters {
            f(counter);
        }
    }

    fn for_each_gauge(&self, f: &mut dyn FnMut(&Arc<Gauge>)) {
        let gauges: Vec<Arc<Gauge>> = self.gauges.lock().values().cloned().collect();
        for gauge in &gauges {
            f(gauge);
        }
    }
}
