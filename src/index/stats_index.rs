//! Thread-safe index container
//!
//! A `StatsIndex` is a named set of weak references to metrics accepted by
//! one matcher. Membership is decided once, at `try_add` time; names are
//! immutable after creation so no re-validation happens on queries.
//!
//! The member set holds `Weak<T>` keyed by metric name rather than raw
//! references: the index never extends a metric's lifetime, and a deletion
//! hook the caller forgot to fire degrades to a stale handle that iteration
//! detects and prunes instead of a dangling access.

use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use crate::index::matcher::IndexMatcher;
use crate::stats::Metric;
use crate::symbol::SymbolTable;

/// A secondary index over a subset of the metric population.
///
/// All operations are thread-safe under one internal mutex per index.
/// `for_each` runs its callback with that mutex held, so callbacks must be
/// cheap, must not block, and must not call back into the same index (the
/// mutex is not reentrant).
pub struct StatsIndex<T: Metric> {
    name: String,
    matcher: Box<dyn IndexMatcher>,
    members: Mutex<HashMap<String, Weak<T>, RandomState>>,
}

impl<T: Metric> StatsIndex<T> {
    /// Create an empty index.
    ///
    /// `name` identifies the index within its owning registry partition;
    /// `matcher` decides membership for the index's whole lifetime.
    pub fn new(name: impl Into<String>, matcher: Box<dyn IndexMatcher>) -> Self {
        StatsIndex {
            name: name.into(),
            matcher,
            members: Mutex::new(HashMap::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matcher(&self) -> &dyn IndexMatcher {
        self.matcher.as_ref()
    }

    /// Add the metric if the matcher accepts its name.
    ///
    /// Returns whether the name matched, not whether the insert was new:
    /// adding an already-present metric is an idempotent success.
    pub fn try_add(&self, metric: &Arc<T>) -> bool {
        if !self.matcher.matches(metric.name()) {
            return false;
        }
        self.insert(metric);
        true
    }

    /// `try_add` via the matcher's interned-name fast path.
    pub fn try_add_with_stat_name(&self, metric: &Arc<T>, symbols: &SymbolTable) -> bool {
        if !self.matcher.matches_stat_name(metric.stat_name(), symbols) {
            return false;
        }
        self.insert(metric);
        true
    }

    fn insert(&self, metric: &Arc<T>) {
        let mut members = self.members.lock();
        members.insert(metric.name().to_string(), Arc::downgrade(metric));
        debug!(index = %self.name, metric = metric.name(), "metric indexed");
    }

    /// Remove the metric. Removing an absent metric is a no-op.
    pub fn remove(&self, metric: &T) {
        self.members.lock().remove(metric.name());
    }

    /// Number of members, O(1).
    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Point-in-time copy of the member set.
    ///
    /// Stale handles are skipped. Prefer [`for_each`] where the allocation
    /// matters.
    ///
    /// [`for_each`]: StatsIndex::for_each
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.members
            .lock()
            .values()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// Visit every member under the index lock.
    ///
    /// Returns false if the callback stopped iteration early, true if all
    /// members were visited. Stale handles encountered along the way are
    /// pruned before returning.
    pub fn for_each(&self, mut f: impl FnMut(&T) -> bool) -> bool {
        let mut members = self.members.lock();
        let mut stale: Vec<String> = Vec::new();
        let mut completed = true;
        for (name, weak) in members.iter() {
            match weak.upgrade() {
                Some(metric) => {
                    if !f(metric.as_ref()) {
                        completed = false;
                        break;
                    }
                }
                None => stale.push(name.clone()),
            }
        }
        if !stale.is_empty() {
            warn!(
                index = %self.name,
                pruned = stale.len(),
                "removed stale metric handles; deletion hook was not fired"
            );
            for name in &stale {
                members.remove(name);
            }
        }
        completed
    }

    /// Remove all members.
    pub fn clear(&self) {
        self.members.lock().clear();
    }
}
