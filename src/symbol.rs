//! Interned metric names
//!
//! Metric names are long dotted strings ("cluster.a.upstream.active_connections")
//! that get compared on every index fan-out. `SymbolTable` interns each distinct
//! name once and hands out a copyable `StatName` id; matchers accept the id on
//! their fast path and only resolve back to a string when a substring comparison
//! is unavoidable.

use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Opaque id of an interned metric name.
///
/// Ids are only meaningful relative to the `SymbolTable` that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatName(u32);

/// Thread-safe, append-only name interner.
///
/// Interning the same string twice returns the same id. Names are never
/// removed; the table is expected to live as long as the process.
#[derive(Default)]
pub struct SymbolTable {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    ids: HashMap<String, u32, RandomState>,
    names: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name, returning the existing id if it is already present.
    pub fn intern(&self, name: &str) -> StatName {
        if let Some(&id) = self.inner.read().ids.get(name) {
            return StatName(id);
        }
        let mut inner = self.inner.write();
        // Re-check: another thread may have interned between the read and
        // write lock acquisitions.
        if let Some(&id) = inner.ids.get(name) {
            return StatName(id);
        }
        let id = u32::try_from(inner.names.len()).unwrap_or_else(|_| {
            panic!("symbol table overflow interning '{}'", name);
        });
        inner.names.push(name.to_string());
        inner.ids.insert(name.to_string(), id);
        StatName(id)
    }

    /// Resolve an id back to the full name.
    ///
    /// Panics if the id came from a different table.
    pub fn resolve(&self, name: StatName) -> String {
        self.inner.read().names[name.0 as usize].clone()
    }

    /// Number of distinct interned names.
    pub fn len(&self) -> usize {
        self.inner.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().names.is_empty()
    }
}
