//! Numeric reductions over an index
//!
//! `AggregatedStatsIndex` decorates a `StatsIndex` with on-demand
//! reductions. Nothing is cached: every call folds over the current member
//! set and reads each metric's live value, so two calls separated by metric
//! updates can legitimately differ. `count()` is the only O(1) accessor;
//! everything else is O(k) over the k members.
//!
//! If query frequency ever dominates mutation frequency, the
//! `MetricAggregationObserver` extension point can replace these folds with
//! incrementally maintained running totals.

use std::ops::Deref;

use crate::index::matcher::IndexMatcher;
use crate::index::stats_index::StatsIndex;
use crate::stats::Metric;

/// Result of a single-pass multi-reduction. See
/// [`AggregatedStatsIndex::compute_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub sum: u64,
    pub min: u64,
    pub max: u64,
    pub count: usize,
}

/// A `StatsIndex` with built-in numeric reductions.
///
/// Derefs to the underlying index, so all membership operations
/// (`try_add`, `remove`, `for_each`, ...) are available directly.
pub struct AggregatedStatsIndex<T: Metric> {
    inner: StatsIndex<T>,
}

impl<T: Metric> AggregatedStatsIndex<T> {
    pub fn new(name: impl Into<String>, matcher: Box<dyn IndexMatcher>) -> Self {
        AggregatedStatsIndex {
            inner: StatsIndex::new(name, matcher),
        }
    }

    /// Sum of all member values. 0 for an empty index.
    pub fn sum(&self) -> u64 {
        let mut total: u64 = 0;
        self.inner.for_each(|metric| {
            total += metric.value();
            true
        });
        total
    }

    /// Number of members. O(1); delegates to the set size.
    pub fn count(&self) -> usize {
        self.inner.len()
    }

    /// Mean of all member values. 0.0 for an empty index.
    pub fn average(&self) -> f64 {
        let n = self.inner.len();
        if n == 0 {
            return 0.0;
        }
        self.sum() as f64 / n as f64
    }

    /// Minimum member value. `u64::MAX` for an empty index ("no data"
    /// sentinel, not a real minimum).
    pub fn min(&self) -> u64 {
        let mut result = u64::MAX;
        self.inner.for_each(|metric| {
            result = result.min(metric.value());
            true
        });
        result
    }

    /// Maximum member value. 0 for an empty index.
    pub fn max(&self) -> u64 {
        let mut result: u64 = 0;
        self.inner.for_each(|metric| {
            result = result.max(metric.value());
            true
        });
        result
    }

    /// Generic single-pass fold over member values.
    pub fn aggregate<A, F>(&self, initial: A, mut f: F) -> A
    where
        F: FnMut(A, u64) -> A,
    {
        let mut acc = Some(initial);
        self.inner.for_each(|metric| {
            if let Some(current) = acc.take() {
                acc = Some(f(current, metric.value()));
            }
            true
        });
        acc.expect("fold accumulator always restored")
    }

    /// Compute sum, min, max and count in one pass.
    ///
    /// For an empty index `min` is reported as 0 here, unlike the standalone
    /// [`min`] which reports the `u64::MAX` sentinel. Callers of the combined
    /// form depend on the 0; the asymmetry is kept as-is.
    ///
    /// [`min`]: AggregatedStatsIndex::min
    pub fn compute_stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            sum: 0,
            min: u64::MAX,
            max: 0,
            count: 0,
        };
        self.inner.for_each(|metric| {
            let value = metric.value();
            stats.sum += value;
            stats.min = stats.min.min(value);
            stats.max = stats.max.max(value);
            stats.count += 1;
            true
        });
        if stats.count == 0 {
            stats.min = 0;
        }
        stats
    }
}

impl<T: Metric> Deref for AggregatedStatsIndex<T> {
    type Target = StatsIndex<T>;

    fn deref(&self) -> &StatsIndex<T> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::matcher::PrefixSuffixMatcher;
    use crate::stats::Gauge;
    use crate::symbol::SymbolTable;
    use std::sync::Arc;

    fn gauge(symbols: &SymbolTable, name: &str, value: u64) -> Arc<Gauge> {
        let g = Arc::new(Gauge::new(name, symbols.intern(name)));
        g.set(value);
        g
    }

    fn index_matching_all() -> AggregatedStatsIndex<Gauge> {
        AggregatedStatsIndex::new("all", Box::new(PrefixSuffixMatcher::new("", "")))
    }

    #[test]
    fn test_empty_index_sentinels() {
        let index = index_matching_all();
        assert_eq!(index.sum(), 0);
        assert_eq!(index.count(), 0);
        assert_eq!(index.average(), 0.0);
        assert_eq!(index.max(), 0);
        assert_eq!(index.min(), u64::MAX);
    }

    #[test]
    fn test_compute_stats_empty_reports_min_zero() {
        let index = index_matching_all();
        let stats = index.compute_stats();
        assert_eq!(
            stats,
            IndexStats {
                sum: 0,
                min: 0,
                max: 0,
                count: 0
            }
        );
    }

    #[test]
    fn test_reductions_over_members() {
        let symbols = SymbolTable::new();
        let index = index_matching_all();
        index.try_add(&gauge(&symbols, "a", 100));
        index.try_add(&gauge(&symbols, "b", 200));
        index.try_add(&gauge(&symbols, "c", 50));

        assert_eq!(index.sum(), 350);
        assert_eq!(index.count(), 3);
        assert_eq!(index.min(), 50);
        assert_eq!(index.max(), 200);
        assert!((index.average() - 350.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_values_are_read_live() {
        let symbols = SymbolTable::new();
        let index = index_matching_all();
        let a = gauge(&symbols, "a", 100);
        let b = gauge(&symbols, "b", 200);
        let c = gauge(&symbols, "c", 50);
        index.try_add(&a);
        index.try_add(&b);
        index.try_add(&c);
        assert_eq!(index.sum(), 350);

        // Mutate without re-adding: the next sum reflects the net delta.
        a.add(50);
        b.sub(25);
        assert_eq!(index.sum(), 375);
    }

    #[test]
    fn test_aggregate_custom_fold() {
        let symbols = SymbolTable::new();
        let index = index_matching_all();
        index.try_add(&gauge(&symbols, "a", 3));
        index.try_add(&gauge(&symbols, "b", 4));

        let sum_of_squares = index.aggregate(0u64, |acc, v| acc + v * v);
        assert_eq!(sum_of_squares, 25);

        let count = index.aggregate(0usize, |acc, _| acc + 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_compute_stats_single_pass() {
        let symbols = SymbolTable::new();
        let index = index_matching_all();
        index.try_add(&gauge(&symbols, "a", 100));
        index.try_add(&gauge(&symbols, "b", 200));
        index.try_add(&gauge(&symbols, "c", 50));

        let stats = index.compute_stats();
        assert_eq!(stats.sum, 350);
        assert_eq!(stats.min, 50);
        assert_eq!(stats.max, 200);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_membership_operations_available_via_deref() {
        let symbols = SymbolTable::new();
        let index = index_matching_all();
        let g = gauge(&symbols, "a", 1);
        index.try_add(&g);
        assert_eq!(index.len(), 1);
        index.remove(&g);
        assert!(index.is_empty());
    }
}
