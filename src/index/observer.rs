//! Extension point for O(1) aggregation
//!
//! The aggregation layer currently folds over the k members of an index on
//! every query. If a deployment's query rate ever dominates its mutation
//! rate, the trade can be reversed: register an observer with every member
//! metric's update path and maintain running totals, paying O(1) per
//! mutation for O(1) per query.
//!
//! The trait is defined but nothing wires it up. An index adopting it must
//! register itself with each metric on `try_add` and deregister on `remove`,
//! and synchronize its running-total state against the metric update path.

/// Observer of metric value changes.
///
/// Implementations must be thread-safe; notifications may arrive from any
/// thread mutating a metric.
pub trait MetricAggregationObserver: Send + Sync {
    /// A counter or gauge was incremented by `delta`.
    fn notify_increment(&self, delta: u64);

    /// A gauge was decremented by `delta`.
    fn notify_decrement(&self, delta: u64);

    /// A gauge value was set directly.
    fn notify_set(&self, old_value: u64, new_value: u64);

    /// A counter was latched, or a gauge subtraction reached zero.
    fn notify_reset(&self, old_value: u64);

    /// A metric joined the aggregation; `initial_value` is its value at the
    /// time of the add.
    fn notify_added(&self, initial_value: u64);

    /// A metric left the aggregation; `final_value` is its value at the time
    /// of the remove.
    fn notify_removed(&self, final_value: u64);
}
