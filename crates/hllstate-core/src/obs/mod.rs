//! Observability: thread-local lifecycle and memory-policy counters behind a
//! sink abstraction.
//!
//! Nothing here changes state or governor behavior; events are advisory.

pub(crate) mod metrics;
pub(crate) mod sink;

#[cfg(test)]
mod tests;

// re-exports
pub use metrics::{EventReport, EventState, GovernorCounters, MemoryCounters, StateCounters};
pub use sink::{
    DecisionKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
