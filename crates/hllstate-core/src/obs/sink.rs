//! Metrics sink boundary.
//!
//! State and governor logic MUST NOT touch obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::{obs::metrics, state::StateKind};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// DecisionKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecisionKind {
    Continue,
    Spill,
    LimitExceeded,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    StateCreated {
        kind: StateKind,
    },
    CapacityGrown {
        from: u64,
        to: u64,
    },
    SetRejected {
        kind: StateKind,
    },
    MemoryCharged {
        kind: StateKind,
        bytes: u64,
    },
    GovernorDecision {
        decision: DecisionKind,
        estimated_bytes: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into the metrics counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::StateCreated { kind } => metrics::with_state_mut(|m| match kind {
                StateKind::Single => {
                    m.states.single_created = m.states.single_created.saturating_add(1);
                }
                StateKind::Grouped => {
                    m.states.grouped_created = m.states.grouped_created.saturating_add(1);
                }
            }),

            MetricsEvent::CapacityGrown { to, .. } => metrics::with_state_mut(|m| {
                m.states.capacity_grows = m.states.capacity_grows.saturating_add(1);
                metrics::raise_max(&mut m.states.max_capacity, to);
            }),

            MetricsEvent::SetRejected { .. } => metrics::with_state_mut(|m| {
                m.states.rejected_sets = m.states.rejected_sets.saturating_add(1);
            }),

            MetricsEvent::MemoryCharged { kind, bytes } => metrics::with_state_mut(|m| {
                m.memory.charge_calls = m.memory.charge_calls.saturating_add(1);
                match kind {
                    StateKind::Single => {
                        m.memory.ignored_charges = m.memory.ignored_charges.saturating_add(1);
                    }
                    StateKind::Grouped => {
                        m.memory.charged_bytes = m.memory.charged_bytes.saturating_add(bytes);
                    }
                }
            }),

            MetricsEvent::GovernorDecision {
                decision,
                estimated_bytes,
            } => metrics::with_state_mut(|m| {
                m.governor.checks = m.governor.checks.saturating_add(1);
                metrics::raise_max(&mut m.governor.max_observed_bytes, estimated_bytes);
                match decision {
                    DecisionKind::Continue => {}
                    DecisionKind::Spill => {
                        m.governor.spills = m.governor.spills.saturating_add(1);
                    }
                    DecisionKind::LimitExceeded => {
                        m.governor.limit_exceeded = m.governor.limit_exceeded.saturating_add(1);
                    }
                }
            }),
        }
    }
}

/// Record one event through the scoped override, or the global sink.
pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY: the pointer was installed by `with_metrics_sink` and is only
        // live for the synchronous extent of that call.
        unsafe { (*ptr).record(event) };
    } else {
        GlobalMetricsSink.record(event);
    }
}

/// Snapshot of this thread's counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset this thread's counters.
pub fn metrics_reset_all() {
    metrics::reset();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for the dynamic scope of `f`.
    // - `Guard` restores the previous slot on every exit, including unwind.
    // - `record` dereferences synchronously and never stores the pointer.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}
