use crate::{
    obs::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink},
    sketch::DenseHll,
    state::{
        GroupedAccumulatorState, HyperLogLogState, HyperLogLogStateFactory, StateFactory,
        StateKind,
    },
};
use std::cell::RefCell;

#[derive(Default)]
struct CapturingSink {
    events: RefCell<Vec<MetricsEvent>>,
}

impl MetricsSink for CapturingSink {
    fn record(&self, event: MetricsEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[test]
fn scoped_sink_captures_events_and_bypasses_global_counters() {
    metrics_reset_all();
    let sink = CapturingSink::default();
    let factory = HyperLogLogStateFactory::<DenseHll>::new();

    with_metrics_sink(&sink, || {
        let mut state = factory.create_grouped_state();
        state.ensure_capacity(4);
        state.add_memory_usage(64);
    });

    let events = sink.events.borrow();
    assert_eq!(
        events.first(),
        Some(&MetricsEvent::StateCreated {
            kind: StateKind::Grouped
        })
    );
    assert!(events.contains(&MetricsEvent::CapacityGrown { from: 0, to: 4 }));
    assert!(events.contains(&MetricsEvent::MemoryCharged {
        kind: StateKind::Grouped,
        bytes: 64,
    }));
    assert_eq!(metrics_report().counters.states.grouped_created, 0);
}

#[test]
fn global_counters_accumulate_and_reset() {
    metrics_reset_all();
    let factory = HyperLogLogStateFactory::<DenseHll>::new();

    let mut single = factory.create_single_state();
    single.add_memory_usage(10);
    let mut grouped = factory.create_grouped_state();
    grouped.ensure_capacity(1);
    grouped.ensure_capacity(100);
    grouped.add_memory_usage(7);

    let report = metrics_report();
    assert_eq!(report.counters.states.single_created, 1);
    assert_eq!(report.counters.states.grouped_created, 1);
    assert_eq!(report.counters.states.capacity_grows, 2);
    assert_eq!(report.counters.states.max_capacity, 100);
    assert_eq!(report.counters.memory.charge_calls, 2);
    assert_eq!(report.counters.memory.ignored_charges, 1);
    assert_eq!(report.counters.memory.charged_bytes, 7);

    let json = serde_json::to_value(&report).expect("metrics report should serialize");
    assert_eq!(json["counters"]["states"]["max_capacity"], 100);

    metrics_reset_all();
    assert_eq!(metrics_report().counters.states.grouped_created, 0);
}
