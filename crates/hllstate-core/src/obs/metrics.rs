use serde::Serialize;
use std::cell::RefCell;

///
/// EventState
/// Ephemeral, in-memory counters for state lifecycle and memory policy.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventState {
    pub states: StateCounters,
    pub memory: MemoryCounters,
    pub governor: GovernorCounters,
}

///
/// StateCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StateCounters {
    pub single_created: u64,
    pub grouped_created: u64,

    // Slot growth
    pub capacity_grows: u64,
    pub max_capacity: u64,

    pub rejected_sets: u64,
}

///
/// MemoryCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MemoryCounters {
    pub charge_calls: u64,
    pub charged_bytes: u64,
    pub ignored_charges: u64,
}

///
/// GovernorCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct GovernorCounters {
    pub checks: u64,
    pub spills: u64,
    pub limit_exceeded: u64,
    pub max_observed_bytes: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset() {
    with_state_mut(|m| *m = EventState::default());
}

/// Raise `max` to `value` when larger.
pub(crate) const fn raise_max(max: &mut u64, value: u64) {
    if value > *max {
        *max = value;
    }
}

///
/// EventReport
/// Point-in-time snapshot of the thread-local counters.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub counters: EventState,
}

/// Build a snapshot of the current thread's counters.
#[must_use]
pub(crate) fn report() -> EventReport {
    EventReport {
        counters: with_state(Clone::clone),
    }
}
