use crate::{
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    sketch::Sketch,
    state::{
        GroupedAccumulatorState, GroupedHyperLogLogState, HyperLogLogState,
        SingleHyperLogLogState, StateDescriptor, StateKind,
    },
};
use std::marker::PhantomData;

///
/// StateFactory
///
/// Builds whichever state strategy the engine asks for and describes both
/// strategies for engine dispatch/layout. It never inspects the plan.
///

pub trait StateFactory<S> {
    type Single: HyperLogLogState<S>;
    type Grouped: GroupedAccumulatorState<S>;

    fn create_single_state(&self) -> Self::Single;

    fn single_state_kind(&self) -> StateDescriptor;

    fn create_grouped_state(&self) -> Self::Grouped;

    fn grouped_state_kind(&self) -> StateDescriptor;
}

///
/// AggregationMode
///
/// Engine-side planning outcome for one aggregate: whether the plan carries
/// grouping keys for it.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggregationMode {
    Ungrouped,
    Grouped,
}

///
/// HyperLogLogStateFactory
///

#[derive(Clone, Copy, Debug)]
pub struct HyperLogLogStateFactory<S> {
    _marker: PhantomData<fn() -> S>,
}

impl<S: Sketch> HyperLogLogStateFactory<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Build the polymorphic state handle for an engine-chosen mode.
    #[must_use]
    pub fn create_state(&self, mode: AggregationMode) -> AccumulatorStateHandle<S> {
        match mode {
            AggregationMode::Ungrouped => {
                AccumulatorStateHandle::Single(self.create_single_state())
            }
            AggregationMode::Grouped => {
                AccumulatorStateHandle::Grouped(self.create_grouped_state())
            }
        }
    }
}

impl<S: Sketch> Default for HyperLogLogStateFactory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sketch> StateFactory<S> for HyperLogLogStateFactory<S> {
    type Single = SingleHyperLogLogState<S>;
    type Grouped = GroupedHyperLogLogState<S>;

    fn create_single_state(&self) -> Self::Single {
        sink::record(MetricsEvent::StateCreated {
            kind: StateKind::Single,
        });
        SingleHyperLogLogState::new()
    }

    fn single_state_kind(&self) -> StateDescriptor {
        StateDescriptor::of::<Self::Single>(StateKind::Single)
    }

    fn create_grouped_state(&self) -> Self::Grouped {
        sink::record(MetricsEvent::StateCreated {
            kind: StateKind::Grouped,
        });
        GroupedHyperLogLogState::new()
    }

    fn grouped_state_kind(&self) -> StateDescriptor {
        StateDescriptor::of::<Self::Grouped>(StateKind::Grouped)
    }
}

///
/// AccumulatorStateHandle
///
/// Tagged handle over both strategies. Engine code drives this handle and
/// never matches on the variant; the single variant behaves as a one-group
/// state, so cursor and capacity calls on it are no-ops.
///

#[derive(Debug)]
pub enum AccumulatorStateHandle<S> {
    Single(SingleHyperLogLogState<S>),
    Grouped(GroupedHyperLogLogState<S>),
}

impl<S: Sketch> AccumulatorStateHandle<S> {
    #[must_use]
    pub const fn kind(&self) -> StateKind {
        match self {
            Self::Single(_) => StateKind::Single,
            Self::Grouped(_) => StateKind::Grouped,
        }
    }
}

impl<S: Sketch> HyperLogLogState<S> for AccumulatorStateHandle<S> {
    fn get(&self) -> Option<&S> {
        match self {
            Self::Single(state) => state.get(),
            Self::Grouped(state) => state.get(),
        }
    }

    fn set(&mut self, sketch: Option<S>) -> Result<(), InternalError> {
        match self {
            Self::Single(state) => state.set(sketch),
            Self::Grouped(state) => state.set(sketch),
        }
    }

    fn update<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        match self {
            Self::Single(state) => state.update(f),
            Self::Grouped(state) => state.update(f),
        }
    }

    fn add_memory_usage(&mut self, bytes: u64) {
        match self {
            Self::Single(state) => state.add_memory_usage(bytes),
            Self::Grouped(state) => state.add_memory_usage(bytes),
        }
    }

    fn estimated_size(&self) -> u64 {
        match self {
            Self::Single(state) => state.estimated_size(),
            Self::Grouped(state) => state.estimated_size(),
        }
    }
}

impl<S: Sketch> GroupedAccumulatorState<S> for AccumulatorStateHandle<S> {
    fn set_current_group(&mut self, group_id: usize) {
        match self {
            Self::Single(_) => {}
            Self::Grouped(state) => state.set_current_group(group_id),
        }
    }

    fn ensure_capacity(&mut self, size: usize) {
        match self {
            Self::Single(_) => {}
            Self::Grouped(state) => state.ensure_capacity(size),
        }
    }
}
