//! Module: state
//! Responsibility: per-aggregation sketch storage, cursor indirection, and memory self-reporting.
//! Does not own: sketch math, group-id assignment, or spill/abort policy.
//! Boundary: the engine drives states only through `HyperLogLogState` and
//! `GroupedAccumulatorState`; the factory decides nothing, it only builds.

mod factory;
mod grouped;
mod single;
mod slots;


use crate::error::InternalError;
use std::mem::size_of;

pub use factory::{AccumulatorStateHandle, AggregationMode, HyperLogLogStateFactory, StateFactory};
pub use grouped::GroupedHyperLogLogState;
pub use single::SingleHyperLogLogState;
pub use slots::SketchSlots;

///
/// HyperLogLogState
///
/// Storage contract shared by both strategies. Update/merge/evaluate code is
/// written once against this trait and never learns which strategy backs it.
///

pub trait HyperLogLogState<S> {
    /// Sketch for the active context, or `None` if never set.
    fn get(&self) -> Option<&S>;

    /// Replace the sketch for the active context, dropping any previous one.
    /// `None` is rejected as an invalid argument and leaves content unchanged.
    fn set(&mut self, sketch: Option<S>) -> Result<(), InternalError>;

    /// Mutate the active sketch in place and return the closure result, or
    /// `None` without calling `f` when no sketch is held. The size change
    /// made by `f` is folded into `estimated_size`.
    fn update<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> Option<R>
    where
        Self: Sized;

    /// Charge auxiliary bytes that no held sketch reports.
    fn add_memory_usage(&mut self, bytes: u64);

    /// Current retained-memory estimate in bytes.
    fn estimated_size(&self) -> u64;
}

///
/// GroupedAccumulatorState
///
/// Cursor and capacity surface for per-group storage. The engine reserves
/// capacity before using a group id and moves the cursor before every
/// get/set; neither precondition is checked outside debug builds.
///

pub trait GroupedAccumulatorState<S>: HyperLogLogState<S> {
    fn set_current_group(&mut self, group_id: usize);

    /// Make group ids `0..size` addressable. Never shrinks.
    fn ensure_capacity(&mut self, size: usize);
}

///
/// StateKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StateKind {
    Single,
    Grouped,
}

///
/// StateDescriptor
///
/// Runtime type descriptor handed to engine dispatch and layout code.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StateDescriptor {
    pub kind: StateKind,
    pub type_name: &'static str,
    pub instance_size: usize,
}

impl StateDescriptor {
    #[must_use]
    pub(crate) fn of<T>(kind: StateKind) -> Self {
        Self {
            kind,
            type_name: std::any::type_name::<T>(),
            instance_size: size_of::<T>(),
        }
    }
}

fn saturating_u64_from_usize(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
