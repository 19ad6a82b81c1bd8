//! Core runtime for hllstate: HyperLogLog aggregate state storage, the sketch
//! capability it stores, engine-side accumulation, and memory policy.
#![warn(unreachable_pub)]

pub mod accumulate;
pub mod error;
pub mod governor;
pub mod obs;
pub mod sketch;
pub mod state;

///
/// Prelude
///
/// Prelude contains the state contract and the vocabulary engines drive it
/// with. Errors, governors and observability stay behind their modules.
///

pub mod prelude {
    pub use crate::{
        sketch::{DenseHll, MergeableSketch, Sketch, SketchConfig},
        state::{
            AccumulatorStateHandle, AggregationMode, GroupedAccumulatorState, HyperLogLogState,
            HyperLogLogStateFactory, StateFactory,
        },
    };
}
