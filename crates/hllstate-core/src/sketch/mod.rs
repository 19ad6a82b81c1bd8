//! Module: sketch
//! Responsibility: the mergeable approximate-counting capability consumed by state storage.
//! Does not own: slot ownership, cursor handling, or memory policy.
//! Boundary: state containers see only `Sketch`; accumulation helpers see `MergeableSketch`.

mod dense;


use crate::error::InternalError;

pub use dense::{DenseHll, SketchConfig};

///
/// Sketch
///
/// Minimal capability a state container needs from a sketch: an honest
/// self-reported retained size in bytes. Replacement and readback are
/// wholesale, so nothing else about the sketch is visible to state storage.
///

pub trait Sketch {
    /// Bytes retained by this sketch, including its own header.
    fn size_bytes(&self) -> u64;
}

///
/// MergeableSketch
///
/// Update/merge/estimate surface used by engine-side accumulation.
/// Merge associativity and commutativity are whatever the implementation
/// guarantees; nothing here re-verifies them.
///

pub trait MergeableSketch: Sketch + Clone {
    /// Fold one pre-hashed value into the sketch.
    fn insert_hash(&mut self, hash: u64);

    /// Union `other` into `self`. On error `self` must be left unchanged.
    fn merge(&mut self, other: &Self) -> Result<(), InternalError>;

    /// Approximate distinct count observed so far.
    fn estimate(&self) -> u64;
}

/// Hash one raw value with the sketch hash function.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(bytes)
}
