//! Module: accumulate
//! Responsibility: engine-side update/merge/evaluate routines for approximate distinct counting.
//! Does not own: sketch storage, cursor movement, or group-id assignment.
//! Boundary: every routine targets whatever the state's cursor selects and is
//! written against `HyperLogLogState` only, so it runs unchanged over either strategy.


use crate::{
    error::InternalError,
    sketch::{MergeableSketch, hash_bytes},
    state::HyperLogLogState,
};
use std::mem::size_of;

///
/// HashScratch
///
/// Reusable hash buffer for `input_values`. Owned by the caller for the
/// lifetime of one state, it remembers how many buffer bytes were already
/// charged so the state is only charged for growth past that mark.
///

#[derive(Debug, Default)]
pub struct HashScratch {
    hashes: Vec<u64>,
    charged: u64,
}

impl HashScratch {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hashes: Vec::new(),
            charged: 0,
        }
    }

    /// Buffer bytes charged to the state so far.
    #[must_use]
    pub const fn charged_bytes(&self) -> u64 {
        self.charged
    }

    fn held_bytes(&self) -> u64 {
        let held = self.hashes.capacity().saturating_mul(size_of::<u64>());
        u64::try_from(held).unwrap_or(u64::MAX)
    }
}

/// Fold one batch of raw values into the active sketch.
///
/// Values are hashed into `scratch` first. Only buffer growth beyond what
/// `scratch` has already charged is reported to the state, so a steady batch
/// size charges once no matter how many batches follow.
pub fn input_values<S, T>(
    state: &mut T,
    scratch: &mut HashScratch,
    values: &[&[u8]],
    new_sketch: impl FnOnce() -> Result<S, InternalError>,
) -> Result<(), InternalError>
where
    S: MergeableSketch,
    T: HyperLogLogState<S>,
{
    if values.is_empty() {
        return Ok(());
    }

    scratch.hashes.clear();
    scratch
        .hashes
        .extend(values.iter().map(|value| hash_bytes(value)));
    input_hashes(state, &scratch.hashes, new_sketch)?;

    let held = scratch.held_bytes();
    if held > scratch.charged {
        state.add_memory_usage(held - scratch.charged);
        scratch.charged = held;
    }

    Ok(())
}

/// Fold one batch of pre-hashed values into the active sketch.
///
/// An occupied slot is updated in place; a sketch is only built when the
/// slot is empty.
pub fn input_hashes<S, T>(
    state: &mut T,
    hashes: &[u64],
    new_sketch: impl FnOnce() -> Result<S, InternalError>,
) -> Result<(), InternalError>
where
    S: MergeableSketch,
    T: HyperLogLogState<S>,
{
    if hashes.is_empty() {
        return Ok(());
    }

    let insert_all = |sketch: &mut S| {
        for &hash in hashes {
            sketch.insert_hash(hash);
        }
    };
    if state.update(insert_all).is_some() {
        return Ok(());
    }

    let mut sketch = new_sketch()?;
    insert_all(&mut sketch);

    state.set(Some(sketch))
}

/// Merge a partial sketch into the active one; an empty slot adopts a copy.
pub fn combine<S, T>(state: &mut T, partial: &S) -> Result<(), InternalError>
where
    S: MergeableSketch,
    T: HyperLogLogState<S>,
{
    if let Some(merged) = state.update(|existing| existing.merge(partial)) {
        return merged;
    }

    state.set(Some(partial.clone()))
}

/// Approximate distinct count for the active context; empty counts as zero.
#[must_use]
pub fn evaluate<S, T>(state: &T) -> u64
where
    S: MergeableSketch,
    T: HyperLogLogState<S> + ?Sized,
{
    state.get().map_or(0, MergeableSketch::estimate)
}
