use crate::{
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    sketch::Sketch,
    state::{
        GroupedAccumulatorState, HyperLogLogState, StateKind, saturating_u64_from_usize,
        slots::SketchSlots,
    },
};

///
/// GroupedHyperLogLogState
///
/// One sketch per engine-assigned group id, addressed through a cursor the
/// engine moves before each get/set. `memory_usage` is a high-water-mark
/// charge: it only ever grows for the lifetime of the state.
///

#[derive(Debug)]
pub struct GroupedHyperLogLogState<S> {
    sketches: SketchSlots<S>,
    group_id: usize,
    memory_usage: u64,
}

impl<S: Sketch> GroupedHyperLogLogState<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sketches: SketchSlots::new(),
            group_id: 0,
            memory_usage: 0,
        }
    }

    /// Number of addressable group slots.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.sketches.len()
    }

    /// Number of groups holding a sketch.
    #[must_use]
    pub const fn occupied(&self) -> usize {
        self.sketches.occupied()
    }

    #[must_use]
    pub const fn current_group(&self) -> usize {
        self.group_id
    }

    fn debug_check_cursor(&self) {
        debug_assert!(
            self.group_id < self.sketches.len(),
            "group id {} is outside reserved capacity {}",
            self.group_id,
            self.sketches.len(),
        );
    }
}

impl<S: Sketch> Default for GroupedHyperLogLogState<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sketch> HyperLogLogState<S> for GroupedHyperLogLogState<S> {
    fn get(&self) -> Option<&S> {
        self.debug_check_cursor();
        self.sketches.get(self.group_id)
    }

    fn set(&mut self, sketch: Option<S>) -> Result<(), InternalError> {
        let Some(sketch) = sketch else {
            sink::record(MetricsEvent::SetRejected {
                kind: StateKind::Grouped,
            });
            return Err(InternalError::state_invalid_argument("value is null"));
        };
        self.debug_check_cursor();
        self.sketches.set(self.group_id, sketch);

        Ok(())
    }

    fn update<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        self.debug_check_cursor();
        self.sketches.update(self.group_id, f)
    }

    fn add_memory_usage(&mut self, bytes: u64) {
        self.memory_usage = self.memory_usage.saturating_add(bytes);
        sink::record(MetricsEvent::MemoryCharged {
            kind: StateKind::Grouped,
            bytes,
        });
    }

    fn estimated_size(&self) -> u64 {
        self.memory_usage.saturating_add(self.sketches.size_bytes())
    }
}

impl<S: Sketch> GroupedAccumulatorState<S> for GroupedHyperLogLogState<S> {
    fn set_current_group(&mut self, group_id: usize) {
        self.group_id = group_id;
    }

    fn ensure_capacity(&mut self, size: usize) {
        if let Some(previous) = self.sketches.ensure_capacity(size) {
            sink::record(MetricsEvent::CapacityGrown {
                from: saturating_u64_from_usize(previous),
                to: saturating_u64_from_usize(self.sketches.len()),
            });
        }
    }
}
