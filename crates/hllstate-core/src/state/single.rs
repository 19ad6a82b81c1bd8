use crate::{
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    sketch::Sketch,
    state::{HyperLogLogState, StateKind, saturating_u64_from_usize},
};
use std::mem::size_of;

///
/// SingleHyperLogLogState
///
/// One sketch for an ungrouped aggregation or a scalar partial merge.
/// The sketch is boxed so the instance header holds only a pointer to it.
/// Size is fully determined by the instance header and the held sketch, so
/// explicit memory charges are discarded instead of double-counted.
///

#[derive(Debug)]
pub struct SingleHyperLogLogState<S> {
    sketch: Option<Box<S>>,
}

impl<S: Sketch> SingleHyperLogLogState<S> {
    pub(crate) const INSTANCE_SIZE: usize = size_of::<Self>();

    #[must_use]
    pub const fn new() -> Self {
        Self { sketch: None }
    }
}

impl<S: Sketch> Default for SingleHyperLogLogState<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sketch> HyperLogLogState<S> for SingleHyperLogLogState<S> {
    fn get(&self) -> Option<&S> {
        self.sketch.as_deref()
    }

    fn set(&mut self, sketch: Option<S>) -> Result<(), InternalError> {
        let Some(sketch) = sketch else {
            sink::record(MetricsEvent::SetRejected {
                kind: StateKind::Single,
            });
            return Err(InternalError::state_invalid_argument("value is null"));
        };
        self.sketch = Some(Box::new(sketch));

        Ok(())
    }

    fn update<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        self.sketch.as_deref_mut().map(f)
    }

    fn add_memory_usage(&mut self, bytes: u64) {
        // discarded; only reported to metrics
        sink::record(MetricsEvent::MemoryCharged {
            kind: StateKind::Single,
            bytes,
        });
    }

    fn estimated_size(&self) -> u64 {
        let base = saturating_u64_from_usize(Self::INSTANCE_SIZE);

        match &self.sketch {
            Some(sketch) => base.saturating_add(sketch.size_bytes()),
            None => base,
        }
    }
}
