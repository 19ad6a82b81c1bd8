use crate::{sketch::Sketch, state::saturating_u64_from_usize};
use std::mem::size_of;

///
/// SketchSlots
///
/// Growable arena of owned sketch slots indexed directly by dense group id.
/// Slots hold boxed sketches, so slot width is one pointer and the sketch
/// itself is counted once, through its own `size_bytes`.
/// Retained size is kept as running totals so `size_bytes` never walks the
/// slots: capacity overhead is derived from the allocation, and occupied
/// bytes are adjusted on every replacement or in-place update.
///

#[derive(Debug)]
pub struct SketchSlots<S> {
    slots: Vec<Option<Box<S>>>,
    occupied: usize,
    occupied_bytes: u64,
}

impl<S: Sketch> SketchSlots<S> {
    const INSTANCE_SIZE: usize = size_of::<Self>();
    const SLOT_SIZE: usize = size_of::<Option<Box<S>>>();

    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            occupied: 0,
            occupied_bytes: 0,
        }
    }

    /// Number of addressable slots.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots currently holding a sketch.
    #[must_use]
    pub const fn occupied(&self) -> usize {
        self.occupied
    }

    /// Grow so `0..size` is addressable, at least doubling the slot count.
    /// Returns the previous slot count when growth happened.
    pub fn ensure_capacity(&mut self, size: usize) -> Option<usize> {
        let current = self.slots.len();
        if size <= current {
            return None;
        }

        let target = size.max(projected_capacity(current));
        self.slots.reserve_exact(target - current);
        self.slots.resize_with(target, || None);

        Some(current)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&S> {
        self.slots.get(index).and_then(Option::as_deref)
    }

    /// Store `sketch` at `index`, returning the previous occupant.
    /// Panics when `index` was never reserved.
    pub fn set(&mut self, index: usize, sketch: S) -> Option<S> {
        let incoming = sketch.size_bytes();
        let previous = self.slots[index].replace(Box::new(sketch));

        match &previous {
            Some(old) => {
                self.occupied_bytes = self
                    .occupied_bytes
                    .saturating_sub(old.size_bytes())
                    .saturating_add(incoming);
            }
            None => {
                self.occupied += 1;
                self.occupied_bytes = self.occupied_bytes.saturating_add(incoming);
            }
        }

        previous.map(|old| *old)
    }

    /// Mutate the sketch at `index` in place, re-reading its size afterwards.
    pub fn update<R>(&mut self, index: usize, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let sketch = self.slots.get_mut(index).and_then(Option::as_deref_mut)?;

        let before = sketch.size_bytes();
        let result = f(sketch);
        let after = sketch.size_bytes();
        self.occupied_bytes = self
            .occupied_bytes
            .saturating_sub(before)
            .saturating_add(after);

        Some(result)
    }

    /// Header + allocated slot capacity + occupied sketch bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        let overhead = Self::INSTANCE_SIZE
            .saturating_add(self.slots.capacity().saturating_mul(Self::SLOT_SIZE));

        saturating_u64_from_usize(overhead).saturating_add(self.occupied_bytes)
    }
}

impl<S: Sketch> Default for SketchSlots<S> {
    fn default() -> Self {
        Self::new()
    }
}

const fn projected_capacity(current: usize) -> usize {
    if current == 0 {
        1
    } else {
        current.saturating_mul(2)
    }
}
