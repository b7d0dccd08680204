use std::any::type_name;
use std::num::NonZero;

use new_zealand::nz;

use crate::{Error, Result, Slot};

/// Each block has this many times the capacity of its predecessor.
const GROWTH_FACTOR: NonZero<usize> = nz!(2);

/// A fixed-capacity, append-only run of slots.
///
/// The slot buffer is reserved once, with exactly the requested capacity, and slots are only
/// ever appended while there is room. The buffer is therefore never reallocated and a slot
/// keeps its address for as long as the block exists.
#[derive(Debug)]
pub(crate) struct Block<T> {
    slots: Vec<Slot<T>>,

    /// We track this ourselves because `Vec` may over-allocate and we want every block in the
    /// chain to be exactly double the previous one.
    capacity: NonZero<usize>,
}

impl<T> Block<T> {
    /// Allocates an empty block with room for `capacity` slots.
    pub(crate) fn try_new(capacity: NonZero<usize>) -> Result<Self> {
        let mut slots = Vec::new();

        slots
            .try_reserve_exact(capacity.get())
            .map_err(|source| Error::BlockAllocation {
                capacity: capacity.get(),
                source,
            })?;

        Ok(Self { slots, capacity })
    }

    /// Allocates the block that follows `previous` in the chain, with twice its capacity.
    pub(crate) fn try_allocate_next(previous: &Self) -> Result<Self> {
        let capacity = previous
            .capacity
            .checked_mul(GROWTH_FACTOR)
            .ok_or(Error::CapacityOverflow {
                previous_capacity: previous.capacity.get(),
            })?;

        Self::try_new(capacity)
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity.get()
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub(crate) fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity.get()
    }

    /// Places a slot in the next unused position and returns its index in the block.
    ///
    /// # Panics
    ///
    /// Panics if the block is full.
    pub(crate) fn append(&mut self, slot: Slot<T>) -> usize {
        assert!(
            !self.is_full(),
            "cannot append to a full block in colony of {}",
            type_name::<T>()
        );

        let index = self.slots.len();

        // Cannot reallocate: we reserved exactly `capacity` and just checked there is room.
        self.slots.push(slot);

        index
    }

    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub(crate) fn slot(&self, index: usize) -> &Slot<T> {
        self.assert_in_bounds(index);

        // SAFETY: Bounds checked above. We go through the buffer pointer instead of a slice so
        // that only the one slot is borrowed, leaving pointers to other slots intact.
        unsafe { &*self.slots.as_ptr().add(index) }
    }

    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Slot<T> {
        let ptr = self.slot_ptr(index);

        // SAFETY: The pointer is in bounds and we hold the block exclusively for the lifetime
        // of the returned reference.
        unsafe { &mut *ptr }
    }

    /// Pointer to a slot, derived without borrowing the rest of the slot buffer.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub(crate) fn slot_ptr(&mut self, index: usize) -> *mut Slot<T> {
        self.assert_in_bounds(index);

        // SAFETY: Bounds checked above, so the offset stays within the slot buffer.
        unsafe { self.slots.as_mut_ptr().add(index) }
    }

    fn assert_in_bounds(&self, index: usize) {
        assert!(
            index < self.slots.len(),
            "slot {index} out of bounds in block of {} slots in colony of {}",
            self.slots.len(),
            type_name::<T>()
        );
    }
}
