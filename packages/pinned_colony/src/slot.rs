use std::any::type_name;
use std::mem;

/// Coordinates of a slot in the block chain of a colony.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct SlotIndex {
    block_index: usize,
    index_in_block: usize,
}

impl SlotIndex {
    /// The sentinel is always the very first slot of the very first block.
    pub(crate) const SENTINEL: Self = Self::from_parts(0, 0);

    #[must_use]
    pub(crate) const fn from_parts(block_index: usize, index_in_block: usize) -> Self {
        Self {
            block_index,
            index_in_block,
        }
    }

    #[must_use]
    pub(crate) fn block_index(self) -> usize {
        self.block_index
    }

    #[must_use]
    pub(crate) fn index_in_block(self) -> usize {
        self.index_in_block
    }
}

/// What a slot currently holds. Which variant is active is decided by which structure of the
/// colony reaches the slot: the live chain reaches `Occupied` slots, the free list reaches
/// `Vacant` slots and the colony itself holds on to the `Sentinel`.
#[derive(Debug)]
pub(crate) enum Payload<T> {
    Sentinel,

    Occupied {
        value: T,
    },

    Vacant {
        /// The live-chain predecessor of this slot at the time it was vacated.
        before: SlotIndex,

        /// The slot that was at the head of the free list when this one was pushed onto it.
        next_free: Option<SlotIndex>,
    },
}

/// One storage cell of a block.
///
/// The `next` link is meaningful in every state. For occupied slots and the sentinel it is the
/// live-chain successor. For vacant slots it is whatever the successor was when the slot was
/// vacated, which is what keeps a cursor parked on a vacated slot pointing at a live element.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    payload: Payload<T>,
    next: Option<SlotIndex>,
}

impl<T> Slot<T> {
    #[must_use]
    pub(crate) fn sentinel() -> Self {
        Self {
            payload: Payload::Sentinel,
            next: None,
        }
    }

    #[must_use]
    pub(crate) fn occupied(value: T) -> Self {
        Self {
            payload: Payload::Occupied { value },
            next: None,
        }
    }

    #[must_use]
    pub(crate) fn next(&self) -> Option<SlotIndex> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<SlotIndex>) {
        self.next = next;
    }

    #[must_use]
    pub(crate) fn payload(&self) -> &Payload<T> {
        &self.payload
    }

    #[must_use]
    pub(crate) fn value(&self) -> Option<&T> {
        match &self.payload {
            Payload::Occupied { value } => Some(value),
            Payload::Sentinel | Payload::Vacant { .. } => None,
        }
    }

    #[must_use]
    pub(crate) fn value_mut(&mut self) -> Option<&mut T> {
        match &mut self.payload {
            Payload::Occupied { value } => Some(value),
            Payload::Sentinel | Payload::Vacant { .. } => None,
        }
    }

    /// The free-list bookkeeping of a vacant slot as `(before, next_free)`.
    #[must_use]
    pub(crate) fn vacancy(&self) -> Option<(SlotIndex, Option<SlotIndex>)> {
        match self.payload {
            Payload::Vacant { before, next_free } => Some((before, next_free)),
            Payload::Sentinel | Payload::Occupied { .. } => None,
        }
    }

    /// Stores a value in a vacant slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not vacant.
    pub(crate) fn fill(&mut self, value: T) {
        assert!(
            matches!(self.payload, Payload::Vacant { .. }),
            "filled a slot that was not vacant in colony of {}",
            type_name::<T>()
        );

        self.payload = Payload::Occupied { value };
    }

    /// Drops the value of an occupied slot where it lies and turns the slot vacant.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not occupied.
    pub(crate) fn vacate(&mut self, before: SlotIndex, next_free: Option<SlotIndex>) {
        self.assert_occupied();

        // Assignment drops the old payload in place, so a pinned value is never moved.
        self.payload = Payload::Vacant { before, next_free };
    }

    /// Moves the value out of an occupied slot and turns the slot vacant.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not occupied.
    #[must_use]
    pub(crate) fn take(&mut self, before: SlotIndex, next_free: Option<SlotIndex>) -> T {
        self.assert_occupied();

        match mem::replace(&mut self.payload, Payload::Vacant { before, next_free }) {
            Payload::Occupied { value } => value,
            Payload::Sentinel | Payload::Vacant { .. } => {
                unreachable!("occupancy was asserted above")
            }
        }
    }

    fn assert_occupied(&self) {
        assert!(
            matches!(self.payload, Payload::Occupied { .. }),
            "vacated a slot that was not occupied in colony of {}",
            type_name::<T>()
        );
    }
}
