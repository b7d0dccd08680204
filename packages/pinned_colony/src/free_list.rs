use crate::{BlockChain, SlotIndex};

/// Intrusive stack of vacated slots.
///
/// The stack entries are stored in the vacated slots themselves, so pushing and popping never
/// allocates. Each entry also remembers the live-chain predecessor the slot had when it was
/// vacated, which is where the slot is linked back in when it is reused.
///
/// Reuse is strictly last-in-first-out. This guarantees that when a slot is popped, every slot
/// vacated after it has already been reused, so its remembered predecessor is live again (or is
/// the sentinel).
#[derive(Debug, Default)]
pub(crate) struct FreeList {
    head: Option<SlotIndex>,
}

impl FreeList {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn head(&self) -> Option<SlotIndex> {
        self.head
    }

    /// Drops the value in `slot` where it lies and makes the slot the new head of the stack.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not occupied.
    pub(crate) fn push<T>(&mut self, chain: &mut BlockChain<T>, before: SlotIndex, slot: SlotIndex) {
        assert!(
            chain.slot(slot).value().is_some(),
            "pushed a slot that is not occupied onto the free list"
        );

        // The head moves before the value is dropped. A panicking drop still leaves the slot
        // vacant, so it must already be on the stack by then.
        let next_free = self.head.replace(slot);
        chain.slot_mut(slot).vacate(before, next_free);
    }

    /// Moves the value out of `slot` and makes the slot the new head of the stack.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not occupied.
    #[must_use]
    pub(crate) fn push_take<T>(
        &mut self,
        chain: &mut BlockChain<T>,
        before: SlotIndex,
        slot: SlotIndex,
    ) -> T {
        let value = chain.slot_mut(slot).take(before, self.head);
        self.head = Some(slot);
        value
    }

    /// Unlinks the head of the stack and returns it as `(before, slot)`.
    ///
    /// The slot stays vacant; the caller is expected to fill it immediately.
    #[must_use]
    pub(crate) fn pop<T>(&mut self, chain: &BlockChain<T>) -> Option<(SlotIndex, SlotIndex)> {
        let slot = self.head?;

        let (before, next_free) = chain
            .slot(slot)
            .vacancy()
            .expect("every slot on the free list is vacant");

        self.head = next_free;

        Some((before, slot))
    }
}
