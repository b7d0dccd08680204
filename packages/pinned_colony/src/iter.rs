use std::any::type_name;
use std::fmt;
use std::iter::FusedIterator;
use std::pin::Pin;

use crate::{BlockChain, Colony, SlotIndex};

/// Iterator over shared references to the items of a [`Colony`], in traversal order.
///
/// Created by [`Colony::iter()`].
pub struct Iter<'a, T> {
    chain: &'a BlockChain<T>,
    next: Option<SlotIndex>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(chain: &'a BlockChain<T>, first: Option<SlotIndex>, count: usize) -> Self {
        Self {
            chain,
            next: first,
            remaining: count,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let slot = self.chain.slot(index);

        self.next = slot.next();
        self.remaining = self
            .remaining
            .checked_sub(1)
            .expect("the live chain has exactly as many slots as there are items");

        Some(
            slot.value()
                .expect("the live chain only links occupied slots"),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

/// Iterator over exclusive pinned references to the items of a [`Colony`], in traversal order.
///
/// Created by [`Colony::iter_mut()`].
pub struct IterMut<'a, T> {
    chain: &'a mut BlockChain<T>,
    next: Option<SlotIndex>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(
        chain: &'a mut BlockChain<T>,
        first: Option<SlotIndex>,
        count: usize,
    ) -> Self {
        Self {
            chain,
            next: first,
            remaining: count,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = Pin<&'a mut T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let index = self.next?;
        let slot_ptr = self.chain.slot_ptr(index);

        // SAFETY: The live chain links each slot at most once and we stop after visiting as
        // many slots as there are items, so no other reference to this slot is ever handed
        // out by this iterator. The chain is exclusively borrowed for 'a and slots never move,
        // so the reference stays valid for 'a.
        let slot = unsafe { &mut *slot_ptr };

        self.next = slot.next();
        self.remaining = self
            .remaining
            .checked_sub(1)
            .expect("we checked above that remaining is non-zero");

        let value = slot
            .value_mut()
            .expect("the live chain only links occupied slots");

        // SAFETY: Items are never moved while in the colony - that is the point of it.
        Some(unsafe { Pin::new_unchecked(value) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

/// Iterator that moves the items out of a [`Colony`], in traversal order.
///
/// Only available for `Unpin` items, as the colony otherwise guarantees that items never move.
/// Items not consumed by the time the iterator is dropped are dropped with the colony.
pub struct IntoIter<T> {
    colony: Colony<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(colony: Colony<T>) -> Self {
        Self { colony }
    }
}

impl<T: Unpin> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.colony.begin();

        if self.colony.is_end(first) {
            return None;
        }

        Some(self.colony.remove(first))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.colony.len(), Some(self.colony.len()))
    }
}

impl<T: Unpin> ExactSizeIterator for IntoIter<T> {}

impl<T: Unpin> FusedIterator for IntoIter<T> {}

impl<T> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter")
            .field("colony", &self.colony)
            .finish()
    }
}
