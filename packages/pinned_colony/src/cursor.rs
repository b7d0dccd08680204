use crate::SlotIndex;

/// A position in a [`Colony`][crate::Colony], used for element access, traversal and O(1)
/// erasure.
///
/// A cursor does not refer to the element it denotes. It refers to the slot *before* that
/// element in the traversal order and finds the element by following that slot's link. This is
/// what lets [`Colony::erase()`][crate::Colony::erase] unlink an element in constant time
/// without the colony having to maintain backward links.
///
/// Cursors are plain values: they can be copied freely, any number of them may exist at the
/// same time and they do not borrow the colony. Every operation on a cursor goes through the
/// colony it was obtained from.
///
/// # Validity
///
/// A cursor stays valid across pushes and across erasures made through other cursors, and keeps
/// denoting the same element as long as that element and the slot before it are not both
/// erased. Using a cursor with a colony it was not obtained from is a logic error and may panic
/// or denote an arbitrary element.
///
/// The derived equality compares the stored positions. Two cursors with different stored
/// positions may still denote the same element, which
/// [`Colony::same_position()`][crate::Colony::same_position] accounts for.
///
/// # Example
///
/// ```rust
/// use pinned_colony::Colony;
///
/// let mut colony = Colony::new();
///
/// let first = colony.push(1);
/// let second = colony.push(2);
///
/// assert_eq!(*colony.get(first), 1);
/// assert_eq!(*colony.get(second), 2);
///
/// // Erasing through a cursor leaves the cursor denoting the next element.
/// let cursor = colony.erase(first);
/// assert_eq!(*colony.get(cursor), 2);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Cursor {
    before: SlotIndex,
}

impl Cursor {
    #[must_use]
    pub(crate) fn new(before: SlotIndex) -> Self {
        Self { before }
    }

    /// The slot before the denoted element.
    #[must_use]
    pub(crate) fn before(self) -> SlotIndex {
        self.before
    }
}
