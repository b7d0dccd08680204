use std::any::type_name;
use std::fmt;
use std::num::NonZero;
use std::pin::Pin;
use std::thread;

use new_zealand::nz;

use crate::{
    BlockChain, ColonyBuilder, Cursor, DropPolicy, FreeList, IntoIter, Iter, IterMut, Payload,
    Result, Slot, SlotIndex,
};

/// Capacity of the first block of a colony unless the builder says otherwise.
pub(crate) const DEFAULT_BLOCK_CAPACITY: NonZero<usize> = nz!(16);

/// An unordered container with O(1) insertion and O(1) removal that never moves its items.
///
/// Items are stored in a chain of blocks, each twice the size of the previous one. Once an item
/// is inserted, its memory address stays the same until the item is erased, no matter how many
/// other items are inserted or erased and even if the colony itself is moved. The slot of an
/// erased item is reused by a later insertion, so the same address may come back for a
/// different item.
///
/// Items are visited in a stable traversal order: new items go to the end unless they reuse the
/// slot of an erased item, in which case they take that item's place in the order.
///
/// # Cursors
///
/// Insertion returns a [`Cursor`], which is used to access, traverse and erase items. Any number
/// of cursors may exist at the same time and erasing through one cursor does not disturb the
/// others.
///
/// # Pinning
///
/// The colony hands out `Pin<&T>` and `Pin<&mut T>` for individual items, so it is valid to
/// obtain pointers to items and use them from unsafe code for as long as the item is in the
/// colony, provided you do not concurrently ask the colony for a conflicting reference.
///
/// # Resource usage
///
/// The colony grows automatically as items are added and never releases capacity until it is
/// dropped. One slot of the first block is permanently used for traversal bookkeeping.
///
/// # Example
///
/// ```rust
/// use pinned_colony::Colony;
///
/// let mut colony = Colony::new();
///
/// for value in 1..=5 {
///     colony.push(value);
/// }
///
/// // Erase every even value while traversing.
/// let mut cursor = colony.begin();
/// while !colony.is_end(cursor) {
///     if *colony.get(cursor) % 2 == 0 {
///         cursor = colony.erase(cursor);
///     } else {
///         cursor = colony.advance(cursor);
///     }
/// }
///
/// assert_eq!(colony.iter().copied().collect::<Vec<_>>(), [1, 3, 5]);
/// ```
pub struct Colony<T> {
    chain: BlockChain<T>,

    /// Slots vacated by erasure, reused last-in-first-out.
    free_list: FreeList,

    /// The last slot of the live chain, or the sentinel if there are no items.
    /// New slots are linked after this one.
    tail: SlotIndex,

    /// Number of occupied slots.
    count: usize,

    drop_policy: DropPolicy,
}

impl<T> Colony<T> {
    pub(crate) fn try_new_inner(
        initial_block_capacity: NonZero<usize>,
        drop_policy: DropPolicy,
    ) -> Result<Self> {
        let mut chain = BlockChain::try_new(initial_block_capacity)?;

        let sentinel = chain.append(Slot::sentinel());
        debug_assert_eq!(sentinel, SlotIndex::SENTINEL);

        Ok(Self {
            chain,
            free_list: FreeList::new(),
            tail: sentinel,
            count: 0,
            drop_policy,
        })
    }

    /// Creates a new [`Colony`] with the default configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let colony = Colony::<String>::new();
    ///
    /// assert_eq!(colony.len(), 0);
    /// assert!(colony.is_empty());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the memory for the first block cannot be allocated.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`Colony`].
    ///
    /// Use this when you want to customize the colony configuration beyond the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use new_zealand::nz;
    /// use pinned_colony::{Colony, DropPolicy};
    ///
    /// let colony = Colony::<u32>::builder()
    ///     .initial_block_capacity(nz!(64))
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    ///
    /// assert_eq!(colony.capacity(), 64);
    /// ```
    pub fn builder() -> ColonyBuilder<T> {
        ColonyBuilder::new()
    }

    /// The number of items in the colony.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::new();
    /// let cursor = colony.push(42);
    /// assert_eq!(colony.len(), 1);
    ///
    /// colony.erase(cursor);
    /// assert_eq!(colony.len(), 0);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the colony has no items. An empty colony may still be holding capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The total number of slots in all blocks of the colony, including the slot reserved for
    /// traversal bookkeeping and the slots of erased items.
    ///
    /// This walks the block chain, so it takes time proportional to the number of blocks.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::new();
    /// assert_eq!(colony.capacity(), 16);
    ///
    /// for value in 0..16 {
    ///     colony.push(value);
    /// }
    ///
    /// // The first block is full, so a second block with twice the capacity was added.
    /// assert_eq!(colony.capacity(), 16 + 32);
    /// ```
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.chain.capacity()
    }

    /// Inserts an item and returns a cursor that denotes it.
    ///
    /// The slot of the most recently erased item is reused if there is one, in which case the
    /// new item takes the erased item's place in the traversal order. Otherwise the item is
    /// placed at the end, growing the colony if the current block is full.
    ///
    /// Existing cursors remain valid. A cursor obtained from [`end()`][Self::end] before the
    /// call no longer denotes the end if the item is placed there.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::new();
    ///
    /// let cursor = colony.push("Hello".to_string());
    /// assert_eq!(&*colony.get(cursor), "Hello");
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the colony needs to grow and the memory for the new block cannot be
    /// allocated. Use [`try_push()`][Self::try_push] to handle that case.
    pub fn push(&mut self, value: T) -> Cursor {
        self.try_push(value).expect(
            "we do not intend to handle allocation failure as a real possibility - OOM is panic",
        )
    }

    /// Inserts an item produced by `f` and returns a cursor that denotes it.
    ///
    /// The colony is not touched until `f` has returned, so if `f` panics, the colony is left
    /// exactly as it was.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::new();
    ///
    /// let cursor = colony.push_with(|| vec![1, 2, 3]);
    /// assert_eq!(colony.get(cursor).len(), 3);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the colony needs to grow and the memory for the new block cannot be
    /// allocated.
    pub fn push_with<F>(&mut self, f: F) -> Cursor
    where
        F: FnOnce() -> T,
    {
        let value = f();
        self.push(value)
    }

    /// Inserts an item and returns a cursor that denotes it, reporting allocation failure
    /// instead of panicking.
    ///
    /// If an error is returned, the item is dropped and the colony is left exactly as it was.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::new();
    ///
    /// let cursor = colony.try_push(42).expect("a small colony can always grow");
    /// assert_eq!(*colony.get(cursor), 42);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the colony needs to grow and the new block cannot be allocated.
    pub fn try_push(&mut self, value: T) -> Result<Cursor> {
        if let Some((before, slot)) = self.free_list.pop(&self.chain) {
            return Ok(self.fill_vacated(before, slot, value));
        }

        if self.chain.is_full() {
            self.chain.try_grow()?;
        }

        Ok(self.append(value))
    }

    /// Erases the item denoted by `cursor`, dropping it without moving it.
    ///
    /// Returns `cursor` itself, which now denotes the item that followed the erased one (or the
    /// end). Other cursors remain valid, except that a cursor parked directly on the erased
    /// slot must not be used to erase until it has been advanced.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::new();
    /// let first = colony.push(1);
    /// colony.push(2);
    ///
    /// let cursor = colony.erase(first);
    ///
    /// assert_eq!(colony.len(), 1);
    /// assert_eq!(*colony.get(cursor), 2);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end, or if the slot it is parked on has been erased.
    pub fn erase(&mut self, cursor: Cursor) -> Cursor {
        let (before, target) = self.unlink(cursor);

        self.free_list.push(&mut self.chain, before, target);

        cursor
    }

    /// Erases the item denoted by `cursor` and returns it.
    ///
    /// Moving an item out is only possible for `Unpin` items, since the colony otherwise
    /// guarantees that items never move. Use [`erase()`][Self::erase] for other items.
    ///
    /// After the call, `cursor` denotes the item that followed the removed one (or the end).
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::new();
    /// let cursor = colony.push("Hello".to_string());
    ///
    /// assert_eq!(colony.remove(cursor), "Hello");
    /// assert!(colony.is_empty());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end, or if the slot it is parked on has been erased.
    #[must_use]
    pub fn remove(&mut self, cursor: Cursor) -> T
    where
        T: Unpin,
    {
        let (before, target) = self.unlink(cursor);

        self.free_list.push_take(&mut self.chain, before, target)
    }

    /// Erases every item for which `f` returns `false`, visiting items in traversal order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony: Colony<u32> = (1..=6).collect();
    /// colony.retain(|value| value % 3 != 0);
    ///
    /// assert_eq!(colony.iter().copied().collect::<Vec<_>>(), [1, 2, 4, 5]);
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.begin();

        while !self.is_end(cursor) {
            cursor = if f(self.get(cursor).get_ref()) {
                self.advance(cursor)
            } else {
                self.erase(cursor)
            };
        }
    }

    /// Erases every item, in traversal order. Capacity is kept for reuse.
    pub fn clear(&mut self) {
        let cursor = self.begin();

        while !self.is_end(cursor) {
            self.erase(cursor);
        }
    }

    /// A cursor that denotes the first item, or the end if the colony is empty.
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor::new(SlotIndex::SENTINEL)
    }

    /// A cursor that denotes the end of the colony, one past the last item.
    ///
    /// Prefer [`is_end()`][Self::is_end] for detecting the end: the cursor returned here stops
    /// being at the end as soon as an item is placed after the current last item.
    #[must_use]
    pub fn end(&self) -> Cursor {
        Cursor::new(self.tail)
    }

    /// Whether `cursor` is at the end of the colony, i.e. denotes no item.
    #[must_use]
    pub fn is_end(&self, cursor: Cursor) -> bool {
        self.chain.slot(cursor.before()).next().is_none()
    }

    /// Returns a cursor that denotes the item after the one denoted by `cursor`.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end.
    #[must_use]
    pub fn advance(&self, cursor: Cursor) -> Cursor {
        Cursor::new(self.denoted(cursor))
    }

    /// Whether two cursors denote the same position, even if they reach it from different
    /// places. Any two cursors at the end are at the same position.
    #[must_use]
    pub fn same_position(&self, a: Cursor, b: Cursor) -> bool {
        self.chain.slot(a.before()).next() == self.chain.slot(b.before()).next()
    }

    /// Gets a pinned reference to the item denoted by `cursor`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::new();
    /// let cursor = colony.push(42);
    ///
    /// // The item is pinned, so we can hold on to a pointer to it.
    /// let ptr: *const i32 = colony.get(cursor).get_ref();
    ///
    /// // Other insertions do not move it.
    /// for value in 0..1000 {
    ///     colony.push(value);
    /// }
    ///
    /// assert_eq!(colony.get(cursor).get_ref() as *const i32, ptr);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end or does not denote an item.
    #[must_use]
    pub fn get(&self, cursor: Cursor) -> Pin<&T> {
        let target = self.denoted(cursor);

        let value = self.chain.slot(target).value().unwrap_or_else(|| {
            panic!(
                "cursor does not denote an item in colony of {}",
                type_name::<T>()
            )
        });

        // SAFETY: Items are never moved while in the colony - that is the point of it.
        unsafe { Pin::new_unchecked(value) }
    }

    /// Gets an exclusive pinned reference to the item denoted by `cursor`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::new();
    /// let cursor = colony.push("Hello".to_string());
    ///
    /// colony.get_mut(cursor).push_str(", World!");
    ///
    /// assert_eq!(&*colony.get(cursor), "Hello, World!");
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end or does not denote an item.
    #[must_use]
    pub fn get_mut(&mut self, cursor: Cursor) -> Pin<&mut T> {
        let target = self.denoted(cursor);

        let value = self.chain.slot_mut(target).value_mut().unwrap_or_else(|| {
            panic!(
                "cursor does not denote an item in colony of {}",
                type_name::<T>()
            )
        });

        // SAFETY: Items are never moved while in the colony - that is the point of it.
        unsafe { Pin::new_unchecked(value) }
    }

    /// Iterates over shared references to the items in traversal order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.chain, self.first(), self.count)
    }

    /// Iterates over exclusive pinned references to the items in traversal order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pinned_colony::Colony;
    ///
    /// let mut colony: Colony<u32> = (1..=3).collect();
    ///
    /// for mut value in colony.iter_mut() {
    ///     *value *= 10;
    /// }
    ///
    /// assert_eq!(colony.iter().copied().collect::<Vec<_>>(), [10, 20, 30]);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let first = self.first();
        IterMut::new(&mut self.chain, first, self.count)
    }

    fn first(&self) -> Option<SlotIndex> {
        self.chain.slot(SlotIndex::SENTINEL).next()
    }

    /// The slot of the item denoted by `cursor`.
    fn denoted(&self, cursor: Cursor) -> SlotIndex {
        self.chain
            .slot(cursor.before())
            .next()
            .unwrap_or_else(|| panic!("cursor is at the end of colony of {}", type_name::<T>()))
    }

    /// Links a reused slot back into the live chain after the predecessor it had when it was
    /// vacated.
    fn fill_vacated(&mut self, before: SlotIndex, slot: SlotIndex, value: T) -> Cursor {
        // The slot's own link may be stale because its old successor may have been erased
        // since, so we take the current successor of the predecessor instead.
        let after = self.chain.slot(before).next();

        let target = self.chain.slot_mut(slot);
        target.fill(value);
        target.set_next(after);

        self.chain.slot_mut(before).set_next(Some(slot));

        if self.tail == before {
            self.tail = slot;
        }

        self.increment_count();

        Cursor::new(before)
    }

    /// Links a freshly appended slot after the tail. There must be room in the last block.
    fn append(&mut self, value: T) -> Cursor {
        let before = self.tail;

        let slot = self.chain.append(Slot::occupied(value));
        self.chain.slot_mut(before).set_next(Some(slot));
        self.tail = slot;

        self.increment_count();

        Cursor::new(before)
    }

    /// Removes the item denoted by `cursor` from the live chain and returns
    /// `(before, target)`. The target slot is still occupied afterwards.
    fn unlink(&mut self, cursor: Cursor) -> (SlotIndex, SlotIndex) {
        let before = cursor.before();

        assert!(
            !matches!(self.chain.slot(before).payload(), Payload::Vacant { .. }),
            "cannot erase through a cursor parked on an erased slot in colony of {}",
            type_name::<T>()
        );

        let target = self.chain.slot(before).next().unwrap_or_else(|| {
            panic!(
                "cannot erase at the end of colony of {}",
                type_name::<T>()
            )
        });

        let target_slot = self.chain.slot(target);

        assert!(
            target_slot.value().is_some(),
            "cursor does not denote an item in colony of {}",
            type_name::<T>()
        );

        let after = target_slot.next();
        self.chain.slot_mut(before).set_next(after);

        if self.tail == target {
            self.tail = before;
        }

        self.count = self
            .count
            .checked_sub(1)
            .expect("we asserted above that the target is occupied so count must be non-zero");

        (before, target)
    }

    fn increment_count(&mut self) {
        self.count = self
            .count
            .checked_add(1)
            .expect("every item occupies a slot in memory, so the count cannot overflow");
    }

    #[cfg(test)]
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    pub(crate) fn block_count(&self) -> usize {
        self.chain.block_count()
    }

    /// Verifies every structural invariant of the colony, panicking on the first violation.
    #[cfg(test)]
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    pub(crate) fn integrity_check(&self) {
        use std::collections::HashSet;

        assert!(
            matches!(
                self.chain.slot(SlotIndex::SENTINEL).payload(),
                Payload::Sentinel
            ),
            "first slot is not the sentinel in colony of {}",
            type_name::<T>()
        );

        let allocated_slots = self
            .chain
            .blocks()
            .map(crate::Block::len)
            .try_fold(0_usize, usize::checked_add)
            .expect("allocated slots exist in memory, so their count fits in usize");

        // Every block but the last is full and each block doubles the previous one.
        let blocks: Vec<_> = self.chain.blocks().collect();
        for pair in blocks.windows(2) {
            let [previous, next] = pair else {
                unreachable!("windows(2) yields pairs")
            };

            assert!(previous.is_full(), "a block before the last one has unused slots");
            assert_eq!(
                Some(next.capacity()),
                previous.capacity().checked_mul(2),
                "block capacity did not double"
            );
        }

        let mut live = HashSet::new();
        let mut current = SlotIndex::SENTINEL;

        while let Some(next) = self.chain.slot(current).next() {
            assert!(
                live.insert(next),
                "live chain revisits slot {next:?} in colony of {}",
                type_name::<T>()
            );
            assert!(
                self.chain.slot(next).value().is_some(),
                "live chain links unoccupied slot {next:?} in colony of {}",
                type_name::<T>()
            );

            current = next;
        }

        assert_eq!(
            live.len(),
            self.count,
            "count does not match the length of the live chain in colony of {}",
            type_name::<T>()
        );
        assert_eq!(
            current,
            self.tail,
            "tail is not the last slot of the live chain in colony of {}",
            type_name::<T>()
        );

        let mut free = HashSet::new();
        let mut current = self.free_list.head();

        while let Some(index) = current {
            assert!(
                !live.contains(&index),
                "slot {index:?} is both live and free in colony of {}",
                type_name::<T>()
            );
            assert!(
                free.insert(index),
                "free list revisits slot {index:?} in colony of {}",
                type_name::<T>()
            );

            let (_, next_free) = self
                .chain
                .slot(index)
                .vacancy()
                .expect("every slot on the free list must be vacant");

            current = next_free;
        }

        let accounted_slots = live
            .len()
            .checked_add(free.len())
            .and_then(|slots| slots.checked_add(1));

        assert_eq!(
            accounted_slots,
            Some(allocated_slots),
            "live chain and free list do not account for every allocated slot in colony of {}",
            type_name::<T>()
        );
    }
}

impl<T> Default for Colony<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Colony<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("len", &self.count)
            .field("capacity", &self.capacity())
            .field("block_count", &self.chain.block_count())
            .field("drop_policy", &self.drop_policy)
            .finish_non_exhaustive()
    }
}

impl<T: Clone> Clone for Colony<T> {
    /// Creates an independent copy of the colony with the same items in the same traversal
    /// order.
    ///
    /// The copy is sized to hold all items in its first block. If cloning an item panics, the
    /// partially built copy is dropped along with the items cloned so far and `self` is not
    /// affected.
    fn clone(&self) -> Self {
        let initial_block_capacity = NonZero::<usize>::MIN
            .saturating_add(self.count)
            .max(DEFAULT_BLOCK_CAPACITY);

        let mut copy = Self::builder()
            .initial_block_capacity(initial_block_capacity)
            .drop_policy(self.drop_policy)
            .build();

        for value in self {
            copy.push(value.clone());
        }

        copy
    }
}

impl<T> Drop for Colony<T> {
    fn drop(&mut self) {
        let was_empty = self.is_empty();

        // Drop the items in traversal order, in place.
        self.clear();

        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropItems && !thread::panicking() {
            assert!(
                was_empty,
                "dropped a non-empty colony of {} with a policy that says it must be empty when dropped",
                type_name::<T>()
            );
        }
    }
}

impl<T> Extend<T> for Colony<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for Colony<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut colony = Self::new();
        colony.extend(iter);
        colony
    }
}

impl<'a, T> IntoIterator for &'a Colony<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Colony<T> {
    type Item = Pin<&'a mut T>;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Unpin> IntoIterator for Colony<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
