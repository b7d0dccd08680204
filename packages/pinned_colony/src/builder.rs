use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;

use crate::colony::DEFAULT_BLOCK_CAPACITY;
use crate::{Colony, DropPolicy, Result};

/// Builder for creating an instance of [`Colony`].
///
/// You only need to use this builder if you want to customize the colony configuration.
/// Otherwise, [`Colony::new()`] is enough.
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use pinned_colony::{Colony, DropPolicy};
///
/// let colony = Colony::<String>::builder()
///     .initial_block_capacity(nz!(1024))
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// assert_eq!(colony.capacity(), 1024);
/// ```
#[must_use]
pub struct ColonyBuilder<T> {
    initial_block_capacity: NonZero<usize>,
    drop_policy: DropPolicy,

    _item: PhantomData<T>,
}

impl<T> fmt::Debug for ColonyBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColonyBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("initial_block_capacity", &self.initial_block_capacity)
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}

impl<T> ColonyBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            initial_block_capacity: DEFAULT_BLOCK_CAPACITY,
            drop_policy: DropPolicy::default(),
            _item: PhantomData,
        }
    }

    /// Sets the number of slots in the first block of the colony. Each further block has twice
    /// the capacity of the one before it.
    ///
    /// One slot of the first block is reserved for traversal bookkeeping, so a first block
    /// with capacity for `n` slots holds `n - 1` items before the colony has to grow.
    ///
    /// Defaults to 16.
    ///
    /// # Examples
    ///
    /// ```
    /// use new_zealand::nz;
    /// use pinned_colony::Colony;
    ///
    /// let mut colony = Colony::builder().initial_block_capacity(nz!(4)).build();
    ///
    /// for value in 0..3 {
    ///     colony.push(value);
    /// }
    /// assert_eq!(colony.capacity(), 4);
    ///
    /// colony.push(3);
    /// assert_eq!(colony.capacity(), 4 + 8);
    /// ```
    pub fn initial_block_capacity(mut self, capacity: NonZero<usize>) -> Self {
        self.initial_block_capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the colony. This governs how
    /// to treat remaining items in the colony when the colony is dropped.
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Validates the options and creates the colony.
    ///
    /// # Panics
    ///
    /// Panics if the memory for the first block cannot be allocated.
    /// Use [`try_build()`][Self::try_build] to handle that case.
    #[must_use]
    pub fn build(self) -> Colony<T> {
        self.try_build().expect(
            "we do not intend to handle allocation failure as a real possibility - OOM is panic",
        )
    }

    /// Creates the colony, reporting allocation failure instead of panicking.
    ///
    /// # Examples
    ///
    /// ```
    /// use pinned_colony::Colony;
    ///
    /// let colony = Colony::<u64>::builder().try_build()?;
    /// assert!(colony.is_empty());
    /// # Ok::<(), pinned_colony::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the memory for the first block cannot be allocated.
    pub fn try_build(self) -> Result<Colony<T>> {
        Colony::try_new_inner(self.initial_block_capacity, self.drop_policy)
    }
}
