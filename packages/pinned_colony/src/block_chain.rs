use std::any::type_name;
use std::num::NonZero;

use tracing::{debug, trace};

use crate::{Block, Error, Result, Slot, SlotIndex};

/// The storage of a colony: an append-only chain of blocks, each twice the size of the one
/// before it.
///
/// Blocks are owned by a `Vec` and addressed by position, so a slot is identified by the pair
/// (block index, index in block). Growing the `Vec` moves the block headers around but never
/// the slot buffers they own, so slot addresses are unaffected.
#[derive(Debug)]
pub(crate) struct BlockChain<T> {
    /// Never empty. The last block is the only one that may have unused slots.
    blocks: Vec<Block<T>>,

    /// When set, the next growth attempt fails as if the allocator had refused the block.
    #[cfg(test)]
    fail_next_growth: bool,
}

impl<T> BlockChain<T> {
    /// Creates a chain consisting of one empty block with room for `capacity` slots.
    pub(crate) fn try_new(capacity: NonZero<usize>) -> Result<Self> {
        let first = Block::try_new(capacity)?;

        let mut blocks = Vec::new();
        blocks
            .try_reserve(1)
            .map_err(|source| Error::BlockAllocation {
                capacity: capacity.get(),
                source,
            })?;
        blocks.push(first);

        Ok(Self {
            blocks,
            #[cfg(test)]
            fail_next_growth: false,
        })
    }

    /// Total number of slots in all blocks, whether in use or not.
    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.blocks
            .iter()
            .map(Block::capacity)
            .try_fold(0_usize, usize::checked_add)
            .expect("the blocks exist in memory, so their combined capacity fits in usize")
    }

    #[must_use]
    pub(crate) fn block_count(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub(crate) fn is_full(&self) -> bool {
        self.last_block().is_full()
    }

    /// Links a new block, twice the size of the current last one, to the end of the chain.
    ///
    /// On failure the chain is left exactly as it was.
    pub(crate) fn try_grow(&mut self) -> Result<()> {
        let block = self.allocate_next_block().inspect_err(|error| {
            debug!(
                item_type = type_name::<T>(),
                previous_capacity = self.last_block().capacity(),
                %error,
                "colony block allocation failed"
            );
        })?;

        let capacity = block.capacity();

        self.blocks
            .try_reserve(1)
            .map_err(|source| Error::BlockAllocation { capacity, source })?;
        self.blocks.push(block);

        trace!(
            item_type = type_name::<T>(),
            capacity,
            block_count = self.blocks.len(),
            "allocated colony block"
        );

        Ok(())
    }

    fn allocate_next_block(&mut self) -> Result<Block<T>> {
        #[cfg(test)]
        if self.fail_next_growth {
            self.fail_next_growth = false;

            // No allocator can satisfy this, so it fails the same way a real refusal does.
            return Block::try_new(NonZero::<usize>::MAX);
        }

        Block::try_allocate_next(self.last_block())
    }

    /// Makes the next [`try_grow()`][Self::try_grow] fail with [`Error::BlockAllocation`].
    #[cfg(test)]
    pub(crate) fn fail_next_growth(&mut self) {
        self.fail_next_growth = true;
    }

    /// Places a slot in the first unused position of the last block.
    ///
    /// # Panics
    ///
    /// Panics if the chain is full. Call [`try_grow()`][Self::try_grow] first.
    pub(crate) fn append(&mut self, slot: Slot<T>) -> SlotIndex {
        let block_index = self
            .blocks
            .len()
            .checked_sub(1)
            .expect("a block chain always has at least one block");

        let index_in_block = self.last_block_mut().append(slot);

        SlotIndex::from_parts(block_index, index_in_block)
    }

    /// # Panics
    ///
    /// Panics if the index does not refer to an allocated slot.
    #[must_use]
    pub(crate) fn slot(&self, index: SlotIndex) -> &Slot<T> {
        self.block(index.block_index()).slot(index.index_in_block())
    }

    /// # Panics
    ///
    /// Panics if the index does not refer to an allocated slot.
    #[must_use]
    pub(crate) fn slot_mut(&mut self, index: SlotIndex) -> &mut Slot<T> {
        self.block_mut(index.block_index())
            .slot_mut(index.index_in_block())
    }

    /// Raw pointer to a slot, for iterators that hand out exclusive references to several
    /// slots at once.
    ///
    /// Obtaining the pointer does not borrow any other slot, so it does not invalidate
    /// references to other slots.
    ///
    /// # Panics
    ///
    /// Panics if the index does not refer to an allocated slot.
    #[must_use]
    pub(crate) fn slot_ptr(&mut self, index: SlotIndex) -> *mut Slot<T> {
        self.block_mut(index.block_index())
            .slot_ptr(index.index_in_block())
    }

    #[cfg(test)]
    pub(crate) fn blocks(&self) -> impl Iterator<Item = &Block<T>> {
        self.blocks.iter()
    }

    fn block(&self, block_index: usize) -> &Block<T> {
        self.blocks.get(block_index).unwrap_or_else(|| {
            panic!(
                "block {block_index} out of bounds in colony of {}",
                type_name::<T>()
            )
        })
    }

    fn block_mut(&mut self, block_index: usize) -> &mut Block<T> {
        self.blocks.get_mut(block_index).unwrap_or_else(|| {
            panic!(
                "block {block_index} out of bounds in colony of {}",
                type_name::<T>()
            )
        })
    }

    fn last_block(&self) -> &Block<T> {
        self.blocks
            .last()
            .expect("a block chain always has at least one block")
    }

    fn last_block_mut(&mut self) -> &mut Block<T> {
        self.blocks
            .last_mut()
            .expect("a block chain always has at least one block")
    }
}
