use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur when a colony needs to acquire more storage.
///
/// A colony that returns one of these errors is left exactly as it was before the call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The memory allocator could not provide storage for a new block.
    #[error("failed to allocate a colony block with capacity for {capacity} slots")]
    BlockAllocation {
        /// The number of slots the block was supposed to hold.
        capacity: usize,

        /// The allocation failure reported by the standard library.
        #[source]
        source: TryReserveError,
    },

    /// Doubling the capacity of the most recent block would overflow `usize`.
    #[error("cannot grow colony beyond a block with capacity for {previous_capacity} slots")]
    CapacityOverflow {
        /// Capacity of the most recent block, which could not be doubled.
        previous_capacity: usize,
    },
}

/// A specialized `Result` type for colony storage operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
