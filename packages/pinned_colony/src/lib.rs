#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! An unordered container with O(1) insertion, O(1) removal and stable item addresses.
//!
//! This crate provides [`Colony`], a dynamically growing container that never moves its items.
//! Storage is organized as a chain of blocks, each twice the size of the previous one, and the
//! slots of erased items are reused by later insertions.
//!
//! # Key Features
//!
//! - **Stable memory addresses**: Items never move once inserted (always pinned)
//! - **Constant-time insertion and erasure**: No shifting, no searching
//! - **Cursors**: Copyable positions used for access, traversal and erasure, which stay valid
//!   when other items are inserted or erased
//! - **Stable traversal order**: Items are visited in the order they were placed, with reused
//!   slots taking the place of the items they replaced
//! - **Pinning support**: [`std::pin::Pin<&T>`] and [`std::pin::Pin<&mut T>`] access to items
//! - **Flexible drop policies**: Configure behavior when the colony is dropped with remaining
//!   items
//! - **Fallible growth**: [`Colony::try_push()`] reports allocation failure instead of
//!   panicking
//!
//! # Example
//!
//! ```rust
//! use pinned_colony::Colony;
//!
//! let mut colony = Colony::new();
//!
//! let cursors: Vec<_> = (1..=5).map(|value| colony.push(value)).collect();
//!
//! // Erase the second item. The others are not affected.
//! colony.erase(cursors[1]);
//! assert_eq!(colony.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5]);
//!
//! // The next item reuses the freed slot and takes the erased item's place in the order.
//! colony.push(9);
//! assert_eq!(colony.iter().copied().collect::<Vec<_>>(), [1, 9, 3, 4, 5]);
//!
//! // Cursors obtained before are still good.
//! assert_eq!(*colony.get(cursors[4]), 5);
//! ```
//!
//! # Thread safety
//!
//! The colony is [`Send`] and [`Sync`] if its items are. It performs no internal
//! synchronization, so modifying it from several threads requires external locking.

mod block;
mod block_chain;
mod builder;
mod colony;
mod cursor;
mod drop_policy;
mod error;
mod free_list;
mod iter;
mod slot;

pub(crate) use block::*;
pub(crate) use block_chain::*;
pub use builder::*;
pub use colony::Colony;
pub use cursor::*;
pub use drop_policy::*;
pub use error::Error;
pub(crate) use error::Result;
pub(crate) use free_list::*;
pub use iter::*;
pub(crate) use slot::*;
