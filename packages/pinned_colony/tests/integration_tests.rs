//! Integration tests for the `pinned_colony` package.
//!
//! These exercise the public API the way a consumer would: cursors held across unrelated
//! insertions and erasures, pinned items that are not `Unpin` and cloning of whole colonies.

use std::collections::HashMap;
use std::marker::PhantomPinned;
use std::pin::Pin;
use std::ptr;
use std::sync::Arc;
use std::thread;

use new_zealand::nz;
use pinned_colony::{Colony, Cursor, DropPolicy};

#[test]
fn push_erase_push_scenario() {
    let mut colony = Colony::new();

    let cursors: Vec<_> = (1..=5).map(|value| colony.push(value)).collect();
    assert_eq!(colony.len(), 5);

    colony.erase(cursors[1]);
    assert_eq!(colony.len(), 4);
    assert_eq!(colony.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5]);

    colony.push(9);
    assert_eq!(colony.len(), 5);
    assert_eq!(colony.iter().copied().collect::<Vec<_>>(), [1, 9, 3, 4, 5]);
}

#[test]
fn traversal_by_cursor_matches_iterator() {
    let mut colony: Colony<u32> = (0..200).collect();
    colony.retain(|value| value % 3 != 1);

    let mut by_cursor = Vec::new();
    let mut cursor = colony.begin();

    while !colony.is_end(cursor) {
        by_cursor.push(*colony.get(cursor));
        cursor = colony.advance(cursor);
    }

    assert!(colony.same_position(cursor, colony.end()));
    assert_eq!(by_cursor, colony.iter().copied().collect::<Vec<_>>());
    assert_eq!(by_cursor.len(), colony.len());
}

#[test]
fn erase_every_item_through_begin() {
    let mut colony = Colony::new();

    for value in 0..33 {
        colony.push(value);
    }

    while !colony.is_end(colony.begin()) {
        colony.erase(colony.begin());
    }

    assert!(colony.is_empty());
    assert_eq!(colony.iter().count(), 0);
}

#[test]
fn cursors_survive_unrelated_erasures() {
    let mut colony = Colony::new();

    // Keep a cursor for every item, keyed by the item.
    let cursors: HashMap<u32, Cursor> = (0..100).map(|value| (value, colony.push(value))).collect();

    // Erase every third item through its own cursor, from the back so that no erased item is
    // the predecessor of a later erasure target.
    for value in (0..100).rev().filter(|value| value % 3 == 0) {
        colony.erase(cursors[&value]);
    }

    for (value, cursor) in &cursors {
        if value % 3 != 0 {
            assert_eq!(*colony.get(*cursor), *value);
        }
    }
}

#[test]
fn pinned_items_keep_their_address() {
    struct SelfAware {
        value: u64,
        _pinned: PhantomPinned,
    }

    let mut colony = Colony::builder().initial_block_capacity(nz!(2)).build();

    let cursors: Vec<_> = (0..64)
        .map(|value| {
            colony.push(SelfAware {
                value,
                _pinned: PhantomPinned,
            })
        })
        .collect();

    let addresses: Vec<*const SelfAware> = cursors
        .iter()
        .map(|cursor| ptr::from_ref(colony.get(*cursor).get_ref()))
        .collect();

    for value in 1000..3000 {
        colony.push(SelfAware {
            value,
            _pinned: PhantomPinned,
        });
    }

    for (cursor, address) in cursors.iter().zip(&addresses) {
        let item: Pin<&SelfAware> = colony.get(*cursor);
        assert_eq!(ptr::from_ref(item.get_ref()), *address);
    }

    // Moving the colony does not move the items either.
    let moved = colony;
    assert_eq!(ptr::from_ref(moved.get(cursors[10]).get_ref()), addresses[10]);
    assert_eq!(moved.get(cursors[10]).value, 10);

    // Items that are not `Unpin` can only be erased, never moved out.
    let mut moved = moved;
    moved.clear();
    assert!(moved.is_empty());
}

#[test]
fn slot_is_reused_after_erase() {
    let mut colony = Colony::new();

    colony.push(String::from("first"));
    let second = colony.push(String::from("second"));
    colony.push(String::from("third"));

    let second_address = ptr::from_ref(colony.get(second).get_ref());
    colony.erase(second);

    let replacement = colony.push(String::from("replacement"));

    assert_eq!(ptr::from_ref(colony.get(replacement).get_ref()), second_address);
    assert_eq!(
        colony.iter().map(String::as_str).collect::<Vec<_>>(),
        ["first", "replacement", "third"]
    );
}

#[test]
fn clone_across_blocks() {
    let mut original = Colony::builder().initial_block_capacity(nz!(8)).build();

    for value in 0..40_u64 {
        original.push(value);
    }

    let copy = original.clone();

    assert_eq!(copy.len(), 40);
    assert!(original.iter().eq(copy.iter()));

    // The copy holds all items in a single block sized to fit them.
    assert_eq!(copy.capacity(), 41);

    // Modifying the original does not affect the copy.
    original.clear();
    assert_eq!(copy.len(), 40);
}

#[test]
fn clone_of_empty_colony_is_minimal() {
    let original = Colony::<u32>::new();
    let copy = original.clone();

    assert!(copy.is_empty());
    assert_eq!(copy.capacity(), 16);
}

#[test]
fn try_push_succeeds_normally() {
    let mut colony = Colony::new();

    for value in 0..100 {
        let cursor = colony.try_push(value).unwrap();
        assert_eq!(*colony.get(cursor), value);
    }

    assert_eq!(colony.len(), 100);
}

#[test]
fn into_iter_moves_items_out() {
    let colony: Colony<String> = ["a", "b", "c"].into_iter().map(String::from).collect();

    let drained: Vec<String> = colony.into_iter().collect();

    assert_eq!(drained, ["a", "b", "c"]);
}

#[test]
fn must_not_drop_policy_allows_drop_once_emptied() {
    let mut colony = Colony::builder()
        .drop_policy(DropPolicy::MustNotDropItems)
        .build();

    let cursor = colony.push(Arc::new(5));
    let item = colony.remove(cursor);

    assert_eq!(*item, 5);
    drop(colony);
}

#[test]
fn colony_can_move_between_threads() {
    let mut colony = Colony::new();
    let cursor = colony.push(String::from("hello"));

    let colony = thread::spawn(move || {
        colony.get_mut(cursor).push_str(" world");
        colony
    })
    .join()
    .unwrap();

    assert_eq!(&*colony.get(cursor), "hello world");
}

#[test]
fn shared_reads_from_many_threads() {
    let colony: Arc<Colony<u32>> = Arc::new((0..1000).collect());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let colony = Arc::clone(&colony);
            thread::spawn(move || colony.iter().map(|value| u64::from(*value)).sum::<u64>())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 499_500);
    }
}
