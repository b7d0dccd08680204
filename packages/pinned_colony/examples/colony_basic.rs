//! Basic usage of the `pinned_colony` crate:
//!
//! * Creating a colony.
//! * Adding items.
//! * Traversing and erasing items with cursors.
//! * Reusing the slots of erased items.

use pinned_colony::Colony;

fn main() {
    let mut colony = Colony::<String>::new();

    // Pushing an item gives you a cursor that you can later use to access or erase the item.
    let alice = colony.push("Alice".to_string());
    let bob = colony.push("Bob".to_string());
    colony.push("Charlie".to_string());

    println!(
        "Colony contains {} items, with an auto-adjusting capacity of {}",
        colony.len(),
        colony.capacity()
    );

    println!("Retrieved item: {}", colony.get(alice));

    // Erasing is constant-time and leaves every other item (and every other cursor) alone.
    colony.erase(bob);

    // The next push reuses the slot Bob was in, including his place in the traversal order.
    colony.push("Dave".to_string());

    let names: Vec<&str> = colony.iter().map(String::as_str).collect();
    println!("Items in traversal order: {names:?}");

    // Cursors can also drive a traversal that erases as it goes.
    let mut cursor = colony.begin();
    while !colony.is_end(cursor) {
        if colony.get(cursor).starts_with('C') {
            cursor = colony.erase(cursor);
        } else {
            cursor = colony.advance(cursor);
        }
    }

    // Items can be modified in place. They are pinned, so they never move while in the colony.
    colony.get_mut(alice).push_str(" Smith");

    let names: Vec<&str> = colony.iter().map(String::as_str).collect();
    println!("Items after erasing everyone whose name starts with C: {names:?}");
}
