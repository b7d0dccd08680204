/// Determines what happens to remaining items when a [`Colony`][crate::Colony] is dropped.
///
/// By default, the colony drops its items in traversal order when it is dropped.
///
/// # Examples
///
/// ```
/// use pinned_colony::{Colony, DropPolicy};
///
/// let mut colony = Colony::<u32>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// let cursor = colony.push(42);
/// colony.erase(cursor);
///
/// // The colony is empty again, so dropping it is fine.
/// drop(colony);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The colony drops its items when the colony is dropped. This is the default.
    #[default]
    MayDropItems,

    /// The colony panics if it still contains items when it is dropped.
    ///
    /// Useful when items are referenced out of band through pointers obtained from the
    /// pinned references the colony hands out, and must be erased explicitly before the
    /// colony goes away.
    MustNotDropItems,
}
