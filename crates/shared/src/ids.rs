use std::collections::BTreeSet;

use crate::models::{HasId, ItemId};

/// Next free id of a collection: one past the largest live id, `0` when empty.
///
/// Only the ids currently present matter. Deleted ids may come back, which is
/// fine because ids are only compared within the live collection. Once the
/// largest id is `ItemId::MAX` the smallest unused id is handed out instead.
pub fn next_id<T: HasId>(items: &[T]) -> ItemId {
    let Some(max) = items.iter().map(HasId::id).max() else {
        return 0;
    };
    max.checked_add(1).unwrap_or_else(|| smallest_unused(items))
}

fn smallest_unused<T: HasId>(items: &[T]) -> ItemId {
    let used: BTreeSet<ItemId> = items.iter().map(HasId::id).collect();
    // A slice cannot hold every u32, so the walk stops before the end.
    (0..=ItemId::MAX)
        .find(|id| !used.contains(id))
        .unwrap_or(ItemId::MAX)
}
