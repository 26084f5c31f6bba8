//! Inventory items.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An item a room script can place in a room's inventory.
///
/// Items are identified by name; two items with the same name are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    name: Arc<str>,
}

impl Item {
    /// Creates a new item with the given name.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the item's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Formats an inventory line: `Item: a` for one item, `Items: a, b` for more.
///
/// Names are sorted; an empty inventory yields an empty string.
#[must_use]
pub fn inventory_line<'a>(items: impl IntoIterator<Item = &'a Item>) -> String {
    let mut names: Vec<&str> = items
        .into_iter()
        .map(Item::name)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return String::new();
    }
    names.sort_unstable();
    let label = if names.len() == 1 { "Item" } else { "Items" };
    format!("{label}: {}", names.join(", "))
}
