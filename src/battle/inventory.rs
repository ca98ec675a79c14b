//! Inventory - consumable items visible on the battle page

use crate::core::types::ItemId;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Remaining quantity per consumable item
///
/// Items absent from the map have quantity zero. Nothing here assumes
/// infinite stock: every use goes through `consume`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: AHashMap<ItemId, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tracked quantity of an item
    pub fn set(&mut self, item: ItemId, quantity: u32) {
        self.items.insert(item, quantity);
    }

    /// Current quantity of an item
    pub fn get(&self, item: ItemId) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    pub fn has(&self, item: ItemId) -> bool {
        self.get(item) > 0
    }

    /// Use one unit, returns true if one was available
    pub fn consume(&mut self, item: ItemId) -> bool {
        match self.items.get_mut(&item) {
            Some(quantity) if *quantity > 0 => {
                *quantity -= 1;
                true
            }
            _ => false,
        }
    }

    /// First item of `preference` still in stock
    pub fn first_available(&self, preference: &[ItemId]) -> Option<ItemId> {
        preference.iter().copied().find(|item| self.has(*item))
    }

    pub fn is_empty(&self) -> bool {
        self.items.values().all(|q| *q == 0)
    }
}

impl FromIterator<(ItemId, u32)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (ItemId, u32)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
