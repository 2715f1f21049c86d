//! Inventory operations keyed by [`ItemId`].
//!
//! Quantities use checked arithmetic. Taking the last unit of an item keeps
//! the entry at zero so the item stays visible; selling removes it.

use std::collections::BTreeMap;

use farmstead_types::{InventoryItem, ItemId};

use crate::catalog;
use crate::error::DomainError;

/// Quantity of `item` held, zero if absent.
pub fn quantity(inventory: &BTreeMap<ItemId, u32>, item: ItemId) -> u32 {
    inventory.get(&item).copied().unwrap_or(0)
}

/// Add `amount` units of `item`, creating the entry if absent.
pub fn add_item(
    inventory: &mut BTreeMap<ItemId, u32>,
    item: ItemId,
    amount: u32,
) -> Result<(), DomainError> {
    let entry = inventory.entry(item).or_insert(0);
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| DomainError::overflow(format!("quantity of {item}")))?;
    Ok(())
}

/// Take `amount` units of `item`. The entry stays, possibly at zero.
pub fn take_item(
    inventory: &mut BTreeMap<ItemId, u32>,
    item: ItemId,
    amount: u32,
) -> Result<(), DomainError> {
    let current = quantity(inventory, item);
    let remaining = current
        .checked_sub(amount)
        .ok_or_else(|| DomainError::InsufficientResource {
            resource: item.to_string(),
            required: u64::from(amount),
            available: u64::from(current),
        })?;
    inventory.insert(item, remaining);
    Ok(())
}

/// Remove the entry for `item` entirely and return how many were held.
///
/// Rejects if none are held.
pub fn remove_all(inventory: &mut BTreeMap<ItemId, u32>, item: ItemId) -> Result<u32, DomainError> {
    match inventory.remove(&item) {
        Some(held) if held > 0 => Ok(held),
        _ => Err(DomainError::InsufficientResource {
            resource: item.to_string(),
            required: 1,
            available: 0,
        }),
    }
}

/// Catalog-enriched view of an inventory.
pub fn describe(inventory: &BTreeMap<ItemId, u32>) -> Vec<InventoryItem> {
    inventory
        .iter()
        .map(|(item, qty)| InventoryItem {
            id: *item,
            name: catalog::item_name(*item),
            kind: item.kind(),
            quantity: *qty,
            glyph: catalog::item_glyph(*item).to_owned(),
        })
        .collect()
}
