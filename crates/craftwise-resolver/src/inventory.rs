//! Inventory aggregation.
//!
//! Stacks arrive from several storage locations. Aggregation flattens them
//! and sums counts per item; the result is what craftability is checked
//! against.

use ahash::AHashMap;
use craftwise_common::{CharacterName, ItemId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a stack is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StorageSource {
    /// Account material storage.
    #[default]
    Materials,
    /// Account bank slots.
    Bank,
    /// Shared inventory slots.
    SharedInventory,
    /// A character's bags.
    CharacterBag,
}

/// Identifies one storage snapshot.
///
/// Account-wide sources have no owner. Each character's bags are a separate
/// snapshot, so two characters never replace each other's stacks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey {
    /// Storage location.
    pub source: StorageSource,
    /// Owning character, for bags.
    pub owner: Option<CharacterName>,
}

impl StorageKey {
    /// Key of an account-wide source.
    #[must_use]
    pub const fn account(source: StorageSource) -> Self {
        Self {
            source,
            owner: None,
        }
    }

    /// Key of one character's bags.
    #[must_use]
    pub fn bags(character: impl Into<CharacterName>) -> Self {
        Self {
            source: StorageSource::CharacterBag,
            owner: Some(character.into()),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{:?} of {}", self.source, owner),
            None => write!(f, "{:?}", self.source),
        }
    }
}

/// A stack of items in one storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStack {
    /// Item type stored.
    pub item: ItemId,
    /// Quantity in the stack.
    pub count: u32,
    /// Storage location.
    #[serde(default)]
    pub source: StorageSource,
}

impl InventoryStack {
    /// Creates a new stack.
    #[must_use]
    pub const fn new(item: ItemId, count: u32, source: StorageSource) -> Self {
        Self {
            item,
            count,
            source,
        }
    }
}

/// Per-item totals across every storage source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryTotals {
    counts: AHashMap<ItemId, u64>,
}

impl InventoryTotals {
    /// Creates empty totals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total of an item, 0 when absent.
    #[must_use]
    pub fn count(&self, item: ItemId) -> u64 {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    /// Checks if at least `amount` of an item is held.
    #[must_use]
    pub fn has(&self, item: ItemId, amount: u32) -> bool {
        self.count(item) >= u64::from(amount)
    }

    /// Adds a quantity of an item.
    pub fn add(&mut self, item: ItemId, amount: u64) {
        let entry = self.counts.entry(item).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Adds every total from `other` into this one.
    pub fn merge(&mut self, other: &Self) {
        for (&item, &amount) in &other.counts {
            self.add(item, amount);
        }
    }

    /// Returns the number of distinct items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns an iterator over all totals.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u64)> + '_ {
        self.counts.iter().map(|(&id, &count)| (id, count))
    }
}

impl FromIterator<(ItemId, u64)> for InventoryTotals {
    fn from_iter<T: IntoIterator<Item = (ItemId, u64)>>(iter: T) -> Self {
        let mut totals = Self::new();
        for (item, amount) in iter {
            totals.add(item, amount);
        }
        totals
    }
}

/// Sums stacks from every source into per-item totals.
///
/// `None` entries are empty slots and are skipped. The result does not
/// depend on source or stack order.
#[must_use]
pub fn aggregate<S: AsRef<[Option<InventoryStack>]>>(sources: &[S]) -> InventoryTotals {
    sources
        .iter()
        .flat_map(|source| source.as_ref().iter().flatten())
        .map(|stack| (stack.item, u64::from(stack.count)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stack(item: u32, count: u32) -> Option<InventoryStack> {
        Some(InventoryStack::new(
            ItemId::new(item),
            count,
            StorageSource::Materials,
        ))
    }

    #[test]
    fn test_aggregate_sums_across_sources() {
        let materials = vec![stack(5, 250), stack(6, 1)];
        let bank = vec![stack(5, 10), None, stack(5, 3), None];

        let totals = aggregate(&[materials, bank]);
        assert_eq!(totals.count(ItemId::new(5)), 263);
        assert_eq!(totals.count(ItemId::new(6)), 1);
        assert_eq!(totals.count(ItemId::new(7)), 0);
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn test_aggregate_empty_sources() {
        let empty: [Vec<Option<InventoryStack>>; 0] = [];
        assert!(aggregate(&empty).is_empty());
        assert!(aggregate(&[vec![None, None]]).is_empty());
    }

    #[test]
    fn test_totals_has() {
        let totals = aggregate(&[vec![stack(1, 10)]]);
        assert!(totals.has(ItemId::new(1), 10));
        assert!(!totals.has(ItemId::new(1), 11));
        assert!(totals.has(ItemId::new(2), 0));
    }

    #[test]
    fn test_totals_saturate() {
        let mut totals = InventoryTotals::new();
        totals.add(ItemId::new(1), u64::MAX);
        totals.add(ItemId::new(1), 5);
        assert_eq!(totals.count(ItemId::new(1)), u64::MAX);
    }

    fn stacks() -> impl Strategy<Value = Vec<Option<InventoryStack>>> {
        prop::collection::vec(
            prop::option::of((0u32..20, 0u32..1000).prop_map(|(item, count)| {
                InventoryStack::new(ItemId::new(item), count, StorageSource::Bank)
            })),
            0..40,
        )
    }

    proptest! {
        #[test]
        fn prop_aggregate_distributes_over_concat(a in stacks(), b in stacks()) {
            let separate_a = aggregate(&[a.clone()]);
            let separate_b = aggregate(&[b.clone()]);
            let mut joined = a;
            joined.extend(b);
            let combined = aggregate(&[joined]);

            for item in 0..20 {
                let id = ItemId::new(item);
                prop_assert_eq!(combined.count(id), separate_a.count(id) + separate_b.count(id));
            }

            let mut merged = separate_a;
            merged.merge(&separate_b);
            prop_assert_eq!(merged, combined);
        }

        #[test]
        fn prop_aggregate_ignores_order(mut a in stacks()) {
            let forward = aggregate(&[a.clone()]);
            a.reverse();
            prop_assert_eq!(aggregate(&[a]), forward);
        }
    }
}
