//! Manual spacing overrides set from the edit view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::tree::BlockKey;

/// One override as sent to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub key: BlockKey,
    pub margin: u32,
}

/// Block key → extra margin-top in px.
///
/// Only positive values are stored: a value that would drop to zero removes the
/// entry, so two maps with the same effective spacing always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideMap {
    margins: BTreeMap<BlockKey, u32>,
}

impl OverrideMap {
    /// Current override for `key`; absent keys read as 0.
    pub fn get(&self, key: BlockKey) -> u32 {
        self.margins.get(&key).copied().unwrap_or(0)
    }

    /// Adds `step` px above `key`. Returns the new value.
    pub fn increase(&mut self, key: BlockKey, step: u32) -> u32 {
        let value = self.get(key).saturating_add(step);
        if value > 0 {
            self.margins.insert(key, value);
        }
        value
    }

    /// Removes up to `step` px above `key`, clamping at 0. Returns the new value.
    pub fn decrease(&mut self, key: BlockKey, step: u32) -> u32 {
        let value = self.get(key).saturating_sub(step);
        if value == 0 {
            self.margins.remove(&key);
        } else {
            self.margins.insert(key, value);
        }
        value
    }

    pub fn clear(&mut self) {
        self.margins.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.margins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.margins.len()
    }

    pub fn entries(&self) -> Vec<OverrideEntry> {
        self.margins
            .iter()
            .map(|(&key, &margin)| OverrideEntry { key, margin })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_accumulates() {
        let mut map = OverrideMap::default();
        assert_eq!(map.increase(BlockKey::item(0), 50), 50);
        assert_eq!(map.increase(BlockKey::item(0), 50), 100);
        assert_eq!(map.get(BlockKey::item(0)), 100);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_decrease_removes_at_zero() {
        let mut map = OverrideMap::default();
        map.increase(BlockKey::section(1), 50);
        assert_eq!(map.decrease(BlockKey::section(1), 50), 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_decrease_clamps_and_never_stores_zero() {
        let mut map = OverrideMap::default();
        map.increase(BlockKey::item(2), 30);
        assert_eq!(map.decrease(BlockKey::item(2), 50), 0);
        assert_eq!(map.decrease(BlockKey::item(2), 50), 0);
        assert!(map.is_empty());
        assert_eq!(map, OverrideMap::default());
    }

    #[test]
    fn test_zero_step_increase_stores_nothing() {
        let mut map = OverrideMap::default();
        map.increase(BlockKey::item(0), 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_entries_are_in_key_order() {
        let mut map = OverrideMap::default();
        map.increase(BlockKey::item(1), 50);
        map.increase(BlockKey::section(0), 100);
        let entries = map.entries();
        assert_eq!(entries[0].key, BlockKey::section(0));
        assert_eq!(entries[1].key, BlockKey::item(1));
    }
}
