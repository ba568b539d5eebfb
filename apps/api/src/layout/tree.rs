//! Content tree and the flattened block index built from it.
//!
//! The renderer sends the tree with measured heights. Blocks are addressed by
//! `BlockKey` — their kind plus their ordinal within that kind's document-order
//! sequence — so `item-3` is the fourth item in the whole document regardless of
//! which section holds it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::geometry::PageGeometry;

// ────────────────────────────────────────────────────────────────────────────
// Tree types (supplied by the content provider)
// ────────────────────────────────────────────────────────────────────────────

/// An atomic entry inside a section (one job, one degree).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Measured height in px, margins excluded.
    pub height: f64,
}

/// A top-level group such as "Experience".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub name: String,
    /// Measured height in px including the section's items, margins excluded.
    pub height: f64,
    /// Allowed to break across a page boundary.
    #[serde(default)]
    pub splittable: bool,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentTree {
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Slack allowed when checking items against their section, for sub-pixel rounding.
const ITEM_FIT_TOLERANCE_PX: f64 = 1.0;

impl ContentTree {
    /// Checks the measurements before they reach the layout passes.
    ///
    /// - every height is finite and non-negative
    /// - a section's items fit inside the section they belong to
    /// - the document, margins excluded, stays within `geometry.max_pages`
    pub fn validate(&self, geometry: &PageGeometry) -> Result<(), String> {
        let max_height = geometry.max_flowed_height();
        let mut total = 0.0_f64;

        for (s_idx, section) in self.sections.iter().enumerate() {
            if !is_valid_height(section.height) {
                return Err(format!(
                    "section {s_idx} has invalid height {}",
                    section.height
                ));
            }

            let mut items_height = 0.0_f64;
            for (i_idx, item) in section.items.iter().enumerate() {
                if !is_valid_height(item.height) {
                    return Err(format!(
                        "item {i_idx} of section {s_idx} has invalid height {}",
                        item.height
                    ));
                }
                items_height += item.height;
            }
            if items_height > section.height + ITEM_FIT_TOLERANCE_PX {
                return Err(format!(
                    "items of section {s_idx} measure {items_height}px but the section is only {}px",
                    section.height
                ));
            }

            total += section.height;
            if total > max_height {
                return Err(format!(
                    "document is taller than {} pages ({max_height}px)",
                    geometry.max_pages
                ));
            }
        }
        Ok(())
    }
}

fn is_valid_height(h: f64) -> bool {
    h.is_finite() && h >= 0.0
}

// ────────────────────────────────────────────────────────────────────────────
// Block keys
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Section,
    Item,
}

/// Stable address of a block: kind + position in that kind's flattened array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockKey {
    pub kind: BlockKind,
    pub index: usize,
}

impl BlockKey {
    pub fn section(index: usize) -> Self {
        Self {
            kind: BlockKind::Section,
            index,
        }
    }

    pub fn item(index: usize) -> Self {
        Self {
            kind: BlockKind::Item,
            index,
        }
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BlockKind::Section => write!(f, "section-{}", self.index),
            BlockKind::Item => write!(f, "item-{}", self.index),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Flattened index
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SectionEntry {
    pub height: f64,
    pub splittable: bool,
    /// Range of this section's items in `BlockIndex::items`.
    pub first_item: usize,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemEntry {
    /// Index of the owning section in `BlockIndex::sections`.
    pub section: usize,
}

/// Document-order arrays of every section and every item, built once per pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockIndex {
    pub sections: Vec<SectionEntry>,
    pub items: Vec<ItemEntry>,
}

impl BlockIndex {
    pub fn build(tree: &ContentTree) -> Self {
        let mut index = BlockIndex {
            sections: Vec::with_capacity(tree.sections.len()),
            items: Vec::new(),
        };

        for (s_idx, section) in tree.sections.iter().enumerate() {
            index.sections.push(SectionEntry {
                height: section.height,
                splittable: section.splittable,
                first_item: index.items.len(),
                item_count: section.items.len(),
            });
            index
                .items
                .extend(section.items.iter().map(|_| ItemEntry { section: s_idx }));
        }

        index
    }

    pub fn contains(&self, key: BlockKey) -> bool {
        match key.kind {
            BlockKind::Section => key.index < self.sections.len(),
            BlockKind::Item => key.index < self.items.len(),
        }
    }

    /// Key of the item at `position` within section `section`, if both exist.
    pub fn item_in_section(&self, section: usize, position: usize) -> Option<BlockKey> {
        let entry = self.sections.get(section)?;
        (position < entry.item_count).then(|| BlockKey::item(entry.first_item + position))
    }

    /// The block that receives space when "add space below" is applied to `key`.
    ///
    /// Items advance through the global item sequence, crossing section borders.
    /// Only the very last item falls back to the section after its own.
    pub fn next_block(&self, key: BlockKey) -> Option<BlockKey> {
        if !self.contains(key) {
            return None;
        }
        match key.kind {
            BlockKind::Item => {
                if key.index + 1 < self.items.len() {
                    return Some(BlockKey::item(key.index + 1));
                }
                let owner = self.items[key.index].section;
                self.next_section(owner)
            }
            BlockKind::Section => self.next_section(key.index),
        }
    }

    fn next_section(&self, index: usize) -> Option<BlockKey> {
        (index + 1 < self.sections.len()).then(|| BlockKey::section(index + 1))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
