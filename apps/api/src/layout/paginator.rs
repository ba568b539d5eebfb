//! Pagination — turns a measured content tree into per-block margins and a page count.
//!
//! # Strategies
//! - `compute_auto_layout` (page view): one greedy forward pass that pushes any
//!   atomic section straddling a page boundary onto the next page.
//! - `compute_manual_layout` (edit view): applies the user's spacing overrides and
//!   nothing else.
//!
//! Both are pure functions of their inputs. Heights must be measured with every
//! margin removed; feeding heights measured with margins applied double counts them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::editor::overrides::OverrideMap;
use crate::layout::geometry::PageGeometry;
use crate::layout::tree::{BlockIndex, BlockKey, ContentTree};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Where the margins of a layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginSource {
    Auto,
    Manual,
}

/// Flowed position of one section after margins are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPlacement {
    pub key: BlockKey,
    pub margin_top: f64,
    pub top: f64,
    pub bottom: f64,
    pub first_page: usize,
    pub last_page: usize,
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub source: MarginSource,
    pub total_pages: usize,
    /// Total height of the tree with margins applied.
    pub flowed_height: f64,
    /// Non-zero margins only; absent blocks get 0.
    pub margins: BTreeMap<BlockKey, f64>,
    pub placements: Vec<SectionPlacement>,
    /// y positions of page boundaries inside the flowed document.
    pub page_breaks: Vec<f64>,
}

impl PageLayout {
    /// Margin-top (px) the renderer applies before `key`.
    pub fn margin_for(&self, key: BlockKey) -> f64 {
        self.margins.get(&key).copied().unwrap_or(0.0)
    }

    /// Layout of an empty document: one blank page.
    pub fn empty(source: MarginSource) -> Self {
        Self {
            source,
            total_pages: 1,
            flowed_height: 0.0,
            margins: BTreeMap::new(),
            placements: Vec::new(),
            page_breaks: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Computes page-view margins from scratch.
///
/// For each section in order:
/// 1. `top = natural_top + shift`, `bottom = top + height`
/// 2. `page_end` = first page boundary strictly after `top`
/// 3. if the section straddles `page_end`, is not splittable and is no taller than
///    the fit threshold → `margin = page_end - top + buffer`, `shift += margin`
///
/// Sections taller than the threshold would not fit on a fresh page either, so they
/// break naturally. Items never receive auto margins.
pub fn compute_auto_layout(tree: &ContentTree, geometry: &PageGeometry) -> PageLayout {
    if tree.sections.is_empty() {
        return PageLayout::empty(MarginSource::Auto);
    }

    let index = BlockIndex::build(tree);
    let fit_threshold = geometry.fit_threshold();
    let mut margins = BTreeMap::new();
    let mut placements = Vec::with_capacity(index.sections.len());
    let mut natural_top = 0.0_f64;
    let mut shift = 0.0_f64;

    for (idx, section) in index.sections.iter().enumerate() {
        let top = natural_top + shift;
        let bottom = top + section.height;
        let page_end = geometry.next_page_boundary(top);

        let straddles = bottom > page_end && top < page_end;
        let margin = if straddles && !section.splittable && section.height <= fit_threshold {
            page_end - top + geometry.buffer
        } else {
            0.0
        };

        let key = BlockKey::section(idx);
        if margin > 0.0 {
            margins.insert(key, margin);
            shift += margin;
        }

        placements.push(place(key, margin, top + margin, section.height, geometry));
        natural_top += section.height;
    }

    finish(MarginSource::Auto, margins, placements, natural_top + shift, geometry)
}

/// Computes edit-view margins: overrides only, no auto margins.
///
/// Overrides on items grow their section's flowed height; overrides on a section
/// push the section itself down. Overrides whose key no longer exists in the tree
/// are ignored.
pub fn compute_manual_layout(
    tree: &ContentTree,
    overrides: &OverrideMap,
    geometry: &PageGeometry,
) -> PageLayout {
    if tree.sections.is_empty() {
        return PageLayout::empty(MarginSource::Manual);
    }

    let index = BlockIndex::build(tree);
    let mut margins = BTreeMap::new();
    let mut placements = Vec::with_capacity(index.sections.len());
    let mut cursor = 0.0_f64;

    for (idx, section) in index.sections.iter().enumerate() {
        let key = BlockKey::section(idx);
        let margin = overrides.get(key) as f64;
        if margin > 0.0 {
            margins.insert(key, margin);
        }

        let mut item_margins = 0.0_f64;
        for item_idx in section.first_item..section.first_item + section.item_count {
            let item_key = BlockKey::item(item_idx);
            let item_margin = overrides.get(item_key) as f64;
            if item_margin > 0.0 {
                margins.insert(item_key, item_margin);
                item_margins += item_margin;
            }
        }

        let top = cursor + margin;
        let flowed = section.height + item_margins;
        placements.push(place(key, margin, top, flowed, geometry));
        cursor = top + flowed;
    }

    finish(MarginSource::Manual, margins, placements, cursor, geometry)
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn place(
    key: BlockKey,
    margin_top: f64,
    top: f64,
    height: f64,
    geometry: &PageGeometry,
) -> SectionPlacement {
    let bottom = top + height;
    let first_page = geometry.page_index_at(top);
    // A section ending exactly on a boundary does not spill onto the next page.
    let last_page = ((bottom / geometry.page_height).ceil() as usize)
        .saturating_sub(1)
        .max(first_page);
    SectionPlacement {
        key,
        margin_top,
        top,
        bottom,
        first_page,
        last_page,
    }
}

fn finish(
    source: MarginSource,
    margins: BTreeMap<BlockKey, f64>,
    placements: Vec<SectionPlacement>,
    flowed_height: f64,
    geometry: &PageGeometry,
) -> PageLayout {
    let total_pages = geometry.page_count(flowed_height);
    let page_breaks = (1..total_pages)
        .map(|page| page as f64 * geometry.page_height)
        .collect();

    PageLayout {
        source,
        total_pages,
        flowed_height,
        margins,
        placements,
        page_breaks,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::default_page_geometry;
    use crate::layout::tree::{Item, Section};

    /// Round numbers: 1000px pages, 10px buffer, threshold 930px.
    fn make_geometry() -> PageGeometry {
        PageGeometry {
            page_height: 1000.0,
            page_width: 700.0,
            buffer: 10.0,
            fit_threshold_ratio: 0.93,
            spacing_step: 50,
            max_pages: 100,
        }
    }

    fn make_section(height: f64, splittable: bool) -> Section {
        Section {
            name: String::new(),
            height,
            splittable,
            items: vec![],
        }
    }

    fn make_tree(sections: Vec<Section>) -> ContentTree {
        ContentTree { sections }
    }

    // ── compute_auto_layout ─────────────────────────────────────────────────

    #[test]
    fn test_straddling_section_pushed_past_boundary() {
        let tree = make_tree(vec![make_section(400.0, false), make_section(700.0, false)]);
        let layout = compute_auto_layout(&tree, &make_geometry());

        assert_eq!(layout.margin_for(BlockKey::section(0)), 0.0);
        assert_eq!(layout.margin_for(BlockKey::section(1)), 610.0);
        assert_eq!(layout.placements[1].top, 1010.0);
        assert_eq!(layout.flowed_height, 1710.0);
        assert_eq!(layout.total_pages, 2);
        assert_eq!(layout.page_breaks, vec![1000.0]);
    }

    #[test]
    fn test_empty_tree_is_one_page() {
        let layout = compute_auto_layout(&ContentTree::default(), &make_geometry());
        assert_eq!(layout.total_pages, 1);
        assert!(layout.margins.is_empty());
        assert!(layout.page_breaks.is_empty());
        assert_eq!(layout, PageLayout::empty(MarginSource::Auto));
    }

    #[test]
    fn test_splittable_oversized_section_never_pushed() {
        let tree = make_tree(vec![make_section(500.0, false), make_section(960.0, true)]);
        let layout = compute_auto_layout(&tree, &make_geometry());
        assert!(layout.margins.is_empty());
        assert_eq!(layout.total_pages, 2);
    }

    #[test]
    fn test_splittable_section_within_threshold_not_pushed() {
        let tree = make_tree(vec![make_section(800.0, false), make_section(400.0, true)]);
        let layout = compute_auto_layout(&tree, &make_geometry());
        assert_eq!(layout.margin_for(BlockKey::section(1)), 0.0);
        assert_eq!(layout.placements[1].first_page, 0);
        assert_eq!(layout.placements[1].last_page, 1);
    }

    #[test]
    fn test_section_above_threshold_breaks_naturally() {
        // 940 > 930: would not fit on a fresh page either.
        let tree = make_tree(vec![make_section(300.0, false), make_section(940.0, false)]);
        let layout = compute_auto_layout(&tree, &make_geometry());
        assert!(layout.margins.is_empty());
        assert_eq!(layout.flowed_height, 1240.0);
    }

    #[test]
    fn test_section_at_threshold_is_pushed() {
        let tree = make_tree(vec![make_section(300.0, false), make_section(930.0, false)]);
        let layout = compute_auto_layout(&tree, &make_geometry());
        assert_eq!(layout.margin_for(BlockKey::section(1)), 710.0);
    }

    #[test]
    fn test_section_ending_on_boundary_not_pushed() {
        let tree = make_tree(vec![make_section(400.0, false), make_section(600.0, false)]);
        let layout = compute_auto_layout(&tree, &make_geometry());
        assert!(layout.margins.is_empty());
        assert_eq!(layout.total_pages, 1);
        assert_eq!(layout.placements[1].last_page, 0);
    }

    #[test]
    fn test_shift_carries_into_later_sections() {
        // B is pushed to 1010; C then starts at 1610 and straddles 2000.
        let tree = make_tree(vec![
            make_section(400.0, false),
            make_section(600.0 + 1.0, false),
            make_section(500.0, false),
        ]);
        let layout = compute_auto_layout(&tree, &make_geometry());
        assert_eq!(layout.margin_for(BlockKey::section(1)), 610.0);
        let c = &layout.placements[2];
        assert_eq!(c.top - c.margin_top, 1611.0);
        assert_eq!(c.margin_top, 2000.0 - 1611.0 + 10.0);
        assert_eq!(c.top, 2010.0);
        assert_eq!(layout.total_pages, 3);
    }

    #[test]
    fn test_section_starting_on_boundary_uses_following_boundary() {
        let tree = make_tree(vec![make_section(1000.0, false), make_section(500.0, false)]);
        let layout = compute_auto_layout(&tree, &make_geometry());
        assert!(layout.margins.is_empty());
        assert_eq!(layout.placements[1].first_page, 1);
    }

    #[test]
    fn test_auto_layout_is_idempotent() {
        let tree = make_tree(vec![
            make_section(650.0, false),
            make_section(500.0, false),
            make_section(900.0, false),
            make_section(1200.0, true),
            make_section(300.0, false),
        ]);
        let geometry = default_page_geometry();
        let first = compute_auto_layout(&tree, &geometry);
        for _ in 0..5 {
            assert_eq!(compute_auto_layout(&tree, &geometry), first);
        }
    }

    #[test]
    fn test_page_count_matches_flowed_height() {
        let geometry = default_page_geometry();
        for n in 0..12 {
            let sections = (0..n)
                .map(|i| make_section(180.0 + (i as f64 * 97.0) % 600.0, i % 4 == 3))
                .collect();
            let layout = compute_auto_layout(&make_tree(sections), &geometry);
            let expected = ((layout.flowed_height / geometry.page_height).ceil() as usize).max(1);
            assert_eq!(layout.total_pages, expected);
        }
    }

    #[test]
    fn test_items_never_get_auto_margins() {
        let mut section = make_section(700.0, false);
        section.items = vec![Item { height: 300.0 }, Item { height: 400.0 }];
        let tree = make_tree(vec![make_section(400.0, false), section]);
        let layout = compute_auto_layout(&tree, &make_geometry());
        assert_eq!(layout.margin_for(BlockKey::item(0)), 0.0);
        assert_eq!(layout.margin_for(BlockKey::item(1)), 0.0);
        assert_eq!(layout.margins.len(), 1);
    }

    // ── compute_manual_layout ───────────────────────────────────────────────

    #[test]
    fn test_manual_layout_applies_overrides_only() {
        let mut section = make_section(700.0, false);
        section.items = vec![Item { height: 300.0 }, Item { height: 400.0 }];
        let tree = make_tree(vec![make_section(400.0, false), section]);

        let mut overrides = OverrideMap::default();
        overrides.increase(BlockKey::item(1), 100);
        overrides.increase(BlockKey::section(0), 50);

        let layout = compute_manual_layout(&tree, &overrides, &make_geometry());
        assert_eq!(layout.source, MarginSource::Manual);
        // The straddling section gets no auto margin in edit view.
        assert_eq!(layout.margin_for(BlockKey::section(1)), 0.0);
        assert_eq!(layout.margin_for(BlockKey::item(1)), 100.0);
        assert_eq!(layout.margin_for(BlockKey::section(0)), 50.0);
        assert_eq!(layout.flowed_height, 400.0 + 700.0 + 150.0);
        assert_eq!(layout.total_pages, 2);
        assert_eq!(layout.placements[1].top, 450.0);
        assert_eq!(layout.placements[1].bottom, 1250.0);
    }

    #[test]
    fn test_manual_layout_ignores_stale_keys() {
        let tree = make_tree(vec![make_section(400.0, false)]);
        let mut overrides = OverrideMap::default();
        overrides.increase(BlockKey::item(4), 50);
        overrides.increase(BlockKey::section(3), 50);

        let layout = compute_manual_layout(&tree, &overrides, &make_geometry());
        assert!(layout.margins.is_empty());
        assert_eq!(layout.flowed_height, 400.0);
    }

    #[test]
    fn test_manual_layout_empty_tree() {
        let layout =
            compute_manual_layout(&ContentTree::default(), &OverrideMap::default(), &make_geometry());
        assert_eq!(layout, PageLayout::empty(MarginSource::Manual));
    }
}
