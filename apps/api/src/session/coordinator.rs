//! Mode Coordinator — owns one document's engine state and keeps its layout current.
//!
//! # View modes
//! - `Edit`: continuous view with break markers; margins come from the override map.
//! - `Page`: discrete stacked pages; margins come from `compute_auto_layout`.
//!
//! Every state change that can affect layout (tree, view mode, overrides) recomputes
//! before the mutating call returns, so `layout()` is never stale.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::editor::{command_for_key, Interaction, KeyPress, SelectionController, SpacingCommand};
use crate::layout::{
    compute_auto_layout, compute_manual_layout, BlockIndex, BlockKey, ContentTree, PageGeometry,
    PageLayout,
};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Edit,
    Page,
}

/// Where a click landed, as reported by the renderer.
///
/// `item` is the position of the clicked item inside `section`, when the click fell
/// inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPath {
    pub section: usize,
    #[serde(default)]
    pub item: Option<usize>,
}

/// Per-document engine instance.
#[derive(Debug, Clone)]
pub struct DocumentSession {
    geometry: PageGeometry,
    tree: ContentTree,
    index: BlockIndex,
    view_mode: ViewMode,
    controller: SelectionController,
    layout: PageLayout,
    revision: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

impl DocumentSession {
    pub fn new(tree: ContentTree, geometry: PageGeometry) -> Self {
        let index = BlockIndex::build(&tree);
        let controller = SelectionController::new(geometry.spacing_step);
        let view_mode = ViewMode::default();
        let layout = layout_for(view_mode, &tree, &controller, &geometry);
        Self {
            geometry,
            tree,
            index,
            view_mode,
            controller,
            layout,
            revision: 1,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn edit_mode(&self) -> bool {
        self.controller.edit_mode()
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    /// Incremented on every recompute.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn total_pages(&self) -> usize {
        self.layout.total_pages
    }

    pub fn margin_for(&self, key: BlockKey) -> f64 {
        self.layout.margin_for(key)
    }

    pub fn is_selection_active(&self) -> bool {
        self.controller.is_selection_active()
    }

    pub fn interaction(&self) -> Interaction {
        self.controller.interaction()
    }

    /// Replaces the tree (new content or fresh measurements) and recomputes.
    pub fn set_tree(&mut self, tree: ContentTree) {
        self.tree = tree;
        self.index = BlockIndex::build(&self.tree);
        self.controller.retain_valid(&self.index);
        self.recompute("tree");
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode == mode {
            return;
        }
        self.view_mode = mode;
        self.recompute("view_mode");
    }

    /// Margins do not depend on the edit-mode flag, so no recompute is needed.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.controller.set_edit_mode(enabled);
    }

    pub fn select(&mut self, key: BlockKey) -> bool {
        self.controller.select(key, &self.index)
    }

    /// Resolves a click to the innermost block under it and selects that block.
    ///
    /// A click that resolves to no block leaves the selection untouched.
    pub fn click(&mut self, hit: HitPath) -> Option<BlockKey> {
        let key = self.resolve(hit)?;
        self.select(key);
        self.controller.selection().filter(|&selected| selected == key)
    }

    /// Runs a toolbar command. Returns whether the overrides changed.
    pub fn command(&mut self, command: SpacingCommand) -> bool {
        let changed = self.controller.apply(command, &self.index);
        if changed {
            self.recompute("overrides");
        }
        changed
    }

    /// Routes a key press through the bindings. Returns the command it triggered.
    pub fn key_press(&mut self, key: &KeyPress) -> Option<SpacingCommand> {
        let command = command_for_key(key, self.is_selection_active())?;
        self.command(command);
        Some(command)
    }

    fn resolve(&self, hit: HitPath) -> Option<BlockKey> {
        if hit.section >= self.index.sections.len() {
            return None;
        }
        hit.item
            .and_then(|position| self.index.item_in_section(hit.section, position))
            .or(Some(BlockKey::section(hit.section)))
    }

    fn recompute(&mut self, trigger: &'static str) {
        self.layout = layout_for(self.view_mode, &self.tree, &self.controller, &self.geometry);
        self.revision += 1;
        debug!(
            trigger,
            revision = self.revision,
            view_mode = ?self.view_mode,
            pages = self.layout.total_pages,
            margins = self.layout.margins.len(),
            overrides = self.controller.overrides().len(),
            "Layout recomputed"
        );
    }
}

fn layout_for(
    mode: ViewMode,
    tree: &ContentTree,
    controller: &SelectionController,
    geometry: &PageGeometry,
) -> PageLayout {
    match mode {
        ViewMode::Page => compute_auto_layout(tree, geometry),
        ViewMode::Edit => compute_manual_layout(tree, controller.overrides(), geometry),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
