//! Selection Controller — the single selected block and the spacing commands that act on it.
//!
//! # Interaction states
//! - `Viewing`: nothing selected. Spacing commands other than reset do nothing.
//! - `Selected(key)`: entered by `select` while edit mode is on; left when edit mode
//!   turns off. Spacing commands keep the selection and only touch the override map.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::editor::overrides::OverrideMap;
use crate::layout::tree::{BlockIndex, BlockKey};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "key", rename_all = "snake_case")]
pub enum Interaction {
    #[default]
    Viewing,
    Selected(BlockKey),
}

/// Spacing edits reachable from both the toolbar and the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacingCommand {
    /// Add space below the selection: grows the override of the next block.
    PushDown,
    /// Remove space above the selection: shrinks the selection's own override.
    PullUp,
    /// Drop every override.
    Reset,
}

/// Owns the edit-mode flag, the selection and the override map of one document.
#[derive(Debug, Clone)]
pub struct SelectionController {
    edit_mode: bool,
    interaction: Interaction,
    overrides: OverrideMap,
    step: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

impl SelectionController {
    pub fn new(step: u32) -> Self {
        Self {
            edit_mode: false,
            interaction: Interaction::Viewing,
            overrides: OverrideMap::default(),
            step,
        }
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn selection(&self) -> Option<BlockKey> {
        match self.interaction {
            Interaction::Viewing => None,
            Interaction::Selected(key) => Some(key),
        }
    }

    pub fn is_selection_active(&self) -> bool {
        self.selection().is_some()
    }

    pub fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    /// Turning edit mode off always drops the selection.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
        if !enabled {
            self.clear_selection();
        }
    }

    /// Replaces the current selection. Ignored outside edit mode and for keys the
    /// index does not contain. Returns whether the selection changed.
    pub fn select(&mut self, key: BlockKey, index: &BlockIndex) -> bool {
        if !self.edit_mode || !index.contains(key) {
            return false;
        }
        let next = Interaction::Selected(key);
        let changed = self.interaction != next;
        self.interaction = next;
        changed
    }

    pub fn clear_selection(&mut self) {
        self.interaction = Interaction::Viewing;
    }

    /// Drops a selection whose block no longer exists after a tree update.
    pub fn retain_valid(&mut self, index: &BlockIndex) {
        if let Some(key) = self.selection() {
            if !index.contains(key) {
                debug!(%key, "Selected block left the tree, clearing selection");
                self.clear_selection();
            }
        }
    }

    /// Runs a spacing command. Returns whether the override map changed.
    pub fn apply(&mut self, command: SpacingCommand, index: &BlockIndex) -> bool {
        match command {
            SpacingCommand::PushDown => self.push_down(index),
            SpacingCommand::PullUp => self.pull_up(),
            SpacingCommand::Reset => self.reset(),
        }
    }

    fn push_down(&mut self, index: &BlockIndex) -> bool {
        let Some(selected) = self.selection() else {
            return false;
        };
        let Some(target) = index.next_block(selected) else {
            return false;
        };
        let value = self.overrides.increase(target, self.step);
        debug!(%selected, %target, value, "Pushed next block down");
        value > 0
    }

    fn pull_up(&mut self) -> bool {
        let Some(selected) = self.selection() else {
            return false;
        };
        let before = self.overrides.get(selected);
        let value = self.overrides.decrease(selected, self.step);
        debug!(%selected, before, value, "Pulled selection up");
        before != value
    }

    fn reset(&mut self) -> bool {
        let changed = !self.overrides.is_empty();
        self.overrides.clear();
        changed
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
