// Edit overlay: selection state, manual spacing overrides and their key bindings.
// Everything here is synchronous and only meaningful in the edit view.

pub mod keymap;
pub mod overrides;
pub mod selection;

pub use keymap::{command_for_key, KeyPress};
pub use overrides::{OverrideEntry, OverrideMap};
pub use selection::{Interaction, SelectionController, SpacingCommand};
