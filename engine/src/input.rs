use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Discrete player intent fed to `Runtime::tick`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Input {
    /// Step in a direction, attacks an enemy in the way. Moves the cursor
    /// when targeting.
    Step(IVec2),
    Wait,
    Confirm,
    Cancel,
    OpenSpellMenu,
    /// Pick a known spell by its menu index.
    SelectSpell(usize),
    /// Use the cell the player is standing on.
    Interact,
    /// Start over after the game has ended.
    Restart,
}
