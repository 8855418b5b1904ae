use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// The single active step of the turn loop.
#[derive(Copy, Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for the player to decide.
    #[default]
    PlayerInput,
    /// Player is aiming a spell with a cursor.
    PlayerTargeting { spell: usize, cursor: IVec2 },
    /// Player's move is animating.
    PlayerAction,
    /// Waiting for projectiles in flight to land.
    ProjectileResolution,
    /// Enemies take their turns one at a time.
    EnemyPlanning,
    /// Player is dead.
    GameOver,
}

impl TurnPhase {
    /// Phase accepts player commands.
    pub fn is_player_turn(&self) -> bool {
        matches!(
            self,
            TurnPhase::PlayerInput | TurnPhase::PlayerTargeting { .. }
        )
    }
}
