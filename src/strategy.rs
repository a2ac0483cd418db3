//! Per-ghost target selection.
//!
//! Every function here is pure: it reads the inputs captured for the current
//! tick and returns a target point. Frightened ghosts never ask for a target.

use crate::constants::{CLYDE_SHY_DISTANCE, INKY_LOOKAHEAD_TILES, PINKY_LOOKAHEAD_TILES};
use crate::types::{Direction, GhostIdentity, Vec2};

/// Everything a strategy may look at when choosing a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetInputs {
    pub ghost_position: Vec2,
    pub player_position: Vec2,
    pub player_direction: Option<Direction>,
    pub scatter_corner: Vec2,
    /// Blinky's live position, looked up by identity when the target is computed.
    pub blinky_position: Option<Vec2>,
}

impl TargetInputs {
    fn player_ahead(&self, tiles: f64) -> Vec2 {
        let step = self
            .player_direction
            .map(Direction::offset)
            .unwrap_or_default();
        self.player_position + step.scale(tiles)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChaseStrategy {
    /// Heads straight for the player.
    Blinky,
    /// Aims four tiles ahead of the player.
    Pinky,
    /// Doubles the vector from Blinky to two tiles ahead of the player.
    Inky,
    /// Chases from afar, retreats to its corner up close.
    Clyde,
}

impl ChaseStrategy {
    pub fn for_identity(identity: GhostIdentity) -> Self {
        match identity {
            GhostIdentity::Blinky => Self::Blinky,
            GhostIdentity::Pinky => Self::Pinky,
            GhostIdentity::Inky => Self::Inky,
            GhostIdentity::Clyde => Self::Clyde,
        }
    }

    pub fn target(self, inputs: &TargetInputs) -> Vec2 {
        match self {
            Self::Blinky => inputs.player_position,
            Self::Pinky => inputs.player_ahead(PINKY_LOOKAHEAD_TILES),
            Self::Inky => {
                let Some(blinky) = inputs.blinky_position else {
                    return inputs.scatter_corner;
                };
                let pivot = inputs.player_ahead(INKY_LOOKAHEAD_TILES);
                blinky + (pivot - blinky).scale(2.0)
            }
            Self::Clyde => {
                let distance = inputs.ghost_position.distance(inputs.player_position);
                if distance > CLYDE_SHY_DISTANCE {
                    inputs.player_position
                } else {
                    inputs.scatter_corner
                }
            }
        }
    }
}

pub fn scatter_target(inputs: &TargetInputs) -> Vec2 {
    inputs.scatter_corner
}
