//! Collaborator contracts the ghost core consumes.

use crate::types::{Direction, DirectionSet, Vec2};

/// Board geometry as seen by a ghost.
pub trait Maze {
    /// Directions that are open from `position`.
    fn legal_directions(&self, position: Vec2) -> DirectionSet;

    /// Whether a ghost standing where `legal` was sampled should pick a new target.
    fn is_at_intersection(&self, legal: DirectionSet) -> bool {
        legal.has_turn()
    }

    /// Where one kinematic step of `distance` along `direction` ends.
    fn advance(&self, position: Vec2, direction: Direction, distance: f64) -> Vec2 {
        position + direction.offset().scale(distance)
    }
}

/// Level-side hooks the ghost core reports into.
pub trait LevelEvents {
    fn add_points(&mut self, points: u32);
    fn handle_lose_life(&mut self);
    fn reset_phase_timer(&mut self);
}
