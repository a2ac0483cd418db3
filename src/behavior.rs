use crate::strategy::{scatter_target, ChaseStrategy, TargetInputs};
use crate::types::{GhostIdentity, GhostMode, Vec2};

/// A ghost's mode together with the strategy that mode uses.
///
/// Keeping both in one value means the active strategy can never disagree
/// with the mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    Chase(ChaseStrategy),
    Scatter,
    /// Direction is picked at random among legal moves; there is no target.
    Frightened,
}

impl Behavior {
    pub fn for_mode(mode: GhostMode, identity: GhostIdentity) -> Self {
        match mode {
            GhostMode::Chase => Self::Chase(ChaseStrategy::for_identity(identity)),
            GhostMode::Scatter => Self::Scatter,
            GhostMode::Frightened => Self::Frightened,
        }
    }

    pub fn mode(self) -> GhostMode {
        match self {
            Self::Chase(_) => GhostMode::Chase,
            Self::Scatter => GhostMode::Scatter,
            Self::Frightened => GhostMode::Frightened,
        }
    }

    pub fn target(self, inputs: &TargetInputs) -> Option<Vec2> {
        match self {
            Self::Chase(strategy) => Some(strategy.target(inputs)),
            Self::Scatter => Some(scatter_target(inputs)),
            Self::Frightened => None,
        }
    }
}
