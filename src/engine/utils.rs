use crate::ghost::Ghost;
use crate::types::{GhostIdentity, Vec2};

pub(super) fn index_of(ghosts: &[Ghost], identity: GhostIdentity) -> Option<usize> {
    ghosts.iter().position(|ghost| ghost.identity() == identity)
}

pub(super) fn touching(a: Vec2, b: Vec2, radius: f64) -> bool {
    a.distance(b) < radius
}
