use tracing::{debug, info};

use crate::config::GhostConfig;
use crate::constants::OFF_BOARD_POSITION;
use crate::ghost::Ghost;
use crate::maze::LevelEvents;
use crate::types::GhostMode;

/// Owns the timed frightened effect, eaten-ghost scoring and respawns.
///
/// Timers are deadlines on the simulation clock. The manager only learns the
/// time through [`FrightenedModeManager::advance`], which also fires whatever
/// became due.
#[derive(Clone, Debug)]
pub struct FrightenedModeManager {
    config: GhostConfig,
    now_ms: u64,
    frightened_until: Option<u64>,
    activations: u32,
    ghosts_eaten: u32,
}

impl FrightenedModeManager {
    pub fn new(config: GhostConfig) -> Self {
        Self {
            config,
            now_ms: 0,
            frightened_until: None,
            activations: 0,
            ghosts_eaten: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.frightened_until.is_some()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.frightened_until
            .map(|until| until.saturating_sub(self.now_ms))
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    pub fn ghosts_eaten(&self) -> u32 {
        self.ghosts_eaten
    }

    /// Starts, or restarts from zero, the frightened timer.
    pub fn activate_frightened_mode<L>(&mut self, ghosts: &mut [Ghost], level: &mut L)
    where
        L: LevelEvents + ?Sized,
    {
        let restarted = self.is_active();
        self.frightened_until = Some(self.now_ms + self.config.frightened_duration_ms);
        self.activations += 1;

        for ghost in ghosts.iter_mut() {
            ghost.set_ghost_mode(GhostMode::Frightened);
            ghost.set_speed(self.config.speeds.frightened);
        }
        level.reset_phase_timer();

        info!(
            now_ms = self.now_ms,
            duration_ms = self.config.frightened_duration_ms,
            restarted,
            "frightened mode activated"
        );
    }

    pub fn end_frightened_mode(&mut self, ghosts: &mut [Ghost]) {
        self.frightened_until = None;
        for ghost in ghosts.iter_mut() {
            ghost.set_ghost_mode(GhostMode::Scatter);
            ghost.set_speed(self.config.speeds.scatter);
        }
        info!(now_ms = self.now_ms, "frightened mode ended");
    }

    pub fn handle_ghost_eaten<L>(&mut self, ghost: &mut Ghost, level: &mut L)
    where
        L: LevelEvents + ?Sized,
    {
        if !self.is_active() {
            debug!(ghost = ?ghost.identity(), "ghost eaten outside frightened mode ignored");
            return;
        }
        ghost.set_position(OFF_BOARD_POSITION);
        ghost.set_direction(None);
        ghost.set_ghost_mode(GhostMode::Scatter);
        ghost.respawn_at = Some(self.now_ms + self.config.respawn_delay_ms);
        level.add_points(self.config.eaten_ghost_points);
        self.ghosts_eaten += 1;
        info!(
            ghost = ?ghost.identity(),
            points = self.config.eaten_ghost_points,
            "ghost eaten"
        );
    }

    /// Moves the clock to `now_ms`, then fires the expiry and any respawns due.
    pub fn advance(&mut self, now_ms: u64, ghosts: &mut [Ghost]) {
        self.now_ms = self.now_ms.max(now_ms);

        if self
            .frightened_until
            .is_some_and(|until| self.now_ms >= until)
        {
            self.end_frightened_mode(ghosts);
        }

        for ghost in ghosts.iter_mut() {
            if ghost.respawn_at.is_some_and(|due| self.now_ms >= due) {
                self.respawn(ghost);
            }
        }
    }

    /// Drops the running timer and any pending respawn without firing them.
    pub fn cancel(&mut self, ghosts: &mut [Ghost]) {
        self.frightened_until = None;
        for ghost in ghosts.iter_mut() {
            ghost.respawn_at = None;
        }
    }

    fn respawn(&self, ghost: &mut Ghost) {
        ghost.respawn_at = None;
        ghost.reset();
        ghost.set_ghost_mode(GhostMode::Scatter);
        ghost.set_speed(self.config.speeds.scatter);
        info!(ghost = ?ghost.identity(), "ghost respawned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::fixtures::RecordingLevel;
    use crate::types::{Collider, GhostIdentity, Vec2};

    fn config() -> GhostConfig {
        GhostConfig {
            frightened_duration_ms: 5_000,
            ..GhostConfig::default()
        }
    }

    fn make_ghosts() -> Vec<Ghost> {
        GhostIdentity::ALL
            .iter()
            .enumerate()
            .map(|(idx, identity)| {
                Ghost::new(
                    *identity,
                    Vec2::new(10.0 + idx as f64, 12.0),
                    Vec2::new(1.0, 1.0),
                    &config(),
                )
            })
            .collect()
    }

    #[test]
    fn activation_frightens_every_ghost_and_resets_phase_timer() {
        let mut manager = FrightenedModeManager::new(config());
        let mut ghosts = make_ghosts();
        ghosts[1].set_ghost_mode(GhostMode::Chase);
        let mut level = RecordingLevel::default();

        manager.activate_frightened_mode(&mut ghosts, &mut level);

        assert!(manager.is_active());
        assert_eq!(level.phase_resets, 1);
        for ghost in &ghosts {
            assert_eq!(ghost.mode(), GhostMode::Frightened);
            assert_eq!(ghost.speed(), config().speeds.frightened);
        }
    }

    #[test]
    fn expiry_returns_everyone_to_scatter() {
        let mut manager = FrightenedModeManager::new(config());
        let mut ghosts = make_ghosts();
        ghosts[0].set_ghost_mode(GhostMode::Chase);
        let mut level = RecordingLevel::default();
        manager.activate_frightened_mode(&mut ghosts, &mut level);

        manager.advance(4_999, &mut ghosts);
        assert!(manager.is_active());
        assert_eq!(manager.remaining_ms(), Some(1));

        manager.advance(5_000, &mut ghosts);
        assert!(!manager.is_active());
        assert_eq!(manager.remaining_ms(), None);
        for ghost in &ghosts {
            assert_eq!(ghost.mode(), GhostMode::Scatter);
            assert_eq!(ghost.speed(), config().speeds.scatter);
        }
    }

    #[test]
    fn reactivation_restarts_the_timer() {
        let mut manager = FrightenedModeManager::new(config());
        let mut ghosts = make_ghosts();
        let mut level = RecordingLevel::default();
        manager.activate_frightened_mode(&mut ghosts, &mut level);

        manager.advance(3_000, &mut ghosts);
        manager.activate_frightened_mode(&mut ghosts, &mut level);

        manager.advance(7_999, &mut ghosts);
        assert!(manager.is_active());
        assert!(ghosts.iter().all(|g| g.mode() == GhostMode::Frightened));

        manager.advance(8_000, &mut ghosts);
        assert!(!manager.is_active());
        assert_eq!(manager.activations(), 2);
    }

    #[test]
    fn eaten_ghost_scores_once_and_respawns_after_delay() {
        let mut manager = FrightenedModeManager::new(config());
        let mut ghosts = make_ghosts();
        let mut level = RecordingLevel::default();
        manager.activate_frightened_mode(&mut ghosts, &mut level);

        manager.handle_ghost_eaten(&mut ghosts[2], &mut level);
        assert_eq!(level.points, 200);
        assert_eq!(ghosts[2].position(), OFF_BOARD_POSITION);
        assert_eq!(ghosts[2].mode(), GhostMode::Scatter);
        assert!(ghosts[2].awaiting_respawn());

        manager.advance(999, &mut ghosts);
        assert!(ghosts[2].awaiting_respawn());

        manager.advance(1_000, &mut ghosts);
        assert!(!ghosts[2].awaiting_respawn());
        assert_eq!(ghosts[2].position(), ghosts[2].start_position());
        assert_eq!(ghosts[2].mode(), GhostMode::Scatter);
        assert_eq!(ghosts[2].speed(), config().speeds.scatter);
        assert_eq!(level.points, 200);
        assert!(manager.is_active());
    }

    #[test]
    fn eaten_while_inactive_is_a_no_op() {
        let mut manager = FrightenedModeManager::new(config());
        let mut ghosts = make_ghosts();
        let mut level = RecordingLevel::default();
        let before = ghosts[0].position();

        manager.handle_ghost_eaten(&mut ghosts[0], &mut level);

        assert_eq!(level.points, 0);
        assert_eq!(ghosts[0].position(), before);
        assert!(!ghosts[0].awaiting_respawn());
    }

    #[test]
    fn frightened_collision_routes_to_eaten_handler() {
        let mut manager = FrightenedModeManager::new(config());
        let mut ghosts = make_ghosts();
        let mut level = RecordingLevel::default();
        manager.activate_frightened_mode(&mut ghosts, &mut level);

        ghosts[0].collide_with(Collider::Player, &mut manager, &mut level);

        assert_eq!(level.points, 200);
        assert_eq!(level.lives_lost, 0);
        assert_eq!(manager.ghosts_eaten(), 1);
    }

    #[test]
    fn respawn_delay_is_independent_of_frightened_timer() {
        let mut manager = FrightenedModeManager::new(config());
        let mut ghosts = make_ghosts();
        let mut level = RecordingLevel::default();
        manager.activate_frightened_mode(&mut ghosts, &mut level);
        manager.advance(4_500, &mut ghosts);
        manager.handle_ghost_eaten(&mut ghosts[1], &mut level);

        manager.advance(5_000, &mut ghosts);
        assert!(!manager.is_active());
        assert!(ghosts[1].awaiting_respawn());

        manager.advance(5_500, &mut ghosts);
        assert!(!ghosts[1].awaiting_respawn());
        assert_eq!(ghosts[1].mode(), GhostMode::Scatter);
    }

    #[test]
    fn cancel_drops_pending_work() {
        let mut manager = FrightenedModeManager::new(config());
        let mut ghosts = make_ghosts();
        let mut level = RecordingLevel::default();
        manager.activate_frightened_mode(&mut ghosts, &mut level);
        manager.handle_ghost_eaten(&mut ghosts[0], &mut level);

        manager.cancel(&mut ghosts);

        assert!(!manager.is_active());
        assert!(ghosts.iter().all(|g| !g.awaiting_respawn()));
    }
}
