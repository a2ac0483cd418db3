use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::GhostConfig;
use crate::frightened::FrightenedModeManager;
use crate::ghost::Ghost;
use crate::maze::{LevelEvents, Maze};
use crate::types::{Collider, Direction, EngineSnapshot, GhostIdentity, GhostMode, Vec2};

mod spawn_system;
mod utils;

pub use self::spawn_system::spawn_ghosts;
use self::utils::{index_of, touching};

/// Owns the ghost roster, the simulation clock and the frightened manager.
#[derive(Clone, Debug)]
pub struct GhostEngine {
    config: GhostConfig,
    ghosts: Vec<Ghost>,
    frightened: FrightenedModeManager,
    rng: StdRng,
    elapsed_ms: u64,
    tick_counter: u64,
}

impl GhostEngine {
    pub fn new(config: GhostConfig, ghosts: Vec<Ghost>, seed: u64) -> Self {
        info!(ghosts = ghosts.len(), seed, "ghost engine created");
        Self {
            config,
            ghosts,
            frightened: FrightenedModeManager::new(config),
            rng: StdRng::seed_from_u64(seed),
            elapsed_ms: 0,
            tick_counter: 0,
        }
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost(&self, identity: GhostIdentity) -> Option<&Ghost> {
        index_of(&self.ghosts, identity).map(|idx| &self.ghosts[idx])
    }

    pub fn frightened(&self) -> &FrightenedModeManager {
        &self.frightened
    }

    pub fn is_frightened(&self) -> bool {
        self.frightened.is_active()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    /// Blinky's position right now, if Blinky is on the board.
    pub fn blinky_position(&self) -> Option<Vec2> {
        self.ghost(GhostIdentity::Blinky)
            .filter(|ghost| !ghost.awaiting_respawn())
            .map(Ghost::position)
    }

    pub fn observe_player(&mut self, position: Vec2, direction: Option<Direction>) {
        for ghost in &mut self.ghosts {
            ghost.observe_player(position, direction);
        }
    }

    pub fn step<M>(&mut self, dt_ms: u64, maze: &M)
    where
        M: Maze + ?Sized,
    {
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        self.frightened.advance(self.elapsed_ms, &mut self.ghosts);

        for idx in 0..self.ghosts.len() {
            if self.ghosts[idx].awaiting_respawn() {
                continue;
            }
            let blinky = self.blinky_position();
            self.ghosts[idx].update(maze, blinky, &mut self.rng);
        }
    }

    /// Roster indices of on-board ghosts strictly within `radius` of the player.
    pub fn colliding_ghosts(&self, player_position: Vec2, radius: f64) -> Vec<usize> {
        self.ghosts
            .iter()
            .enumerate()
            .filter(|(_, ghost)| !ghost.awaiting_respawn())
            .filter(|(_, ghost)| touching(ghost.position(), player_position, radius))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn collide<L>(&mut self, ghost_idx: usize, other: Collider, level: &mut L)
    where
        L: LevelEvents + ?Sized,
    {
        let Some(ghost) = self.ghosts.get_mut(ghost_idx) else {
            warn!(ghost_idx, "collision reported for unknown ghost");
            return;
        };
        if ghost.awaiting_respawn() {
            return;
        }
        ghost.collide_with(other, &mut self.frightened, level);
    }

    pub fn activate_frightened_mode<L>(&mut self, level: &mut L)
    where
        L: LevelEvents + ?Sized,
    {
        self.frightened
            .activate_frightened_mode(&mut self.ghosts, level);
    }

    /// Phase scheduler entry point: switches ghosts between CHASE and SCATTER.
    pub fn apply_phase(&mut self, mode: GhostMode) {
        if mode == GhostMode::Frightened {
            warn!("frightened mode is not a phase, ignoring");
            return;
        }
        for ghost in &mut self.ghosts {
            if ghost.mode() == GhostMode::Frightened || ghost.awaiting_respawn() {
                continue;
            }
            if ghost.mode() != mode {
                ghost.set_ghost_mode(mode);
            }
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            tick: self.tick_counter,
            now_ms: self.elapsed_ms,
            frightened_remaining_ms: self.frightened.remaining_ms(),
            ghosts: self.ghosts.iter().map(Ghost::view).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GhostConfig;
    use crate::constants::{OFF_BOARD_POSITION, TICK_MS};
    use crate::engine::GhostEngine;
    use crate::ghost::Ghost;
    use crate::maze::fixtures::{FixedMaze, RecordingLevel};
    use crate::types::{Collider, Direction, DirectionSet, GhostIdentity, GhostMode, Vec2};
    use crate::world::{GridMaze, DEFAULT_MAP};

    fn make_ghosts(positions: &[(GhostIdentity, f64, f64)]) -> Vec<Ghost> {
        positions
            .iter()
            .map(|(identity, x, y)| {
                Ghost::new(
                    *identity,
                    Vec2::new(*x, *y),
                    Vec2::new(1.0, 1.0),
                    &GhostConfig::default(),
                )
            })
            .collect()
    }

    fn default_engine(seed: u64) -> (GhostEngine, GridMaze) {
        let maze = GridMaze::parse(DEFAULT_MAP).expect("default map parses");
        let engine = GhostEngine::from_maze(&maze, GhostConfig::default(), seed);
        (engine, maze)
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let (mut a, maze) = default_engine(424_242);
        let (mut b, _) = default_engine(424_242);
        let mut level_a = RecordingLevel::default();
        let mut level_b = RecordingLevel::default();
        a.activate_frightened_mode(&mut level_a);
        b.activate_frightened_mode(&mut level_b);

        for _ in 0..400 {
            a.step(TICK_MS, &maze);
            b.step(TICK_MS, &maze);
            let sa = a.snapshot();
            let sb = b.snapshot();
            assert_eq!(sa.tick, sb.tick);
            for (ga, gb) in sa.ghosts.iter().zip(sb.ghosts.iter()) {
                assert_eq!(ga.identity, gb.identity);
                assert_eq!(ga.x.to_bits(), gb.x.to_bits());
                assert_eq!(ga.y.to_bits(), gb.y.to_bits());
                assert_eq!(ga.dir, gb.dir);
                assert_eq!(ga.mode, gb.mode);
            }
        }
    }

    #[test]
    fn inky_sees_blinky_after_blinky_moved_this_tick() {
        let mut engine = GhostEngine::new(
            GhostConfig::default(),
            make_ghosts(&[
                (GhostIdentity::Blinky, 3.0, 5.0),
                (GhostIdentity::Inky, 5.0, 5.0),
            ]),
            1,
        );
        engine.apply_phase(GhostMode::Chase);
        engine.observe_player(Vec2::new(10.0, 5.0), Some(Direction::Right));

        engine.step(TICK_MS, &FixedMaze(DirectionSet::all()));

        let blinky = engine.ghost(GhostIdentity::Blinky).expect("blinky");
        assert_eq!(blinky.position(), Vec2::new(3.125, 5.0));
        let inky = engine.ghost(GhostIdentity::Inky).expect("inky");
        assert_eq!(inky.target(), Vec2::new(20.875, 5.0));
    }

    #[test]
    fn inky_without_blinky_falls_back_to_corner() {
        let mut engine = GhostEngine::new(
            GhostConfig::default(),
            make_ghosts(&[(GhostIdentity::Inky, 5.0, 5.0)]),
            1,
        );
        engine.apply_phase(GhostMode::Chase);
        engine.observe_player(Vec2::new(10.0, 5.0), Some(Direction::Right));
        engine.step(TICK_MS, &FixedMaze(DirectionSet::all()));
        let inky = engine.ghost(GhostIdentity::Inky).expect("inky");
        assert_eq!(inky.target(), inky.scatter_corner());
    }

    #[test]
    fn eaten_ghost_stays_off_board_until_respawn() {
        let (mut engine, maze) = default_engine(9);
        let mut level = RecordingLevel::default();
        engine.activate_frightened_mode(&mut level);
        engine.collide(0, Collider::Player, &mut level);
        assert_eq!(level.points, 200);

        for _ in 0..30 {
            engine.step(TICK_MS, &maze);
            assert_eq!(engine.ghosts()[0].position(), OFF_BOARD_POSITION);
        }
        assert!(engine.colliding_ghosts(OFF_BOARD_POSITION, 0.6).is_empty());

        // A second collision while waiting scores nothing.
        engine.collide(0, Collider::Player, &mut level);
        assert_eq!(level.points, 200);

        while engine.elapsed_ms() < 1_000 {
            engine.step(TICK_MS, &maze);
        }
        let ghost = &engine.ghosts()[0];
        assert!(!ghost.awaiting_respawn());
        assert_eq!(ghost.mode(), GhostMode::Scatter);
    }

    #[test]
    fn apply_phase_skips_frightened_and_waiting_ghosts() {
        let (mut engine, _) = default_engine(3);
        let mut level = RecordingLevel::default();
        engine.activate_frightened_mode(&mut level);
        engine.collide(1, Collider::Player, &mut level);

        engine.apply_phase(GhostMode::Chase);

        assert_eq!(engine.ghosts()[0].mode(), GhostMode::Frightened);
        assert_eq!(engine.ghosts()[1].mode(), GhostMode::Scatter);
        assert!(engine.ghosts()[1].awaiting_respawn());
    }

    #[test]
    fn apply_phase_switches_everyone_outside_frightened() {
        let (mut engine, _) = default_engine(3);
        engine.apply_phase(GhostMode::Chase);
        assert!(engine
            .ghosts()
            .iter()
            .all(|ghost| ghost.mode() == GhostMode::Chase));
        engine.apply_phase(GhostMode::Frightened);
        assert!(engine
            .ghosts()
            .iter()
            .all(|ghost| ghost.mode() == GhostMode::Chase));
    }

    #[test]
    fn collision_outside_frightened_costs_a_life() {
        let (mut engine, _) = default_engine(5);
        let mut level = RecordingLevel::default();
        engine.collide(2, Collider::Player, &mut level);
        engine.collide(99, Collider::Player, &mut level);
        assert_eq!(level.lives_lost, 1);
        assert_eq!(level.points, 0);
    }

    #[test]
    fn reset_all_clears_frightened_and_pending_respawns() {
        let (mut engine, maze) = default_engine(11);
        let mut level = RecordingLevel::default();
        engine.activate_frightened_mode(&mut level);
        engine.collide(3, Collider::Player, &mut level);
        for _ in 0..10 {
            engine.step(TICK_MS, &maze);
        }

        engine.reset_all();

        assert!(!engine.is_frightened());
        for ghost in engine.ghosts() {
            assert!(!ghost.awaiting_respawn());
            assert_eq!(ghost.position(), ghost.start_position());
            assert_eq!(ghost.mode(), GhostMode::Scatter);
            assert_eq!(ghost.speed(), GhostConfig::default().speeds.scatter);
        }
    }

    #[test]
    fn ghosts_never_leave_walkable_cells() {
        let (mut engine, maze) = default_engine(77);
        engine.observe_player(maze.player_spawn, Some(Direction::Left));
        engine.apply_phase(GhostMode::Chase);
        for _ in 0..600 {
            engine.step(TICK_MS, &maze);
            for ghost in engine.ghosts() {
                let (x, y) = GridMaze::cell_of(ghost.position());
                assert!(maze.is_walkable(x, y), "{:?} at {x},{y}", ghost.identity());
                assert!(!ghost.legal_directions().is_empty() || ghost.direction().is_none());
            }
        }
        assert!(engine
            .ghosts()
            .iter()
            .any(|ghost| ghost.position() != ghost.start_position()));
    }

    #[test]
    fn snapshot_serializes_with_camel_case_fields() {
        let (mut engine, maze) = default_engine(2);
        let mut level = RecordingLevel::default();
        engine.activate_frightened_mode(&mut level);
        engine.step(TICK_MS, &maze);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.now_ms, TICK_MS);
        assert_eq!(
            snapshot.frightened_remaining_ms,
            Some(GhostConfig::default().frightened_duration_ms - TICK_MS)
        );
        let json = serde_json::to_value(&snapshot).expect("snapshot serializes");
        assert!(json.get("frightenedRemainingMs").is_some());
        assert_eq!(json["ghosts"][0]["identity"], "blinky");
        assert_eq!(json["ghosts"][0]["mode"], "frightened");
    }
}
