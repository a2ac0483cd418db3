use rand::Rng;
use tracing::{debug, warn};

use crate::behavior::Behavior;
use crate::config::{GhostConfig, SpeedTable};
use crate::frightened::FrightenedModeManager;
use crate::maze::{LevelEvents, Maze};
use crate::strategy::TargetInputs;
use crate::types::{Collider, Direction, DirectionSet, GhostIdentity, GhostMode, GhostView, Vec2};

#[derive(Clone, Debug)]
pub struct Ghost {
    identity: GhostIdentity,
    position: Vec2,
    previous_position: Vec2,
    start_position: Vec2,
    scatter_corner: Vec2,
    direction: Option<Direction>,
    speed: f64,
    speeds: SpeedTable,
    behavior: Behavior,
    target: Vec2,
    direction_ticks: u32,
    min_direction_ticks: u32,
    legal_directions: DirectionSet,
    player_position: Option<Vec2>,
    player_direction: Option<Direction>,
    pub(crate) respawn_at: Option<u64>,
}

impl Ghost {
    pub fn new(
        identity: GhostIdentity,
        start_position: Vec2,
        scatter_corner: Vec2,
        config: &GhostConfig,
    ) -> Self {
        Self {
            identity,
            position: start_position,
            previous_position: start_position,
            start_position,
            scatter_corner,
            direction: None,
            speed: config.speeds.scatter,
            speeds: config.speeds,
            behavior: Behavior::Scatter,
            target: scatter_corner,
            direction_ticks: config.min_direction_ticks,
            min_direction_ticks: config.min_direction_ticks,
            legal_directions: DirectionSet::empty(),
            player_position: None,
            player_direction: None,
            respawn_at: None,
        }
    }

    pub fn identity(&self) -> GhostIdentity {
        self.identity
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    pub fn start_position(&self) -> Vec2 {
        self.start_position
    }

    pub fn scatter_corner(&self) -> Vec2 {
        self.scatter_corner
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn mode(&self) -> GhostMode {
        self.behavior.mode()
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn direction_ticks(&self) -> u32 {
        self.direction_ticks
    }

    pub fn legal_directions(&self) -> DirectionSet {
        self.legal_directions
    }

    pub fn awaiting_respawn(&self) -> bool {
        self.respawn_at.is_some()
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.previous_position = position;
        self.position = position;
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn set_direction(&mut self, direction: Option<Direction>) {
        self.direction = direction;
    }

    pub fn observe_player(&mut self, position: Vec2, direction: Option<Direction>) {
        self.player_position = Some(position);
        self.player_direction = direction;
    }

    /// One simulation tick: retarget at intersections, pick a direction, move.
    pub fn update<M, R>(&mut self, maze: &M, blinky_position: Option<Vec2>, rng: &mut R)
    where
        M: Maze + ?Sized,
        R: Rng,
    {
        let legal = maze.legal_directions(self.position);
        self.legal_directions = legal;

        if maze.is_at_intersection(legal) {
            self.refresh_target(blinky_position);
        }

        let next = self.select_direction(legal, rng);
        if next != self.direction {
            debug!(
                ghost = ?self.identity,
                from = ?self.direction,
                to = ?next,
                "ghost changed direction"
            );
            self.direction_ticks = 0;
        }
        self.direction = next;

        if let Some(dir) = next {
            self.previous_position = self.position;
            self.position = maze.advance(self.position, dir, self.speed);
        }
    }

    pub fn select_direction<R>(&mut self, legal: DirectionSet, rng: &mut R) -> Option<Direction>
    where
        R: Rng,
    {
        if legal.is_empty() {
            warn!(
                ghost = ?self.identity,
                x = self.position.x,
                y = self.position.y,
                "no legal directions, keeping current heading"
            );
            return self.direction;
        }

        if let Some(current) = self.direction {
            if self.direction_ticks < self.min_direction_ticks {
                self.direction_ticks += 1;
                return Some(current);
            }
        }

        if self.behavior == Behavior::Frightened {
            let options: Vec<Direction> = legal.directions().collect();
            return Some(options[rng.random_range(0..options.len())]);
        }

        let reverse = self.direction.map(Direction::opposite);
        let nearest = legal
            .directions()
            .filter(|dir| Some(*dir) != reverse)
            .map(|dir| (dir, (self.position + dir.offset()).distance(self.target)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(dir, _)| dir);

        // Dead end: reversing is the only way out.
        nearest.or(reverse)
    }

    fn refresh_target(&mut self, blinky_position: Option<Vec2>) {
        if self.behavior == Behavior::Frightened {
            return;
        }
        let Some(player_position) = self.player_position else {
            if matches!(self.behavior, Behavior::Chase(_)) {
                warn!(ghost = ?self.identity, "player position unknown, targeting scatter corner");
            }
            self.target = self.scatter_corner;
            return;
        };
        let inputs = TargetInputs {
            ghost_position: self.position,
            player_position,
            player_direction: self.player_direction,
            scatter_corner: self.scatter_corner,
            blinky_position,
        };
        if let Some(target) = self.behavior.target(&inputs) {
            self.target = target;
        }
    }

    pub fn set_ghost_mode(&mut self, mode: GhostMode) {
        if self.behavior.mode() != mode {
            debug!(ghost = ?self.identity, from = ?self.behavior.mode(), to = ?mode, "ghost mode changed");
        }
        self.behavior = Behavior::for_mode(mode, self.identity);
        self.speed = self.speeds.get(mode);
        self.direction_ticks = self.min_direction_ticks;
    }

    pub fn reset(&mut self) {
        self.set_position(self.start_position);
        self.direction = None;
        self.target = self.scatter_corner;
        self.set_ghost_mode(GhostMode::Scatter);
    }

    pub fn collide_with<L>(
        &mut self,
        other: Collider,
        frightened: &mut FrightenedModeManager,
        level: &mut L,
    ) where
        L: LevelEvents + ?Sized,
    {
        if other != Collider::Player {
            return;
        }
        if self.mode() == GhostMode::Frightened {
            frightened.handle_ghost_eaten(self, level);
        } else {
            level.handle_lose_life();
        }
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            identity: self.identity,
            x: self.position.x,
            y: self.position.y,
            dir: self.direction,
            mode: self.mode(),
            speed: self.speed,
            target_x: self.target.x,
            target_y: self.target.y,
            respawn_at: self.respawn_at,
        }
    }
}
