use tracing::{debug, info};

use crate::maze::LevelEvents;
use crate::types::GhostMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Phase {
    pub mode: GhostMode,
    /// `None` means the phase never ends.
    pub duration_ms: Option<u64>,
}

const fn timed(mode: GhostMode, seconds: u64) -> Phase {
    Phase {
        mode,
        duration_ms: Some(seconds * 1_000),
    }
}

const CHASE_FOREVER: Phase = Phase {
    mode: GhostMode::Chase,
    duration_ms: None,
};

/// CHASE/SCATTER alternation for a level number.
pub fn phase_schedule(level_no: u32) -> Vec<Phase> {
    use GhostMode::{Chase, Scatter};
    match level_no {
        0 | 1 => vec![
            timed(Scatter, 7),
            timed(Chase, 20),
            timed(Scatter, 7),
            timed(Chase, 20),
            timed(Scatter, 5),
            timed(Chase, 20),
            timed(Scatter, 5),
            CHASE_FOREVER,
        ],
        2..=4 => vec![
            timed(Scatter, 7),
            timed(Chase, 20),
            timed(Scatter, 7),
            timed(Chase, 20),
            timed(Scatter, 5),
            timed(Chase, 20),
            timed(Scatter, 1),
            CHASE_FOREVER,
        ],
        _ => vec![
            timed(Scatter, 5),
            timed(Chase, 20),
            timed(Scatter, 5),
            timed(Chase, 20),
            timed(Scatter, 5),
            CHASE_FOREVER,
        ],
    }
}

/// Score, lives and the phase scheduler for one level.
#[derive(Clone, Debug)]
pub struct Level {
    level_no: u32,
    score: u32,
    lives: u32,
    schedule: Vec<Phase>,
    phase_index: usize,
    phase_remaining_ms: Option<u64>,
    restart_pending: bool,
}

impl Level {
    pub fn new(level_no: u32, lives: u32) -> Self {
        let schedule = phase_schedule(level_no);
        let phase_remaining_ms = schedule.first().and_then(|phase| phase.duration_ms);
        Self {
            level_no,
            score: 0,
            lives,
            schedule,
            phase_index: 0,
            phase_remaining_ms,
            restart_pending: false,
        }
    }

    pub fn level_no(&self) -> u32 {
        self.level_no
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    pub fn current_mode(&self) -> GhostMode {
        self.schedule
            .get(self.phase_index)
            .map_or(GhostMode::Chase, |phase| phase.mode)
    }

    pub fn phase_remaining_ms(&self) -> Option<u64> {
        self.phase_remaining_ms
    }

    /// Returns and clears the restart flag raised by a lost life.
    pub fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_pending)
    }

    /// Counts down the current phase. Returns the new mode when a phase ends.
    pub fn tick(&mut self, dt_ms: u64) -> Option<GhostMode> {
        let remaining = self.phase_remaining_ms?;
        if dt_ms < remaining {
            self.phase_remaining_ms = Some(remaining - dt_ms);
            return None;
        }

        let mut overflow = dt_ms - remaining;
        loop {
            self.phase_index += 1;
            let Some(phase) = self.schedule.get(self.phase_index) else {
                self.phase_index = self.schedule.len().saturating_sub(1);
                self.phase_remaining_ms = None;
                break;
            };
            match phase.duration_ms {
                Some(duration) if overflow >= duration => overflow -= duration,
                Some(duration) => {
                    self.phase_remaining_ms = Some(duration - overflow);
                    break;
                }
                None => {
                    self.phase_remaining_ms = None;
                    break;
                }
            }
        }

        let mode = self.current_mode();
        debug!(level = self.level_no, phase = self.phase_index, ?mode, "phase changed");
        Some(mode)
    }
}

impl LevelEvents for Level {
    fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    fn handle_lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.restart_pending = true;
        info!(lives = self.lives, "life lost");
    }

    fn reset_phase_timer(&mut self) {
        self.phase_remaining_ms = self
            .schedule
            .get(self.phase_index)
            .and_then(|phase| phase.duration_ms);
    }
}
