use crate::types::{GhostIdentity, Vec2};

pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const MIN_DIRECTION_TICKS: u32 = 8;
pub const GHOST_EATEN_POINTS: u32 = 200;
pub const RESPAWN_DELAY_MS: u64 = 1_000;
pub const FRIGHTENED_DURATION_MS: u64 = 6_000;

pub const CHASE_SPEED: f64 = 0.125;
pub const SCATTER_SPEED: f64 = 0.1;
pub const FRIGHTENED_SPEED: f64 = 0.0625;

/// Clyde gives up the chase at or inside this many tiles.
pub const CLYDE_SHY_DISTANCE: f64 = 8.0;
pub const PINKY_LOOKAHEAD_TILES: f64 = 4.0;
pub const INKY_LOOKAHEAD_TILES: f64 = 2.0;

/// Where an eaten ghost waits until it respawns.
pub const OFF_BOARD_POSITION: Vec2 = Vec2::new(-100.0, -100.0);

pub const PELLET_POINTS: u32 = 10;
pub const POWER_PELLET_POINTS: u32 = 50;
pub const DEFAULT_LIVES: u32 = 3;

pub fn get_scatter_corner(identity: GhostIdentity, width: i32, height: i32) -> Vec2 {
    let max_x = f64::from(width - 2).max(0.0);
    let max_y = f64::from(height - 2).max(0.0);
    match identity {
        GhostIdentity::Blinky => Vec2::new(max_x, 1.0),
        GhostIdentity::Pinky => Vec2::new(1.0, 1.0),
        GhostIdentity::Inky => Vec2::new(max_x, max_y),
        GhostIdentity::Clyde => Vec2::new(1.0, max_y),
    }
}
