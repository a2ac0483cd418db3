//! Ghost behaviour core for a Pac-Man style game: per-ghost targeting,
//! direction choice, mode switching, and the timed frightened effect.

pub mod behavior;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod frightened;
pub mod ghost;
pub mod level;
pub mod maze;
pub mod strategy;
pub mod types;
pub mod world;
