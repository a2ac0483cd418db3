//! Errors raised while loading configuration and maps.

use thiserror::Error;

use crate::types::GhostMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no ghost speed configured for {0:?} mode")]
    MissingSpeed(GhostMode),

    #[error("ghost speed for {mode:?} mode must be finite and non-negative, got {value}")]
    InvalidSpeed { mode: GhostMode, value: f64 },

    #[error("{what} duration must be positive")]
    InvalidDuration { what: &'static str },

    #[error("level {0} is not defined")]
    UnknownLevel(u32),

    #[error("invalid map: {0}")]
    InvalidMap(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
