use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CHASE_SPEED, DEFAULT_LIVES, FRIGHTENED_DURATION_MS, FRIGHTENED_SPEED, GHOST_EATEN_POINTS,
    MIN_DIRECTION_TICKS, RESPAWN_DELAY_MS, SCATTER_SPEED,
};
use crate::error::{ConfigError, Result};
use crate::types::GhostMode;

/// Ghost speed per mode, in tiles per tick. Every mode is always present.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<GhostMode, f64>")]
pub struct SpeedTable {
    pub chase: f64,
    pub scatter: f64,
    pub frightened: f64,
}

impl SpeedTable {
    pub fn get(&self, mode: GhostMode) -> f64 {
        match mode {
            GhostMode::Chase => self.chase,
            GhostMode::Scatter => self.scatter,
            GhostMode::Frightened => self.frightened,
        }
    }

    pub fn from_modes(speeds: &BTreeMap<GhostMode, f64>) -> Result<Self> {
        let lookup = |mode: GhostMode| -> Result<f64> {
            let value = *speeds.get(&mode).ok_or(ConfigError::MissingSpeed(mode))?;
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSpeed { mode, value });
            }
            Ok(value)
        };
        Ok(Self {
            chase: lookup(GhostMode::Chase)?,
            scatter: lookup(GhostMode::Scatter)?,
            frightened: lookup(GhostMode::Frightened)?,
        })
    }
}

impl TryFrom<BTreeMap<GhostMode, f64>> for SpeedTable {
    type Error = ConfigError;

    fn try_from(speeds: BTreeMap<GhostMode, f64>) -> Result<Self> {
        Self::from_modes(&speeds)
    }
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            chase: CHASE_SPEED,
            scatter: SCATTER_SPEED,
            frightened: FRIGHTENED_SPEED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostConfig {
    pub speeds: SpeedTable,
    pub frightened_duration_ms: u64,
    pub min_direction_ticks: u32,
    pub eaten_ghost_points: u32,
    pub respawn_delay_ms: u64,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            speeds: SpeedTable::default(),
            frightened_duration_ms: FRIGHTENED_DURATION_MS,
            min_direction_ticks: MIN_DIRECTION_TICKS,
            eaten_ghost_points: GHOST_EATEN_POINTS,
            respawn_delay_ms: RESPAWN_DELAY_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeLengths {
    /// Seconds.
    pub frightened: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub level_no: u32,
    #[serde(default)]
    pub pacman_speed: Option<f64>,
    pub ghost_speed: SpeedTable,
    pub mode_lengths: ModeLengths,
}

impl LevelDefinition {
    pub fn ghost_config(&self) -> Result<GhostConfig> {
        let seconds = self.mode_lengths.frightened;
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ConfigError::InvalidDuration { what: "frightened" });
        }
        Ok(GhostConfig {
            speeds: self.ghost_speed,
            frightened_duration_ms: (seconds * 1000.0).round() as u64,
            ..GhostConfig::default()
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDefinition {
    pub num_lives: u32,
    pub levels: Vec<LevelDefinition>,
}

impl GameDefinition {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(raw)?;
        for level in &definition.levels {
            level.ghost_config()?;
        }
        Ok(definition)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn level(&self, level_no: u32) -> Result<&LevelDefinition> {
        self.levels
            .iter()
            .find(|level| level.level_no == level_no)
            .ok_or(ConfigError::UnknownLevel(level_no))
    }
}

impl Default for GameDefinition {
    fn default() -> Self {
        let frightened_seconds = FRIGHTENED_DURATION_MS as f64 / 1000.0;
        let levels = (1..=3)
            .map(|level_no| {
                let boost = 1.0 + 0.1 * f64::from(level_no - 1);
                LevelDefinition {
                    level_no,
                    pacman_speed: Some(CHASE_SPEED * 1.1 * boost),
                    ghost_speed: SpeedTable {
                        chase: CHASE_SPEED * boost,
                        scatter: SCATTER_SPEED * boost,
                        frightened: FRIGHTENED_SPEED,
                    },
                    mode_lengths: ModeLengths {
                        frightened: (frightened_seconds - f64::from(level_no - 1)).max(1.0),
                    },
                }
            })
            .collect();
        Self {
            num_lives: DEFAULT_LIVES,
            levels,
        }
    }
}
