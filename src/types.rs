use std::ops::{Add, Sub};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed iteration order used for every tie-break.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit step in screen coordinates (y grows downwards).
    pub fn offset(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    fn flag(self) -> DirectionSet {
        match self {
            Self::Up => DirectionSet::UP,
            Self::Down => DirectionSet::DOWN,
            Self::Left => DirectionSet::LEFT,
            Self::Right => DirectionSet::RIGHT,
        }
    }
}

bitflags! {
    /// Set of directions a ghost may legally take from its current cell.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DirectionSet: u8 {
        const UP    = 1 << 0;
        const DOWN  = 1 << 1;
        const LEFT  = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl DirectionSet {
    pub fn of(directions: &[Direction]) -> Self {
        directions
            .iter()
            .fold(Self::empty(), |set, dir| set | dir.flag())
    }

    pub fn has(self, dir: Direction) -> bool {
        self.contains(dir.flag())
    }

    pub fn insert_dir(&mut self, dir: Direction) {
        self.insert(dir.flag());
    }

    pub fn without(self, dir: Direction) -> Self {
        self - dir.flag()
    }

    /// Directions in `Direction::ALL` order.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |dir| self.has(*dir))
    }

    pub fn len(self) -> usize {
        self.bits().count_ones() as usize
    }

    /// True when the set offers both a horizontal and a vertical option.
    pub fn has_turn(self) -> bool {
        self.intersects(Self::LEFT | Self::RIGHT) && self.intersects(Self::UP | Self::DOWN)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Chase,
    Scatter,
    Frightened,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostIdentity {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostIdentity {
    pub const ALL: [GhostIdentity; 4] = [
        GhostIdentity::Blinky,
        GhostIdentity::Pinky,
        GhostIdentity::Inky,
        GhostIdentity::Clyde,
    ];

    /// Map tile letter that places this ghost.
    pub fn from_tile(tile: char) -> Option<Self> {
        match tile {
            'b' => Some(Self::Blinky),
            's' => Some(Self::Pinky),
            'i' => Some(Self::Inky),
            'c' => Some(Self::Clyde),
            _ => None,
        }
    }
}

/// Things a ghost can be told it collided with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collider {
    Player,
    Ghost,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub identity: GhostIdentity,
    pub x: f64,
    pub y: f64,
    pub dir: Option<Direction>,
    pub mode: GhostMode,
    pub speed: f64,
    #[serde(rename = "targetX")]
    pub target_x: f64,
    #[serde(rename = "targetY")]
    pub target_y: f64,
    #[serde(rename = "respawnAt")]
    pub respawn_at: Option<u64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EngineSnapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    #[serde(rename = "frightenedRemainingMs")]
    pub frightened_remaining_ms: Option<u64>,
    pub ghosts: Vec<GhostView>,
}
