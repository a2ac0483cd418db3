use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::constants::{get_scatter_corner, PELLET_POINTS, POWER_PELLET_POINTS};
use crate::error::{ConfigError, Result};
use crate::maze::Maze;
use crate::types::{Direction, DirectionSet, GhostIdentity, Vec2};

const CENTER_EPSILON: f64 = 1e-6;

pub const DEFAULT_MAP: &str = "\
###################
#z.......#.......z#
#.##.###.#.###.##.#
#.................#
#.##.#.#####.#.##.#
#....#...#...#....#
####.### # ###.####
####.# bs.ic #.####
####.# ##### #.####
#........p........#
#.##.###.#.###.##.#
#z.#...........#.z#
##.#.#.#####.#.#.##
#....#...#...#....#
#.######.#.######.#
#.................#
###################";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pellet {
    Normal,
    Power,
}

impl Pellet {
    pub fn points(self) -> u32 {
        match self {
            Self::Normal => PELLET_POINTS,
            Self::Power => POWER_PELLET_POINTS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GhostStart {
    pub identity: GhostIdentity,
    pub position: Vec2,
    pub scatter_corner: Vec2,
}

/// Tile grid: `#` is wall, anything else is floor.
#[derive(Clone, Debug)]
pub struct GridMaze {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
    pub player_spawn: Vec2,
    pub ghost_starts: Vec<GhostStart>,
    pub pellets: BTreeSet<(i32, i32)>,
    pub power_pellets: BTreeSet<(i32, i32)>,
}

impl GridMaze {
    pub fn parse(text: &str) -> Result<Self> {
        let tiles: Vec<String> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let height = tiles.len() as i32;
        let width = tiles.first().map_or(0, |row| row.chars().count()) as i32;
        if width == 0 {
            return Err(ConfigError::InvalidMap("map is empty".to_string()));
        }
        if let Some(row) = tiles.iter().position(|row| row.chars().count() as i32 != width) {
            return Err(ConfigError::InvalidMap(format!(
                "row {row} is not {width} tiles wide"
            )));
        }

        let mut player_spawn = None;
        let mut ghost_starts = Vec::new();
        let mut pellets = BTreeSet::new();
        let mut power_pellets = BTreeSet::new();
        for (y, row) in tiles.iter().enumerate() {
            for (x, tile) in row.chars().enumerate() {
                let cell = (x as i32, y as i32);
                let center = Vec2::new(cell.0 as f64, cell.1 as f64);
                match tile {
                    '.' => {
                        pellets.insert(cell);
                    }
                    'z' => {
                        power_pellets.insert(cell);
                    }
                    'p' => player_spawn = Some(center),
                    other => {
                        if let Some(identity) = GhostIdentity::from_tile(other) {
                            ghost_starts.push(GhostStart {
                                identity,
                                position: center,
                                scatter_corner: get_scatter_corner(identity, width, height),
                            });
                        }
                    }
                }
            }
        }

        let player_spawn = player_spawn
            .ok_or_else(|| ConfigError::InvalidMap("no player start ('p')".to_string()))?;
        if ghost_starts.is_empty() {
            return Err(ConfigError::InvalidMap("no ghost starts".to_string()));
        }
        ghost_starts.sort_by_key(|start| start.identity);

        Ok(Self {
            width,
            height,
            tiles,
            player_spawn,
            ghost_starts,
            pellets,
            power_pellets,
        })
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        self.tiles
            .get(y as usize)
            .and_then(|row| row.chars().nth(x as usize))
            .is_some_and(|tile| tile != '#')
    }

    pub fn cell_of(position: Vec2) -> (i32, i32) {
        (position.x.round() as i32, position.y.round() as i32)
    }

    pub fn is_cell_center(position: Vec2) -> bool {
        (position.x - position.x.round()).abs() < CENTER_EPSILON
            && (position.y - position.y.round()).abs() < CENTER_EPSILON
    }

    pub fn open_directions(&self, x: i32, y: i32) -> DirectionSet {
        let mut open = DirectionSet::empty();
        for dir in Direction::ALL {
            let (nx, ny) = step(x, y, dir);
            if self.is_walkable(nx, ny) {
                open.insert_dir(dir);
            }
        }
        open
    }

    pub fn take_pellet(&mut self, cell: (i32, i32)) -> Option<Pellet> {
        if self.power_pellets.remove(&cell) {
            return Some(Pellet::Power);
        }
        if self.pellets.remove(&cell) {
            return Some(Pellet::Normal);
        }
        None
    }

    pub fn remaining_pellets(&self) -> usize {
        self.pellets.len() + self.power_pellets.len()
    }

    /// First move of a shortest path from `from` to the closest cell in `goals`.
    pub fn first_step_towards(
        &self,
        from: (i32, i32),
        goals: &BTreeSet<(i32, i32)>,
    ) -> Option<Direction> {
        if goals.is_empty() {
            return None;
        }
        let mut visited = HashSet::from([from]);
        let mut queue = VecDeque::new();
        for dir in Direction::ALL {
            let next = step(from.0, from.1, dir);
            if self.is_walkable(next.0, next.1) && visited.insert(next) {
                queue.push_back((next, dir));
            }
        }
        while let Some((cell, first)) = queue.pop_front() {
            if goals.contains(&cell) {
                return Some(first);
            }
            for dir in Direction::ALL {
                let next = step(cell.0, cell.1, dir);
                if self.is_walkable(next.0, next.1) && visited.insert(next) {
                    queue.push_back((next, first));
                }
            }
        }
        None
    }
}

impl Maze for GridMaze {
    fn legal_directions(&self, position: Vec2) -> DirectionSet {
        let (x, y) = Self::cell_of(position);
        let off_x = (position.x - x as f64).abs() >= CENTER_EPSILON;
        let off_y = (position.y - y as f64).abs() >= CENTER_EPSILON;
        match (off_x, off_y) {
            (false, false) => self.open_directions(x, y),
            (true, false) => DirectionSet::LEFT | DirectionSet::RIGHT,
            (false, true) => DirectionSet::UP | DirectionSet::DOWN,
            (true, true) => DirectionSet::empty(),
        }
    }

    fn advance(&self, position: Vec2, direction: Direction, distance: f64) -> Vec2 {
        let (x, y) = Self::cell_of(position);
        let at_center = Self::is_cell_center(position);
        let horizontal = direction.is_horizontal();
        let sign = if matches!(direction, Direction::Right | Direction::Down) {
            1.0
        } else {
            -1.0
        };

        // Turning is only possible from a cell centre.
        let off_cross_axis = if horizontal {
            (position.y - y as f64).abs() >= CENTER_EPSILON
        } else {
            (position.x - x as f64).abs() >= CENTER_EPSILON
        };
        if off_cross_axis {
            return position;
        }

        let along = if horizontal { position.x } else { position.y };
        let next_center = if at_center {
            let (nx, ny) = step(x, y, direction);
            if !self.is_walkable(nx, ny) {
                return Vec2::new(x as f64, y as f64);
            }
            along.round() + sign
        } else if sign > 0.0 {
            along.ceil()
        } else {
            along.floor()
        };

        let moved = along + sign * distance;
        let clamped = if sign > 0.0 {
            moved.min(next_center)
        } else {
            moved.max(next_center)
        };
        if horizontal {
            Vec2::new(clamped, y as f64)
        } else {
            Vec2::new(x as f64, clamped)
        }
    }
}

fn step(x: i32, y: i32, dir: Direction) -> (i32, i32) {
    match dir {
        Direction::Up => (x, y - 1),
        Direction::Down => (x, y + 1),
        Direction::Left => (x - 1, y),
        Direction::Right => (x + 1, y),
    }
}
