use super::*;

use crate::world::GridMaze;

/// One ghost per start marker in `maze`, ordered by identity.
pub fn spawn_ghosts(maze: &GridMaze, config: &GhostConfig) -> Vec<Ghost> {
    maze.ghost_starts
        .iter()
        .map(|start| Ghost::new(start.identity, start.position, start.scatter_corner, config))
        .collect()
}

impl GhostEngine {
    pub fn from_maze(maze: &GridMaze, config: GhostConfig, seed: u64) -> Self {
        let ghosts = spawn_ghosts(maze, &config);
        Self::new(config, ghosts, seed)
    }

    /// Sends every ghost home and drops frightened state and pending respawns.
    pub fn reset_all(&mut self) {
        self.frightened.cancel(&mut self.ghosts);
        for ghost in &mut self.ghosts {
            ghost.reset();
            ghost.set_speed(self.config.speeds.scatter);
        }
        info!(now_ms = self.elapsed_ms, "ghosts reset to start positions");
    }
}
