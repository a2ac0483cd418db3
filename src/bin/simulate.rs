use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use ghost_brain::config::{GameDefinition, GhostConfig};
use ghost_brain::constants::{CHASE_SPEED, TICK_MS, TICK_RATE};
use ghost_brain::engine::GhostEngine;
use ghost_brain::level::Level;
use ghost_brain::maze::{LevelEvents, Maze};
use ghost_brain::types::{Collider, Direction, EngineSnapshot, GhostMode, Vec2};
use ghost_brain::world::{GridMaze, Pellet, DEFAULT_MAP};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const COLLISION_RADIUS: f64 = 0.6;
const DEFAULT_TICKS: u64 = TICK_RATE as u64 * 120;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Game definition JSON; the built-in levels are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct Scenario {
    seed: u64,
    level_no: u32,
    lives: u32,
    max_ticks: u64,
    ghost_config: GhostConfig,
    player_speed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Cleared,
    GameOver,
    Timeout,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    seed: u64,
    level: u32,
    outcome: Outcome,
    ticks: u64,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    score: u32,
    lives: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    #[serde(rename = "frightenedActivations")]
    frightened_activations: u32,
    #[serde(rename = "phaseChanges")]
    phase_changes: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "pelletsLeft")]
    pellets_left: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    #[serde(rename = "finalSnapshot")]
    final_snapshot: EngineSnapshot,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    run: ScenarioRunResult,
}

/// Walks toward the nearest pellet, one cell centre at a time.
#[derive(Clone, Debug)]
struct ScriptedPlayer {
    position: Vec2,
    spawn: Vec2,
    direction: Option<Direction>,
    speed: f64,
}

impl ScriptedPlayer {
    fn new(spawn: Vec2, speed: f64) -> Self {
        Self {
            position: spawn,
            spawn,
            direction: None,
            speed,
        }
    }

    fn reset(&mut self) {
        self.position = self.spawn;
        self.direction = None;
    }

    fn step(&mut self, maze: &GridMaze) {
        if GridMaze::is_cell_center(self.position) {
            let goals: BTreeSet<(i32, i32)> = maze
                .pellets
                .union(&maze.power_pellets)
                .copied()
                .collect();
            self.direction = maze.first_step_towards(GridMaze::cell_of(self.position), &goals);
        }
        if let Some(dir) = self.direction {
            self.position = maze.advance(self.position, dir, self.speed);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = resolve_scenario(&cli)?;
    let started_at = now_iso();
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(scenario.seed, Utc::now().timestamp_millis()));

    info!(%match_id, seed = scenario.seed, level = scenario.level_no, "scenario started");
    let run = run_scenario(&scenario)?;
    for anomaly in &run.anomaly_records {
        warn!(%match_id, tick = anomaly.tick, message = %anomaly.message, "anomaly detected");
    }
    info!(
        %match_id,
        outcome = ?run.result.outcome,
        score = run.result.score,
        ticks = run.result.ticks,
        "scenario finished"
    );
    println!("{}", serde_json::to_string(&run.result)?);

    let has_anomaly = !run.result.anomalies.is_empty();
    let summary = RunSummary {
        match_id,
        started_at,
        finished_at: now_iso(),
        anomaly_count: run.anomaly_records.len(),
        run,
    };
    if let Some(path) = cli.summary_out.as_ref() {
        write_summary(path, &summary)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }

    if has_anomaly {
        std::process::exit(1);
    }
    Ok(())
}

fn resolve_scenario(cli: &Cli) -> Result<Scenario> {
    let definition = match cli.config.as_deref() {
        Some(path) => GameDefinition::from_path(path)
            .with_context(|| format!("failed to load game definition {}", path.display()))?,
        None => GameDefinition::default(),
    };
    let level = definition.level(cli.level)?;
    let seed = cli
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs());
    Ok(Scenario {
        seed,
        level_no: level.level_no,
        lives: definition.num_lives,
        max_ticks: cli.ticks.unwrap_or(DEFAULT_TICKS),
        ghost_config: level.ghost_config()?,
        player_speed: level.pacman_speed.unwrap_or(CHASE_SPEED),
    })
}

fn run_scenario(scenario: &Scenario) -> Result<ScenarioRunResult> {
    let mut maze = GridMaze::parse(DEFAULT_MAP)?;
    let mut engine = GhostEngine::from_maze(&maze, scenario.ghost_config, scenario.seed);
    let mut level = Level::new(scenario.level_no, scenario.lives);
    let mut player = ScriptedPlayer::new(maze.player_spawn, scenario.player_speed);
    engine.apply_phase(level.current_mode());

    let mut phase_changes = 0;
    let mut lives_lost = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut ticks = 0;

    while ticks < scenario.max_ticks && !level.is_game_over() && maze.remaining_pellets() > 0 {
        ticks += 1;
        player.step(&maze);
        if GridMaze::is_cell_center(player.position) {
            if let Some(pellet) = maze.take_pellet(GridMaze::cell_of(player.position)) {
                level.add_points(pellet.points());
                if pellet == Pellet::Power {
                    engine.activate_frightened_mode(&mut level);
                }
            }
        }

        // The phase clock is suspended while ghosts are frightened.
        if !engine.is_frightened() {
            if let Some(mode) = level.tick(TICK_MS) {
                engine.apply_phase(mode);
                phase_changes += 1;
            }
        }

        engine.observe_player(player.position, player.direction);
        engine.step(TICK_MS, &maze);

        for idx in engine.colliding_ghosts(player.position, COLLISION_RADIUS) {
            engine.collide(idx, Collider::Player, &mut level);
            if level.take_restart() {
                lives_lost += 1;
                engine.reset_all();
                engine.apply_phase(level.current_mode());
                player.reset();
                break;
            }
        }

        let snapshot = engine.snapshot();
        for message in collect_snapshot_anomalies(&snapshot, &maze) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
    }

    let outcome = if maze.remaining_pellets() == 0 {
        Outcome::Cleared
    } else if level.is_game_over() {
        Outcome::GameOver
    } else {
        Outcome::Timeout
    };

    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            seed: scenario.seed,
            level: scenario.level_no,
            outcome,
            ticks,
            duration_ms: engine.elapsed_ms(),
            score: level.score(),
            lives: level.lives(),
            ghosts_eaten: engine.frightened().ghosts_eaten(),
            frightened_activations: engine.frightened().activations(),
            phase_changes,
            lives_lost,
            pellets_left: maze.remaining_pellets(),
            anomalies,
        },
        anomaly_records,
        final_snapshot: engine.snapshot(),
    })
}

fn collect_snapshot_anomalies(snapshot: &EngineSnapshot, maze: &GridMaze) -> Vec<String> {
    let mut anomalies = Vec::new();
    for ghost in &snapshot.ghosts {
        if !ghost.x.is_finite() || !ghost.y.is_finite() {
            anomalies.push(format!("ghost position not finite: {:?}", ghost.identity));
            continue;
        }
        if ghost.respawn_at.is_none() {
            let (x, y) = GridMaze::cell_of(Vec2::new(ghost.x, ghost.y));
            if !maze.is_walkable(x, y) {
                anomalies.push(format!("ghost inside wall: {:?}", ghost.identity));
            }
        }
        if ghost.mode == GhostMode::Frightened && snapshot.frightened_remaining_ms.is_none() {
            anomalies.push(format!(
                "ghost frightened without a running timer: {:?}",
                ghost.identity
            ));
        }
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u64, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)?;
    Ok(())
}
