#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Maze Chase level headless.

mod autopilot;
mod backend;
mod session;
mod timestep;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use maze_chase_maze::{Grid, MazeDefinition};
use maze_chase_rendering::{
    Color, MazePresentation, PacManPresentation, Presentation, RenderingBackend, Scene,
};
use maze_chase_world::{query, Config, World};

use autopilot::Autopilot;
use backend::TextBackend;
use session::{Session, SessionLimits};
use timestep::FixedTimestep;

const TILE_LENGTH: f32 = 16.0;

/// Runs the ghost engine against a scripted player and logs what happens.
#[derive(Debug, Parser)]
#[command(name = "maze-chase", version)]
struct Args {
    /// JSON file with level configuration overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON maze definition; the classic layout is used when omitted.
    #[arg(long)]
    maze: Option<PathBuf>,
    /// Overrides the configured random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated seconds to run for.
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
    /// Presented frames per simulated second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    frame_rate: u32,
    /// Simulation ticks per simulated second.
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u32).range(1..))]
    tick_rate: u32,
    /// Print a scene line every this many frames; 0 prints only the last one.
    #[arg(long, default_value_t = 60)]
    report_every: u32,
    /// Player speed in tiles per second.
    #[arg(long, default_value_t = 7.6)]
    pac_man_speed: f32,
    /// Catches after which the run ends.
    #[arg(long, default_value_t = 3)]
    lives: u32,
}

/// Entry point for the Maze Chase command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let duration = Duration::try_from_secs_f32(args.seconds).with_context(|| {
        format!(
            "--seconds must be a non-negative duration, got {}",
            args.seconds
        )
    })?;
    ensure!(
        args.pac_man_speed.is_finite() && args.pac_man_speed > 0.0,
        "--pac-man-speed must be positive, got {}",
        args.pac_man_speed
    );

    let mut config = load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let definition = load_maze(args.maze.as_ref())?;
    let grid = Grid::load(&definition).context("maze definition is invalid")?;

    let autopilot = Autopilot::new(&grid, args.pac_man_speed, config.rng_seed);
    let maze = MazePresentation::new(
        grid.columns(),
        grid.rows(),
        TILE_LENGTH,
        Color::from_rgb_u8(33, 33, 222),
    )?;
    let world = World::new(grid, config).context("level configuration is invalid")?;
    tracing::info!(
        seed = query::config(&world).rng_seed,
        pellets = query::pellets_remaining(&world),
        "level loaded"
    );

    let scene = Scene::new(
        maze,
        Vec::new(),
        PacManPresentation::new(autopilot.snapshot(), autopilot.position(), &maze),
        query::active_mode(&world),
    );
    let presentation = Presentation::new("Maze Chase", Color::from_rgb_u8(0, 0, 0), scene);

    let mut session = Session::new(
        world,
        autopilot,
        FixedTimestep::from_rate(args.tick_rate),
        SessionLimits {
            duration,
            lives: args.lives,
        },
    );
    TextBackend::new(args.frame_rate, args.report_every)
        .run(presentation, |dt, scene| session.frame(dt, scene))?;

    let summary = session.summary();
    println!(
        "ticks={} mode_changes={} power_pellets={} ghosts_eaten={} catches={} levels_cleared={}",
        summary.ticks,
        summary.mode_changes,
        summary.power_pellets,
        summary.ghosts_eaten,
        summary.catches,
        summary.levels_cleared
    );
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn load_maze(path: Option<&PathBuf>) -> Result<MazeDefinition> {
    let Some(path) = path else {
        return Ok(MazeDefinition::classic());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read maze {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse maze {}", path.display()))
}
