#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for the Maze Chase ghost engine.
//!
//! The world owns the maze, the mode controller, the four ghost agents and the
//! random number generator. Adapters mutate it exclusively through [`apply`]
//! and read it through the [`query`] module.

mod config;
mod house;

use std::time::Duration;

use maze_chase_core::{
    Command, ConfigurationError, Direction, ElroyStage, Event, GhostState, PacManSnapshot,
    PelletKind, Personality,
};
use maze_chase_maze::Grid;
use maze_chase_system_ghosts::{GhostAgent, UpdateContext};
use maze_chase_system_mode::ModeController;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use config::{Config, SchedulePhase};
use house::HousePolicy;

/// Represents the authoritative state of a single level.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    config: Config,
    controller: ModeController,
    agents: Vec<GhostAgent>,
    house: HousePolicy,
    rng: ChaCha8Rng,
    pellets_consumed: u32,
    pac_man: PacManSnapshot,
    fault: Option<ConfigurationError>,
}

impl World {
    /// Creates a level on the provided maze.
    pub fn new(grid: Grid, config: Config) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let controller = ModeController::new(config.mode_settings()?);
        let house = HousePolicy::new(config.house_pellet_limits, config.idle_release()?);
        let agents = spawn_agents(&grid, &controller);
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let pac_man = PacManSnapshot::new(grid.pac_man_start(), Direction::Left);

        Ok(Self {
            grid,
            config,
            controller,
            agents,
            house,
            rng,
            pellets_consumed: 0,
            pac_man,
            fault: None,
        })
    }

    fn reset_level(&mut self) {
        self.controller.reset();
        self.agents = spawn_agents(&self.grid, &self.controller);
        self.house.reset();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
        self.pellets_consumed = 0;
        self.pac_man = PacManSnapshot::new(self.grid.pac_man_start(), Direction::Left);
    }

    fn pellets_remaining(&self) -> u32 {
        self.grid.pellet_count().saturating_sub(self.pellets_consumed)
    }

    fn elroy_stage(&self) -> ElroyStage {
        let remaining = self.pellets_remaining();
        let [first, second] = self.config.elroy_pellet_thresholds;
        if remaining <= second {
            ElroyStage::Two
        } else if remaining <= first {
            ElroyStage::One
        } else {
            ElroyStage::Inactive
        }
    }

    fn tick(
        &mut self,
        dt: Duration,
        pac_man: PacManSnapshot,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ConfigurationError> {
        self.pac_man = pac_man;

        let mut mode_events = Vec::new();
        self.controller.advance(dt, &mut mode_events);
        for event in &mode_events {
            match *event {
                Event::ModeChanged { mode } => {
                    tracing::debug!(?mode, "scatter/chase mode changed");
                    for agent in &mut self.agents {
                        agent.on_mode_changed(mode);
                    }
                }
                Event::FrightenedEnded => {
                    let base = self.controller.base_mode();
                    tracing::debug!(?base, "frightened override ended");
                    for agent in &mut self.agents {
                        agent.on_frightened_ended(base);
                    }
                }
                _ => {}
            }
        }
        out_events.append(&mut mode_events);

        self.house.release(dt, &mut self.agents, out_events);

        let elroy = self.elroy_stage();
        let mut blinky_tile = self.agents[Personality::Blinky.index()].occupied_tile();
        for agent in &mut self.agents {
            let is_blinky = agent.personality() == Personality::Blinky;
            let ctx = UpdateContext {
                grid: &self.grid,
                controller: &self.controller,
                pac_man,
                blinky_tile,
                elroy: if is_blinky {
                    elroy
                } else {
                    ElroyStage::Inactive
                },
                base_speed: self.config.ghost_speed_tiles_per_sec,
                clyde_shy_radius: self.config.clyde_shy_radius,
                dt,
            };

            let before = out_events.len();
            agent.update(&ctx, &mut self.rng, out_events)?;
            for event in &out_events[before..] {
                if let Event::GhostRespawned { personality } = event {
                    tracing::debug!(%personality, "ghost respawned in the house");
                }
            }

            if is_blinky {
                blinky_tile = agent.occupied_tile();
            }
        }

        self.resolve_collisions(out_events);
        Ok(())
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        for agent in &mut self.agents {
            if agent.occupied_tile() != self.pac_man.tile {
                continue;
            }

            let personality = agent.personality();
            match agent.state() {
                GhostState::Frightened => {
                    if agent.mark_eaten() {
                        tracing::debug!(%personality, "ghost eaten");
                        out_events.push(Event::GhostEaten { personality });
                    }
                }
                GhostState::Chase | GhostState::Scatter => {
                    out_events.push(Event::PacManCaught { personality });
                }
                GhostState::Eaten => {}
            }
        }
    }

    fn consume_pellet(&mut self, kind: PelletKind, out_events: &mut Vec<Event>) {
        self.pellets_consumed = self
            .pellets_consumed
            .saturating_add(1)
            .min(self.grid.pellet_count());
        self.house.record_pellet(&self.agents);

        if kind == PelletKind::Power {
            self.controller.activate_frightened(out_events);
            tracing::debug!("frightened override started");
            for agent in &mut self.agents {
                agent.on_frightened_started();
            }
        }
    }
}

fn spawn_agents(grid: &Grid, controller: &ModeController) -> Vec<GhostAgent> {
    Personality::ALL
        .into_iter()
        .map(|personality| GhostAgent::new(personality, grid, controller.base_mode()))
        .collect()
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// A configuration fault aborts the level: the error is returned and every
/// later call fails with the same error.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), ConfigurationError> {
    if let Some(fault) = &world.fault {
        return Err(fault.clone());
    }

    let result = match command {
        Command::Tick { dt, pac_man } => world.tick(dt, pac_man, out_events),
        Command::ConsumePellet { kind } => {
            world.consume_pellet(kind, out_events);
            Ok(())
        }
        Command::ResetLevel => {
            world.reset_level();
            Ok(())
        }
    };

    if let Err(error) = &result {
        tracing::error!(%error, "configuration fault aborted the level");
        world.fault = Some(error.clone());
    }

    result
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use maze_chase_core::{
        ActiveMode, BaseMode, ConfigurationError, ElroyStage, GhostView, PacManSnapshot,
    };
    use maze_chase_maze::Grid;

    use super::{Config, World};

    /// Provides read-only access to the level's maze.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Provides read-only access to the level configuration.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Captures a read-only view of the ghosts in update order.
    #[must_use]
    pub fn ghost_view(world: &World) -> GhostView {
        let flashing = world.controller.is_flashing();
        GhostView::from_snapshots(
            world
                .agents
                .iter()
                .map(|agent| agent.snapshot(flashing))
                .collect(),
        )
    }

    /// Mode movement decisions currently follow.
    #[must_use]
    pub fn active_mode(world: &World) -> ActiveMode {
        world.controller.active_mode()
    }

    /// Mode the scatter/chase schedule currently indicates.
    #[must_use]
    pub fn base_mode(world: &World) -> BaseMode {
        world.controller.base_mode()
    }

    /// Time left on the frightened override.
    #[must_use]
    pub fn frightened_remaining(world: &World) -> Duration {
        world.controller.frightened_remaining()
    }

    /// Pellets still on the board.
    #[must_use]
    pub fn pellets_remaining(world: &World) -> u32 {
        world.pellets_remaining()
    }

    /// Cruise Elroy stage applying to Blinky.
    #[must_use]
    pub fn elroy_stage(world: &World) -> ElroyStage {
        world.elroy_stage()
    }

    /// Player snapshot observed on the most recent tick.
    #[must_use]
    pub fn pac_man(world: &World) -> PacManSnapshot {
        world.pac_man
    }

    /// Fault that aborted the level, if any.
    #[must_use]
    pub fn fault(world: &World) -> Option<&ConfigurationError> {
        world.fault.as_ref()
    }
}
