//! Drives one headless level: player autopilot, fixed-step world ticks and
//! scene updates.

use std::time::Duration;

use anyhow::{Context, Result};
use maze_chase_core::{Command, Event};
use maze_chase_rendering::{FrameControl, PacManPresentation, Scene};
use maze_chase_world::{self as world, query, World};

use crate::{autopilot::Autopilot, timestep::FixedTimestep};

/// Limits after which the session stops.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionLimits {
    pub(crate) duration: Duration,
    pub(crate) lives: u32,
}

/// Totals reported when the session ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    pub(crate) ticks: u64,
    pub(crate) mode_changes: u32,
    pub(crate) power_pellets: u32,
    pub(crate) ghosts_eaten: u32,
    pub(crate) catches: u32,
    pub(crate) levels_cleared: u32,
}

pub(crate) struct Session {
    world: World,
    autopilot: Autopilot,
    timestep: FixedTimestep,
    limits: SessionLimits,
    elapsed: Duration,
    summary: SessionSummary,
}

impl Session {
    pub(crate) fn new(
        world: World,
        autopilot: Autopilot,
        timestep: FixedTimestep,
        limits: SessionLimits,
    ) -> Self {
        Self {
            world,
            autopilot,
            timestep,
            limits,
            elapsed: Duration::ZERO,
            summary: SessionSummary::default(),
        }
    }

    pub(crate) fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Advances the simulation by one presented frame and refreshes the scene.
    pub(crate) fn frame(&mut self, dt: Duration, scene: &mut Scene) -> Result<FrameControl> {
        self.timestep.accumulate(dt);

        let mut control = FrameControl::Continue;
        while let Some(step) = self.timestep.consume() {
            control = self.step(step)?;
            if control == FrameControl::Exit {
                break;
            }
        }

        self.refresh(scene);
        Ok(control)
    }

    fn step(&mut self, step: Duration) -> Result<FrameControl> {
        let grid = query::grid(&self.world);
        let eaten = self
            .autopilot
            .advance(grid, step)
            .context("player autopilot failed")?;

        let mut events = Vec::new();
        for kind in eaten {
            self.apply(Command::ConsumePellet { kind }, &mut events)?;
        }
        self.apply(
            Command::Tick {
                dt: step,
                pac_man: self.autopilot.snapshot(),
            },
            &mut events,
        )?;
        self.elapsed += step;
        self.summary.ticks += 1;

        let caught = self.record(&events);
        if caught {
            self.summary.catches += 1;
            if self.summary.catches >= self.limits.lives {
                tracing::info!(catches = self.summary.catches, "out of lives");
                return Ok(FrameControl::Exit);
            }
            self.restart_level()?;
        } else if self.autopilot.pellets_left() == 0 {
            self.summary.levels_cleared += 1;
            tracing::info!(elapsed = ?self.elapsed, "board cleared");
            self.restart_level()?;
        }

        if self.elapsed >= self.limits.duration {
            return Ok(FrameControl::Exit);
        }
        Ok(FrameControl::Continue)
    }

    fn apply(&mut self, command: Command, events: &mut Vec<Event>) -> Result<()> {
        world::apply(&mut self.world, command, events)
            .with_context(|| format!("level aborted after {:?}", self.elapsed))
    }

    fn restart_level(&mut self) -> Result<()> {
        let mut events = Vec::new();
        self.apply(Command::ResetLevel, &mut events)?;
        self.autopilot.restart(query::grid(&self.world));
        Ok(())
    }

    /// Logs the tick's events and reports whether the player was caught.
    fn record(&mut self, events: &[Event]) -> bool {
        let mut caught = false;
        for event in events {
            match event {
                Event::ModeChanged { mode } => {
                    self.summary.mode_changes += 1;
                    tracing::info!(?mode, elapsed = ?self.elapsed, "mode changed");
                }
                Event::FrightenedStarted => {
                    self.summary.power_pellets += 1;
                    tracing::info!(elapsed = ?self.elapsed, "ghosts frightened");
                }
                Event::FrightenedEnded => {
                    tracing::info!(elapsed = ?self.elapsed, "ghosts recovered");
                }
                Event::GhostEaten { personality } => {
                    self.summary.ghosts_eaten += 1;
                    tracing::info!(%personality, "ghost eaten");
                }
                Event::GhostRespawned { personality } => {
                    tracing::info!(%personality, "ghost respawned");
                }
                Event::GhostReleased { personality } => {
                    tracing::info!(%personality, "ghost released");
                }
                Event::PacManCaught { personality } => {
                    tracing::info!(%personality, elapsed = ?self.elapsed, "pac-man caught");
                    caught = true;
                }
            }
        }
        caught
    }

    fn refresh(&self, scene: &mut Scene) {
        scene.set_ghosts(&query::ghost_view(&self.world));
        scene.pac_man = PacManPresentation::new(
            self.autopilot.snapshot(),
            self.autopilot.position(),
            &scene.maze,
        );
        scene.active_mode = query::active_mode(&self.world);
        scene.elapsed = self.elapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_maze::{Grid, MazeDefinition};
    use maze_chase_rendering::{Color, MazePresentation};
    use maze_chase_world::Config;

    fn session(duration: Duration, seed: u64) -> (Session, Scene) {
        let grid = Grid::load(&MazeDefinition::classic()).expect("classic maze is valid");
        let autopilot = Autopilot::new(&grid, 7.6, seed);
        let maze = MazePresentation::new(
            grid.columns(),
            grid.rows(),
            16.0,
            Color::from_rgb_u8(33, 33, 222),
        )
        .expect("valid maze");
        let world = World::new(grid, Config::default().with_seed(seed)).expect("valid config");
        let scene = Scene::new(
            maze,
            Vec::new(),
            PacManPresentation::new(autopilot.snapshot(), autopilot.position(), &maze),
            query::active_mode(&world),
        );
        let session = Session::new(
            world,
            autopilot,
            FixedTimestep::from_rate(120),
            SessionLimits { duration, lives: 3 },
        );
        (session, scene)
    }

    fn run(session: &mut Session, scene: &mut Scene) {
        for _ in 0..100_000 {
            let control = session
                .frame(Duration::from_micros(16_667), scene)
                .expect("classic level runs without faults");
            if control == FrameControl::Exit {
                return;
            }
        }
        panic!("session never finished");
    }

    #[test]
    fn session_stops_at_the_time_limit() {
        let (mut session, mut scene) = session(Duration::from_secs(10), 11);

        run(&mut session, &mut scene);

        assert_eq!(scene.ghosts.len(), 4);
        assert!(session.summary().ticks > 0);
        assert!(session.summary().catches <= 3);
        assert!(scene.elapsed <= Duration::from_secs(11));
    }

    #[test]
    fn sessions_with_the_same_seed_agree() {
        let (mut first, mut first_scene) = session(Duration::from_secs(20), 3);
        let (mut second, mut second_scene) = session(Duration::from_secs(20), 3);

        run(&mut first, &mut first_scene);
        run(&mut second, &mut second_scene);

        assert_eq!(first.summary(), second.summary());
        assert_eq!(first_scene, second_scene);
    }
}
