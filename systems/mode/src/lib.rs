#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timer-driven scatter/chase schedule with a frightened override.
//!
//! The controller is a plain value owned by the world. It advances only when
//! the world feeds it elapsed time and reports every transition through the
//! shared event buffer so agents, audio and UI observe the same sequence.

use std::time::Duration;

use maze_chase_core::{ActiveMode, BaseMode, ElroyStage, Event, GhostState, TileKind};

/// One entry of the scatter/chase schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Phase {
    /// Base mode active during the phase.
    pub mode: BaseMode,
    /// Length of the phase.
    pub duration: Duration,
}

impl Phase {
    /// Creates a new schedule phase.
    #[must_use]
    pub const fn new(mode: BaseMode, duration: Duration) -> Self {
        Self { mode, duration }
    }
}

/// Multipliers applied to the base ghost speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedMultipliers {
    /// Applied while the ghost stands on a tunnel tile.
    pub tunnel: f32,
    /// Applied while the ghost is frightened.
    pub frightened: f32,
    /// Applied while the ghost returns home as eyes.
    pub eaten: f32,
    /// Applied to Blinky in Cruise Elroy stage one and two.
    pub elroy: [f32; 2],
}

/// Static inputs of a [`ModeController`].
#[derive(Clone, Debug, PartialEq)]
pub struct ModeSettings {
    /// Ordered scatter/chase phases. Chase continues once exhausted.
    pub schedule: Vec<Phase>,
    /// Length of the frightened override.
    pub frightened_duration: Duration,
    /// Trailing part of the override during which ghosts flash.
    pub frightened_flash: Duration,
    /// Speed multipliers consulted by [`ModeController::speed_for`].
    pub speeds: SpeedMultipliers,
}

/// Level-wide mode state machine.
#[derive(Clone, Debug)]
pub struct ModeController {
    settings: ModeSettings,
    phase_index: usize,
    elapsed: Duration,
    base: BaseMode,
    frightened_remaining: Option<Duration>,
}

impl ModeController {
    /// Creates a controller positioned at the start of the schedule.
    #[must_use]
    pub fn new(settings: ModeSettings) -> Self {
        let base = initial_mode(&settings.schedule);
        Self {
            settings,
            phase_index: 0,
            elapsed: Duration::ZERO,
            base,
            frightened_remaining: None,
        }
    }

    /// Advances both clocks by `dt`, emitting transition events.
    ///
    /// Leftover time carries into the next phase, so several phases may elapse
    /// within a single call. The schedule keeps running while frightened.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.advance_schedule(dt, out);

        if let Some(remaining) = self.frightened_remaining {
            let left = remaining.saturating_sub(dt);
            if left.is_zero() {
                self.frightened_remaining = None;
                out.push(Event::FrightenedEnded);
            } else {
                self.frightened_remaining = Some(left);
            }
        }
    }

    /// Starts (or restarts) the frightened override.
    pub fn activate_frightened(&mut self, out: &mut Vec<Event>) {
        self.frightened_remaining = Some(self.settings.frightened_duration);
        out.push(Event::FrightenedStarted);
    }

    /// Mode movement decisions should follow.
    #[must_use]
    pub fn active_mode(&self) -> ActiveMode {
        if self.frightened_remaining.is_some() {
            ActiveMode::Frightened
        } else {
            ActiveMode::from(self.base)
        }
    }

    /// Mode the schedule currently indicates, ignoring the override.
    #[must_use]
    pub const fn base_mode(&self) -> BaseMode {
        self.base
    }

    /// Time left on the frightened override, zero when inactive.
    #[must_use]
    pub fn frightened_remaining(&self) -> Duration {
        self.frightened_remaining.unwrap_or(Duration::ZERO)
    }

    /// Reports whether frightened ghosts should flash.
    #[must_use]
    pub fn is_flashing(&self) -> bool {
        self.frightened_remaining
            .is_some_and(|remaining| remaining <= self.settings.frightened_flash)
    }

    /// Speed multiplier for a ghost in the provided situation.
    ///
    /// Eaten beats tunnel, tunnel beats frightened, frightened beats Elroy.
    #[must_use]
    pub fn speed_for(&self, kind: TileKind, state: GhostState, elroy: ElroyStage) -> f32 {
        let speeds = &self.settings.speeds;
        if state == GhostState::Eaten {
            return speeds.eaten;
        }
        if kind == TileKind::Tunnel {
            return speeds.tunnel;
        }
        if state == GhostState::Frightened {
            return speeds.frightened;
        }
        match elroy {
            ElroyStage::Inactive => 1.0,
            ElroyStage::One => speeds.elroy[0],
            ElroyStage::Two => speeds.elroy[1],
        }
    }

    /// Restores the state the controller had when created.
    pub fn reset(&mut self) {
        self.phase_index = 0;
        self.elapsed = Duration::ZERO;
        self.base = initial_mode(&self.settings.schedule);
        self.frightened_remaining = None;
    }

    fn advance_schedule(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.phase_index >= self.settings.schedule.len() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);

        while let Some(phase) = self.settings.schedule.get(self.phase_index) {
            if self.elapsed < phase.duration {
                return;
            }

            self.elapsed -= phase.duration;
            self.phase_index += 1;

            let next = self
                .settings
                .schedule
                .get(self.phase_index)
                .map_or(BaseMode::Chase, |phase| phase.mode);
            if next != self.base {
                self.base = next;
                out.push(Event::ModeChanged { mode: next });
            }
        }

        self.elapsed = Duration::ZERO;
    }
}

fn initial_mode(schedule: &[Phase]) -> BaseMode {
    schedule.first().map_or(BaseMode::Chase, |phase| phase.mode)
}
