//! Tunable level parameters.

use std::time::Duration;

use maze_chase_core::{BaseMode, ConfigurationError};
use maze_chase_system_mode::{ModeSettings, Phase, SpeedMultipliers};
use serde::{Deserialize, Serialize};

/// One scatter/chase phase expressed in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulePhase {
    /// Base mode active during the phase.
    pub mode: BaseMode,
    /// Length of the phase in seconds.
    pub seconds: f32,
}

impl SchedulePhase {
    /// Creates a new schedule phase.
    #[must_use]
    pub const fn new(mode: BaseMode, seconds: f32) -> Self {
        Self { mode, seconds }
    }
}

/// Level configuration. Defaults reproduce level one of the reference game.
///
/// Missing fields fall back to their defaults when deserialising, so a JSON
/// file only needs to list the values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered scatter/chase phases; chase continues once exhausted.
    pub scatter_chase_schedule: Vec<SchedulePhase>,
    /// Length of the frightened override in seconds.
    pub frightened_duration_secs: f32,
    /// Trailing part of the override during which ghosts flash, in seconds.
    pub frightened_flash_secs: f32,
    /// Distance in tiles under which Clyde retreats to his corner.
    pub clyde_shy_radius: f32,
    /// Remaining-pellet counts that trigger Cruise Elroy stage one and two.
    pub elroy_pellet_thresholds: [u32; 2],
    /// Blinky's speed multipliers in Cruise Elroy stage one and two.
    pub elroy_speed_multipliers: [f32; 2],
    /// Speed multiplier on tunnel tiles.
    pub tunnel_speed_multiplier: f32,
    /// Speed multiplier while frightened.
    pub frightened_speed_multiplier: f32,
    /// Speed multiplier while returning home as eyes.
    pub eaten_speed_multiplier: f32,
    /// Base ghost speed in tiles per second.
    pub ghost_speed_tiles_per_sec: f32,
    /// Pellets the preferred waiting ghost must see before release, by personality.
    pub house_pellet_limits: [u32; 4],
    /// Seconds without a pellet after which the preferred waiting ghost leaves.
    pub house_idle_release_secs: f32,
    /// Seed of the frightened-movement random number generator.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scatter_chase_schedule: vec![
                SchedulePhase::new(BaseMode::Scatter, 7.0),
                SchedulePhase::new(BaseMode::Chase, 20.0),
                SchedulePhase::new(BaseMode::Scatter, 7.0),
                SchedulePhase::new(BaseMode::Chase, 20.0),
                SchedulePhase::new(BaseMode::Scatter, 5.0),
                SchedulePhase::new(BaseMode::Chase, 20.0),
                SchedulePhase::new(BaseMode::Scatter, 5.0),
            ],
            frightened_duration_secs: 6.0,
            frightened_flash_secs: 2.0,
            clyde_shy_radius: 8.0,
            elroy_pellet_thresholds: [20, 10],
            elroy_speed_multipliers: [1.0667, 1.1333],
            tunnel_speed_multiplier: 0.5333,
            frightened_speed_multiplier: 0.6667,
            eaten_speed_multiplier: 2.0,
            ghost_speed_tiles_per_sec: 7.1,
            house_pellet_limits: [0, 0, 30, 60],
            house_idle_release_secs: 4.0,
            rng_seed: 0x6a09_e667_f3bc_c908,
        }
    }
}

impl Config {
    /// Returns a copy of the configuration using the provided seed.
    #[must_use]
    pub fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Checks every value for range errors.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (index, phase) in self.scatter_chase_schedule.iter().enumerate() {
            let _ = seconds(&format!("scatter_chase_schedule[{index}]"), phase.seconds)?;
        }
        let _ = seconds("frightened_duration_secs", self.frightened_duration_secs)?;
        let _ = seconds("frightened_flash_secs", self.frightened_flash_secs)?;
        let _ = seconds("house_idle_release_secs", self.house_idle_release_secs)?;

        non_negative("clyde_shy_radius", self.clyde_shy_radius)?;
        positive("ghost_speed_tiles_per_sec", self.ghost_speed_tiles_per_sec)?;
        positive("tunnel_speed_multiplier", self.tunnel_speed_multiplier)?;
        positive("frightened_speed_multiplier", self.frightened_speed_multiplier)?;
        positive("eaten_speed_multiplier", self.eaten_speed_multiplier)?;
        for multiplier in self.elroy_speed_multipliers {
            positive("elroy_speed_multipliers", multiplier)?;
        }

        let [first, second] = self.elroy_pellet_thresholds;
        if second > first {
            return Err(ConfigurationError::InvalidConfig(format!(
                "elroy_pellet_thresholds must be descending, got [{first}, {second}]"
            )));
        }

        Ok(())
    }

    pub(crate) fn mode_settings(&self) -> Result<ModeSettings, ConfigurationError> {
        let schedule = self
            .scatter_chase_schedule
            .iter()
            .map(|phase| {
                seconds("scatter_chase_schedule", phase.seconds)
                    .map(|duration| Phase::new(phase.mode, duration))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ModeSettings {
            schedule,
            frightened_duration: seconds(
                "frightened_duration_secs",
                self.frightened_duration_secs,
            )?,
            frightened_flash: seconds("frightened_flash_secs", self.frightened_flash_secs)?,
            speeds: SpeedMultipliers {
                tunnel: self.tunnel_speed_multiplier,
                frightened: self.frightened_speed_multiplier,
                eaten: self.eaten_speed_multiplier,
                elroy: self.elroy_speed_multipliers,
            },
        })
    }

    pub(crate) fn idle_release(&self) -> Result<Duration, ConfigurationError> {
        seconds("house_idle_release_secs", self.house_idle_release_secs)
    }
}

fn seconds(name: &str, value: f32) -> Result<Duration, ConfigurationError> {
    Duration::try_from_secs_f32(value).map_err(|_| {
        ConfigurationError::InvalidConfig(format!(
            "{name} must be a finite, non-negative number of seconds, got {value}"
        ))
    })
}

fn positive(name: &str, value: f32) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidConfig(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidConfig(format!(
            "{name} must not be negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn negative_durations_are_rejected() {
        let config = Config {
            frightened_duration_secs: -1.0,
            ..Config::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidConfig(message))
                if message.contains("frightened_duration_secs")
        ));
    }

    #[test]
    fn thresholds_must_descend() {
        let config = Config {
            elroy_pellet_thresholds: [10, 20],
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn mode_settings_convert_seconds() {
        let settings = Config::default().mode_settings().expect("valid defaults");

        assert_eq!(settings.schedule.len(), 7);
        assert_eq!(settings.schedule[0].duration, Duration::from_secs(7));
        assert_eq!(settings.frightened_duration, Duration::from_secs(6));
    }
}
