//! Fixed-step accumulator decoupling simulation ticks from presented frames.

use std::time::Duration;

/// Accumulates frame time and hands it back in fixed simulation steps.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    pub(crate) fn new(step: Duration) -> Self {
        Self {
            step,
            accumulator: Duration::ZERO,
        }
    }

    pub(crate) fn from_rate(ticks_per_second: u32) -> Self {
        Self::new(Duration::from_secs(1) / ticks_per_second.max(1))
    }

    /// Adds presented frame time to the accumulator.
    pub(crate) fn accumulate(&mut self, frame: Duration) {
        self.accumulator = self.accumulator.saturating_add(frame);
    }

    /// Takes one step out of the accumulator if enough time is banked.
    pub(crate) fn consume(&mut self) -> Option<Duration> {
        if self.step.is_zero() || self.accumulator < self.step {
            return None;
        }
        self.accumulator -= self.step;
        Some(self.step)
    }
}
