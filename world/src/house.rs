//! Ghost-house release policy.

use std::time::Duration;

use maze_chase_core::{Event, HouseProgress};
use maze_chase_system_ghosts::GhostAgent;

/// Decides when confined ghosts may leave the house.
///
/// Only the preferred ghost (the first one still waiting, in update order)
/// counts pellets. It leaves once its counter reaches its limit or once the
/// player has gone too long without eating.
#[derive(Clone, Debug)]
pub(crate) struct HousePolicy {
    pellet_limits: [u32; 4],
    idle_limit: Duration,
    counters: [u32; 4],
    idle: Duration,
}

impl HousePolicy {
    pub(crate) fn new(pellet_limits: [u32; 4], idle_limit: Duration) -> Self {
        Self {
            pellet_limits,
            idle_limit,
            counters: [0; 4],
            idle: Duration::ZERO,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.counters = [0; 4];
        self.idle = Duration::ZERO;
    }

    pub(crate) fn record_pellet(&mut self, agents: &[GhostAgent]) {
        self.idle = Duration::ZERO;
        if let Some(index) = preferred(agents) {
            let slot = &mut self.counters[agents[index].personality().index()];
            *slot = slot.saturating_add(1);
        }
    }

    pub(crate) fn release(
        &mut self,
        dt: Duration,
        agents: &mut [GhostAgent],
        out: &mut Vec<Event>,
    ) {
        self.idle = self.idle.saturating_add(dt);

        while let Some(index) = preferred(agents) {
            let personality = agents[index].personality();
            let by_pellets =
                self.counters[personality.index()] >= self.pellet_limits[personality.index()];
            let by_idle = self.idle >= self.idle_limit;
            if !by_pellets && !by_idle {
                return;
            }

            if !by_pellets {
                self.idle = Duration::ZERO;
            }
            if !agents[index].release() {
                return;
            }

            tracing::debug!(%personality, by_pellets, "ghost released from the house");
            out.push(Event::GhostReleased { personality });
        }
    }
}

fn preferred(agents: &[GhostAgent]) -> Option<usize> {
    agents
        .iter()
        .position(|agent| agent.house() == HouseProgress::Waiting)
}
