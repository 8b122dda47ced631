#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ghost agents: behaviour state machine and grid-locked movement.
//!
//! Each [`GhostAgent`] travels from tile centre to tile centre. Decisions are
//! only taken on arrival at a centre, so a ghost is exactly tile-aligned
//! whenever it picks a new direction. Between centres its position is
//! interpolated continuously for rendering.

use std::time::Duration;

use maze_chase_core::{
    BaseMode, ConfigurationError, Direction, DirectionSet, ElroyStage, Event, GhostSnapshot,
    GhostState, HouseProgress, PacManSnapshot, Personality, TileCoord, TileKind, TilePoint,
    VisualState,
};
use maze_chase_maze::{Access, Grid};
use maze_chase_system_mode::ModeController;
use maze_chase_system_targeting::{target_tile, Target, TargetRequest};
use rand::{seq::SliceRandom, Rng};

const MAX_ARRIVALS_PER_UPDATE: usize = 64;

/// Behaviour of a ghost: a base mode, optionally wrapped by an override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Behaviour {
    /// Following the scatter/chase schedule.
    Base(BaseMode),
    /// Frightened; resumes `resume` when the override ends.
    Frightened {
        /// Base mode to return to.
        resume: BaseMode,
    },
    /// Eaten; resumes `resume` after respawning.
    Eaten {
        /// Base mode to return to.
        resume: BaseMode,
    },
}

impl Behaviour {
    /// Behaviour state tag reported to adapters.
    #[must_use]
    pub const fn state(self) -> GhostState {
        match self {
            Self::Base(BaseMode::Scatter) => GhostState::Scatter,
            Self::Base(BaseMode::Chase) => GhostState::Chase,
            Self::Frightened { .. } => GhostState::Frightened,
            Self::Eaten { .. } => GhostState::Eaten,
        }
    }
}

/// Shared, read-only inputs of a single agent update.
#[derive(Clone, Copy, Debug)]
pub struct UpdateContext<'a> {
    /// Maze the agent moves through.
    pub grid: &'a Grid,
    /// Level-wide mode controller.
    pub controller: &'a ModeController,
    /// Player position and facing for this tick.
    pub pac_man: PacManSnapshot,
    /// Tile Blinky occupies after its own update this tick.
    pub blinky_tile: TileCoord,
    /// Cruise Elroy stage applying to this agent.
    pub elroy: ElroyStage,
    /// Base ghost speed in tiles per second.
    pub base_speed: f32,
    /// Distance under which Clyde gives up the chase.
    pub clyde_shy_radius: f32,
    /// Simulated time to integrate.
    pub dt: Duration,
}

/// A single pursuing ghost.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostAgent {
    personality: Personality,
    tile: TileCoord,
    next: Option<TileCoord>,
    direction: Direction,
    progress: f32,
    behaviour: Behaviour,
    pending_mode: Option<BaseMode>,
    house: HouseProgress,
}

impl GhostAgent {
    /// Places the ghost on its level-start tile.
    ///
    /// Blinky starts outside the house; every other ghost waits for release.
    #[must_use]
    pub fn new(personality: Personality, grid: &Grid, base: BaseMode) -> Self {
        let start = grid.ghost_start(personality);
        let house = if personality == Personality::Blinky {
            HouseProgress::Roaming
        } else {
            HouseProgress::Waiting
        };
        Self::placed(personality, start.tile, start.direction, base, house)
    }

    /// Places a ghost on an arbitrary tile centre.
    #[must_use]
    pub fn placed(
        personality: Personality,
        tile: TileCoord,
        direction: Direction,
        base: BaseMode,
        house: HouseProgress,
    ) -> Self {
        Self {
            personality,
            tile,
            next: None,
            direction,
            progress: 0.0,
            behaviour: Behaviour::Base(base),
            pending_mode: None,
            house,
        }
    }

    /// Personality of the ghost.
    #[must_use]
    pub const fn personality(&self) -> Personality {
        self.personality
    }

    /// Current behaviour including any override.
    #[must_use]
    pub const fn behaviour(&self) -> Behaviour {
        self.behaviour
    }

    /// Behaviour state tag.
    #[must_use]
    pub const fn state(&self) -> GhostState {
        self.behaviour.state()
    }

    /// Base mode waiting to be committed at the next intersection.
    #[must_use]
    pub const fn pending_mode(&self) -> Option<BaseMode> {
        self.pending_mode
    }

    /// Direction of travel.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// House lifecycle progress.
    #[must_use]
    pub const fn house(&self) -> HouseProgress {
        self.house
    }

    /// Fraction of the current segment already travelled.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Reports whether the ghost sits exactly on a tile centre.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.next.is_none() || self.progress == 0.0
    }

    /// Nearest tile centre: the origin before the midpoint, the destination after.
    #[must_use]
    pub fn occupied_tile(&self) -> TileCoord {
        match self.next {
            Some(next) if self.progress >= 0.5 => next,
            _ => self.tile,
        }
    }

    /// Continuous position in tile units.
    ///
    /// Inside a wrapping tunnel the point may lie just outside the grid.
    #[must_use]
    pub fn world_position(&self) -> TilePoint {
        let (column, row) = self.direction.delta();
        let progress = if self.next.is_some() { self.progress } else { 0.0 };
        TilePoint::new(
            self.tile.column() as f32 + column as f32 * progress,
            self.tile.row() as f32 + row as f32 * progress,
        )
    }

    /// Tag rendering adapters use to tint the ghost.
    #[must_use]
    pub const fn visual(&self, flashing: bool) -> VisualState {
        match self.behaviour {
            Behaviour::Eaten { .. } => VisualState::Eyes,
            Behaviour::Frightened { .. } if flashing => VisualState::FrightenedFlashing,
            Behaviour::Frightened { .. } => VisualState::Frightened,
            Behaviour::Base(_) => VisualState::Normal,
        }
    }

    /// Read-only snapshot of the agent.
    #[must_use]
    pub fn snapshot(&self, flashing: bool) -> GhostSnapshot {
        GhostSnapshot {
            personality: self.personality,
            tile: self.occupied_tile(),
            position: self.world_position(),
            direction: self.direction,
            state: self.state(),
            visual: self.visual(flashing),
            house: self.house,
        }
    }

    /// Reacts to a scatter/chase flip.
    ///
    /// Roaming ghosts in a base state reverse immediately and adopt the new
    /// mode at the next intersection they reach. Overridden ghosts only update
    /// the mode they resume into.
    pub fn on_mode_changed(&mut self, mode: BaseMode) {
        match self.behaviour {
            Behaviour::Base(_) if self.house == HouseProgress::Roaming => {
                self.pending_mode = Some(mode);
                self.reverse();
            }
            Behaviour::Base(_) => self.behaviour = Behaviour::Base(mode),
            Behaviour::Frightened { .. } => self.behaviour = Behaviour::Frightened { resume: mode },
            Behaviour::Eaten { .. } => self.behaviour = Behaviour::Eaten { resume: mode },
        }
    }

    /// Enters the frightened override. Eaten ghosts are unaffected.
    pub fn on_frightened_started(&mut self) {
        let resume = match self.behaviour {
            Behaviour::Eaten { .. } => return,
            Behaviour::Base(mode) => self.pending_mode.take().unwrap_or(mode),
            Behaviour::Frightened { resume } => resume,
        };
        self.behaviour = Behaviour::Frightened { resume };

        if self.house == HouseProgress::Roaming {
            self.reverse();
        }
    }

    /// Leaves the frightened override, adopting the schedule's current mode.
    pub fn on_frightened_ended(&mut self, base: BaseMode) {
        if let Behaviour::Frightened { .. } = self.behaviour {
            self.behaviour = Behaviour::Base(base);
        }
    }

    /// Turns a frightened ghost into eyes heading home.
    ///
    /// Returns `false` when the ghost was not frightened.
    pub fn mark_eaten(&mut self) -> bool {
        match self.behaviour {
            Behaviour::Frightened { resume } => {
                self.behaviour = Behaviour::Eaten { resume };
                true
            }
            _ => false,
        }
    }

    /// Lets a waiting ghost start leaving the house.
    ///
    /// Returns `false` when the ghost was not waiting.
    pub fn release(&mut self) -> bool {
        if self.house != HouseProgress::Waiting {
            return false;
        }
        self.house = HouseProgress::Exiting;
        true
    }

    /// Turns the ghost around on the spot.
    ///
    /// Mid-segment the origin and destination swap and the progress mirrors,
    /// so the rendered position does not jump.
    pub fn reverse(&mut self) {
        self.direction = self.direction.opposite();
        match self.next {
            Some(next) if self.progress > 0.0 => {
                self.next = Some(self.tile);
                self.tile = next;
                self.progress = 1.0 - self.progress;
            }
            _ => {
                self.next = None;
                self.progress = 0.0;
            }
        }
    }

    /// Integrates movement for `ctx.dt`, deciding at every tile-centre arrival.
    ///
    /// On failure the ghost holds its position.
    pub fn update<R>(
        &mut self,
        ctx: &UpdateContext<'_>,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> Result<(), ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        if self.house == HouseProgress::Waiting {
            return Ok(());
        }

        let mut budget = ctx.dt.as_secs_f32();

        for _ in 0..MAX_ARRIVALS_PER_UPDATE {
            if self.next.is_none() {
                if self.arrive(ctx, rng, out)? == Arrival::Hold {
                    return Ok(());
                }
            }

            let Some(next) = self.next else {
                return Ok(());
            };

            let kind = ctx.grid.kind(self.tile).unwrap_or(TileKind::Walkable);
            let speed = ctx.base_speed * ctx.controller.speed_for(kind, self.state(), ctx.elroy);
            if speed <= 0.0 {
                return Ok(());
            }

            let needed = (1.0 - self.progress) / speed;
            if budget < needed {
                self.progress += budget * speed;
                return Ok(());
            }

            budget -= needed;
            self.tile = next;
            self.next = None;
            self.progress = 0.0;
        }

        tracing::warn!(
            personality = %self.personality,
            leftover_secs = budget,
            "arrival cap reached, remaining movement dropped"
        );
        Ok(())
    }

    fn arrive<R>(
        &mut self,
        ctx: &UpdateContext<'_>,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> Result<Arrival, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        let grid = ctx.grid;

        if let Behaviour::Eaten { resume } = self.behaviour {
            if self.tile == grid.house_entry() {
                self.respawn(grid, resume, out);
                return Ok(Arrival::Hold);
            }
            self.head_home(grid)?;
            return Ok(Arrival::Move);
        }

        if self.house == HouseProgress::Exiting {
            if self.tile != grid.house_entry() {
                self.head_home(grid)?;
                return Ok(Arrival::Move);
            }
            self.house = HouseProgress::Roaming;
            tracing::debug!(personality = %self.personality, "ghost left the house");
        }

        self.roam(ctx, rng)?;
        Ok(Arrival::Move)
    }

    fn respawn(&mut self, grid: &Grid, resume: BaseMode, out: &mut Vec<Event>) {
        self.tile = grid.house_respawn();
        self.next = None;
        self.progress = 0.0;
        self.direction = Direction::Up;
        self.behaviour = Behaviour::Base(resume);
        self.pending_mode = None;
        self.house = HouseProgress::Exiting;
        out.push(Event::GhostRespawned {
            personality: self.personality,
        });
    }

    fn head_home(&mut self, grid: &Grid) -> Result<(), ConfigurationError> {
        let mut best: Option<Candidate> = None;

        for (rank, direction) in Direction::PRIORITY.into_iter().enumerate() {
            let Some(neighbor) = grid.neighbor(self.tile, direction) else {
                continue;
            };
            if !grid.is_walkable(neighbor, Access::GHOST_THROUGH_DOOR) {
                continue;
            }
            let Some(distance) = grid.house_distance(neighbor) else {
                continue;
            };

            let candidate = Candidate {
                direction,
                neighbor,
                score: i64::from(distance),
                rank,
            };
            best = Some(match best {
                Some(existing) if !candidate.is_better_than(existing) => existing,
                _ => candidate,
            });
        }

        let best = best.ok_or_else(|| self.stuck())?;
        self.direction = best.direction;
        self.next = Some(best.neighbor);
        Ok(())
    }

    fn roam<R>(&mut self, ctx: &UpdateContext<'_>, rng: &mut R) -> Result<(), ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        let grid = ctx.grid;
        let exits = grid
            .legal_exits(self.tile, Access::GHOST)
            .map_err(|_| self.stuck())?;
        let at_intersection = grid
            .is_intersection(self.tile, Access::GHOST)
            .map_err(|_| self.stuck())?;

        if at_intersection {
            if let (Some(mode), Behaviour::Base(_)) = (self.pending_mode, self.behaviour) {
                self.behaviour = Behaviour::Base(mode);
                self.pending_mode = None;
            }
        }

        if !at_intersection && exits.contains(self.direction) {
            self.next = grid.neighbor(self.tile, self.direction);
            return Ok(());
        }

        let candidates = self.candidates(grid, exits);
        if candidates.is_empty() {
            return Err(self.stuck());
        }

        let request = TargetRequest {
            personality: self.personality,
            agent_tile: self.tile,
            state: self.state(),
            pac_man: ctx.pac_man,
            blinky_tile: ctx.blinky_tile,
            grid,
            clyde_shy_radius: ctx.clyde_shy_radius,
        };

        let choice = match target_tile(&request) {
            Target::Wander => {
                let options: Vec<Direction> = candidates.iter().collect();
                options.choose(rng).copied()
            }
            Target::Tile(target) => closest_to(self.tile, candidates, target),
        }
        .ok_or_else(|| self.stuck())?;

        tracing::trace!(
            personality = %self.personality,
            tile = %self.tile,
            direction = ?choice,
            state = ?self.state(),
            "ghost chose direction"
        );

        self.direction = choice;
        self.next = grid.neighbor(self.tile, choice);
        Ok(())
    }

    fn candidates(&self, grid: &Grid, exits: DirectionSet) -> DirectionSet {
        let forward = exits.without(self.direction.opposite());
        let mut candidates = if forward.is_empty() { exits } else { forward };

        let restricted = matches!(self.state(), GhostState::Chase | GhostState::Scatter)
            && grid.is_restricted_up(self.tile);
        if restricted {
            // Up stays legal when it is the only way forward.
            let without_up = candidates.without(Direction::Up);
            if !without_up.is_empty() {
                candidates = without_up;
            }
        }
        candidates
    }

    fn stuck(&self) -> ConfigurationError {
        ConfigurationError::NoLegalExits {
            personality: self.personality,
            tile: self.tile,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Arrival {
    Move,
    Hold,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    direction: Direction,
    neighbor: TileCoord,
    score: i64,
    rank: usize,
}

impl Candidate {
    fn is_better_than(self, other: Candidate) -> bool {
        (self.score, self.rank) < (other.score, other.rank)
    }
}

fn closest_to(tile: TileCoord, candidates: DirectionSet, target: TileCoord) -> Option<Direction> {
    let mut best: Option<Candidate> = None;

    for (rank, direction) in Direction::PRIORITY.into_iter().enumerate() {
        if !candidates.contains(direction) {
            continue;
        }

        let adjacent = tile.offset(direction, 1);
        let candidate = Candidate {
            direction,
            neighbor: adjacent,
            score: adjacent.squared_distance(target),
            rank,
        };
        best = Some(match best {
            Some(existing) if !candidate.is_better_than(existing) => existing,
            _ => candidate,
        });
    }

    best.map(|candidate| candidate.direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_to_breaks_ties_by_priority() {
        let all: DirectionSet = Direction::PRIORITY.into_iter().collect();
        let tile = TileCoord::new(6, 5);

        assert_eq!(
            closest_to(tile, all, TileCoord::new(7, 4)),
            Some(Direction::Up)
        );
        assert_eq!(
            closest_to(tile, all.without(Direction::Up), TileCoord::new(5, 6)),
            Some(Direction::Left)
        );
        assert_eq!(
            closest_to(tile, all, TileCoord::new(6, 30)),
            Some(Direction::Down)
        );
    }

    #[test]
    fn candidate_ranking_prefers_lower_scores() {
        let near = Candidate {
            direction: Direction::Right,
            neighbor: TileCoord::new(1, 0),
            score: 1,
            rank: 3,
        };
        let far = Candidate {
            direction: Direction::Up,
            neighbor: TileCoord::new(0, -1),
            score: 2,
            rank: 0,
        };

        assert!(near.is_better_than(far));
        assert!(!far.is_better_than(near));
    }

    #[test]
    fn behaviour_state_tags() {
        assert_eq!(Behaviour::Base(BaseMode::Chase).state(), GhostState::Chase);
        assert_eq!(
            Behaviour::Eaten {
                resume: BaseMode::Scatter
            }
            .state(),
            GhostState::Eaten
        );
    }
}
