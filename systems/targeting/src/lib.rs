#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic ghost target tiles.
//!
//! Every ghost steers toward a single tile. Which tile depends on its
//! behaviour state and, while chasing, on its personality. The functions here
//! read immutable inputs only, so identical inputs always produce identical
//! targets.

use maze_chase_core::{GhostState, PacManSnapshot, Personality, TileCoord};
use maze_chase_maze::Grid;

const PINKY_LOOKAHEAD: i32 = 4;
const INKY_PIVOT_LOOKAHEAD: i32 = 2;

/// Destination a ghost steers toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// Minimise the straight-line distance to this tile.
    Tile(TileCoord),
    /// Pick uniformly among the legal exits.
    Wander,
}

/// Chase strategy bound to a personality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Head straight for the player.
    Blinky,
    /// Aim a few tiles ahead of the player.
    Pinky,
    /// Flank by reflecting Blinky through a point ahead of the player.
    Inky,
    /// Chase from afar, retreat up close.
    Clyde,
}

impl From<Personality> for Strategy {
    fn from(personality: Personality) -> Self {
        match personality {
            Personality::Blinky => Self::Blinky,
            Personality::Pinky => Self::Pinky,
            Personality::Inky => Self::Inky,
            Personality::Clyde => Self::Clyde,
        }
    }
}

/// Inputs sampled once per decision.
#[derive(Clone, Copy, Debug)]
pub struct TargetRequest<'a> {
    /// Ghost asking for a target.
    pub personality: Personality,
    /// Tile the ghost currently occupies.
    pub agent_tile: TileCoord,
    /// Behaviour state of the ghost.
    pub state: GhostState,
    /// Player position and facing.
    pub pac_man: PacManSnapshot,
    /// Tile Blinky occupies after its own update this tick.
    pub blinky_tile: TileCoord,
    /// Maze providing bounds and anchors.
    pub grid: &'a Grid,
    /// Distance under which Clyde gives up the chase.
    pub clyde_shy_radius: f32,
}

/// Computes the target for the provided request.
#[must_use]
pub fn target_tile(request: &TargetRequest<'_>) -> Target {
    match request.state {
        GhostState::Frightened => Target::Wander,
        GhostState::Eaten => Target::Tile(request.grid.house_entry()),
        GhostState::Scatter => Target::Tile(request.grid.scatter_corner(request.personality)),
        GhostState::Chase => Target::Tile(Strategy::from(request.personality).chase(request)),
    }
}

impl Strategy {
    /// Chase-mode target tile of the strategy.
    #[must_use]
    pub fn chase(self, request: &TargetRequest<'_>) -> TileCoord {
        let pac_man = request.pac_man;
        match self {
            Self::Blinky => pac_man.tile,
            Self::Pinky => request
                .grid
                .clamp(pac_man.tile.offset(pac_man.facing, PINKY_LOOKAHEAD)),
            Self::Inky => {
                let pivot = pac_man.tile.offset(pac_man.facing, INKY_PIVOT_LOOKAHEAD);
                request
                    .grid
                    .clamp(request.blinky_tile.reflect_through(pivot))
            }
            Self::Clyde => {
                if request.agent_tile.distance(pac_man.tile) > request.clyde_shy_radius {
                    pac_man.tile
                } else {
                    request.grid.scatter_corner(request.personality)
                }
            }
        }
    }
}
