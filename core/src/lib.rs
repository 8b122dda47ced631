#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Chase ghost engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pure ghost systems. Adapters submit
//! [`Command`] values describing what happened outside the ghost core (time
//! passing, pellets being eaten), the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for audio, UI and
//! rendering adapters to react to. Systems read immutable snapshots and never
//! reach into each other's state.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Commands that express every input the ghost core accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Player position and facing observed for this tick.
        pac_man: PacManSnapshot,
    },
    /// Reports that the player consumed a pellet.
    ConsumePellet {
        /// Kind of pellet that was consumed.
        kind: PelletKind,
    },
    /// Reinitialises the mode controller and every ghost for a fresh level.
    ResetLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Announces that the scatter/chase schedule flipped to a new base mode.
    ModeChanged {
        /// Base mode that became active.
        mode: BaseMode,
    },
    /// Announces that a power pellet activated the frightened override.
    FrightenedStarted,
    /// Announces that the frightened override expired.
    FrightenedEnded,
    /// Reports that the player caught a frightened ghost.
    GhostEaten {
        /// Ghost that was eaten.
        personality: Personality,
    },
    /// Reports that an eaten ghost reached the house and respawned inside it.
    GhostRespawned {
        /// Ghost that respawned.
        personality: Personality,
    },
    /// Reports that a confined ghost was released from the house.
    GhostReleased {
        /// Ghost that started leaving the house.
        personality: Personality,
    },
    /// Reports that a non-frightened ghost touched the player.
    PacManCaught {
        /// Ghost that caught the player.
        personality: Personality,
    },
}

/// The four pursuing personalities, in the order the world updates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Personality {
    /// Red ghost; targets the player directly.
    Blinky,
    /// Pink ghost; ambushes ahead of the player.
    Pinky,
    /// Cyan ghost; flanks relative to Blinky.
    Inky,
    /// Orange ghost; chases from afar and retreats up close.
    Clyde,
}

impl Personality {
    /// Every personality in deterministic update order.
    pub const ALL: [Personality; 4] = [Self::Blinky, Self::Pinky, Self::Inky, Self::Clyde];

    /// Zero-based index matching the position inside [`Personality::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Blinky => 0,
            Self::Pinky => 1,
            Self::Inky => 2,
            Self::Clyde => 3,
        }
    }

    /// Lowercase name used in logs and configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blinky => "blinky",
            Self::Pinky => "pinky",
            Self::Inky => "inky",
            Self::Clyde => "clyde",
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cardinal movement directions available to every agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Directions in tie-break priority order: Up, Left, Down, Right.
    pub const PRIORITY: [Direction; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    /// Returns the unique reverse of the direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Reports whether both directions lie on the same axis.
    #[must_use]
    pub const fn is_collinear(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Self::Up | Self::Down, Self::Up | Self::Down)
                | (Self::Left | Self::Right, Self::Left | Self::Right)
        )
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Up => 0b0001,
            Self::Left => 0b0010,
            Self::Down => 0b0100,
            Self::Right => 0b1000,
        }
    }
}

/// Compact set of directions iterated in tie-break priority order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet {
    bits: u8,
}

impl DirectionSet {
    /// Set containing no directions.
    pub const EMPTY: DirectionSet = DirectionSet { bits: 0 };

    /// Adds a direction to the set.
    pub fn insert(&mut self, direction: Direction) {
        self.bits |= direction.bit();
    }

    /// Removes a direction from the set.
    pub fn remove(&mut self, direction: Direction) {
        self.bits &= !direction.bit();
    }

    /// Returns a copy of the set without the provided direction.
    #[must_use]
    pub const fn without(self, direction: Direction) -> Self {
        Self {
            bits: self.bits & !direction.bit(),
        }
    }

    /// Reports whether the direction is part of the set.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.bits & direction.bit() != 0
    }

    /// Number of directions contained in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Reports whether the set contains no directions.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Iterates the contained directions in tie-break priority order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::PRIORITY
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

/// Location of a single maze tile expressed as column and row coordinates.
///
/// Coordinates are signed because targets such as scatter corners or Inky's
/// reflected tile may lie outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: i32,
    row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Tile reached by walking `steps` tiles in the provided direction.
    #[must_use]
    pub const fn offset(self, direction: Direction, steps: i32) -> Self {
        let (column, row) = direction.delta();
        Self {
            column: self.column + column * steps,
            row: self.row + row * steps,
        }
    }

    /// Point reflection of this tile through `pivot`, i.e. `2 * pivot - self`.
    #[must_use]
    pub const fn reflect_through(self, pivot: TileCoord) -> Self {
        Self {
            column: 2 * pivot.column - self.column,
            row: 2 * pivot.row - self.row,
        }
    }

    /// Squared Euclidean distance between two tiles.
    #[must_use]
    pub fn squared_distance(self, other: TileCoord) -> i64 {
        let columns = i64::from(self.column) - i64::from(other.column);
        let rows = i64::from(self.row) - i64::from(other.row);
        columns * columns + rows * rows
    }

    /// Euclidean distance between two tiles measured in tiles.
    #[must_use]
    pub fn distance(self, other: TileCoord) -> f32 {
        (self.squared_distance(other) as f64).sqrt() as f32
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Continuous position expressed in tile units.
///
/// Tile centres sit on integer coordinates, so a ghost standing on tile
/// `(3, 4)` reports the point `(3.0, 4.0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TilePoint {
    column: f32,
    row: f32,
}

impl TilePoint {
    /// Creates a new continuous position.
    #[must_use]
    pub const fn new(column: f32, row: f32) -> Self {
        Self { column, row }
    }

    /// Horizontal component measured in tiles.
    #[must_use]
    pub const fn column(&self) -> f32 {
        self.column
    }

    /// Vertical component measured in tiles.
    #[must_use]
    pub const fn row(&self) -> f32 {
        self.row
    }
}

impl From<TileCoord> for TilePoint {
    fn from(tile: TileCoord) -> Self {
        Self::new(tile.column() as f32, tile.row() as f32)
    }
}

/// Static classification of a maze tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Impassable for every agent.
    Wall,
    /// Open corridor.
    Walkable,
    /// Open corridor with reduced ghost speed, possibly wrapping at the border.
    Tunnel,
    /// Ghost-house door; passable only by ghosts allowed through it.
    GhostDoor,
}

/// Scatter/chase mode driven by the mode controller's schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseMode {
    /// Ghosts retreat toward their corner anchors.
    Scatter,
    /// Ghosts pursue using their personality targeting.
    Chase,
}

/// Mode the controller reports for movement decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveMode {
    /// Scheduled scatter phase.
    Scatter,
    /// Scheduled chase phase.
    Chase,
    /// Frightened override superseding the schedule.
    Frightened,
}

impl From<BaseMode> for ActiveMode {
    fn from(mode: BaseMode) -> Self {
        match mode {
            BaseMode::Scatter => Self::Scatter,
            BaseMode::Chase => Self::Chase,
        }
    }
}

/// Behaviour state reported for a single ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostState {
    /// Pursuing with personality targeting.
    Chase,
    /// Retreating toward the scatter corner.
    Scatter,
    /// Vulnerable and wandering randomly.
    Frightened,
    /// Captured; eyes returning to the house.
    Eaten,
}

impl From<BaseMode> for GhostState {
    fn from(mode: BaseMode) -> Self {
        match mode {
            BaseMode::Scatter => Self::Scatter,
            BaseMode::Chase => Self::Chase,
        }
    }
}

/// Tag rendering adapters use to tint a ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualState {
    /// Personality colours.
    Normal,
    /// Frightened blue.
    Frightened,
    /// Frightened and about to recover.
    FrightenedFlashing,
    /// Eyes only.
    Eyes,
}

/// Progress of a ghost through the house lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HouseProgress {
    /// Confined inside the house until released.
    Waiting,
    /// Navigating out through the door toward the house entry.
    Exiting,
    /// Moving through the maze.
    Roaming,
}

/// Cruise Elroy acceleration stage applied to Blinky.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElroyStage {
    /// Pellet count above both thresholds.
    #[default]
    Inactive,
    /// Pellet count at or below the first threshold.
    One,
    /// Pellet count at or below the second threshold.
    Two,
}

/// Kinds of pellets the player may consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PelletKind {
    /// Regular pellet.
    Normal,
    /// Power pellet that frightens the ghosts.
    Power,
}

/// Read-only per-tick snapshot of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PacManSnapshot {
    /// Tile the player currently occupies.
    pub tile: TileCoord,
    /// Direction the player is facing.
    pub facing: Direction,
}

impl PacManSnapshot {
    /// Creates a new player snapshot.
    #[must_use]
    pub const fn new(tile: TileCoord, facing: Direction) -> Self {
        Self { tile, facing }
    }
}

/// Immutable representation of a single ghost used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostSnapshot {
    /// Personality of the ghost.
    pub personality: Personality,
    /// Tile the ghost occupies (nearest tile centre).
    pub tile: TileCoord,
    /// Continuous position measured in tiles.
    pub position: TilePoint,
    /// Direction the ghost is travelling.
    pub direction: Direction,
    /// Behaviour state of the ghost.
    pub state: GhostState,
    /// Tint rendering adapters should apply.
    pub visual: VisualState,
    /// House lifecycle progress.
    pub house: HouseProgress,
}

/// Read-only snapshot describing all ghosts in update order.
#[derive(Clone, Debug, Default)]
pub struct GhostView {
    snapshots: Vec<GhostSnapshot>,
}

impl GhostView {
    /// Creates a new ghost view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<GhostSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.personality);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &GhostSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the ghost with the provided personality, if present.
    #[must_use]
    pub fn get(&self, personality: Personality) -> Option<&GhostSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.personality == personality)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<GhostSnapshot> {
        self.snapshots
    }
}

/// Named anchor tiles a maze definition must provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// Corner a personality retreats to while scattering.
    ScatterCorner(Personality),
    /// Tile directly outside the ghost-house door.
    HouseEntry,
    /// Interior tile eaten ghosts respawn on.
    HouseRespawn,
    /// Level-start tile of a personality.
    GhostStart(Personality),
    /// Level-start tile of the player.
    PacManStart,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScatterCorner(personality) => write!(f, "{personality} scatter corner"),
            Self::HouseEntry => f.write_str("house entry"),
            Self::HouseRespawn => f.write_str("house respawn"),
            Self::GhostStart(personality) => write!(f, "{personality} start"),
            Self::PacManStart => f.write_str("pac-man start"),
        }
    }
}

/// Fatal data-integrity failures that abort a level.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The maze layout contains no rows or no columns.
    #[error("maze layout is empty")]
    EmptyLayout,
    /// A layout row differs in width from the first row.
    #[error("maze row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The layout contains a glyph the loader does not understand.
    #[error("unknown glyph {glyph:?} at {tile}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Location of the character.
        tile: TileCoord,
    },
    /// A required anchor was not provided.
    #[error("missing {0} anchor")]
    MissingAnchor(Anchor),
    /// An anchor lies outside the grid or on a tile agents cannot stand on.
    #[error("{anchor} anchor at {tile} is not a walkable in-grid tile")]
    AnchorNotWalkable {
        /// Anchor that failed validation.
        anchor: Anchor,
        /// Tile the anchor points to.
        tile: TileCoord,
    },
    /// A tunnel mouth on the border has no partner on the opposite border.
    #[error("tunnel mouth at {tile} has no partner on the opposite border")]
    UnpairedTunnel {
        /// Tunnel mouth lacking a partner.
        tile: TileCoord,
    },
    /// A non-wall tile has no non-wall neighbour.
    #[error("tile {tile} has no walkable neighbours")]
    IsolatedTile {
        /// Isolated tile.
        tile: TileCoord,
    },
    /// A non-wall tile is not connected to the main region.
    #[error("tile {tile} is disconnected from the main maze region")]
    DisconnectedRegion {
        /// First disconnected tile found in row-major order.
        tile: TileCoord,
    },
    /// The house entry cannot be reached from a tile a ghost needs to leave.
    #[error("house entry is unreachable from {tile}")]
    UnreachableHouse {
        /// Tile without a route to the entry.
        tile: TileCoord,
    },
    /// A ghost arrived at a tile with no legal exit.
    #[error("{personality} has no legal exit at {tile}")]
    NoLegalExits {
        /// Ghost that got stuck.
        personality: Personality,
        /// Tile without exits.
        tile: TileCoord,
    },
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Recoverable query failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidQuery {
    /// The queried position lies outside the grid bounds.
    #[error("position {tile} lies outside the grid")]
    InvalidPosition {
        /// Tile nearest to the queried position.
        tile: TileCoord,
    },
}
