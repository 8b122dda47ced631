//! Serializable maze description and the built-in reference layout.

use maze_chase_core::{Direction, Personality, TileCoord};
use serde::{Deserialize, Serialize};

const CLASSIC_ROWS: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###--### ##.######",
    "######.## #      # ##.######",
    "TTTTTT.   #      #   .TTTTTT",
    "######.## #      # ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......  .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

/// Human-authored maze description.
///
/// Rows are ASCII strings where `#` is a wall, `.` a pellet, `o` a power
/// pellet, a space an empty corridor, `T` a tunnel tile and `-` the ghost-house
/// door. Anchors are expressed in tile coordinates with row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeDefinition {
    /// Layout rows from top to bottom.
    pub rows: Vec<String>,
    /// Tile directly outside the ghost-house door.
    #[serde(default)]
    pub house_entry: Option<TileCoord>,
    /// Interior tile eaten ghosts respawn on.
    #[serde(default)]
    pub house_respawn: Option<TileCoord>,
    /// Level-start tile of the player.
    #[serde(default)]
    pub pac_man_start: Option<TileCoord>,
    /// Per-ghost anchors.
    #[serde(default)]
    pub ghosts: Vec<GhostAnchors>,
    /// Tiles where ghosts may not turn upward while chasing or scattering.
    #[serde(default)]
    pub restricted_up: Vec<TileCoord>,
}

/// Anchors tied to a single personality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostAnchors {
    /// Ghost the anchors belong to.
    pub personality: Personality,
    /// Level-start tile.
    pub start: TileCoord,
    /// Level-start travel direction.
    pub direction: Direction,
    /// Corner targeted while scattering. May lie outside the grid.
    #[serde(default)]
    pub scatter_corner: Option<TileCoord>,
}

impl MazeDefinition {
    /// The 28×31 reference maze with level-one anchors.
    #[must_use]
    pub fn classic() -> Self {
        let ghost = |personality, start, direction, corner| GhostAnchors {
            personality,
            start,
            direction,
            scatter_corner: Some(corner),
        };

        Self {
            rows: CLASSIC_ROWS.iter().map(|row| (*row).to_owned()).collect(),
            house_entry: Some(TileCoord::new(13, 11)),
            house_respawn: Some(TileCoord::new(13, 14)),
            pac_man_start: Some(TileCoord::new(13, 23)),
            ghosts: vec![
                ghost(
                    Personality::Blinky,
                    TileCoord::new(13, 11),
                    Direction::Left,
                    TileCoord::new(25, -3),
                ),
                ghost(
                    Personality::Pinky,
                    TileCoord::new(13, 14),
                    Direction::Down,
                    TileCoord::new(2, -3),
                ),
                ghost(
                    Personality::Inky,
                    TileCoord::new(11, 14),
                    Direction::Up,
                    TileCoord::new(27, 31),
                ),
                ghost(
                    Personality::Clyde,
                    TileCoord::new(15, 14),
                    Direction::Up,
                    TileCoord::new(0, 31),
                ),
            ],
            restricted_up: vec![
                TileCoord::new(12, 11),
                TileCoord::new(15, 11),
                TileCoord::new(12, 23),
                TileCoord::new(15, 23),
            ],
        }
    }

    /// Anchors registered for the personality, if any.
    #[must_use]
    pub fn ghost(&self, personality: Personality) -> Option<&GhostAnchors> {
        self.ghosts
            .iter()
            .find(|anchors| anchors.personality == personality)
    }
}

impl Default for MazeDefinition {
    fn default() -> Self {
        Self::classic()
    }
}
