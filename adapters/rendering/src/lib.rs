#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Maze Chase adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use maze_chase_core::{
    ActiveMode, Direction, GhostSnapshot, GhostView, PacManSnapshot, Personality, TileCoord,
    TilePoint, VisualState,
};
use std::{fmt, time::Duration};
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Byte RGB channels, clamped to the displayable range. Alpha is dropped.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [
            channel_byte(self.red),
            channel_byte(self.green),
            channel_byte(self.blue),
        ]
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Body color of a ghost in its normal state.
    #[must_use]
    pub const fn personality(personality: Personality) -> Self {
        match personality {
            Personality::Blinky => Self::from_rgb_u8(255, 0, 0),
            Personality::Pinky => Self::from_rgb_u8(255, 184, 255),
            Personality::Inky => Self::from_rgb_u8(0, 255, 255),
            Personality::Clyde => Self::from_rgb_u8(255, 184, 82),
        }
    }

    /// Tint applied to a ghost given its personality and visual tag.
    #[must_use]
    pub fn ghost_tint(personality: Personality, visual: VisualState) -> Self {
        match visual {
            VisualState::Normal => Self::personality(personality),
            VisualState::Frightened => FRIGHTENED_BLUE,
            VisualState::FrightenedFlashing => FRIGHTENED_BLUE.lighten(0.85),
            VisualState::Eyes => Self::new(1.0, 1.0, 1.0, 0.6),
        }
    }
}

const FRIGHTENED_BLUE: Color = Color::from_rgb_u8(33, 33, 255);

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

fn channel_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [red, green, blue] = self.to_rgb_u8();
        write!(f, "#{red:02x}{green:02x}{blue:02x}")
    }
}

/// Geometry of the maze as drawn on screen.
///
/// World space has its origin at the top-left corner of the maze with the
/// y axis pointing down, matching tile rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazePresentation {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Length of a tile edge in world units.
    pub tile_length: f32,
    /// Color used for wall tiles.
    pub wall_color: Color,
}

impl MazePresentation {
    /// Creates a maze presentation, rejecting non-positive tile lengths.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        wall_color: Color,
    ) -> Result<Self, RenderingError> {
        if !(tile_length.is_finite() && tile_length > 0.0) {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
            wall_color,
        })
    }

    /// Width of the maze in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Height of the maze in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// World-space centre of a continuous tile position.
    #[must_use]
    pub fn tile_to_world(&self, point: TilePoint) -> Vec2 {
        (Vec2::new(point.column(), point.row()) + Vec2::splat(0.5)) * self.tile_length
    }
}

/// Orientation, in radians, of a sprite facing `direction`.
///
/// Zero faces right; angles grow clockwise on screen because rows grow
/// downward.
#[must_use]
pub fn heading(direction: Direction) -> f32 {
    let (column, row) = direction.delta();
    Vec2::X.angle_between(Vec2::new(column as f32, row as f32))
}

/// Drawable description of a single ghost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostPresentation {
    /// Personality of the ghost.
    pub personality: Personality,
    /// Tile the ghost occupies.
    pub tile: TileCoord,
    /// Sprite centre in world units.
    pub position: Vec2,
    /// Sprite orientation in radians.
    pub rotation: f32,
    /// Body tint.
    pub tint: Color,
    /// Visual tag the sprite is drawn with.
    pub visual: VisualState,
}

impl GhostPresentation {
    /// Projects a ghost snapshot into world space.
    #[must_use]
    pub fn from_snapshot(snapshot: &GhostSnapshot, maze: &MazePresentation) -> Self {
        Self {
            personality: snapshot.personality,
            tile: snapshot.tile,
            position: maze.tile_to_world(snapshot.position),
            rotation: heading(snapshot.direction),
            tint: Color::ghost_tint(snapshot.personality, snapshot.visual),
            visual: snapshot.visual,
        }
    }
}

/// Drawable description of the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PacManPresentation {
    /// Tile the player occupies.
    pub tile: TileCoord,
    /// Sprite centre in world units.
    pub position: Vec2,
    /// Sprite orientation in radians.
    pub rotation: f32,
}

impl PacManPresentation {
    /// Projects the player into world space.
    #[must_use]
    pub fn new(snapshot: PacManSnapshot, position: TilePoint, maze: &MazePresentation) -> Self {
        Self {
            tile: snapshot.tile,
            position: maze.tile_to_world(position),
            rotation: heading(snapshot.facing),
        }
    }
}

/// Describes the state of the scene for a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Maze geometry.
    pub maze: MazePresentation,
    /// Ghosts in update order.
    pub ghosts: Vec<GhostPresentation>,
    /// Player sprite.
    pub pac_man: PacManPresentation,
    /// Mode ghost movement currently follows.
    pub active_mode: ActiveMode,
    /// Simulated time since the level started.
    pub elapsed: Duration,
}

impl Scene {
    /// Creates a new scene description.
    #[must_use]
    pub fn new(
        maze: MazePresentation,
        ghosts: Vec<GhostPresentation>,
        pac_man: PacManPresentation,
        active_mode: ActiveMode,
    ) -> Self {
        Self {
            maze,
            ghosts,
            pac_man,
            active_mode,
            elapsed: Duration::ZERO,
        }
    }

    /// Replaces the ghost sprites with a fresh projection of the view.
    pub fn set_ghosts(&mut self, view: &GhostView) {
        let maze = self.maze;
        self.ghosts.clear();
        self.ghosts.extend(
            view.iter()
                .map(|snapshot| GhostPresentation::from_snapshot(snapshot, &maze)),
        );
    }
}

/// Rendering configuration supplied by adapters.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title displayed by the backend.
    pub window_title: String,
    /// Background color.
    pub clear_color: Color,
    /// Initial scene.
    pub scene: Scene,
}

impl Presentation {
    /// Creates a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Whether the backend should keep presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Present another frame.
    Continue,
    /// Stop after this frame.
    Exit,
}

/// Rendering backend capable of presenting Maze Chase scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the update closure asks it to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and may
    /// mutate the scene before it is presented. Errors returned by the closure
    /// stop the backend and are propagated.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> AnyResult<FrameControl>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive, finite edge length.
    #[error("tile_length must be positive (received {tile_length})")]
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}
