#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static maze model for the Maze Chase ghost engine.
//!
//! A [`Grid`] is loaded once per level from a [`MazeDefinition`], validated,
//! and never mutated afterwards. It answers the collision and adjacency
//! questions the ghost systems ask every tick and carries the navigation field
//! that leads eaten ghosts back to the house.

mod definition;
mod navigation;

use maze_chase_core::{
    Anchor, ConfigurationError, Direction, DirectionSet, InvalidQuery, PelletKind, Personality,
    TileCoord, TileKind, TilePoint,
};

pub use definition::{GhostAnchors, MazeDefinition};
use navigation::NavigationField;

const CENTER_EPSILON: f32 = 1e-4;

/// Movement capability used when asking whether a tile can be entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Access {
    ghost: bool,
    through_door: bool,
}

impl Access {
    /// The player; never passes the ghost-house door.
    pub const PAC_MAN: Access = Access {
        ghost: false,
        through_door: false,
    };
    /// A roaming ghost; the door stays closed.
    pub const GHOST: Access = Access {
        ghost: true,
        through_door: false,
    };
    /// A ghost entering or leaving the house.
    pub const GHOST_THROUGH_DOOR: Access = Access {
        ghost: true,
        through_door: true,
    };

    /// Reports whether a tile of the provided kind can be entered.
    #[must_use]
    pub const fn permits(self, kind: TileKind) -> bool {
        match kind {
            TileKind::Wall => false,
            TileKind::Walkable | TileKind::Tunnel => true,
            TileKind::GhostDoor => self.ghost && self.through_door,
        }
    }
}

/// Level-start placement of a ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostStart {
    /// Tile the ghost starts on.
    pub tile: TileCoord,
    /// Direction the ghost starts travelling.
    pub direction: Direction,
}

/// Validated, immutable maze.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
    pellets: Vec<(TileCoord, PelletKind)>,
    house_entry: TileCoord,
    house_respawn: TileCoord,
    pac_man_start: TileCoord,
    ghost_starts: [GhostStart; 4],
    scatter_corners: [TileCoord; 4],
    restricted_up: Vec<TileCoord>,
    house_field: NavigationField,
}

impl Grid {
    /// Parses and validates the provided definition.
    pub fn load(definition: &MazeDefinition) -> Result<Self, ConfigurationError> {
        let (columns, rows, tiles, pellets) = parse_rows(&definition.rows)?;

        let house_entry = definition
            .house_entry
            .ok_or(ConfigurationError::MissingAnchor(Anchor::HouseEntry))?;
        let house_respawn = definition
            .house_respawn
            .ok_or(ConfigurationError::MissingAnchor(Anchor::HouseRespawn))?;
        let pac_man_start = definition
            .pac_man_start
            .ok_or(ConfigurationError::MissingAnchor(Anchor::PacManStart))?;

        let mut ghost_starts = [GhostStart {
            tile: house_entry,
            direction: Direction::Left,
        }; 4];
        let mut scatter_corners = [house_entry; 4];
        for personality in Personality::ALL {
            let anchors = definition
                .ghost(personality)
                .ok_or(ConfigurationError::MissingAnchor(Anchor::GhostStart(
                    personality,
                )))?;
            ghost_starts[personality.index()] = GhostStart {
                tile: anchors.start,
                direction: anchors.direction,
            };
            scatter_corners[personality.index()] = anchors.scatter_corner.ok_or(
                ConfigurationError::MissingAnchor(Anchor::ScatterCorner(personality)),
            )?;
        }

        let mut grid = Self {
            columns,
            rows,
            tiles,
            pellets,
            house_entry,
            house_respawn,
            pac_man_start,
            ghost_starts,
            scatter_corners,
            restricted_up: definition.restricted_up.clone(),
            house_field: NavigationField::default(),
        };

        grid.validate_tunnels()?;
        grid.validate_neighbours()?;
        grid.validate_anchors()?;
        grid.build_house_field()?;

        Ok(grid)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the tile lies inside the grid bounds.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.index(tile).is_some()
    }

    /// Kind of the provided tile.
    pub fn kind(&self, tile: TileCoord) -> Result<TileKind, InvalidQuery> {
        self.kind_of(tile).ok_or(InvalidQuery::InvalidPosition { tile })
    }

    /// Nearest tile centre to a continuous position.
    ///
    /// Non-finite positions are rejected; a NaN component is reported as `i32::MIN`.
    pub fn tile_at(&self, position: TilePoint) -> Result<TileCoord, InvalidQuery> {
        let tile = TileCoord::new(nearest(position.column()), nearest(position.row()));
        let finite = position.column().is_finite() && position.row().is_finite();
        if finite && self.contains(tile) {
            Ok(tile)
        } else {
            Err(InvalidQuery::InvalidPosition { tile })
        }
    }

    /// Reports whether the agent with the provided capability may enter the tile.
    ///
    /// Tiles outside the grid are never walkable.
    #[must_use]
    pub fn is_walkable(&self, tile: TileCoord, access: Access) -> bool {
        self.kind_of(tile).is_some_and(|kind| access.permits(kind))
    }

    /// Reports whether a continuous position sits on a tile centre.
    #[must_use]
    pub fn is_centered(position: TilePoint) -> bool {
        (position.column() - position.column().round()).abs() < CENTER_EPSILON
            && (position.row() - position.row().round()).abs() < CENTER_EPSILON
    }

    /// Tile adjacent to `tile` in `direction`.
    ///
    /// Stepping off the border from a tunnel mouth wraps to the partner mouth on
    /// the opposite border. Walkability is not checked.
    #[must_use]
    pub fn neighbor(&self, tile: TileCoord, direction: Direction) -> Option<TileCoord> {
        let kind = self.kind_of(tile)?;
        let next = tile.offset(direction, 1);
        if self.contains(next) {
            return Some(next);
        }

        if kind != TileKind::Tunnel {
            return None;
        }

        let wrapped = TileCoord::new(
            next.column().rem_euclid(self.columns as i32),
            next.row().rem_euclid(self.rows as i32),
        );
        (self.kind_of(wrapped) == Some(TileKind::Tunnel)).then_some(wrapped)
    }

    /// Directions whose neighbour the capability may enter.
    pub fn legal_exits(
        &self,
        tile: TileCoord,
        access: Access,
    ) -> Result<DirectionSet, InvalidQuery> {
        let _ = self.kind(tile)?;
        Ok(self.exits(tile, access))
    }

    /// Reports whether the tile is a decision point for the capability.
    ///
    /// Three or more exits, two perpendicular exits, or a dead end all count.
    pub fn is_intersection(&self, tile: TileCoord, access: Access) -> Result<bool, InvalidQuery> {
        let exits = self.legal_exits(tile, access)?;
        Ok(match exits.len() {
            0 => false,
            1 => true,
            2 => {
                let mut directions = exits.iter();
                match (directions.next(), directions.next()) {
                    (Some(first), Some(second)) => !first.is_collinear(second),
                    _ => false,
                }
            }
            _ => true,
        })
    }

    /// Clamps the tile into the grid bounds.
    #[must_use]
    pub fn clamp(&self, tile: TileCoord) -> TileCoord {
        let max_column = self.columns.saturating_sub(1) as i32;
        let max_row = self.rows.saturating_sub(1) as i32;
        TileCoord::new(
            tile.column().clamp(0, max_column),
            tile.row().clamp(0, max_row),
        )
    }

    /// Tile directly outside the ghost-house door.
    #[must_use]
    pub const fn house_entry(&self) -> TileCoord {
        self.house_entry
    }

    /// Interior tile eaten ghosts respawn on.
    #[must_use]
    pub const fn house_respawn(&self) -> TileCoord {
        self.house_respawn
    }

    /// Level-start tile of the player.
    #[must_use]
    pub const fn pac_man_start(&self) -> TileCoord {
        self.pac_man_start
    }

    /// Level-start placement of the ghost.
    #[must_use]
    pub const fn ghost_start(&self, personality: Personality) -> GhostStart {
        self.ghost_starts[personality.index()]
    }

    /// Scatter corner of the ghost.
    #[must_use]
    pub const fn scatter_corner(&self, personality: Personality) -> TileCoord {
        self.scatter_corners[personality.index()]
    }

    /// Reports whether ghosts may not turn upward on the tile while chasing or scattering.
    #[must_use]
    pub fn is_restricted_up(&self, tile: TileCoord) -> bool {
        self.restricted_up.contains(&tile)
    }

    /// Pellets placed by the layout, in row-major order.
    #[must_use]
    pub fn pellets(&self) -> &[(TileCoord, PelletKind)] {
        &self.pellets
    }

    /// Number of pellets (including power pellets) placed by the layout.
    #[must_use]
    pub fn pellet_count(&self) -> u32 {
        u32::try_from(self.pellets.len()).unwrap_or(u32::MAX)
    }

    /// Steps from the tile to the house entry, door traversal allowed.
    #[must_use]
    pub fn house_distance(&self, tile: TileCoord) -> Option<u16> {
        self.house_field.distance(tile)
    }

    fn kind_of(&self, tile: TileCoord) -> Option<TileKind> {
        self.index(tile).and_then(|index| self.tiles.get(index).copied())
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        let column = u32::try_from(tile.column()).ok()?;
        let row = u32::try_from(tile.row()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        usize::try_from(row * self.columns + column).ok()
    }

    fn exits(&self, tile: TileCoord, access: Access) -> DirectionSet {
        Direction::PRIORITY
            .into_iter()
            .filter(|direction| {
                self.neighbor(tile, *direction)
                    .is_some_and(|next| self.is_walkable(next, access))
            })
            .collect()
    }

    fn tiles(&self) -> impl Iterator<Item = (TileCoord, TileKind)> + '_ {
        let columns = self.columns as i32;
        self.tiles.iter().enumerate().map(move |(index, kind)| {
            let index = index as i32;
            (TileCoord::new(index % columns, index / columns), *kind)
        })
    }

    fn validate_tunnels(&self) -> Result<(), ConfigurationError> {
        let last_column = self.columns as i32 - 1;
        let last_row = self.rows as i32 - 1;

        for (tile, kind) in self.tiles() {
            if kind != TileKind::Tunnel {
                continue;
            }

            let mut partners = Vec::with_capacity(2);
            if tile.column() == 0 {
                partners.push(TileCoord::new(last_column, tile.row()));
            }
            if tile.column() == last_column {
                partners.push(TileCoord::new(0, tile.row()));
            }
            if tile.row() == 0 {
                partners.push(TileCoord::new(tile.column(), last_row));
            }
            if tile.row() == last_row {
                partners.push(TileCoord::new(tile.column(), 0));
            }

            if partners
                .into_iter()
                .any(|partner| self.kind_of(partner) != Some(TileKind::Tunnel))
            {
                return Err(ConfigurationError::UnpairedTunnel { tile });
            }
        }

        Ok(())
    }

    fn validate_neighbours(&self) -> Result<(), ConfigurationError> {
        for (tile, kind) in self.tiles() {
            if kind == TileKind::Wall {
                continue;
            }

            if self.exits(tile, Access::GHOST_THROUGH_DOOR).is_empty() {
                return Err(ConfigurationError::IsolatedTile { tile });
            }
        }

        Ok(())
    }

    fn validate_anchors(&self) -> Result<(), ConfigurationError> {
        let mut anchors = vec![
            (Anchor::HouseEntry, self.house_entry),
            (Anchor::HouseRespawn, self.house_respawn),
            (Anchor::PacManStart, self.pac_man_start),
        ];
        anchors.extend(Personality::ALL.into_iter().map(|personality| {
            (
                Anchor::GhostStart(personality),
                self.ghost_start(personality).tile,
            )
        }));

        for (anchor, tile) in anchors {
            if !self.is_walkable(tile, Access::GHOST_THROUGH_DOOR) {
                return Err(ConfigurationError::AnchorNotWalkable { anchor, tile });
            }
        }

        if !self.is_walkable(self.house_entry, Access::GHOST) {
            return Err(ConfigurationError::AnchorNotWalkable {
                anchor: Anchor::HouseEntry,
                tile: self.house_entry,
            });
        }

        Ok(())
    }

    fn build_house_field(&mut self) -> Result<(), ConfigurationError> {
        let mut field = NavigationField::default();
        self.rebuild_field(&mut field, &[self.house_entry]);

        let mut house_tiles = vec![self.house_respawn];
        house_tiles.extend(
            Personality::ALL
                .into_iter()
                .map(|personality| self.ghost_start(personality).tile),
        );
        if let Some(tile) = house_tiles
            .into_iter()
            .find(|tile| field.distance(*tile).is_none())
        {
            return Err(ConfigurationError::UnreachableHouse { tile });
        }

        if let Some((tile, _)) = self
            .tiles()
            .find(|(tile, kind)| *kind != TileKind::Wall && field.distance(*tile).is_none())
        {
            return Err(ConfigurationError::DisconnectedRegion { tile });
        }

        self.house_field = field;
        Ok(())
    }

    fn rebuild_field(&self, field: &mut NavigationField, sources: &[TileCoord]) {
        field.rebuild_with(self.columns, self.rows, sources, |tile, direction| {
            if !self.is_walkable(tile, Access::GHOST_THROUGH_DOOR) {
                return None;
            }
            self.neighbor(tile, direction)
                .filter(|next| self.is_walkable(*next, Access::GHOST_THROUGH_DOOR))
        });
    }
}

/// Rounds a coordinate to the nearest tile index, saturating at the `i32` range.
fn nearest(value: f32) -> i32 {
    if value.is_nan() {
        i32::MIN
    } else {
        value.round() as i32
    }
}

type ParsedRows = (u32, u32, Vec<TileKind>, Vec<(TileCoord, PelletKind)>);

fn parse_rows(rows: &[String]) -> Result<ParsedRows, ConfigurationError> {
    let expected = rows.first().map_or(0, |row| row.chars().count());
    if expected == 0 {
        return Err(ConfigurationError::EmptyLayout);
    }

    let column_count = u32::try_from(expected)
        .map_err(|_| ConfigurationError::InvalidConfig("maze is too wide".to_owned()))?;
    let row_count = u32::try_from(rows.len())
        .map_err(|_| ConfigurationError::InvalidConfig("maze is too tall".to_owned()))?;

    let mut tiles = Vec::with_capacity(expected * rows.len());
    let mut pellets = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != expected {
            return Err(ConfigurationError::RaggedRow {
                row: row_index,
                expected,
                found,
            });
        }

        for (column_index, glyph) in row.chars().enumerate() {
            let tile = TileCoord::new(column_index as i32, row_index as i32);
            let (kind, pellet) = match glyph {
                '#' => (TileKind::Wall, None),
                '.' => (TileKind::Walkable, Some(PelletKind::Normal)),
                'o' => (TileKind::Walkable, Some(PelletKind::Power)),
                ' ' => (TileKind::Walkable, None),
                'T' => (TileKind::Tunnel, None),
                '-' => (TileKind::GhostDoor, None),
                _ => return Err(ConfigurationError::UnknownGlyph { glyph, tile }),
            };
            tiles.push(kind);
            if let Some(pellet) = pellet {
                pellets.push((tile, pellet));
            }
        }
    }

    Ok((column_count, row_count, tiles, pellets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_admits_only_ghosts_with_door_access() {
        assert!(!Access::PAC_MAN.permits(TileKind::GhostDoor));
        assert!(!Access::GHOST.permits(TileKind::GhostDoor));
        assert!(Access::GHOST_THROUGH_DOOR.permits(TileKind::GhostDoor));
        assert!(Access::PAC_MAN.permits(TileKind::Tunnel));
    }

    #[test]
    fn centred_positions_snap_within_epsilon() {
        assert!(Grid::is_centered(TilePoint::new(3.0, 4.0)));
        assert!(Grid::is_centered(TilePoint::new(3.00001, 3.99999)));
        assert!(!Grid::is_centered(TilePoint::new(3.5, 4.0)));
    }

    #[test]
    fn parse_rows_counts_pellets() {
        let rows = vec!["#.o #".to_owned()];
        let (columns, row_count, tiles, pellets) = parse_rows(&rows).expect("valid row");

        assert_eq!((columns, row_count), (5, 1));
        assert_eq!(tiles[3], TileKind::Walkable);
        assert_eq!(
            pellets,
            vec![
                (TileCoord::new(1, 0), PelletKind::Normal),
                (TileCoord::new(2, 0), PelletKind::Power),
            ]
        );
    }
}
