//! Static navigation field built once per maze load.

use std::collections::VecDeque;

use maze_chase_core::{Direction, TileCoord};

/// Dense step-distance grid seeded from one or more source tiles.
///
/// The field mirrors the maze dimensions and stores the reverse breadth-first
/// search results that steer eaten and house-exiting ghosts. Distances default
/// to `u16::MAX` for unreachable tiles so callers can distinguish walls from
/// traversable tiles.
#[derive(Clone, Debug, Default)]
pub(crate) struct NavigationField {
    columns: u32,
    rows: u32,
    distances: Vec<u16>,
}

impl NavigationField {
    /// Rebuilds the distances using a reverse breadth-first search.
    ///
    /// `step` resolves the tile reached from a tile in a direction, returning
    /// `None` when the move is not passable. Passability must be symmetric.
    pub(crate) fn rebuild_with<F>(
        &mut self,
        columns: u32,
        rows: u32,
        sources: &[TileCoord],
        mut step: F,
    ) where
        F: FnMut(TileCoord, Direction) -> Option<TileCoord>,
    {
        let columns_usize = usize::try_from(columns).unwrap_or(0);
        let rows_usize = usize::try_from(rows).unwrap_or(0);
        let tile_count = columns_usize.checked_mul(rows_usize).unwrap_or(0);

        self.columns = columns;
        self.rows = rows;

        if tile_count == 0 {
            self.distances.clear();
            return;
        }

        if self.distances.len() != tile_count {
            self.distances = vec![u16::MAX; tile_count];
        } else {
            self.distances.fill(u16::MAX);
        }

        let mut queue = VecDeque::new();

        for &source in sources {
            let Some(index) = index(columns, rows, source) else {
                continue;
            };

            if self.distances[index] == 0 {
                continue;
            }

            self.distances[index] = 0;
            queue.push_back(source);
        }

        while let Some(tile) = queue.pop_front() {
            let Some(current_index) = index(columns, rows, tile) else {
                continue;
            };
            let current_distance = self.distances[current_index];

            if current_distance >= u16::MAX.saturating_sub(1) {
                continue;
            }

            let next_distance = current_distance + 1;

            for direction in Direction::PRIORITY {
                let Some(neighbor) = step(tile, direction) else {
                    continue;
                };

                let Some(neighbor_index) = index(columns, rows, neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Distance captured for the provided tile, if it is reachable.
    #[must_use]
    pub(crate) fn distance(&self, tile: TileCoord) -> Option<u16> {
        index(self.columns, self.rows, tile)
            .and_then(|offset| self.distances.get(offset).copied())
            .filter(|distance| *distance != u16::MAX)
    }
}

fn index(columns: u32, rows: u32, tile: TileCoord) -> Option<usize> {
    let column = u32::try_from(tile.column()).ok()?;
    let row = u32::try_from(tile.row()).ok()?;
    if column >= columns || row >= rows {
        return None;
    }

    let width = usize::try_from(columns).ok()?;
    usize::try_from(row)
        .ok()?
        .checked_mul(width)?
        .checked_add(usize::try_from(column).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_step(columns: i32, rows: i32) -> impl FnMut(TileCoord, Direction) -> Option<TileCoord> {
        move |tile, direction| {
            let next = tile.offset(direction, 1);
            (next.column() >= 0 && next.row() >= 0 && next.column() < columns && next.row() < rows)
                .then_some(next)
        }
    }

    #[test]
    fn rebuild_with_sets_source_tiles_to_zero() {
        let mut field = NavigationField::default();
        let sources = [TileCoord::new(1, 2)];

        field.rebuild_with(3, 4, &sources, open_step(3, 4));

        assert_eq!(field.distance(TileCoord::new(1, 2)), Some(0));
        assert_eq!(field.distance(TileCoord::new(1, 1)), Some(1));
        assert_eq!(field.distance(TileCoord::new(1, 0)), Some(2));
        assert_eq!(field.distance(TileCoord::new(0, 0)), Some(3));
    }

    #[test]
    fn rebuild_with_respects_walls() {
        let mut field = NavigationField::default();
        let sources = [TileCoord::new(1, 2)];
        let wall = TileCoord::new(1, 1);
        let mut open = open_step(3, 4);

        field.rebuild_with(3, 4, &sources, |tile, direction| {
            open(tile, direction).filter(|next| *next != wall && tile != wall)
        });

        assert_eq!(field.distance(wall), None);
        assert_eq!(field.distance(TileCoord::new(1, 0)), Some(4));
        assert_eq!(field.distance(TileCoord::new(0, 1)), Some(2));
    }

    #[test]
    fn out_of_grid_tiles_have_no_distance() {
        let mut field = NavigationField::default();
        field.rebuild_with(2, 2, &[TileCoord::new(0, 0)], open_step(2, 2));

        assert_eq!(field.distance(TileCoord::new(-1, 0)), None);
        assert_eq!(field.distance(TileCoord::new(2, 0)), None);
    }
}
