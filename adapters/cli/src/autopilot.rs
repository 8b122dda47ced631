//! Scripted stand-in for a human player.

use std::{collections::HashMap, time::Duration};

use anyhow::{Context, Result};
use maze_chase_core::{Direction, PacManSnapshot, PelletKind, TileCoord, TilePoint};
use maze_chase_maze::{Access, Grid};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wanders the maze like the ghosts do, preferring corridors with pellets.
///
/// It never reverses unless cornered and eats every pellet it passes over.
#[derive(Clone, Debug)]
pub(crate) struct Autopilot {
    tile: TileCoord,
    next: Option<TileCoord>,
    direction: Direction,
    progress: f32,
    speed: f32,
    seed: u64,
    rng: ChaCha8Rng,
    pellets: HashMap<TileCoord, PelletKind>,
}

impl Autopilot {
    pub(crate) fn new(grid: &Grid, speed: f32, seed: u64) -> Self {
        Self {
            tile: grid.pac_man_start(),
            next: None,
            direction: Direction::Left,
            progress: 0.0,
            speed,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            pellets: grid.pellets().iter().copied().collect(),
        }
    }

    /// Puts the player back on its start tile with a full board.
    pub(crate) fn restart(&mut self, grid: &Grid) {
        *self = Self::new(grid, self.speed, self.seed);
    }

    pub(crate) fn snapshot(&self) -> PacManSnapshot {
        let tile = match self.next {
            Some(next) if self.progress >= 0.5 => next,
            _ => self.tile,
        };
        PacManSnapshot::new(tile, self.direction)
    }

    pub(crate) fn position(&self) -> TilePoint {
        let (column, row) = self.direction.delta();
        let progress = if self.next.is_some() { self.progress } else { 0.0 };
        TilePoint::new(
            self.tile.column() as f32 + column as f32 * progress,
            self.tile.row() as f32 + row as f32 * progress,
        )
    }

    pub(crate) fn pellets_left(&self) -> usize {
        self.pellets.len()
    }

    /// Moves for `dt`, returning the pellets eaten on the way in order.
    pub(crate) fn advance(&mut self, grid: &Grid, dt: Duration) -> Result<Vec<PelletKind>> {
        let mut eaten = Vec::new();
        let mut budget = dt.as_secs_f32();

        while budget > 0.0 && self.speed > 0.0 {
            if self.next.is_none() {
                if let Some(kind) = self.pellets.remove(&self.tile) {
                    eaten.push(kind);
                }
                self.choose(grid)?;
            }
            let Some(next) = self.next else {
                break;
            };

            let needed = (1.0 - self.progress) / self.speed;
            if budget < needed {
                self.progress += budget * self.speed;
                break;
            }
            budget -= needed;
            self.tile = next;
            self.next = None;
            self.progress = 0.0;
        }

        Ok(eaten)
    }

    fn choose(&mut self, grid: &Grid) -> Result<()> {
        let exits = grid
            .legal_exits(self.tile, Access::PAC_MAN)
            .with_context(|| format!("player left the maze at {}", self.tile))?;
        let forward = exits.without(self.direction.opposite());
        let candidates = if forward.is_empty() { exits } else { forward };

        let options: Vec<Direction> = candidates.iter().collect();
        let hungry: Vec<Direction> = options
            .iter()
            .copied()
            .filter(|direction| {
                grid.neighbor(self.tile, *direction)
                    .is_some_and(|tile| self.pellets.contains_key(&tile))
            })
            .collect();
        let pool = if hungry.is_empty() { &options } else { &hungry };

        if pool.contains(&self.direction) && self.rng.gen_bool(0.75) {
            self.next = grid.neighbor(self.tile, self.direction);
            return Ok(());
        }

        let Some(direction) = pool.choose(&mut self.rng).copied() else {
            self.next = None;
            return Ok(());
        };
        self.direction = direction;
        self.next = grid.neighbor(self.tile, direction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_maze::MazeDefinition;

    fn grid() -> Grid {
        Grid::load(&MazeDefinition::classic()).expect("classic maze is valid")
    }

    #[test]
    fn autopilot_eats_pellets_and_stays_on_walkable_tiles() {
        let grid = grid();
        let mut autopilot = Autopilot::new(&grid, 8.0, 7);
        let mut eaten = 0;

        for _ in 0..3_000 {
            eaten += autopilot
                .advance(&grid, Duration::from_millis(16))
                .expect("classic maze has exits everywhere")
                .len();
            assert!(grid.is_walkable(autopilot.snapshot().tile, Access::PAC_MAN));
        }

        assert!(eaten > 0);
        assert_eq!(autopilot.pellets_left() + eaten, grid.pellets().len());
    }

    #[test]
    fn restart_restores_the_board() {
        let grid = grid();
        let mut autopilot = Autopilot::new(&grid, 8.0, 7);
        let _ = autopilot
            .advance(&grid, Duration::from_secs(2))
            .expect("classic maze has exits everywhere");

        autopilot.restart(&grid);

        assert_eq!(autopilot.snapshot().tile, grid.pac_man_start());
        assert_eq!(autopilot.pellets_left(), grid.pellets().len());
    }
}
