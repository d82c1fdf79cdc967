//! Engine for the classic single-player mine-uncovering puzzle.
//!
//! The crate owns everything that is not drawing: minefield generation around a safe first move,
//! reveal/flag/chord rules, win and loss detection, the game clock, best-time persistence and the
//! classification of raw mouse input into player intents. A presentation layer feeds it button
//! samples plus hover notifications and renders [`BoardSnapshot`]s.

use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use clock::*;
pub use controller::*;
pub use difficulty::*;
pub use display::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use input::*;
pub use scores::*;
pub use types::*;

mod cell;
mod clock;
mod controller;
mod difficulty;
mod display;
mod engine;
mod error;
mod generator;
mod input;
mod scores;
mod types;

/// Board dimensions and mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Checks the board is non-empty and leaves at least one safe cell.
    pub fn new((rows, cols): Coord2, mines: CellCount) -> Result<Self, ConfigError> {
        if rows == 0 {
            return Err(ConfigError::NotPositive {
                field: ConfigField::Rows,
            });
        }
        if cols == 0 {
            return Err(ConfigError::NotPositive {
                field: ConfigField::Columns,
            });
        }
        let config = Self::new_unchecked((rows, cols), mines);
        if mines >= config.total_cells() {
            return Err(ConfigError::TooManyMines {
                mines: mines.into(),
                eligible: u32::from(config.total_cells()) - 1,
            });
        }
        Ok(config)
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn contains(&self, (row, col): Coord2) -> bool {
        row < self.size.0 && col < self.size.1
    }
}

/// The full grid of cells for one game, mines included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    mine_count: CellCount,
}

impl Board {
    /// Board without any mines, stands in for the real one until the first reveal.
    pub fn empty(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
            mine_count: 0,
        }
    }

    /// Builds a board from a mine mask, counting neighbours for every safe cell.
    pub(crate) fn from_mine_mask(mine_mask: &Array2<bool>) -> Self {
        let size = grid_size(mine_mask);
        let mut mine_count: CellCount = 0;
        let cells = Array2::from_shape_fn(mine_mask.dim(), |(row, col)| {
            let coords = (row as Coord, col as Coord);
            if mine_mask[coords.to_nd_index()] {
                mine_count += 1;
                return Cell::new(true, 0);
            }
            let adjacent = NeighborIter::new(coords, size)
                .filter(|pos| mine_mask[pos.to_nd_index()])
                .count() as u8;
            Cell::new(false, adjacent)
        });
        Self { cells, mine_count }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(&mine_mask))
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.cells)
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size().0, self.size().1)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn get(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords].is_mine()
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self[coords].adjacent_mine_count()
    }

    /// Coordinates of every mine, row-major.
    pub fn mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        iter_coords(self.size()).filter(|&pos| self[pos].is_mine())
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}
