use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

/// Produces the board for a game once the first revealed cell is known.
pub trait MinefieldGenerator {
    fn generate(&self, config: GameConfig, safe: Coord2) -> Result<Board, ConfigError>;
}

/// Which cells around the first reveal are kept free of mines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SafeZone {
    /// Only the revealed cell.
    Cell,
    /// The revealed cell and its 8 neighbours, so the first reveal always opens an area.
    Neighborhood,
    /// The whole row and the whole column of the revealed cell.
    ///
    /// This is the classic behaviour of the game this engine reproduces. It keeps far more cells
    /// free than needed and should be revisited, but is kept as the default.
    #[default]
    RowAndColumn,
}

impl SafeZone {
    pub fn contains(self, safe: Coord2, coords: Coord2) -> bool {
        use SafeZone::*;
        match self {
            Cell => coords == safe,
            Neighborhood => coords.0.abs_diff(safe.0) <= 1 && coords.1.abs_diff(safe.1) <= 1,
            RowAndColumn => coords.0 == safe.0 || coords.1 == safe.1,
        }
    }

    /// Number of cells left for mines when the first reveal is at `safe`.
    pub fn eligible_cells(self, config: GameConfig, safe: Coord2) -> CellCount {
        let (rows, cols) = config.size;
        let excluded = match self {
            Self::Cell => 1,
            Self::Neighborhood => {
                let span = |center: Coord, len: Coord| {
                    let start = center.saturating_sub(1);
                    let end = center.saturating_add(2).min(len);
                    end.saturating_sub(start)
                };
                mult(span(safe.0, rows), span(safe.1, cols))
            }
            Self::RowAndColumn => (CellCount::from(rows) + CellCount::from(cols)).saturating_sub(1),
        };
        config.total_cells().saturating_sub(excluded)
    }

    /// Smallest number of eligible cells over every possible first reveal.
    pub fn min_eligible_cells(self, config: GameConfig) -> CellCount {
        let (rows, cols) = config.size;
        // an interior cell excludes the most, or the middle one on small boards
        let center = (rows / 2, cols / 2);
        self.eligible_cells(config, center)
    }

    /// Fails when `config` could leave too few cells for its mines after some first reveal.
    pub fn check_feasible(self, config: GameConfig) -> Result<(), ConfigError> {
        let eligible = self.min_eligible_cells(config);
        if config.mines > eligible {
            return Err(ConfigError::TooManyMines {
                mines: config.mines.into(),
                eligible: eligible.into(),
            });
        }
        Ok(())
    }
}

/// Always hands out the same predetermined board, ignoring where the first reveal lands.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMinefield(pub Board);

impl MinefieldGenerator for FixedMinefield {
    fn generate(&self, _config: GameConfig, _safe: Coord2) -> Result<Board, ConfigError> {
        Ok(self.0.clone())
    }
}
