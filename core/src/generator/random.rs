use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Purely random placement outside of the configured safe zone.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    safe_zone: SafeZone,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, safe_zone: SafeZone) -> Self {
        Self { seed, safe_zone }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn safe_zone(&self) -> SafeZone {
        self.safe_zone
    }

    /// Places mines using an externally owned random source.
    ///
    /// Cells are sampled uniformly and rejected when they fall in the safe zone or already hold a
    /// mine. Feasibility is checked first so the sampling loop always terminates.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        rng: &mut R,
        config: GameConfig,
        safe: Coord2,
        safe_zone: SafeZone,
    ) -> Result<Board, ConfigError> {
        let (rows, cols) = config.size;
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
        debug_assert!(config.contains(safe), "safe cell {safe:?} outside the board");

        let eligible = safe_zone.eligible_cells(config, safe);
        if config.mines > eligible {
            log::warn!(
                "Cannot place {} mines, only {} cells eligible around {:?}",
                config.mines,
                eligible,
                safe
            );
            return Err(ConfigError::TooManyMines {
                mines: config.mines.into(),
                eligible: eligible.into(),
            });
        }

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut placed: CellCount = 0;
        let mut rejected: u32 = 0;
        while placed < config.mines {
            let coords = (rng.random_range(0..rows), rng.random_range(0..cols));
            let cell = &mut mine_mask[coords.to_nd_index()];
            if *cell || safe_zone.contains(safe, coords) {
                rejected += 1;
                continue;
            }
            *cell = true;
            placed += 1;
        }
        log::debug!(
            "Placed {} mines on {:?} around {:?} ({:?}), {} samples rejected",
            placed,
            config.size,
            safe,
            safe_zone,
            rejected
        );

        Ok(Board::from_mine_mask(&mine_mask))
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(&self, config: GameConfig, safe: Coord2) -> Result<Board, ConfigError> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        Self::generate_with_rng(&mut rng, config, safe, self.safe_zone)
    }
}
