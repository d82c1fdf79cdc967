use serde::{Deserialize, Serialize};

/// Player-visible state of a cell. A cell cannot be flagged and revealed at the same time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Flagged,
    Revealed,
}

/// A single board cell: its hidden content and what the player sees of it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    mine: bool,
    adjacent: u8,
    state: CellState,
}

impl Cell {
    pub(crate) const fn new(mine: bool, adjacent: u8) -> Self {
        Self {
            mine,
            adjacent,
            state: CellState::Hidden,
        }
    }

    pub const fn is_mine(self) -> bool {
        self.mine
    }

    /// Number of mines among the neighbours, meaningless for mines themselves (always 0).
    pub const fn adjacent_mine_count(self) -> u8 {
        self.adjacent
    }

    pub const fn state(self) -> CellState {
        self.state
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self.state, CellState::Revealed)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self.state, CellState::Flagged)
    }

    pub const fn is_hidden(self) -> bool {
        matches!(self.state, CellState::Hidden)
    }

    pub(crate) fn set_state(&mut self, state: CellState) {
        self.state = state;
    }
}

/// What a renderer should draw for a cell.
///
/// While the game is running only `Hidden`, `Flagged` and `Revealed` occur. After a loss the
/// remaining mines, the mine that was hit, and every flag placed on a safe cell are exposed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    #[default]
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    TriggeredMine,
    WrongFlag,
}

impl CellView {
    /// Whether the cell is still drawn as a raised button
    pub const fn is_closed(self) -> bool {
        use CellView::*;
        match self {
            Hidden | Flagged | WrongFlag => true,
            Revealed(_) | Mine | TriggeredMine => false,
        }
    }
}
