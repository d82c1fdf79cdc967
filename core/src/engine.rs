use std::collections::{BTreeSet, VecDeque};

use core::ops::BitOr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Pending -> InProgress (first reveal seeds the mines)
/// - InProgress -> Won
/// - InProgress -> Lost
///
/// A restart never goes back, it replaces the whole [`BoardState`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// No mines placed yet, waiting for the first reveal
    #[default]
    Pending,
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Game ended and no moves can be made anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Outcome of placing or removing a flag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Outcome of revealing one or more cells
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    const fn priority(self) -> u8 {
        use RevealOutcome::*;
        match self {
            NoChange => 0,
            Revealed => 1,
            Won => 2,
            HitMine => 3,
        }
    }
}

/// Merges outcomes of a chord, hitting a mine wins over everything else.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        if rhs.priority() > self.priority() {
            rhs
        } else {
            self
        }
    }
}

/// Everything a renderer needs to show a lost game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossReport {
    /// The mine that was revealed.
    pub triggered: Coord2,
    /// Every mine on the board, the triggered one included.
    pub mines: Vec<Coord2>,
    /// Flags placed on cells without a mine.
    pub misflagged: Vec<Coord2>,
}

/// Read-only picture of a board for presentation layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub state: GameState,
    pub mines_left: i32,
    pub cells: Array2<CellView>,
}

impl BoardSnapshot {
    pub fn size(&self) -> Coord2 {
        grid_size(&self.cells)
    }

    /// `None` when `coords` lies outside the board.
    pub fn view_at(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }
}

/// One game from the first reveal to win or loss.
#[derive(Clone, Debug)]
pub struct BoardState<G = RandomMinefieldGenerator> {
    config: GameConfig,
    generator: G,
    board: Board,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: GameState,
    triggered_mine: Option<Coord2>,
}

impl BoardState<FixedMinefield> {
    /// Game on a predetermined board, still waiting for its first reveal.
    pub fn with_board(board: Board) -> Self {
        Self::new(board.game_config(), FixedMinefield(board))
    }
}

impl<G: MinefieldGenerator> BoardState<G> {
    pub fn new(config: GameConfig, generator: G) -> Self {
        Self {
            config,
            generator,
            board: Board::empty(config.size),
            revealed_count: 0,
            flagged_count: 0,
            state: GameState::Pending,
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    /// Mines minus flags, negative when the player placed too many flags.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flagged_count)
    }

    /// The underlying board, empty while the game is still pending.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<Cell> {
        self.board.get(coords).copied()
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.state.is_finished() || !self.board[coords].is_hidden() {
            return Ok(RevealOutcome::NoChange);
        }
        if self.state.is_pending() {
            self.seed_board(coords)?;
        }
        Ok(self.reveal_single_cell(coords))
    }

    /// Flags are only accepted while the game is in progress: not before the mines exist, and not
    /// after it ended.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use CellState::*;

        let coords = self.validate_coords(coords)?;
        if !self.state.is_in_progress() {
            return Ok(MarkOutcome::NoChange);
        }

        let cell = &mut self.board[coords];
        match cell.state() {
            Hidden => {
                cell.set_state(Flagged);
                self.flagged_count += 1;
            }
            Flagged => {
                cell.set_state(Hidden);
                self.flagged_count -= 1;
            }
            Revealed => return Ok(MarkOutcome::NoChange),
        }
        log::debug!("Flag toggled at {:?}, {} mines left", coords, self.mines_left());
        Ok(MarkOutcome::Changed)
    }

    /// Reveals every hidden neighbour of a revealed cell once as many flags surround it as its
    /// number says. Wrong flags make this lose the game like any other reveal.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        if !self.state.is_in_progress() {
            return Ok(RevealOutcome::NoChange);
        }

        let cell = self.board[coords];
        if !cell.is_revealed() {
            return Ok(RevealOutcome::NoChange);
        }
        let flagged = self.count_flagged_neighbors(coords);
        if flagged != cell.adjacent_mine_count() {
            log::debug!(
                "Chord at {:?} ignored, {} flags around a {}",
                coords,
                flagged,
                cell.adjacent_mine_count()
            );
            return Ok(RevealOutcome::NoChange);
        }

        Ok(self
            .board
            .iter_neighbors(coords)
            .map(|neighbor| self.reveal_single_cell(neighbor))
            .fold(RevealOutcome::NoChange, BitOr::bitor))
    }

    /// Mines, the triggering mine, and wrong flags; only available once the game is lost.
    pub fn loss_report(&self) -> Option<LossReport> {
        if !matches!(self.state, GameState::Lost) {
            return None;
        }
        let triggered = self.triggered_mine?;
        let misflagged = iter_coords(self.size())
            .filter(|&pos| {
                let cell = self.board[pos];
                cell.is_flagged() && !cell.is_mine()
            })
            .collect();

        Some(LossReport {
            triggered,
            mines: self.board.mines().collect(),
            misflagged,
        })
    }

    /// `None` when `coords` lies outside the board.
    pub fn view_at(&self, coords: Coord2) -> Option<CellView> {
        self.board.get(coords).map(|cell| self.view_of(cell))
    }

    fn view_of(&self, cell: &Cell) -> CellView {
        use CellState::*;
        use GameState::*;

        match (self.state, cell.state(), cell.is_mine()) {
            (_, Revealed, false) => CellView::Revealed(cell.adjacent_mine_count()),
            (_, Revealed, true) => CellView::TriggeredMine,
            (Lost, Hidden, true) => CellView::Mine,
            (Lost, Flagged, false) => CellView::WrongFlag,
            // a won board shows every remaining mine as flagged
            (Won, Hidden, true) => CellView::Flagged,
            (_, Flagged, _) => CellView::Flagged,
            (_, Hidden, _) => CellView::Hidden,
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let cells = Array2::from_shape_fn(self.size().to_nd_index(), |(row, col)| {
            self.view_of(&self.board[(row as Coord, col as Coord)])
        });
        BoardSnapshot {
            state: self.state,
            mines_left: if self.state == GameState::Won {
                0
            } else {
                self.mines_left()
            },
            cells,
        }
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.config.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn seed_board(&mut self, safe: Coord2) -> Result<()> {
        let board = self.generator.generate(self.config, safe)?;
        if board.size() != self.config.size {
            log::error!(
                "Generated board is {:?}, expected {:?}",
                board.size(),
                self.config.size
            );
            return Err(GameError::InvalidCoords);
        }
        self.board = board;
        self.state = GameState::InProgress;
        log::debug!("Game started at {:?}", safe);
        Ok(())
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        let cell = self.board[coords];
        if self.state.is_finished() || !cell.is_hidden() {
            return RevealOutcome::NoChange;
        }

        if cell.is_mine() {
            self.board[coords].set_state(CellState::Revealed);
            self.triggered_mine = Some(coords);
            self.state = GameState::Lost;
            log::debug!("Mine hit at {:?}", coords);
            return RevealOutcome::HitMine;
        }

        self.flood_reveal(coords);

        if self.revealed_count == self.board.safe_cell_count() {
            self.state = GameState::Won;
            log::debug!("All {} safe cells revealed", self.revealed_count);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Reveals `start` and, through zero cells, the whole connected zero region plus its border.
    fn flood_reveal(&mut self, start: Coord2) {
        let mut visited = BTreeSet::from([start]);
        let mut to_visit = VecDeque::from([start]);

        while let Some(pos) = to_visit.pop_front() {
            let cell = self.board[pos];
            // flags stop the cascade, mines are never next to a zero
            if !cell.is_hidden() || cell.is_mine() {
                continue;
            }

            self.board[pos].set_state(CellState::Revealed);
            self.revealed_count += 1;
            log::trace!("Revealed {:?}, mine count: {}", pos, cell.adjacent_mine_count());

            if cell.adjacent_mine_count() == 0 {
                for neighbor in self.board.iter_neighbors(pos) {
                    if visited.insert(neighbor) {
                        to_visit.push_back(neighbor);
                    }
                }
            }
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.board
            .iter_neighbors(coords)
            .filter(|&pos| self.board[pos].is_flagged())
            .count() as u8
    }
}
