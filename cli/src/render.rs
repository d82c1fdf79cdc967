use std::fmt;

use sweeper_core::{BoardSnapshot, CellView, GameState, ThreeDigits};

/// Text rendering of a board with the mine counter and clock on top.
pub(crate) struct BoardView<'a> {
    snapshot: &'a BoardSnapshot,
    elapsed: u16,
}

impl<'a> BoardView<'a> {
    pub fn new(snapshot: &'a BoardSnapshot, elapsed: u16) -> Self {
        Self { snapshot, elapsed }
    }
}

fn face(state: GameState) -> &'static str {
    match state {
        GameState::Pending | GameState::InProgress => ":)",
        GameState::Won => "B)",
        GameState::Lost => "X(",
    }
}

pub(crate) fn cell_char(view: CellView) -> char {
    match view {
        CellView::Hidden => '#',
        CellView::Flagged => 'F',
        CellView::Revealed(0) => '.',
        CellView::Revealed(count) => char::from_digit(count.into(), 10).unwrap_or('?'),
        CellView::Mine => '*',
        CellView::TriggeredMine => 'X',
        CellView::WrongFlag => 'x',
    }
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.snapshot.size();
        writeln!(
            f,
            "[{}]  {}  [{}]",
            ThreeDigits::from(self.snapshot.mines_left),
            face(self.snapshot.state),
            ThreeDigits::from(self.elapsed)
        )?;

        if cols > 10 {
            f.write_str("    ")?;
            for col in 0..cols {
                let tens = if col % 10 == 0 {
                    char::from_digit((col / 10).into(), 10).unwrap_or('?')
                } else {
                    ' '
                };
                write!(f, "{tens}")?;
            }
            writeln!(f)?;
        }
        f.write_str("    ")?;
        for col in 0..cols {
            write!(f, "{}", col % 10)?;
        }
        writeln!(f)?;

        for row in 0..rows {
            write!(f, "{row:>3} ")?;
            for col in 0..cols {
                write!(f, "{}", cell_char(self.snapshot.view_at((row, col)).unwrap_or_default()))?;
            }
            if row + 1 < rows {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
