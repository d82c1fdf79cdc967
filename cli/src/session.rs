use std::io::{self, BufRead, Write};

use anyhow::{Context, bail};
use sweeper_core::*;
use web_time::Instant;

use crate::render::BoardView;

pub(crate) const HELP: &str = "\
Commands:
  r ROW COL        reveal (left button)
  f ROW COL        toggle flag (right button)
  c ROW COL        chord (both buttons)
  n                new game
  level NAME       beginner, intermediate or expert
  custom R C M     custom board
  scores           show best times
  reset-scores     forget best times
  json             dump the board as JSON
  help             this text
  q                quit";

const BOTH: MouseButtons = MouseButtons::LEFT.union(MouseButtons::RIGHT);
const RELEASED: MouseButtons = MouseButtons::empty();

/// Button samples simulating a click, one per tick.
const LEFT_CLICK: &[MouseButtons] = &[MouseButtons::LEFT, RELEASED];
const RIGHT_CLICK: &[MouseButtons] = &[MouseButtons::RIGHT, RELEASED];
// right button lets go a little before the left one
const CHORD_CLICK: &[MouseButtons] = &[BOTH, MouseButtons::LEFT, MouseButtons::LEFT, RELEASED];

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Press(ClickIntent, Coord2),
    New,
    Level(Tier),
    Custom([String; 3]),
    Scores,
    ResetScores,
    Json,
    Help,
    Quit,
}

impl Command {
    /// `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (name.to_lowercase().as_str(), args) {
            ("r", [row, col]) => Self::Press(ClickIntent::Reveal, parse_coords(row, col)?),
            ("f", [row, col]) => Self::Press(ClickIntent::ToggleFlag, parse_coords(row, col)?),
            ("c", [row, col]) => Self::Press(ClickIntent::Chord, parse_coords(row, col)?),
            ("n" | "new", []) => Self::New,
            ("level", [level]) => Self::Level(parse_tier(level)?),
            ("custom", [rows, cols, mines]) => {
                Self::Custom([rows.to_string(), cols.to_string(), mines.to_string()])
            }
            ("scores", []) => Self::Scores,
            ("reset-scores", []) => Self::ResetScores,
            ("json", []) => Self::Json,
            ("h" | "help" | "?", []) => Self::Help,
            ("q" | "quit" | "exit", []) => Self::Quit,
            _ => bail!("Unknown command {:?}, type 'help' for a list", line.trim()),
        };
        Ok(Some(command))
    }
}

fn parse_coords(row: &str, col: &str) -> anyhow::Result<Coord2> {
    let row = row
        .parse::<Coord>()
        .with_context(|| format!("Invalid row {row:?}"))?;
    let col = col
        .parse::<Coord>()
        .with_context(|| format!("Invalid column {col:?}"))?;
    Ok((row, col))
}

fn parse_tier(name: &str) -> anyhow::Result<Tier> {
    Tier::ALL
        .into_iter()
        .find(|tier| tier.name().eq_ignore_ascii_case(name))
        .with_context(|| format!("Unknown level {name:?}"))
}

fn gesture_samples(intent: ClickIntent) -> &'static [MouseButtons] {
    match intent {
        ClickIntent::None => &[],
        ClickIntent::Reveal => LEFT_CLICK,
        ClickIntent::ToggleFlag => RIGHT_CLICK,
        ClickIntent::Chord => CHORD_CLICK,
    }
}

/// Line-oriented driver feeding simulated mouse input into a [`GameController`].
pub(crate) struct Session<S, R, W> {
    game: GameController<S>,
    ticker: Ticker,
    input: R,
    output: W,
}

impl<S: ScoreStorage, R: BufRead, W: Write> Session<S, R, W> {
    pub fn new(game: GameController<S>, input: R, output: W) -> Self {
        Self {
            game,
            ticker: Ticker::new(CLOCK_INTERVAL, Instant::now()),
            input,
            output,
        }
    }

    pub fn game(&self) -> &GameController<S> {
        &self.game
    }

    /// Runs until `q` or end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{HELP}")?;
        self.show_board()?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                break;
            };
            self.catch_up_clock();

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    writeln!(self.output, "{err:#}")?;
                    continue;
                }
            };
            log::trace!("{:?}", command);
            if command == Command::Quit {
                break;
            }
            self.execute(command)?;
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// Feeds the clock every whole second that passed while waiting for input.
    fn catch_up_clock(&mut self) {
        for _ in 0..self.ticker.due(Instant::now()) {
            self.game.clock_tick();
        }
    }

    fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Press(intent, at) => self.press(intent, at)?,
            Command::New => {
                self.game.restart();
                self.show_board()?;
            }
            Command::Level(tier) => self.change_difficulty(Ok(tier.into()))?,
            Command::Custom([rows, cols, mines]) => {
                self.change_difficulty(Difficulty::parse_custom(&rows, &cols, &mines))?
            }
            Command::Scores => self.show_scores()?,
            Command::ResetScores => {
                if let Err(err) = self.game.scores_mut().reset() {
                    writeln!(self.output, "Could not save high scores: {err}")?;
                }
                self.show_scores()?;
            }
            Command::Json => {
                let json = serde_json::to_string_pretty(&self.game.snapshot())?;
                writeln!(self.output, "{json}")?;
            }
            Command::Help => writeln!(self.output, "{HELP}")?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn press(&mut self, intent: ClickIntent, at: Coord2) -> anyhow::Result<()> {
        let was_pending = self.game.state().is_pending();
        let mut events = Vec::new();

        self.game.hover_mut().enter(at);
        for &buttons in gesture_samples(intent) {
            match self.game.sample_input(buttons) {
                Ok(GameEvent::Nothing) => {}
                Ok(event) => events.push(event),
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
        self.game.hover_mut().leave(at);

        if was_pending && !self.game.state().is_pending() {
            self.ticker.reset(Instant::now());
        }
        if !events.is_empty() {
            self.show_board()?;
        }
        for event in events {
            self.report(event)?;
        }
        Ok(())
    }

    fn report(&mut self, event: GameEvent) -> anyhow::Result<()> {
        match event {
            GameEvent::Won { seconds, record } => {
                writeln!(self.output, "Cleared in {seconds} seconds!")?;
                if let Some(request) = record {
                    self.ask_name(request)?;
                }
            }
            GameEvent::Lost(report) => writeln!(
                self.output,
                "Boom! Mine at {:?}, {} wrong flag(s). Type 'n' for a new game.",
                report.triggered,
                report.misflagged.len()
            )?,
            GameEvent::Anomaly(anomaly) => writeln!(self.output, "Ignored: {anomaly}")?,
            GameEvent::Nothing | GameEvent::Changed => {}
        }
        Ok(())
    }

    fn ask_name(&mut self, request: RecordRequest) -> anyhow::Result<()> {
        write!(
            self.output,
            "Fastest {} time! Your name: ",
            request.tier
        )?;
        self.output.flush()?;
        let name = self.read_line()?.unwrap_or_default();
        if let Err(err) = self.game.submit_record(&name) {
            log::warn!("Record not saved: {}", err);
            writeln!(self.output, "Could not save high scores: {err}")?;
        }
        self.show_scores()?;
        Ok(())
    }

    fn change_difficulty(
        &mut self,
        difficulty: Result<Difficulty, ConfigError>,
    ) -> anyhow::Result<()> {
        match difficulty.and_then(|difficulty| self.game.set_difficulty(difficulty)) {
            Ok(()) => self.show_board()?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }

    fn show_board(&mut self) -> io::Result<()> {
        let snapshot = self.game.snapshot();
        writeln!(
            self.output,
            "{}",
            BoardView::new(&snapshot, self.game.elapsed())
        )
    }

    fn show_scores(&mut self) -> io::Result<()> {
        for (tier, entry) in self.game.scores().scores().iter() {
            writeln!(
                self.output,
                "{:<13} {} {}",
                format!("{tier}:"),
                ThreeDigits::from(entry.seconds),
                entry.name
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(
        difficulty: Difficulty,
        input: &str,
    ) -> Session<MemoryStorage, Cursor<Vec<u8>>, Vec<u8>> {
        seeded_session(difficulty, 0, input)
    }

    fn seeded_session(
        difficulty: Difficulty,
        seed: u64,
        input: &str,
    ) -> Session<MemoryStorage, Cursor<Vec<u8>>, Vec<u8>> {
        let store = HighScoreStore::open(MemoryStorage::new());
        let options = ControllerOptions {
            seed,
            ..Default::default()
        };
        let game = GameController::new(difficulty, options, store).unwrap();
        Session::new(game, Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output<S, R>(session: &Session<S, R, Vec<u8>>) -> String {
        String::from_utf8_lossy(&session.output).into_owned()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            Command::parse("r 3 4").unwrap(),
            Some(Command::Press(ClickIntent::Reveal, (3, 4)))
        );
        assert_eq!(
            Command::parse("  C 0 15 ").unwrap(),
            Some(Command::Press(ClickIntent::Chord, (0, 15)))
        );
        assert_eq!(
            Command::parse("level Expert").unwrap(),
            Some(Command::Level(Tier::Expert))
        );
        assert_eq!(
            Command::parse("custom 5 x 3").unwrap(),
            Some(Command::Custom(["5".into(), "x".into(), "3".into()]))
        );
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("q").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(Command::parse("r 1").is_err());
        assert!(Command::parse("r -1 2").is_err());
        assert!(Command::parse("f 1 300").is_err());
        assert!(Command::parse("level impossible").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[test]
    fn first_reveal_starts_the_game() {
        let mut session = session(Difficulty::Beginner, "r 4 4\nq\n");

        session.run().unwrap();

        assert_ne!(session.game().state(), GameState::Pending);
        assert!(session.game().board().cell_at((4, 4)).unwrap().is_revealed());
    }

    #[test]
    fn chord_goes_through_classifier() {
        // all mines flagged around a number that still has hidden safe neighbours
        let (mut session, target) = (0..100)
            .find_map(|seed| {
                let mut session = seeded_session(Difficulty::Beginner, seed, "");
                session.press(ClickIntent::Reveal, (4, 4)).unwrap();
                let state = session.game().board();
                let board = state.board();
                let target = iter_coords(board.size()).find(|&pos| {
                    state.cell_at(pos).is_some_and(|cell| cell.is_revealed())
                        && board.adjacent_mine_count(pos) > 0
                        && board.iter_neighbors(pos).any(|n| {
                            !board.contains_mine(n)
                                && state.cell_at(n).is_some_and(|cell| cell.is_hidden())
                        })
                })?;
                Some((session, target))
            })
            .expect("some seed leaves a chordable number");
        let board = session.game().board().board().clone();
        for mine in board.iter_neighbors(target).filter(|&n| board.contains_mine(n)) {
            session.press(ClickIntent::ToggleFlag, mine).unwrap();
        }

        session.press(ClickIntent::Chord, target).unwrap();

        for n in board.iter_neighbors(target) {
            let cell = session.game().board().cell_at(n).unwrap();
            assert_eq!(cell.is_revealed(), !board.contains_mine(n));
        }
    }

    #[test]
    fn reports_bad_input_and_keeps_going() {
        let mut session = session(Difficulty::Beginner, "dance\nr 40 40\ncustom 0 5 5\nhelp\n");

        session.run().unwrap();

        let text = output(&session);
        assert!(text.contains("Unknown command \"dance\""));
        assert!(text.contains("Invalid coordinates"));
        assert!(text.contains("Rows should be a positive integer value"));
        assert_eq!(text.matches("Commands:").count(), 2);
        assert_eq!(session.game().state(), GameState::Pending);
    }

    #[test]
    fn level_switch_redraws_board() {
        let mut session = session(Difficulty::Beginner, "level expert\nq\n");

        session.run().unwrap();

        assert_eq!(session.game().difficulty(), Difficulty::Expert);
        assert!(output(&session).contains("[099]  :)  [000]"));
    }

    #[test]
    fn scores_listing() {
        let mut session = session(Difficulty::Beginner, "scores\n");

        session.run().unwrap();

        let text = output(&session);
        assert!(text.contains("Beginner:     999 Anonymous"));
        assert!(text.contains("Expert:       999 Anonymous"));
    }

    #[test]
    fn record_prompt_stores_name() {
        let mut session = session(Difficulty::Beginner, "");
        session.press(ClickIntent::Reveal, (4, 4)).unwrap();
        let board = session.game().board().board().clone();
        session.input = Cursor::new(b"Grace Hopper\n".to_vec());

        for pos in iter_coords(board.size()).filter(|&pos| !board.contains_mine(pos)) {
            session.press(ClickIntent::Reveal, pos).unwrap();
        }

        assert_eq!(session.game().state(), GameState::Won);
        let best = session.game().scores().entry(Tier::Beginner);
        assert_eq!(best.name, "Grace Hopper");
        assert!(best.seconds < DEFAULT_SECONDS);
        assert!(output(&session).contains("Your name: "));
    }

    #[test]
    fn json_dump_contains_state() {
        let mut session = session(Difficulty::Beginner, "json\n");

        session.run().unwrap();

        assert!(output(&session).contains("\"state\": \"Pending\""));
    }
}
