use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Knobs that stay fixed across restarts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    pub safe_zone: SafeZone,
    pub debounce_ticks: u8,
    /// Seeds the sequence of per-game seeds.
    pub seed: u64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            safe_zone: SafeZone::default(),
            debounce_ticks: DEFAULT_DEBOUNCE_TICKS,
            seed: 0,
        }
    }
}

/// A won game beat the stored time, the presentation layer should ask for a name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RecordRequest {
    pub tier: Tier,
    pub seconds: u16,
}

/// What happened as a result of input or a direct action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Nothing,
    /// Board changed, redraw.
    Changed,
    Won {
        seconds: u16,
        record: Option<RecordRequest>,
    },
    Lost(LossReport),
    /// Input that had to be dropped, the game is untouched.
    Anomaly(InputAnomaly),
}

/// Routes classified input into the current game and handles its end.
pub struct GameController<S> {
    difficulty: Difficulty,
    options: ControllerOptions,
    seeds: SmallRng,
    board: BoardState,
    clock: GameClock,
    classifier: ClickClassifier,
    hover: HoverTracker,
    scores: HighScoreStore<S>,
    record_request: Option<RecordRequest>,
    generation: u64,
}

impl<S: ScoreStorage> GameController<S> {
    pub fn new(
        difficulty: Difficulty,
        options: ControllerOptions,
        scores: HighScoreStore<S>,
    ) -> Result<Self, ConfigError> {
        let config = validate(difficulty, options.safe_zone)?;
        let mut seeds = SmallRng::seed_from_u64(options.seed);
        let board = new_board(&mut seeds, config, options.safe_zone);
        Ok(Self {
            difficulty,
            options,
            seeds,
            board,
            clock: GameClock::new(),
            classifier: ClickClassifier::new(options.debounce_ticks),
            hover: HoverTracker::new(),
            scores,
            record_request: None,
            generation: 0,
        })
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    pub fn state(&self) -> GameState {
        self.board.state()
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn mines_left(&self) -> i32 {
        self.board.mines_left()
    }

    pub fn elapsed(&self) -> u16 {
        self.clock.elapsed()
    }

    pub fn scores(&self) -> &HighScoreStore<S> {
        &self.scores
    }

    pub fn scores_mut(&mut self) -> &mut HighScoreStore<S> {
        &mut self.scores
    }

    /// Increases with every restart, lets observers drop snapshots of a previous game.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Receives enter/leave notifications from the presentation layer.
    pub fn hover_mut(&mut self) -> &mut HoverTracker {
        &mut self.hover
    }

    /// Intent of the press in progress, for drawing pressed cells.
    pub fn gesture(&self) -> ClickIntent {
        self.classifier.gesture()
    }

    pub fn record_request(&self) -> Option<RecordRequest> {
        self.record_request
    }

    pub fn loss_report(&self) -> Option<LossReport> {
        self.board.loss_report()
    }

    /// Throws the current game away and starts a fresh one with the same difficulty.
    pub fn restart(&mut self) {
        let config = self.difficulty.config();
        self.board = new_board(&mut self.seeds, config, self.options.safe_zone);
        self.clock = GameClock::new();
        self.classifier.reset();
        self.record_request = None;
        self.generation += 1;
        log::debug!("Restarted as game #{} ({:?})", self.generation, self.difficulty);
    }

    /// Switches difficulty and restarts; an invalid difficulty leaves everything as it was.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), ConfigError> {
        validate(difficulty, self.options.safe_zone)?;
        self.difficulty = difficulty;
        self.hover.clear();
        self.restart();
        Ok(())
    }

    /// One sampling tick of the mouse buttons.
    pub fn sample_input(&mut self, buttons: MouseButtons) -> Result<GameEvent> {
        match self.classifier.sample(buttons, self.hover.hover()) {
            Classified::Idle => Ok(GameEvent::Nothing),
            Classified::Intent { intent, at } => self.apply(intent, at),
            Classified::Anomaly(anomaly) => Ok(GameEvent::Anomaly(anomaly)),
        }
    }

    /// One tick of the one-second clock.
    pub fn clock_tick(&mut self) {
        if self.board.state().is_in_progress() {
            self.clock.tick();
        }
    }

    /// Applies an intent at a cell, bypassing the classifier.
    pub fn apply(&mut self, intent: ClickIntent, at: Coord2) -> Result<GameEvent> {
        let before = self.board.state();
        let changed = match intent {
            ClickIntent::None => return Ok(GameEvent::Nothing),
            ClickIntent::Reveal => self.board.reveal(at)?.has_update(),
            ClickIntent::ToggleFlag => self.board.toggle_flag(at)?.has_update(),
            ClickIntent::Chord => self.board.chord_reveal(at)?.has_update(),
        };
        let after = self.board.state();

        if before.is_pending() && !after.is_pending() {
            self.clock.start();
        }
        if before != after {
            match after {
                GameState::Won => return Ok(self.finish_won()),
                GameState::Lost => return Ok(self.finish_lost()),
                GameState::Pending | GameState::InProgress => {}
            }
        }
        Ok(if changed {
            GameEvent::Changed
        } else {
            GameEvent::Nothing
        })
    }

    /// Stores the pending record under `name`. Does nothing when there is no record to store.
    pub fn submit_record(&mut self, name: &str) -> Result<(), PersistenceError> {
        let Some(RecordRequest { tier, seconds }) = self.record_request.take() else {
            log::debug!("No record waiting for a name");
            return Ok(());
        };
        self.scores.commit(tier, HighScoreEntry::new(name, seconds))
    }

    /// Drops the pending record without storing it.
    pub fn dismiss_record(&mut self) {
        self.record_request = None;
    }

    fn finish_won(&mut self) -> GameEvent {
        self.clock.freeze();
        let seconds = self.clock.elapsed();
        let record = self
            .difficulty
            .tier()
            .filter(|&tier| self.scores.is_new_record(tier, seconds))
            .map(|tier| RecordRequest { tier, seconds });
        log::debug!("Won in {}s, record: {:?}", seconds, record);
        self.record_request = record;
        GameEvent::Won { seconds, record }
    }

    fn finish_lost(&mut self) -> GameEvent {
        self.clock.freeze();
        match self.board.loss_report() {
            Some(report) => GameEvent::Lost(report),
            None => GameEvent::Changed,
        }
    }
}

fn validate(difficulty: Difficulty, safe_zone: SafeZone) -> Result<GameConfig, ConfigError> {
    let config = difficulty.config();
    let config = GameConfig::new(config.size, config.mines)?;
    safe_zone.check_feasible(config)?;
    Ok(config)
}

fn new_board(seeds: &mut SmallRng, config: GameConfig, safe_zone: SafeZone) -> BoardState {
    let seed = seeds.random();
    BoardState::new(config, RandomMinefieldGenerator::new(seed, safe_zone))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: MouseButtons = MouseButtons::empty();
    const LEFT: MouseButtons = MouseButtons::LEFT;
    const RIGHT: MouseButtons = MouseButtons::RIGHT;
    const BOTH: MouseButtons = MouseButtons::LEFT.union(MouseButtons::RIGHT);

    fn controller(difficulty: Difficulty, seed: u64) -> GameController<MemoryStorage> {
        let options = ControllerOptions {
            seed,
            ..Default::default()
        };
        GameController::new(difficulty, options, HighScoreStore::open(MemoryStorage::new()))
            .unwrap()
    }

    fn with_beginner_best(seconds: u16) -> GameController<MemoryStorage> {
        let mut scores = HighScores::default();
        scores[Tier::Beginner] = HighScoreEntry::new("ada", seconds);
        let store = HighScoreStore::open(MemoryStorage::with_scores(scores));
        GameController::new(Difficulty::Beginner, ControllerOptions::default(), store).unwrap()
    }

    /// Presses and releases over `at`, one sample per entry in `ticks`.
    fn click(
        game: &mut GameController<MemoryStorage>,
        at: Coord2,
        ticks: &[MouseButtons],
    ) -> Vec<GameEvent> {
        game.hover_mut().enter(at);
        let events = ticks
            .iter()
            .map(|&buttons| game.sample_input(buttons).unwrap())
            .filter(|event| *event != GameEvent::Nothing)
            .collect();
        game.hover_mut().leave(at);
        events
    }

    fn safe_cells(game: &GameController<MemoryStorage>) -> Vec<Coord2> {
        iter_coords(game.board().size())
            .filter(|&pos| !game.board().board().contains_mine(pos))
            .collect()
    }

    /// Reveals the first cell, waits `seconds`, then reveals every other safe cell.
    fn win_after(game: &mut GameController<MemoryStorage>, seconds: u16) -> GameEvent {
        game.apply(ClickIntent::Reveal, (4, 4)).unwrap();
        for _ in 0..seconds {
            game.clock_tick();
        }
        let mut last = GameEvent::Nothing;
        for pos in safe_cells(game) {
            let event = game.apply(ClickIntent::Reveal, pos).unwrap();
            if event != GameEvent::Nothing {
                last = event;
            }
        }
        last
    }

    #[test]
    fn left_click_reveals_hovered_cell() {
        let mut game = controller(Difficulty::Beginner, 1);

        let events = click(&mut game, (4, 4), &[LEFT, LEFT, NONE]);

        assert_eq!(events.len(), 1);
        assert_ne!(game.state(), GameState::Pending);
        assert!(game.board().cell_at((4, 4)).unwrap().is_revealed());
    }

    #[test]
    fn flag_click_before_first_reveal_is_ignored() {
        let mut game = controller(Difficulty::Beginner, 1);

        let events = click(&mut game, (0, 0), &[RIGHT, NONE]);

        assert!(events.is_empty());
        assert_eq!(game.state(), GameState::Pending);
        assert_eq!(game.mines_left(), 10);
    }

    #[test]
    fn staggered_two_button_press_chords_once() {
        // a revealed number whose neighbourhood still has something to open
        let chordable = |game: &GameController<MemoryStorage>| {
            let state = game.board();
            iter_coords(state.size()).find(|&pos| {
                let board = state.board();
                state.cell_at(pos).is_some_and(|cell| cell.is_revealed())
                    && board.adjacent_mine_count(pos) > 0
                    && board
                        .iter_neighbors(pos)
                        .any(|n| !board.contains_mine(n) && state.cell_at(n).is_some_and(|c| c.is_hidden()))
            })
        };
        let (mut game, target) = (0..100)
            .find_map(|seed| {
                let mut game = controller(Difficulty::Beginner, seed);
                game.apply(ClickIntent::Reveal, (4, 4)).unwrap();
                let target = chordable(&game)?;
                Some((game, target))
            })
            .expect("some seed leaves a chordable number");
        let board = game.board().board().clone();
        for mine in board.iter_neighbors(target).filter(|&n| board.contains_mine(n)) {
            game.apply(ClickIntent::ToggleFlag, mine).unwrap();
        }
        let revealed_before = game.board().revealed_count();

        let events = click(&mut game, target, &[BOTH, LEFT, LEFT, LEFT, NONE]);

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::Changed | GameEvent::Won { .. }));
        assert!(game.board().revealed_count() > revealed_before);
        for n in board.iter_neighbors(target) {
            let cell = game.board().cell_at(n).unwrap();
            assert_eq!(cell.is_revealed(), !board.contains_mine(n), "at {n:?}");
        }
    }

    #[test]
    fn clock_runs_only_during_the_game() {
        let mut game = controller(Difficulty::Beginner, 5);
        game.clock_tick();
        assert_eq!(game.elapsed(), 0);

        game.apply(ClickIntent::Reveal, (4, 4)).unwrap();
        game.clock_tick();
        game.clock_tick();
        assert_eq!(game.elapsed(), 2);

        let mine = game.board().board().mines().next().unwrap();
        assert!(matches!(
            game.apply(ClickIntent::Reveal, mine).unwrap(),
            GameEvent::Lost(_)
        ));
        game.clock_tick();
        assert_eq!(game.elapsed(), 2);
    }

    #[test]
    fn losing_exposes_report() {
        let mut game = controller(Difficulty::Intermediate, 11);
        game.apply(ClickIntent::Reveal, (0, 0)).unwrap();
        let mine = game.board().board().mines().last().unwrap();

        let event = game.apply(ClickIntent::Reveal, mine).unwrap();

        let GameEvent::Lost(report) = event else {
            panic!("expected a loss, got {event:?}");
        };
        assert_eq!(report.triggered, mine);
        assert_eq!(report.mines.len(), 40);
        assert_eq!(game.loss_report(), Some(report));
        assert_eq!(game.record_request(), None);
    }

    #[test]
    fn fast_win_requests_a_name() {
        let mut game = with_beginner_best(120);

        let event = win_after(&mut game, 90);

        let request = RecordRequest {
            tier: Tier::Beginner,
            seconds: 90,
        };
        assert_eq!(
            event,
            GameEvent::Won {
                seconds: 90,
                record: Some(request)
            }
        );
        assert_eq!(game.record_request(), Some(request));

        game.submit_record("grace").unwrap();
        assert_eq!(game.record_request(), None);
        assert_eq!(
            game.scores().entry(Tier::Beginner),
            &HighScoreEntry::new("grace", 90)
        );
        assert_eq!(
            game.scores().storage().stored().unwrap()[Tier::Beginner].seconds,
            90
        );
    }

    #[test]
    fn slow_win_is_not_a_record() {
        let mut game = with_beginner_best(120);

        let event = win_after(&mut game, 150);

        assert_eq!(
            event,
            GameEvent::Won {
                seconds: 150,
                record: None
            }
        );
        game.submit_record("nobody").unwrap();
        assert_eq!(game.scores().entry(Tier::Beginner).name, "ada");
    }

    #[test]
    fn custom_games_never_record() {
        let custom = Difficulty::Custom(Tier::Beginner.config());
        let mut game = controller(custom, 0);

        let event = win_after(&mut game, 1);

        assert_eq!(
            event,
            GameEvent::Won {
                seconds: 1,
                record: None
            }
        );
    }

    #[test]
    fn restart_discards_the_game() {
        let mut game = controller(Difficulty::Beginner, 2);
        game.apply(ClickIntent::Reveal, (4, 4)).unwrap();
        game.clock_tick();

        game.restart();

        assert_eq!(game.state(), GameState::Pending);
        assert_eq!(game.elapsed(), 0);
        assert_eq!(game.generation(), 1);
        assert_eq!(game.board().revealed_count(), 0);
    }

    #[test]
    fn invalid_difficulty_keeps_current_game() {
        let mut game = controller(Difficulty::Beginner, 2);
        game.apply(ClickIntent::Reveal, (4, 4)).unwrap();

        // row and column exclusion leaves only 4 cells on a 3x3 board
        let crowded = Difficulty::Custom(GameConfig::new_unchecked((3, 3), 5));
        assert!(matches!(
            game.set_difficulty(crowded),
            Err(ConfigError::TooManyMines { .. })
        ));

        assert_eq!(game.difficulty(), Difficulty::Beginner);
        assert_eq!(game.state(), GameState::InProgress);
        assert_eq!(game.generation(), 0);
    }

    #[test]
    fn changing_difficulty_restarts_with_new_size() {
        let mut game = controller(Difficulty::Beginner, 2);

        game.set_difficulty(Difficulty::Expert).unwrap();

        assert_eq!(game.board().size(), (16, 30));
        assert_eq!(game.mines_left(), 99);
        assert_eq!(game.generation(), 1);
    }

    #[test]
    fn ambiguous_hover_suppresses_action() {
        let mut game = controller(Difficulty::Beginner, 2);
        game.hover_mut().enter((1, 1));
        game.hover_mut().enter((1, 2));

        game.sample_input(LEFT).unwrap();
        let event = game.sample_input(NONE).unwrap();

        assert_eq!(event, GameEvent::Anomaly(InputAnomaly::AmbiguousHover(2)));
        assert_eq!(game.state(), GameState::Pending);
    }

    #[test]
    fn restarts_draw_fresh_boards() {
        let mut game = controller(Difficulty::Expert, 8);
        game.apply(ClickIntent::Reveal, (8, 8)).unwrap();
        let first = game.board().board().clone();

        game.restart();
        game.apply(ClickIntent::Reveal, (8, 8)).unwrap();

        assert_ne!(game.board().board(), &first);
    }
}
