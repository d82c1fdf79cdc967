use std::io;
use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use sweeper_core::{Difficulty, FileStorage, GameController, HighScoreStore, SafeZone, ScoreStorage};
use tracing_subscriber::filter::LevelFilter;

use settings::{Level, Settings};

mod render;
mod session;
mod settings;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Difficulty to start with
    #[arg(short, long, value_enum)]
    level: Option<Level>,

    /// Rows of a custom board
    #[arg(long)]
    rows: Option<i64>,

    /// Columns of a custom board
    #[arg(long)]
    cols: Option<i64>,

    /// Mines on a custom board
    #[arg(long)]
    mines: Option<i64>,

    /// Cells kept free of mines around the first reveal: cell, neighborhood or row-and-column
    #[arg(long, value_parser = settings::parse_safe_zone)]
    safe_zone: Option<SafeZone>,

    /// Samples a two-button press may take to settle
    #[arg(long)]
    debounce: Option<u8>,

    /// High score file
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Keep high scores readable instead of hex encoded
    #[arg(long)]
    plain_scores: bool,

    /// Plain text high score file created with default entries when missing
    #[arg(long)]
    seed_file: Option<PathBuf>,

    /// TOML settings file, flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            level: self.level,
            rows: self.rows,
            cols: self.cols,
            mines: self.mines,
            seed: self.seed,
            safe_zone: self.safe_zone,
            debounce: self.debounce,
            scores: self.scores.clone(),
            plain_scores: self.plain_scores.then_some(true),
            seed_file: self.seed_file.clone(),
        }
    }
}

fn init_logging(level: LevelFilter) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn play<S: ScoreStorage>(
    storage: S,
    difficulty: Difficulty,
    settings: &Settings,
    seed: u64,
) -> anyhow::Result<()> {
    let options = settings.controller_options(seed);
    let game = GameController::new(difficulty, options, HighScoreStore::open(storage))?;
    let mut session = session::Session::new(game, io::stdin().lock(), io::stdout().lock());
    session.run()?;
    log::debug!("Quit after {} restart(s)", session.game().generation());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose.tracing_level_filter());

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    }
    .overlay(args.settings());
    log::debug!("settings: {:?}", settings);

    let difficulty = settings.difficulty()?;
    let seed = settings.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {}", seed);

    let seed_file = settings.seed_file_path();
    if let Err(err) = FileStorage::plain(&seed_file).seed_if_missing() {
        log::warn!("Could not create {}: {}", seed_file.display(), err);
    }

    let path = settings.scores_path();
    if settings.plain_scores.unwrap_or(false) {
        play(FileStorage::plain(path), difficulty, &settings, seed)
    } else {
        play(FileStorage::hex(path), difficulty, &settings, seed)
    }
}
