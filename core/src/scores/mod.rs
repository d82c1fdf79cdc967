//! Best time per named difficulty, persisted through an injected [`ScoreStorage`].

use core::fmt;
use core::ops::{Index, IndexMut};
use serde::{Deserialize, Serialize};

use crate::*;
pub use codec::*;
pub use file::*;

mod codec;
mod file;

pub const DEFAULT_NAME: &str = "Anonymous";
pub const DEFAULT_SECONDS: u16 = 999;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub seconds: u16,
}

impl Default for HighScoreEntry {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.into(),
            seconds: DEFAULT_SECONDS,
        }
    }
}

impl HighScoreEntry {
    /// Entry with a cleaned up name: line breaks dropped, surrounding blanks trimmed, and an empty
    /// name replaced by the default one.
    pub fn new(name: &str, seconds: u16) -> Self {
        let name: String = name.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
        let name = name.trim();
        Self {
            name: if name.is_empty() {
                DEFAULT_NAME.into()
            } else {
                name.into()
            },
            seconds,
        }
    }

    /// Parses `"<name> <seconds>"`, the name being everything before the last space.
    pub fn parse(line: &str) -> Result<Self, &'static str> {
        let (name, seconds) = line.rsplit_once(' ').ok_or("missing seconds")?;
        let seconds = seconds.parse().map_err(|_| "seconds are not a number")?;
        Ok(Self::new(name, seconds))
    }
}

impl fmt::Display for HighScoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.seconds)
    }
}

/// One entry per [`Tier`], in [`Tier::ALL`] order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores([HighScoreEntry; 3]);

impl HighScores {
    pub fn new(entries: [HighScoreEntry; 3]) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, &HighScoreEntry)> {
        Tier::ALL.into_iter().zip(self.0.iter())
    }
}

impl Index<Tier> for HighScores {
    type Output = HighScoreEntry;

    fn index(&self, tier: Tier) -> &Self::Output {
        &self.0[tier.index()]
    }
}

impl IndexMut<Tier> for HighScores {
    fn index_mut(&mut self, tier: Tier) -> &mut Self::Output {
        &mut self.0[tier.index()]
    }
}

/// Where the high-score table lives between runs.
pub trait ScoreStorage {
    /// `Ok(None)` when nothing was stored yet.
    fn load(&mut self) -> Result<Option<HighScores>, PersistenceError>;

    /// Replaces the stored table as a whole.
    fn save(&mut self, scores: &HighScores) -> Result<(), PersistenceError>;
}

/// Keeps the table in memory only.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    stored: Option<HighScores>,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scores(scores: HighScores) -> Self {
        Self {
            stored: Some(scores),
            saves: 0,
        }
    }

    pub fn stored(&self) -> Option<&HighScores> {
        self.stored.as_ref()
    }

    /// How many times the table was written.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl ScoreStorage for MemoryStorage {
    fn load(&mut self) -> Result<Option<HighScores>, PersistenceError> {
        Ok(self.stored.clone())
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), PersistenceError> {
        self.stored = Some(scores.clone());
        self.saves += 1;
        Ok(())
    }
}

pub struct HighScoreStore<S> {
    storage: S,
    scores: HighScores,
}

impl<S: ScoreStorage> HighScoreStore<S> {
    /// Loads the table, falling back to defaults when storage is empty or unreadable.
    ///
    /// Defaults are written back so the next run finds a valid table.
    pub fn open(mut storage: S) -> Self {
        let scores = match storage.load() {
            Ok(Some(scores)) => return Self { storage, scores },
            Ok(None) => {
                log::debug!("No high scores stored yet, seeding defaults");
                HighScores::default()
            }
            Err(err) => {
                log::warn!("Could not load high scores, using defaults: {}", err);
                HighScores::default()
            }
        };

        let mut store = Self { storage, scores };
        if let Err(err) = store.persist() {
            log::warn!("Could not seed high scores: {}", err);
        }
        store
    }

    pub fn entry(&self, tier: Tier) -> &HighScoreEntry {
        &self.scores[tier]
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Strictly faster than the stored time.
    pub fn is_new_record(&self, tier: Tier, seconds: u16) -> bool {
        seconds < self.scores[tier].seconds
    }

    /// Replaces the entry of `tier` and writes the whole table.
    ///
    /// The new entry stays in memory even when writing fails.
    pub fn commit(&mut self, tier: Tier, entry: HighScoreEntry) -> Result<(), PersistenceError> {
        log::debug!("New {} record: {}", tier, entry);
        self.scores[tier] = entry;
        self.persist()
    }

    pub fn reset(&mut self) -> Result<(), PersistenceError> {
        log::debug!("High scores reset");
        self.scores = HighScores::default();
        self.persist()
    }

    fn persist(&mut self) -> Result<(), PersistenceError> {
        self.storage.save(&self.scores)
    }
}
