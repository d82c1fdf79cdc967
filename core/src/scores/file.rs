use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::*;

/// High scores in a text file, one codec-encoded `"<name> <seconds>"` line per tier.
#[derive(Clone, Debug)]
pub struct FileStorage<C> {
    path: PathBuf,
    codec: C,
}

impl FileStorage<HexCodec> {
    /// The obfuscated store.
    pub fn hex(path: impl Into<PathBuf>) -> Self {
        Self::new(path, HexCodec)
    }
}

impl FileStorage<PlainCodec> {
    /// The plaintext seed file.
    pub fn plain(path: impl Into<PathBuf>) -> Self {
        Self::new(path, PlainCodec)
    }
}

impl<C: LineCodec> FileStorage<C> {
    pub fn new(path: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            path: path.into(),
            codec,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the default table when nothing is stored at the path yet. An existing file is left
    /// alone even when it does not parse. Returns whether the file was written.
    pub fn seed_if_missing(&mut self) -> Result<bool, PersistenceError> {
        if self.path.try_exists()? {
            return Ok(false);
        }
        log::debug!("Seeding {} with default high scores", self.path.display());
        self.save(&HighScores::default())?;
        Ok(true)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn decode_lines(&self, content: &str) -> Result<HighScores, PersistenceError> {
        let mut lines = content.lines().map(str::trim);
        let mut scores = HighScores::default();
        for (i, tier) in Tier::ALL.into_iter().enumerate() {
            let line = lines.next().ok_or(PersistenceError::MissingTier(tier))?;
            let corrupt = |reason| PersistenceError::Corrupt { line: i + 1, reason };
            let text = self.codec.decode(line).map_err(corrupt)?;
            scores[tier] = HighScoreEntry::parse(&text).map_err(corrupt)?;
        }
        if lines.any(|line| !line.is_empty()) {
            log::debug!("Ignoring trailing lines in {}", self.path.display());
        }
        Ok(scores)
    }
}

impl<C: LineCodec> ScoreStorage for FileStorage<C> {
    fn load(&mut self) -> Result<Option<HighScores>, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        self.decode_lines(&content).map(Some)
    }

    /// Writes a sibling temp file and renames it over the target, so readers never see half a
    /// table.
    fn save(&mut self, scores: &HighScores) -> Result<(), PersistenceError> {
        let content = scores
            .iter()
            .map(|(_, entry)| self.codec.encode(&entry.to_string()))
            .collect::<Vec<_>>()
            .join("\n");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        log::trace!("High scores written to {}", self.path.display());
        Ok(())
    }
}
