use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use serde::Deserialize;
use sweeper_core::{ConfigError, ConfigField, ControllerOptions, DEFAULT_DEBOUNCE_TICKS, Difficulty, SafeZone};

/// Hex-encoded store next to the working directory, like the classic game kept it.
pub(crate) const DEFAULT_SCORES_PATH: &str = "bitio";

/// Readable defaults written once for players who want to inspect the table format.
pub(crate) const DEFAULT_SEED_FILE_PATH: &str = "assets/high_scores.txt";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Level {
    Beginner,
    Intermediate,
    Expert,
    Custom,
}

/// Every setting the front end understands. Missing values fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub(crate) struct Settings {
    pub level: Option<Level>,
    pub rows: Option<i64>,
    pub cols: Option<i64>,
    pub mines: Option<i64>,
    pub seed: Option<u64>,
    pub safe_zone: Option<SafeZone>,
    pub debounce: Option<u8>,
    pub scores: Option<PathBuf>,
    pub plain_scores: Option<bool>,
    pub seed_file: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read settings from {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Values set in `top` win over ours.
    pub fn overlay(self, top: Settings) -> Settings {
        Settings {
            level: top.level.or(self.level),
            rows: top.rows.or(self.rows),
            cols: top.cols.or(self.cols),
            mines: top.mines.or(self.mines),
            seed: top.seed.or(self.seed),
            safe_zone: top.safe_zone.or(self.safe_zone),
            debounce: top.debounce.or(self.debounce),
            scores: top.scores.or(self.scores),
            plain_scores: top.plain_scores.or(self.plain_scores),
            seed_file: top.seed_file.or(self.seed_file),
        }
    }

    /// Giving any of rows, cols or mines without a level implies a custom game.
    pub fn difficulty(&self) -> Result<Difficulty, ConfigError> {
        let has_dimensions = self.rows.is_some() || self.cols.is_some() || self.mines.is_some();
        let level = match self.level {
            Some(level) => level,
            None if has_dimensions => Level::Custom,
            None => Level::Beginner,
        };
        Ok(match level {
            Level::Beginner => Difficulty::Beginner,
            Level::Intermediate => Difficulty::Intermediate,
            Level::Expert => Difficulty::Expert,
            Level::Custom => Difficulty::custom(
                required(self.rows, ConfigField::Rows)?,
                required(self.cols, ConfigField::Columns)?,
                required(self.mines, ConfigField::Mines)?,
            )?,
        })
    }

    pub fn controller_options(&self, seed: u64) -> ControllerOptions {
        ControllerOptions {
            safe_zone: self.safe_zone.unwrap_or_default(),
            debounce_ticks: self.debounce.unwrap_or(DEFAULT_DEBOUNCE_TICKS),
            seed,
        }
    }

    pub fn scores_path(&self) -> PathBuf {
        self.scores
            .clone()
            .unwrap_or_else(|| DEFAULT_SCORES_PATH.into())
    }

    pub fn seed_file_path(&self) -> PathBuf {
        self.seed_file
            .clone()
            .unwrap_or_else(|| DEFAULT_SEED_FILE_PATH.into())
    }
}

fn required(value: Option<i64>, field: ConfigField) -> Result<i64, ConfigError> {
    value.ok_or(ConfigError::Missing { field })
}

pub(crate) fn parse_safe_zone(input: &str) -> Result<SafeZone, String> {
    match input {
        "cell" => Ok(SafeZone::Cell),
        "neighborhood" => Ok(SafeZone::Neighborhood),
        "row-and-column" => Ok(SafeZone::RowAndColumn),
        _ => Err(format!(
            "unknown safe zone {input:?}, expected cell, neighborhood or row-and-column"
        )),
    }
}
