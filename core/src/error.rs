use core::fmt;
use thiserror::Error;

use crate::Tier;

/// Field of a difficulty configuration, used to point at invalid user input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigField {
    Rows,
    Columns,
    Mines,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rows => "Rows",
            Self::Columns => "Columns",
            Self::Mines => "Mines",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} value is missing")]
    Missing { field: ConfigField },
    #[error("{field} should be a positive integer value")]
    NotPositive { field: ConfigField },
    #[error("{field} must be at most {max}")]
    TooLarge { field: ConfigField, max: u32 },
    #[error("Too many mines: {mines} requested but only {eligible} cells are eligible")]
    TooManyMines { mines: u32, eligible: u32 },
}

impl ConfigError {
    /// The configuration field the error points at.
    pub const fn field(&self) -> ConfigField {
        match self {
            Self::Missing { field } | Self::NotPositive { field } | Self::TooLarge { field, .. } => {
                *field
            }
            Self::TooManyMines { .. } => ConfigField::Mines,
        }
    }
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("High score storage I/O failed")]
    Io(#[from] std::io::Error),
    #[error("High score line {line} is corrupt: {reason}")]
    Corrupt { line: usize, reason: &'static str },
    #[error("High score storage has no entry for {0}")]
    MissingTier(Tier),
}

/// Raw input that cannot be turned into a single action.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputAnomaly {
    #[error("{0} cells report the pointer hovering over them at once")]
    AmbiguousHover(usize),
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type Result<T, E = GameError> = core::result::Result<T, E>;
