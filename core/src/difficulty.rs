use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Named difficulty that keeps a best time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Beginner,
    Intermediate,
    Expert,
}

impl Tier {
    /// Persistence order of the high-score table.
    pub const ALL: [Tier; 3] = [Tier::Beginner, Tier::Intermediate, Tier::Expert];

    pub const fn config(self) -> GameConfig {
        use Tier::*;
        match self {
            Beginner => GameConfig::new_unchecked((9, 9), 10),
            Intermediate => GameConfig::new_unchecked((16, 16), 40),
            Expert => GameConfig::new_unchecked((16, 30), 99),
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        use Tier::*;
        match self {
            Beginner => "Beginner",
            Intermediate => "Intermediate",
            Expert => "Expert",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
    Custom(GameConfig),
}

impl Difficulty {
    /// Custom difficulty from integer input, each field must be a positive integer.
    pub fn custom(rows: i64, cols: i64, mines: i64) -> Result<Self, ConfigError> {
        let rows = positive_coord(rows, ConfigField::Rows)?;
        let cols = positive_coord(cols, ConfigField::Columns)?;
        if mines <= 0 {
            return Err(ConfigError::NotPositive {
                field: ConfigField::Mines,
            });
        }
        let mines = CellCount::try_from(mines).map_err(|_| ConfigError::TooLarge {
            field: ConfigField::Mines,
            max: CellCount::MAX.into(),
        })?;
        Ok(Self::Custom(GameConfig::new((rows, cols), mines)?))
    }

    /// Custom difficulty from raw text fields, as typed into an options form.
    pub fn parse_custom(rows: &str, cols: &str, mines: &str) -> Result<Self, ConfigError> {
        let rows = parse_field(rows, ConfigField::Rows)?;
        let cols = parse_field(cols, ConfigField::Columns)?;
        let mines = parse_field(mines, ConfigField::Mines)?;
        Self::custom(rows, cols, mines)
    }

    pub const fn config(self) -> GameConfig {
        use Difficulty::*;
        match self {
            Beginner => Tier::Beginner.config(),
            Intermediate => Tier::Intermediate.config(),
            Expert => Tier::Expert.config(),
            Custom(config) => config,
        }
    }

    /// The named tier, `None` for custom boards which never keep a best time.
    pub const fn tier(self) -> Option<Tier> {
        use Difficulty::*;
        match self {
            Beginner => Some(Tier::Beginner),
            Intermediate => Some(Tier::Intermediate),
            Expert => Some(Tier::Expert),
            Custom(_) => None,
        }
    }
}

impl From<Tier> for Difficulty {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Beginner => Self::Beginner,
            Tier::Intermediate => Self::Intermediate,
            Tier::Expert => Self::Expert,
        }
    }
}

fn positive_coord(value: i64, field: ConfigField) -> Result<Coord, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NotPositive { field });
    }
    Coord::try_from(value).map_err(|_| ConfigError::TooLarge {
        field,
        max: Coord::MAX.into(),
    })
}

fn parse_field(input: &str, field: ConfigField) -> Result<i64, ConfigError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ConfigError::Missing { field });
    }
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::NotPositive { field });
    }
    // only digits left, so overflow is the one failure
    input.parse().map_err(|_| ConfigError::TooLarge {
        field,
        max: match field {
            ConfigField::Mines => CellCount::MAX.into(),
            _ => Coord::MAX.into(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_tiers_match_classic_presets() {
        assert_eq!(Difficulty::Beginner.config(), GameConfig::new_unchecked((9, 9), 10));
        assert_eq!(
            Difficulty::Intermediate.config(),
            GameConfig::new_unchecked((16, 16), 40)
        );
        assert_eq!(Difficulty::Expert.config(), GameConfig::new_unchecked((16, 30), 99));
        assert_eq!(Difficulty::Expert.tier(), Some(Tier::Expert));
    }

    #[test]
    fn custom_never_has_a_tier() {
        let custom = Difficulty::custom(9, 9, 10).unwrap();
        assert_eq!(custom.tier(), None);
        assert_eq!(custom.config(), GameConfig::new_unchecked((9, 9), 10));
    }

    #[test]
    fn custom_errors_name_the_field() {
        assert_eq!(
            Difficulty::custom(0, 9, 10).unwrap_err().field(),
            ConfigField::Rows
        );
        assert_eq!(
            Difficulty::custom(9, -1, 10).unwrap_err().field(),
            ConfigField::Columns
        );
        assert_eq!(
            Difficulty::custom(9, 9, 0).unwrap_err().field(),
            ConfigField::Mines
        );
        assert_eq!(
            Difficulty::custom(300, 9, 10),
            Err(ConfigError::TooLarge {
                field: ConfigField::Rows,
                max: 255
            })
        );
        assert_eq!(
            Difficulty::custom(3, 3, 9).unwrap_err().field(),
            ConfigField::Mines
        );
    }

    #[test]
    fn parse_custom_reports_offending_text_field() {
        assert_eq!(
            Difficulty::parse_custom("", "9", "10"),
            Err(ConfigError::Missing {
                field: ConfigField::Rows
            })
        );
        assert_eq!(
            Difficulty::parse_custom("9", "nine", "10"),
            Err(ConfigError::NotPositive {
                field: ConfigField::Columns
            })
        );
        assert_eq!(
            Difficulty::parse_custom("9", "9", "-3"),
            Err(ConfigError::NotPositive {
                field: ConfigField::Mines
            })
        );
        assert_eq!(
            Difficulty::parse_custom(" 20 ", "30", "99"),
            Ok(Difficulty::Custom(GameConfig::new_unchecked((20, 30), 99)))
        );
    }

    #[test]
    fn error_messages_read_like_form_warnings() {
        let err = Difficulty::parse_custom("9", "9", "x").unwrap_err();
        assert_eq!(err.to_string(), "Mines should be a positive integer value");
    }
}
