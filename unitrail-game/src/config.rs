//! Typed game configuration and load-time validation.
use crate::board::{BoardError, BoardLayout, TileKind};
use crate::constants::{DEFAULT_CREDITS_CAP, DEFAULT_DICE_MAX, DEFAULT_DICE_MIN, DICE_CEILING};
use crate::stats::{StatKind, StatsConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One level of the campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub label: String,
    pub board: BoardLayout,
    /// Credits needed to leave this level; required below the maximum level.
    #[serde(default)]
    pub credits_to_advance: Option<i32>,
}

/// Level sequence bounds plus integer-keyed level definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelsConfig {
    pub initial: u32,
    pub maximum: u32,
    #[serde(flatten)]
    pub entries: BTreeMap<String, LevelConfig>,
}

fn parse_level_key(key: &str) -> Option<u32> {
    key.trim().parse::<u32>().ok().filter(|number| *number > 0)
}

impl LevelsConfig {
    /// Entry whose key names `level`; `"01"` and `" 1"` both match level 1.
    #[must_use]
    pub fn get(&self, level: u32) -> Option<&LevelConfig> {
        self.entries
            .iter()
            .find(|(key, _)| parse_level_key(key) == Some(level))
            .map(|(_, entry)| entry)
    }

    /// Parsed level numbers of every entry, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLevelKey`] for keys that are not positive integers
    /// and [`ConfigError::DuplicateLevel`] when two keys name the same level.
    pub fn numbered(&self) -> Result<BTreeMap<u32, &LevelConfig>, ConfigError> {
        let mut numbered = BTreeMap::new();
        for (key, level) in &self.entries {
            let number =
                parse_level_key(key).ok_or_else(|| ConfigError::InvalidLevelKey(key.clone()))?;
            if numbered.insert(number, level).is_some() {
                return Err(ConfigError::DuplicateLevel(number));
            }
        }
        Ok(numbered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsConfig {
    #[serde(default)]
    pub initial: i32,
    /// Cap applied once the final level is reached.
    #[serde(default = "CreditsConfig::default_maximum")]
    pub maximum: i32,
}

impl CreditsConfig {
    const fn default_maximum() -> i32 {
        DEFAULT_CREDITS_CAP
    }
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            initial: 0,
            maximum: Self::default_maximum(),
        }
    }
}

/// Inclusive dice range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceConfig {
    #[serde(default = "DiceConfig::default_minimum")]
    pub minimum: u32,
    #[serde(default = "DiceConfig::default_maximum")]
    pub maximum: u32,
}

impl DiceConfig {
    const fn default_minimum() -> u32 {
        DEFAULT_DICE_MIN
    }

    const fn default_maximum() -> u32 {
        DEFAULT_DICE_MAX
    }
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            minimum: Self::default_minimum(),
            maximum: Self::default_maximum(),
        }
    }
}

/// Presentation metadata for a tile type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxMeta {
    /// Single-character tile code this entry describes.
    pub id: String,
    pub label: String,
    #[serde(default, alias = "emoji")]
    pub icon: Option<String>,
}

/// Full game configuration as consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub title: String,
    pub stats: StatsConfig,
    pub levels: LevelsConfig,
    #[serde(default)]
    pub credits: CreditsConfig,
    #[serde(default)]
    pub dice: DiceConfig,
    #[serde(default)]
    pub boxes: BTreeMap<String, BoxMeta>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level key {0:?} is not a positive integer")]
    InvalidLevelKey(String),
    #[error("initial level {initial} must be between 1 and the maximum level {maximum}")]
    LevelRange { initial: u32, maximum: u32 },
    #[error("level {0} is defined more than once")]
    DuplicateLevel(u32),
    #[error("level {0} is not defined")]
    MissingLevel(u32),
    #[error("level {0} needs a non-negative credits_to_advance")]
    MissingThreshold(u32),
    #[error("dice minimum {minimum} exceeds maximum {maximum}")]
    DiceRange { minimum: u32, maximum: u32 },
    #[error("dice maximum {maximum} exceeds the ceiling of {ceiling}")]
    DiceCeiling { maximum: u32, ceiling: u32 },
    #[error("{stat} minimum {minimum} exceeds maximum {maximum}")]
    InvertedBounds {
        stat: StatKind,
        minimum: i32,
        maximum: i32,
    },
    #[error("{stat} initial value {value} lies outside [{minimum}, {maximum}]")]
    InitialOutOfBounds {
        stat: StatKind,
        value: i32,
        minimum: i32,
        maximum: i32,
    },
    #[error("credits initial {initial} and maximum {maximum} must be non-negative")]
    Credits { initial: i32, maximum: i32 },
    #[error("board for level {level} is invalid: {source}")]
    Board {
        level: u32,
        #[source]
        source: BoardError,
    },
}

impl GameConfig {
    /// Parse and validate configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the shape rules serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_levels()?;
        self.validate_stats()?;
        if self.dice.minimum > self.dice.maximum {
            return Err(ConfigError::DiceRange {
                minimum: self.dice.minimum,
                maximum: self.dice.maximum,
            });
        }
        if self.dice.maximum > DICE_CEILING {
            return Err(ConfigError::DiceCeiling {
                maximum: self.dice.maximum,
                ceiling: DICE_CEILING,
            });
        }
        if self.credits.initial < 0 || self.credits.maximum < 0 {
            return Err(ConfigError::Credits {
                initial: self.credits.initial,
                maximum: self.credits.maximum,
            });
        }
        Ok(())
    }

    fn validate_levels(&self) -> Result<(), ConfigError> {
        let (initial, maximum) = (self.levels.initial, self.levels.maximum);
        if initial == 0 || initial > maximum {
            return Err(ConfigError::LevelRange { initial, maximum });
        }
        let numbered = self.levels.numbered()?;
        for level in initial..=maximum {
            let entry = numbered.get(&level).ok_or(ConfigError::MissingLevel(level))?;
            let needs_threshold = level < maximum;
            if needs_threshold && !entry.credits_to_advance.is_some_and(|credits| credits >= 0) {
                return Err(ConfigError::MissingThreshold(level));
            }
        }
        Ok(())
    }

    fn validate_stats(&self) -> Result<(), ConfigError> {
        for stat in StatKind::ALL {
            let (minimum, maximum) = self.stats.bounds(stat);
            if minimum > maximum {
                return Err(ConfigError::InvertedBounds {
                    stat,
                    minimum,
                    maximum,
                });
            }
            let value = self.stats.get(stat).initial;
            if !(minimum..=maximum).contains(&value) {
                return Err(ConfigError::InitialOutOfBounds {
                    stat,
                    value,
                    minimum,
                    maximum,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn level(&self, level: u32) -> Option<&LevelConfig> {
        self.levels.get(level)
    }

    /// Credits required to leave `level`; `None` at or above the maximum.
    #[must_use]
    pub fn threshold(&self, level: u32) -> Option<i32> {
        if level >= self.levels.maximum {
            return None;
        }
        self.level(level).and_then(|entry| entry.credits_to_advance)
    }

    #[must_use]
    pub fn level_label(&self, level: u32) -> String {
        self.level(level)
            .map_or_else(|| format!("Level {level}"), |entry| entry.label.clone())
    }

    #[must_use]
    pub const fn is_final_level(&self, level: u32) -> bool {
        level >= self.levels.maximum
    }

    fn box_meta(&self, kind: TileKind) -> Option<&BoxMeta> {
        let code = kind.code().to_string();
        self.boxes.values().find(|meta| meta.id == code)
    }

    /// Display label for a tile type, falling back to its upper-cased code.
    #[must_use]
    pub fn tile_label(&self, kind: TileKind) -> String {
        self.box_meta(kind).map_or_else(
            || kind.code().to_ascii_uppercase().to_string(),
            |meta| meta.label.clone(),
        )
    }

    #[must_use]
    pub fn tile_icon(&self, kind: TileKind) -> Option<&str> {
        self.box_meta(kind).and_then(|meta| meta.icon.as_deref())
    }
}
