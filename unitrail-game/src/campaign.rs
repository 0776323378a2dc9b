use crate::board::{Board, parse_board};
use crate::config::{ConfigError, GameConfig};
use crate::data::ReferenceLists;
use std::collections::BTreeMap;

/// Validated configuration plus one parsed board per playable level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    config: GameConfig,
    refs: ReferenceLists,
    boards: BTreeMap<u32, Board>,
}

impl Campaign {
    /// Validate the configuration and parse every level's board up front.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if validation fails or any board cannot be parsed.
    pub fn new(config: GameConfig, refs: ReferenceLists) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut boards = BTreeMap::new();
        for level in config.levels.initial..=config.levels.maximum {
            let entry = config.level(level).ok_or(ConfigError::MissingLevel(level))?;
            let board = parse_board(&entry.board)
                .map_err(|source| ConfigError::Board { level, source })?;
            log::debug!("level {level}: {} landable tiles", board.len());
            boards.insert(level, board);
        }
        Ok(Self {
            config,
            refs: refs.normalized(),
            boards,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn references(&self) -> &ReferenceLists {
        &self.refs
    }

    #[must_use]
    pub fn board(&self, level: u32) -> Option<&Board> {
        self.boards.get(&level)
    }

    #[must_use]
    pub const fn initial_level(&self) -> u32 {
        self.config.levels.initial
    }

    #[must_use]
    pub const fn max_level(&self) -> u32 {
        self.config.levels.maximum
    }

    /// Whether `level` is defined and playable.
    #[must_use]
    pub fn has_level(&self, level: u32) -> bool {
        self.boards.contains_key(&level)
    }

    /// Start index of a level's board; zero if the level is unknown.
    #[must_use]
    pub fn start_index(&self, level: u32) -> usize {
        self.board(level).map_or(0, Board::start_index)
    }

    /// Inclusive credit bounds for a level: `[0, threshold]` below the
    /// maximum level, `[0, credits.maximum]` at it.
    #[must_use]
    pub fn credit_bounds(&self, level: u32) -> (i32, i32) {
        let upper = self
            .config
            .threshold(level)
            .unwrap_or(self.config.credits.maximum);
        (0, upper.max(0))
    }

    #[must_use]
    pub fn clamp_credits(&self, level: u32, credits: i32) -> i32 {
        let (lower, upper) = self.credit_bounds(level);
        credits.min(upper).max(lower)
    }
}
