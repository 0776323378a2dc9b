//! Centralized tuning constants for the Unitrail engine.
//!
//! Values that must not drift through configuration assets live here so they
//! can only change through reviewed code.

// Stat overrides -----------------------------------------------------------
/// Upper bound applied to luck regardless of configuration.
pub const LUCK_CEILING: i32 = 1_000;
/// Lower bound applied to money regardless of configuration.
pub const MONEY_FLOOR: i32 = 0;

// Credits ------------------------------------------------------------------
/// Credits cap used at the final level when the configuration omits one.
pub const DEFAULT_CREDITS_CAP: i32 = 999;

// Dice ---------------------------------------------------------------------
pub const DEFAULT_DICE_MIN: u32 = 1;
pub const DEFAULT_DICE_MAX: u32 = 6;
/// Largest configurable dice face; every step of a roll is recorded.
pub const DICE_CEILING: u32 = 1_000;

// Board parsing ------------------------------------------------------------
/// The ASCII walk gives up after `area * ASCII_WALK_GUARD_FACTOR` steps.
pub(crate) const ASCII_WALK_GUARD_FACTOR: usize = 4;

// Enhancement --------------------------------------------------------------
/// Options beyond this count are ignored.
pub const MAX_ENHANCEMENT_OPTIONS: usize = 3;
/// Reference lists are cut to this many entries before leaving the engine.
pub const REFERENCE_EXCERPT_LEN: usize = 20;

// Persistence --------------------------------------------------------------
/// Key under which the single progress snapshot is stored.
pub const SNAPSHOT_KEY: &str = "unitrail_game_state";

// Journal ------------------------------------------------------------------
pub const TURN_LOG_CAPACITY: usize = 200;

// Event fallbacks ----------------------------------------------------------
pub(crate) const FALLBACK_CLASS: &str = "a lecture";
pub(crate) const FALLBACK_FOOD: &str = "the cafeteria";
pub(crate) const FALLBACK_HANGOUT: &str = "the park";
