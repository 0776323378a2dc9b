//! Player attributes, their bounds and clamping rules.
use crate::constants::{LUCK_CEILING, MONEY_FLOOR};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four tracked player attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Intelligence,
    Energy,
    Luck,
    Money,
}

impl StatKind {
    pub const ALL: [Self; 4] = [Self::Intelligence, Self::Energy, Self::Luck, Self::Money];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intelligence => "intelligence",
            Self::Energy => "energy",
            Self::Luck => "luck",
            Self::Money => "money",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any quantity a turn can change: the four stats plus credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Intelligence,
    Energy,
    Luck,
    Money,
    Credits,
}

impl Quantity {
    pub const ALL: [Self; 5] = [
        Self::Intelligence,
        Self::Energy,
        Self::Luck,
        Self::Money,
        Self::Credits,
    ];

    #[must_use]
    pub const fn stat(self) -> Option<StatKind> {
        match self {
            Self::Intelligence => Some(StatKind::Intelligence),
            Self::Energy => Some(StatKind::Energy),
            Self::Luck => Some(StatKind::Luck),
            Self::Money => Some(StatKind::Money),
            Self::Credits => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self.stat() {
            Some(stat) => stat.as_str(),
            None => "credits",
        }
    }
}

impl From<StatKind> for Quantity {
    fn from(value: StatKind) -> Self {
        match value {
            StatKind::Intelligence => Self::Intelligence,
            StatKind::Energy => Self::Energy,
            StatKind::Luck => Self::Luck,
            StatKind::Money => Self::Money,
        }
    }
}

/// Configured initial value and optional bounds for one stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatConfig {
    #[serde(default)]
    pub label: Option<String>,
    pub initial: i32,
    #[serde(default)]
    pub minimum: Option<i32>,
    #[serde(default)]
    pub maximum: Option<i32>,
}

impl StatConfig {
    #[must_use]
    pub const fn new(initial: i32, minimum: Option<i32>, maximum: Option<i32>) -> Self {
        Self {
            label: None,
            initial,
            minimum,
            maximum,
        }
    }
}

/// Per-stat configuration block; every stat is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    pub intelligence: StatConfig,
    pub energy: StatConfig,
    pub luck: StatConfig,
    pub money: StatConfig,
}

impl StatsConfig {
    #[must_use]
    pub const fn get(&self, stat: StatKind) -> &StatConfig {
        match stat {
            StatKind::Intelligence => &self.intelligence,
            StatKind::Energy => &self.energy,
            StatKind::Luck => &self.luck,
            StatKind::Money => &self.money,
        }
    }

    /// Effective bounds after the fixed luck/money overrides.
    #[must_use]
    pub fn bounds(&self, stat: StatKind) -> (i32, i32) {
        let cfg = self.get(stat);
        let lower = cfg.minimum.unwrap_or(i32::MIN);
        let upper = cfg.maximum.unwrap_or(i32::MAX);
        match stat {
            StatKind::Luck => (lower, LUCK_CEILING),
            StatKind::Money => (MONEY_FLOOR, upper),
            StatKind::Intelligence | StatKind::Energy => (lower, upper),
        }
    }

    /// Display label, falling back to the stat name.
    #[must_use]
    pub fn label(&self, stat: StatKind) -> &str {
        self.get(stat).label.as_deref().unwrap_or(stat.as_str())
    }
}

/// Additive change to stats and credits produced by one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Delta {
    #[serde(default)]
    pub intelligence: i32,
    #[serde(default)]
    pub energy: i32,
    #[serde(default)]
    pub luck: i32,
    #[serde(default)]
    pub money: i32,
    #[serde(default)]
    pub credits: i32,
}

impl Delta {
    #[must_use]
    pub const fn get(&self, quantity: Quantity) -> i32 {
        match quantity {
            Quantity::Intelligence => self.intelligence,
            Quantity::Energy => self.energy,
            Quantity::Luck => self.luck,
            Quantity::Money => self.money,
            Quantity::Credits => self.credits,
        }
    }

    pub const fn set(&mut self, quantity: Quantity, value: i32) {
        match quantity {
            Quantity::Intelligence => self.intelligence = value,
            Quantity::Energy => self.energy = value,
            Quantity::Luck => self.luck = value,
            Quantity::Money => self.money = value,
            Quantity::Credits => self.credits = value,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Current value of every stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatSet {
    pub intelligence: i32,
    pub energy: i32,
    pub luck: i32,
    pub money: i32,
}

impl StatSet {
    #[must_use]
    pub const fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::Intelligence => self.intelligence,
            StatKind::Energy => self.energy,
            StatKind::Luck => self.luck,
            StatKind::Money => self.money,
        }
    }

    pub const fn set(&mut self, stat: StatKind, value: i32) {
        match stat {
            StatKind::Intelligence => self.intelligence = value,
            StatKind::Energy => self.energy = value,
            StatKind::Luck => self.luck = value,
            StatKind::Money => self.money = value,
        }
    }

    /// Add a delta without clamping; credits are ignored.
    #[must_use]
    pub fn apply(self, delta: &Delta) -> Self {
        Self {
            intelligence: self.intelligence.saturating_add(delta.intelligence),
            energy: self.energy.saturating_add(delta.energy),
            luck: self.luck.saturating_add(delta.luck),
            money: self.money.saturating_add(delta.money),
        }
    }
}

/// Read each stat's configured initial value.
#[must_use]
pub fn initial_stats(config: &StatsConfig) -> StatSet {
    StatSet {
        intelligence: config.intelligence.initial,
        energy: config.energy.initial,
        luck: config.luck.initial,
        money: config.money.initial,
    }
}

/// Clamp every stat into its effective bounds.
///
/// Luck never exceeds [`LUCK_CEILING`] and money never drops below
/// [`MONEY_FLOOR`], whatever the configuration says. With inverted bounds the
/// lower bound wins.
#[must_use]
pub fn clamp_stats(config: &StatsConfig, values: StatSet) -> StatSet {
    let mut clamped = values;
    for stat in StatKind::ALL {
        let (lower, upper) = config.bounds(stat);
        clamped.set(stat, values.get(stat).min(upper).max(lower));
    }
    clamped
}
