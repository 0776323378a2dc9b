//! Tile event resolution.
//!
//! Each tile type maps to a resolver function in a lookup table; adding a
//! tile behavior means registering another entry, call sites stay untouched.
use crate::board::TileKind;
use crate::constants::{FALLBACK_CLASS, FALLBACK_FOOD, FALLBACK_HANGOUT};
use crate::data::ReferenceLists;
use crate::stats::Delta;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Randomized delta plus a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventOutcome {
    pub delta: Delta,
    pub message: String,
}

impl EventOutcome {
    fn message(message: impl Into<String>) -> Self {
        Self {
            delta: Delta::default(),
            message: message.into(),
        }
    }
}

pub type ResolverFn = fn(&mut dyn RngCore, &ReferenceLists) -> EventOutcome;

/// Tile type → resolution function table.
#[derive(Debug, Clone)]
pub struct EventResolver {
    table: HashMap<TileKind, ResolverFn>,
}

impl Default for EventResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl EventResolver {
    /// Resolver with the stock behavior for every tile type.
    #[must_use]
    pub fn standard() -> Self {
        let mut resolver = Self {
            table: HashMap::new(),
        };
        resolver
            .register(TileKind::Start, resolve_start)
            .register(TileKind::Class, resolve_class)
            .register(TileKind::RandomEvent, resolve_random)
            .register(TileKind::Food, resolve_food)
            .register(TileKind::Hangout, resolve_hangout)
            .register(TileKind::Neutral, resolve_neutral)
            .register(TileKind::Special, resolve_special);
        resolver
    }

    /// Add or replace the resolver for a tile type.
    pub fn register(&mut self, kind: TileKind, resolver: ResolverFn) -> &mut Self {
        self.table.insert(kind, resolver);
        self
    }

    /// Resolve a tile by its character code; unknown codes yield no delta.
    pub fn resolve(
        &self,
        code: char,
        refs: &ReferenceLists,
        rng: &mut dyn RngCore,
    ) -> EventOutcome {
        TileKind::from_code(code)
            .and_then(|kind| self.table.get(&kind))
            .map_or_else(
                || EventOutcome::message("Unknown tile."),
                |resolver| resolver(rng, refs),
            )
    }
}

/// Resolve a tile code with the standard table.
pub fn compute_event_outcome<R: RngCore>(
    code: char,
    refs: &ReferenceLists,
    rng: &mut R,
) -> EventOutcome {
    EventResolver::standard().resolve(code, refs, rng)
}

fn pick<'a>(rng: &mut dyn RngCore, list: &'a [String], fallback: &'a str) -> &'a str {
    list.choose(rng).map_or(fallback, String::as_str)
}

fn resolve_start(_rng: &mut dyn RngCore, _refs: &ReferenceLists) -> EventOutcome {
    EventOutcome::message("Back at the start! Stats reset.")
}

fn resolve_class(rng: &mut dyn RngCore, refs: &ReferenceLists) -> EventOutcome {
    let delta = Delta {
        credits: rng.gen_range(1..=3),
        energy: -rng.gen_range(1..=5),
        intelligence: rng.gen_range(1..=4),
        ..Delta::default()
    };
    let class = pick(rng, &refs.classes, FALLBACK_CLASS);
    EventOutcome {
        message: format!("You attended {class}. +{} credits.", delta.credits),
        delta,
    }
}

fn resolve_random(rng: &mut dyn RngCore, _refs: &ReferenceLists) -> EventOutcome {
    EventOutcome {
        delta: Delta {
            energy: rng.gen_range(-5..=5),
            intelligence: rng.gen_range(-3..=3),
            luck: rng.gen_range(-5..=5),
            money: rng.gen_range(-50..=50),
            credits: 0,
        },
        message: "Surprise event!".to_string(),
    }
}

fn resolve_food(rng: &mut dyn RngCore, refs: &ReferenceLists) -> EventOutcome {
    let place = pick(rng, &refs.foods, FALLBACK_FOOD);
    EventOutcome {
        message: format!("You ate at {place}."),
        delta: Delta {
            energy: rng.gen_range(3..=8),
            money: -rng.gen_range(15..=50),
            ..Delta::default()
        },
    }
}

fn resolve_hangout(rng: &mut dyn RngCore, refs: &ReferenceLists) -> EventOutcome {
    let activity = pick(rng, &refs.hangouts, FALLBACK_HANGOUT);
    EventOutcome {
        message: format!("Free time: {activity}."),
        delta: Delta {
            energy: rng.gen_range(2..=6),
            intelligence: rng.gen_range(-2..=2),
            money: -rng.gen_range(0..=40),
            ..Delta::default()
        },
    }
}

fn resolve_neutral(_rng: &mut dyn RngCore, _refs: &ReferenceLists) -> EventOutcome {
    EventOutcome::message("Nothing notable happened.")
}

fn resolve_special(rng: &mut dyn RngCore, _refs: &ReferenceLists) -> EventOutcome {
    EventOutcome {
        delta: Delta {
            luck: rng.gen_range(1..=4),
            ..Delta::default()
        },
        message: "Career fair: the sponsors are waiting for you :)".to_string(),
    }
}
