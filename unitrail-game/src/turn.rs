//! Turn records and the shared finalize step.
use crate::board::TileKind;
use crate::campaign::Campaign;
use crate::enhance::EnhancementOption;
use crate::events::EventOutcome;
use crate::snapshot::Progress;
use crate::stats::{Delta, Quantity, StatKind, clamp_stats};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// One tile entered while moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub position: usize,
    pub tile: TileKind,
    /// Stats were reset to their initial values on this step.
    pub reset: bool,
}

pub type StepList = SmallVec<[StepRecord; 8]>;

/// A level-up performed during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTransition {
    pub from: u32,
    pub to: u32,
    pub label: String,
    /// The new level is the final one.
    pub completed: bool,
    pub start_position: usize,
}

impl LevelTransition {
    #[must_use]
    pub fn message(&self) -> String {
        if self.completed {
            format!("You graduated! Welcome to {}.", self.label)
        } else {
            format!("You advanced to {}.", self.label)
        }
    }
}

/// Effective change of one quantity after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChange {
    pub quantity: Quantity,
    pub amount: i32,
}

/// Everything that happened during one completed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub roll: u32,
    pub steps: StepList,
    /// Tile the turn resolved on; `None` when a level-up ended movement.
    pub landing: Option<TileKind>,
    pub title: Option<String>,
    pub story: Option<String>,
    pub message: String,
    pub changes: Vec<StatChange>,
    pub selected_option: Option<usize>,
    pub transition: Option<LevelTransition>,
    pub progress: Progress,
}

impl TurnReport {
    #[must_use]
    pub fn change(&self, quantity: Quantity) -> i32 {
        self.changes
            .iter()
            .find(|change| change.quantity == quantity)
            .map_or(0, |change| change.amount)
    }
}

/// State scoped to the turn in flight; dropped once the turn completes.
#[derive(Debug, Clone)]
pub(crate) struct TurnContext {
    pub roll: u32,
    pub steps: StepList,
    pub tile: TileKind,
    pub default_outcome: EventOutcome,
    pub title: Option<String>,
    pub story: Option<String>,
    pub options: Vec<EnhancementOption>,
}

/// Newest-first journal of completed turns with a fixed capacity.
#[derive(Debug, Clone)]
pub struct TurnLog {
    entries: VecDeque<TurnReport>,
    capacity: usize,
}

impl TurnLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, report: TurnReport) {
        self.entries.push_front(report);
        self.entries.truncate(self.capacity);
    }

    #[must_use]
    pub fn latest(&self) -> Option<&TurnReport> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TurnReport> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Level up if the current level's threshold is met.
///
/// Credits carry over, clamped to the new level's bounds; the token moves to
/// the new board's start tile.
pub(crate) fn advance_if_ready(
    campaign: &Campaign,
    progress: &mut Progress,
) -> Option<LevelTransition> {
    let threshold = campaign.config().threshold(progress.level)?;
    let next = progress.level.checked_add(1)?;
    if progress.credits < threshold || !campaign.has_level(next) {
        return None;
    }
    let from = progress.level;
    progress.level = next;
    progress.position = campaign.start_index(next);
    progress.credits = campaign.clamp_credits(next, progress.credits);
    let transition = LevelTransition {
        from,
        to: next,
        label: campaign.config().level_label(next),
        completed: campaign.config().is_final_level(next),
        start_position: progress.position,
    };
    log::info!(
        "level {from} -> {next} ({}) with {} credits",
        transition.label,
        progress.credits
    );
    Some(transition)
}

/// Apply a landing delta and report the effective changes.
///
/// Credits only move on class tiles. Stats and credits are clamped before the
/// level threshold is checked.
pub(crate) fn finalize(
    campaign: &Campaign,
    progress: &mut Progress,
    tile: TileKind,
    mut delta: Delta,
) -> (Vec<StatChange>, Option<LevelTransition>) {
    if !tile.earns_credits() {
        delta.credits = 0;
    }
    let before = *progress;
    progress.stats = clamp_stats(&campaign.config().stats, before.stats.apply(&delta));
    progress.credits =
        campaign.clamp_credits(before.level, before.credits.saturating_add(delta.credits));

    let mut changes: Vec<StatChange> = StatKind::ALL
        .iter()
        .map(|stat| StatChange {
            quantity: Quantity::from(*stat),
            amount: progress.stats.get(*stat) - before.stats.get(*stat),
        })
        .collect();
    changes.push(StatChange {
        quantity: Quantity::Credits,
        amount: progress.credits - before.credits,
    });
    changes.retain(|change| change.amount != 0);

    let transition = advance_if_ready(campaign, progress);
    (changes, transition)
}
