//! Game session: progress, random streams and the per-turn phase machine.
use crate::board::{Board, TileKind};
use crate::campaign::Campaign;
use crate::constants::TURN_LOG_CAPACITY;
use crate::enhance::{
    Enhancement, EnhancementOption, EnhancementRequest, Enhancer, enhance_or_default,
};
use crate::events::EventResolver;
use crate::numbers::u32_to_usize;
use crate::rng::RngBundle;
use crate::snapshot::{Progress, Snapshot};
use crate::stats::{Delta, clamp_stats, initial_stats};
use crate::turn::{
    StepList, StepRecord, TurnContext, TurnLog, TurnReport, advance_if_ready, finalize,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("a turn is already in progress")]
    TurnInProgress,
    #[error("no landing is waiting to be resolved")]
    NoPendingLanding,
    #[error("no choice is waiting for an answer")]
    NoPendingChoice,
    #[error("level {0} has no board")]
    UnknownLevel(u32),
}

/// Where the session is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    Idle,
    Landing,
    AwaitingChoice,
}

#[derive(Debug, Clone, Default)]
enum Pending {
    #[default]
    Idle,
    Landing(Box<TurnContext>),
    AwaitingChoice(Box<TurnContext>),
}

/// Landing handed back by [`GameSession::roll`] while the turn waits for an
/// optional enhancement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingRequest {
    pub position: usize,
    pub tile: TileKind,
    pub request: EnhancementRequest,
}

/// Options shown to the player; the default delta is withheld until answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoice {
    pub tile: TileKind,
    pub title: Option<String>,
    pub story: Option<String>,
    pub options: Vec<EnhancementOption>,
}

impl PendingChoice {
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|opt| opt.label.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollOutcome {
    /// A level-up during movement ended the turn.
    Completed(TurnReport),
    Landed(LandingRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandingOutcome {
    Completed(TurnReport),
    AwaitingChoice(PendingChoice),
}

/// Picks one of the offered options, or none.
pub trait ChoicePolicy {
    fn choose(&mut self, pending: &PendingChoice) -> Option<usize>;
}

impl<F> ChoicePolicy for F
where
    F: FnMut(&PendingChoice) -> Option<usize>,
{
    fn choose(&mut self, pending: &PendingChoice) -> Option<usize> {
        self(pending)
    }
}

/// Always takes the first option.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOption;

impl ChoicePolicy for FirstOption {
    fn choose(&mut self, pending: &PendingChoice) -> Option<usize> {
        (!pending.options.is_empty()).then_some(0)
    }
}

/// Declines every choice, applying nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipChoice;

impl ChoicePolicy for SkipChoice {
    fn choose(&mut self, _pending: &PendingChoice) -> Option<usize> {
        None
    }
}

/// One player's game over a [`Campaign`].
#[derive(Debug, Clone)]
pub struct GameSession {
    campaign: Campaign,
    progress: Progress,
    rngs: RngBundle,
    resolver: EventResolver,
    pending: Pending,
    log: TurnLog,
}

fn fresh_progress(campaign: &Campaign) -> Progress {
    let config = campaign.config();
    let level = campaign.initial_level();
    Progress {
        level,
        stats: clamp_stats(&config.stats, initial_stats(&config.stats)),
        credits: campaign.clamp_credits(level, config.credits.initial),
        position: campaign.start_index(level),
    }
}

impl GameSession {
    /// Start a new game at the initial level.
    #[must_use]
    pub fn new(campaign: Campaign, seed: u64) -> Self {
        let progress = fresh_progress(&campaign);
        Self::with_progress(campaign, progress, seed)
    }

    /// Resume from a stored snapshot, repairing anything out of range.
    ///
    /// An unknown level starts a fresh game; stats, credits and position are
    /// pulled back into their bounds.
    #[must_use]
    pub fn restore(campaign: Campaign, snapshot: Snapshot, seed: u64) -> Self {
        let Some(board) = campaign.board(snapshot.level) else {
            log::warn!(
                "snapshot level {} is not playable; starting a new game",
                snapshot.level
            );
            return Self::new(campaign, seed);
        };
        let progress = Progress {
            level: snapshot.level,
            stats: clamp_stats(&campaign.config().stats, snapshot.stats),
            credits: campaign.clamp_credits(snapshot.level, snapshot.credits),
            position: board.clamp_position(snapshot.position),
        };
        if progress != snapshot {
            log::warn!("snapshot repaired on load: {snapshot:?} -> {progress:?}");
        }
        Self::with_progress(campaign, progress, seed)
    }

    fn with_progress(campaign: Campaign, progress: Progress, seed: u64) -> Self {
        Self {
            campaign,
            progress,
            rngs: RngBundle::from_user_seed(seed),
            resolver: EventResolver::standard(),
            pending: Pending::Idle,
            log: TurnLog::with_capacity(TURN_LOG_CAPACITY),
        }
    }

    /// Replace the tile resolver table.
    #[must_use]
    pub fn with_resolver(mut self, resolver: EventResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Throw away progress and history and start over at the initial level.
    pub fn restart(&mut self) {
        self.progress = fresh_progress(&self.campaign);
        self.pending = Pending::Idle;
        self.log.clear();
    }

    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub const fn snapshot(&self) -> Snapshot {
        self.progress
    }

    #[must_use]
    pub const fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Board of the current level.
    #[must_use]
    pub fn board(&self) -> Option<&Board> {
        self.campaign.board(self.progress.level)
    }

    #[must_use]
    pub const fn log(&self) -> &TurnLog {
        &self.log
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rngs.seed()
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        match self.pending {
            Pending::Idle => TurnPhase::Idle,
            Pending::Landing(_) => TurnPhase::Landing,
            Pending::AwaitingChoice(_) => TurnPhase::AwaitingChoice,
        }
    }

    /// The final level has been reached.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.campaign.config().is_final_level(self.progress.level)
    }

    /// Roll the die and move the token.
    ///
    /// # Errors
    ///
    /// [`EngineError::TurnInProgress`] unless the session is idle.
    pub fn roll(&mut self) -> Result<RollOutcome, EngineError> {
        if !matches!(self.pending, Pending::Idle) {
            return Err(EngineError::TurnInProgress);
        }
        let level = self.progress.level;
        let board = self
            .campaign
            .board(level)
            .ok_or(EngineError::UnknownLevel(level))?;
        let dice = self.campaign.config().dice;
        let roll = self.rngs.dice().gen_range(dice.minimum..=dice.maximum);

        let mut steps = StepList::new();
        for _ in 0..u32_to_usize(roll) {
            let position = board.next_position(self.progress.position);
            self.progress.position = position;
            let Some(tile) = board.tile(position).map(|tile| tile.kind) else {
                break;
            };
            let reset = tile.is_start();
            steps.push(StepRecord {
                position,
                tile,
                reset,
            });
            log::debug!("step to {position} ({tile})");
            if !reset {
                continue;
            }
            let stats = &self.campaign.config().stats;
            self.progress.stats = clamp_stats(stats, initial_stats(stats));
            if let Some(transition) = advance_if_ready(&self.campaign, &mut self.progress) {
                let report = TurnReport {
                    roll,
                    steps,
                    landing: None,
                    title: None,
                    story: None,
                    message: transition.message(),
                    changes: Vec::new(),
                    selected_option: None,
                    transition: Some(transition),
                    progress: self.progress,
                };
                self.log.push(report.clone());
                return Ok(RollOutcome::Completed(report));
            }
        }

        let position = self.progress.position;
        let tile = board
            .tile(position)
            .map_or(TileKind::Neutral, |tile| tile.kind);
        let refs = self.campaign.references();
        let default_outcome = self.resolver.resolve(tile.code(), refs, self.rngs.events());
        let request = EnhancementRequest::new(tile, self.campaign.config().tile_label(tile), refs);
        self.pending = Pending::Landing(Box::new(TurnContext {
            roll,
            steps,
            tile,
            default_outcome,
            title: None,
            story: None,
            options: Vec::new(),
        }));
        Ok(RollOutcome::Landed(LandingRequest {
            position,
            tile,
            request,
        }))
    }

    /// Resolve the pending landing, with or without an enhancement.
    ///
    /// A usable enhancement replaces the default tile outcome. With options the
    /// outcome waits for [`Self::choose`]; a story alone completes the turn
    /// with nothing applied. Without one the default outcome applies.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoPendingLanding`] if no roll is waiting.
    pub fn land(
        &mut self,
        enhancement: Option<Enhancement>,
    ) -> Result<LandingOutcome, EngineError> {
        let mut ctx = match std::mem::take(&mut self.pending) {
            Pending::Landing(ctx) => ctx,
            other => {
                self.pending = other;
                return Err(EngineError::NoPendingLanding);
            }
        };
        if let Some(enhancement) = enhancement.filter(Enhancement::is_usable) {
            ctx.title = enhancement.title;
            ctx.story = enhancement.story;
            if !enhancement.options.is_empty() {
                ctx.options = enhancement.options;
                let pending = PendingChoice {
                    tile: ctx.tile,
                    title: ctx.title.clone(),
                    story: ctx.story.clone(),
                    options: ctx.options.clone(),
                };
                self.pending = Pending::AwaitingChoice(ctx);
                return Ok(LandingOutcome::AwaitingChoice(pending));
            }
            let message = ctx.story.clone().unwrap_or_default();
            return Ok(LandingOutcome::Completed(self.complete(
                *ctx,
                Delta::default(),
                message,
                None,
            )));
        }
        let delta = ctx.default_outcome.delta;
        let message = ctx.default_outcome.message.clone();
        Ok(LandingOutcome::Completed(
            self.complete(*ctx, delta, message, None),
        ))
    }

    /// Answer the pending choice. `None`, an unknown index or an option
    /// without effects applies nothing.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoPendingChoice`] if no choice is waiting.
    pub fn choose(&mut self, index: Option<usize>) -> Result<TurnReport, EngineError> {
        let ctx = match std::mem::take(&mut self.pending) {
            Pending::AwaitingChoice(ctx) => ctx,
            other => {
                self.pending = other;
                return Err(EngineError::NoPendingChoice);
            }
        };
        let selected = index.and_then(|idx| ctx.options.get(idx).map(|opt| (idx, opt)));
        let (delta, message) = selected.map_or_else(
            || (Delta::default(), "You let the moment pass.".to_string()),
            |(_, option)| {
                let delta = option
                    .effects
                    .as_ref()
                    .map(|effects| effects.sample(self.rngs.choices()))
                    .unwrap_or_default();
                (delta, format!("You chose: {}", option.label))
            },
        );
        let selected = selected.map(|(idx, _)| idx);
        Ok(self.complete(*ctx, delta, message, selected))
    }

    fn complete(
        &mut self,
        ctx: TurnContext,
        delta: Delta,
        message: String,
        selected_option: Option<usize>,
    ) -> TurnReport {
        let (changes, transition) = finalize(&self.campaign, &mut self.progress, ctx.tile, delta);
        let message = match &transition {
            Some(transition) => format!("{message} {}", transition.message()),
            None => message,
        };
        let report = TurnReport {
            roll: ctx.roll,
            steps: ctx.steps,
            landing: Some(ctx.tile),
            title: ctx.title,
            story: ctx.story,
            message,
            changes,
            selected_option,
            transition,
            progress: self.progress,
        };
        self.log.push(report.clone());
        report
    }

    /// Play a whole turn: roll, ask the enhancer, land and answer any choice.
    ///
    /// # Errors
    ///
    /// [`EngineError::TurnInProgress`] if a turn is already in flight.
    pub fn play_turn(
        &mut self,
        enhancer: &dyn Enhancer,
        policy: &mut dyn ChoicePolicy,
    ) -> Result<TurnReport, EngineError> {
        match self.roll()? {
            RollOutcome::Completed(report) => Ok(report),
            RollOutcome::Landed(landing) => {
                let enhancement = enhance_or_default(enhancer, &landing.request);
                self.resolve_landing(enhancement, policy)
            }
        }
    }

    /// Like [`Self::play_turn`], waiting at most `timeout` for the enhancer.
    ///
    /// # Errors
    ///
    /// [`EngineError::TurnInProgress`] if a turn is already in flight.
    #[cfg(feature = "async")]
    pub async fn play_turn_async<E: crate::enhance::AsyncEnhancer>(
        &mut self,
        enhancer: &E,
        timeout: std::time::Duration,
        policy: &mut dyn ChoicePolicy,
    ) -> Result<TurnReport, EngineError> {
        match self.roll()? {
            RollOutcome::Completed(report) => Ok(report),
            RollOutcome::Landed(landing) => {
                let enhancement =
                    crate::enhance::enhance_with_timeout(enhancer, &landing.request, timeout)
                        .await;
                self.resolve_landing(enhancement, policy)
            }
        }
    }

    fn resolve_landing(
        &mut self,
        enhancement: Option<Enhancement>,
        policy: &mut dyn ChoicePolicy,
    ) -> Result<TurnReport, EngineError> {
        match self.land(enhancement)? {
            LandingOutcome::Completed(report) => Ok(report),
            LandingOutcome::AwaitingChoice(pending) => {
                let index = policy.choose(&pending);
                self.choose(index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::data::ReferenceLists;
    use crate::enhance::{EffectRange, NoEnhancement, OptionEffects};
    use crate::stats::{Quantity, StatSet};

    const CONFIG: &str = r#"{
        "stats": {
            "intelligence": {"initial": 10, "minimum": 0, "maximum": 100},
            "energy": {"initial": 50, "minimum": 0, "maximum": 100},
            "luck": {"initial": 0},
            "money": {"initial": 100}
        },
        "levels": {
            "initial": 1,
            "maximum": 2,
            "1": {"label": "Year 1", "board": "sccc", "credits_to_advance": 6},
            "2": {"label": "Graduation", "board": "snnn"}
        },
        "dice": {"minimum": 1, "maximum": 1}
    }"#;

    fn campaign() -> Campaign {
        Campaign::new(
            GameConfig::from_json(CONFIG).unwrap(),
            ReferenceLists::empty(),
        )
        .unwrap()
    }

    fn option_enhancement() -> Enhancement {
        Enhancement {
            title: Some("Pop quiz".to_string()),
            story: Some("The professor smiles.".to_string()),
            options: vec![
                EnhancementOption {
                    label: "Study".to_string(),
                    effects: Some(
                        OptionEffects::default()
                            .with(Quantity::Intelligence, EffectRange::new(5, 5))
                            .with(Quantity::Credits, EffectRange::new(2, 2)),
                    ),
                },
                EnhancementOption {
                    label: "Shrug".to_string(),
                    effects: None,
                },
            ],
        }
    }

    #[test]
    fn default_turn_moves_one_tile_and_resolves_class() {
        let mut session = GameSession::new(campaign(), 1);
        let report = session.play_turn(&NoEnhancement, &mut FirstOption).unwrap();
        assert_eq!(report.roll, 1);
        assert_eq!(report.landing, Some(TileKind::Class));
        assert_eq!(session.progress().position, 1);
        assert!((1..=3).contains(&session.progress().credits));
        assert_eq!(session.phase(), TurnPhase::Idle);
        assert_eq!(session.log().len(), 1);
    }

    #[test]
    fn phases_reject_out_of_order_calls() {
        let mut session = GameSession::new(campaign(), 2);
        assert_eq!(session.land(None), Err(EngineError::NoPendingLanding));
        assert_eq!(session.choose(Some(0)), Err(EngineError::NoPendingChoice));
        assert!(matches!(session.roll(), Ok(RollOutcome::Landed(_))));
        assert_eq!(session.phase(), TurnPhase::Landing);
        assert_eq!(session.roll(), Err(EngineError::TurnInProgress));
        assert_eq!(session.choose(None), Err(EngineError::NoPendingChoice));
        assert_eq!(session.phase(), TurnPhase::Landing);
        assert!(matches!(
            session.land(Some(option_enhancement())),
            Ok(LandingOutcome::AwaitingChoice(_))
        ));
        assert_eq!(session.roll(), Err(EngineError::TurnInProgress));
        assert_eq!(session.land(None), Err(EngineError::NoPendingLanding));
        assert!(session.choose(Some(0)).is_ok());
        assert_eq!(session.phase(), TurnPhase::Idle);
    }

    #[test]
    fn chosen_option_replaces_default_delta() {
        let mut session = GameSession::new(campaign(), 3);
        session.roll().unwrap();
        let LandingOutcome::AwaitingChoice(pending) =
            session.land(Some(option_enhancement())).unwrap()
        else {
            panic!("expected a choice");
        };
        assert_eq!(pending.labels(), vec!["Study", "Shrug"]);
        let report = session.choose(Some(0)).unwrap();
        assert_eq!(report.change(Quantity::Intelligence), 5);
        assert_eq!(report.change(Quantity::Energy), 0);
        assert_eq!(report.change(Quantity::Credits), 2);
        assert_eq!(report.selected_option, Some(0));
        assert_eq!(report.title.as_deref(), Some("Pop quiz"));
        assert_eq!(report.message, "You chose: Study");
    }

    #[test]
    fn skipping_or_empty_option_applies_nothing() {
        for index in [None, Some(1), Some(7)] {
            let mut session = GameSession::new(campaign(), 4);
            let before = *session.progress();
            session.roll().unwrap();
            session.land(Some(option_enhancement())).unwrap();
            let report = session.choose(index).unwrap();
            assert!(report.changes.is_empty());
            assert_eq!(session.progress().stats, before.stats);
            assert_eq!(session.progress().credits, before.credits);
            assert_eq!(report.selected_option, index.filter(|idx| *idx < 2));
        }
    }

    #[test]
    fn story_only_enhancement_replaces_default_outcome() {
        let mut session = GameSession::new(campaign(), 5);
        let before = *session.progress();
        session.roll().unwrap();
        let flavor = Enhancement {
            title: Some("Slide deck".to_string()),
            story: Some("Slides everywhere.".to_string()),
            ..Enhancement::default()
        };
        let LandingOutcome::Completed(report) = session.land(Some(flavor)).unwrap() else {
            panic!("story-only enhancement should complete the turn");
        };
        assert_eq!(report.story.as_deref(), Some("Slides everywhere."));
        assert_eq!(report.message, "Slides everywhere.");
        assert!(report.changes.is_empty());
        assert_eq!(session.progress().stats, before.stats);
        assert_eq!(session.progress().credits, before.credits);
        assert_eq!(session.phase(), TurnPhase::Idle);
    }

    #[test]
    fn title_only_enhancement_falls_back_to_default_outcome() {
        let mut session = GameSession::new(campaign(), 5);
        session.roll().unwrap();
        let bare = Enhancement {
            title: Some("Just a heading".to_string()),
            ..Enhancement::default()
        };
        let LandingOutcome::Completed(report) = session.land(Some(bare)).unwrap() else {
            panic!("title-only enhancement should complete the turn");
        };
        assert!(report.title.is_none());
        assert!(report.change(Quantity::Credits) >= 1);
    }

    #[test]
    fn inverted_option_range_is_sampled_not_rejected() {
        let enhancement: Enhancement = serde_json::from_str(
            r#"{"options": [{"label": "x", "effects": {"energy": {"min": 5, "max": 1}}}]}"#,
        )
        .unwrap();
        let mut session = GameSession::new(campaign(), 9);
        let before = session.progress().stats.energy;
        session.roll().unwrap();
        assert!(matches!(
            session.land(Some(enhancement)),
            Ok(LandingOutcome::AwaitingChoice(_))
        ));
        let report = session.choose(Some(0)).unwrap();
        assert!((1..=5).contains(&report.change(Quantity::Energy)));
        assert_eq!(session.progress().stats.energy, before + report.change(Quantity::Energy));
        assert_eq!(session.phase(), TurnPhase::Idle);
    }

    fn campaign_with(board: &str, dice: (u32, u32)) -> Campaign {
        let json = CONFIG
            .replace(r#""board": "sccc""#, &format!(r#""board": "{board}""#))
            .replace(
                r#""dice": {"minimum": 1, "maximum": 1}"#,
                &format!(r#""dice": {{"minimum": {}, "maximum": {}}}"#, dice.0, dice.1),
            );
        Campaign::new(GameConfig::from_json(&json).unwrap(), ReferenceLists::empty()).unwrap()
    }

    #[test]
    fn zero_roll_resolves_the_current_tile() {
        let mut session = GameSession::new(campaign_with("sccc", (0, 0)), 13);
        let report = session.play_turn(&NoEnhancement, &mut FirstOption).unwrap();
        assert_eq!(report.roll, 0);
        assert!(report.steps.is_empty());
        assert_eq!(report.landing, Some(TileKind::Start));
        assert_eq!(session.progress().position, 0);
        assert!(report.changes.is_empty());
    }

    #[test]
    fn passing_start_mid_roll_resets_before_landing_delta() {
        let snapshot = Snapshot {
            level: 1,
            stats: StatSet {
                intelligence: 90,
                energy: 5,
                luck: 7,
                money: 10,
            },
            credits: 0,
            position: 2,
        };
        let mut session = GameSession::restore(campaign_with("scnn", (3, 3)), snapshot, 14);
        let report = session.play_turn(&NoEnhancement, &mut FirstOption).unwrap();
        let steps: Vec<(usize, bool)> = report
            .steps
            .iter()
            .map(|step| (step.position, step.reset))
            .collect();
        assert_eq!(steps, vec![(3, false), (0, true), (1, false)]);
        assert_eq!(report.landing, Some(TileKind::Class));
        let stats = session.progress().stats;
        assert!((11..=14).contains(&stats.intelligence));
        assert!((45..=49).contains(&stats.energy));
        assert_eq!(stats.luck, 0);
        assert_eq!(stats.money, 100);
        assert!((1..=3).contains(&session.progress().credits));
    }

    #[test]
    fn passing_start_with_enough_credits_levels_up() {
        let campaign = campaign();
        let snapshot = Snapshot {
            level: 1,
            stats: StatSet {
                intelligence: 90,
                energy: 5,
                luck: 0,
                money: 10,
            },
            credits: 6,
            position: 3,
        };
        let mut session = GameSession::restore(campaign, snapshot, 6);
        let report = session.play_turn(&NoEnhancement, &mut SkipChoice).unwrap();
        let transition = report.transition.unwrap();
        assert_eq!((transition.from, transition.to), (1, 2));
        assert!(transition.completed);
        assert!(report.landing.is_none());
        assert!(report.steps[0].reset);
        assert_eq!(session.progress().level, 2);
        assert_eq!(session.progress().stats.intelligence, 10);
        assert_eq!(session.progress().credits, 6);
        assert!(session.is_completed());
    }

    #[test]
    fn passing_start_short_of_threshold_only_resets_stats() {
        let snapshot = Snapshot {
            level: 1,
            stats: StatSet {
                intelligence: 90,
                energy: 5,
                luck: 0,
                money: 10,
            },
            credits: 2,
            position: 3,
        };
        let mut session = GameSession::restore(campaign(), snapshot, 7);
        let report = session.play_turn(&NoEnhancement, &mut SkipChoice).unwrap();
        assert_eq!(report.landing, Some(TileKind::Start));
        assert!(report.transition.is_none());
        assert_eq!(session.progress().level, 1);
        assert_eq!(session.progress().stats.intelligence, 10);
        assert_eq!(session.progress().stats.money, 100);
    }

    #[test]
    fn restore_repairs_out_of_range_snapshots() {
        let snapshot = Snapshot {
            level: 1,
            stats: StatSet {
                intelligence: 500,
                energy: -3,
                luck: 5000,
                money: -1,
            },
            credits: 99,
            position: 42,
        };
        let session = GameSession::restore(campaign(), snapshot, 8);
        let progress = session.progress();
        assert_eq!(progress.stats.intelligence, 100);
        assert_eq!(progress.stats.energy, 0);
        assert_eq!(progress.stats.luck, 1000);
        assert_eq!(progress.stats.money, 0);
        assert_eq!(progress.credits, 6);
        assert_eq!(progress.position, 3);

        let unknown = Snapshot {
            level: 9,
            ..snapshot
        };
        let fresh = GameSession::restore(campaign(), unknown, 8);
        assert_eq!(fresh.progress(), &fresh_progress(fresh.campaign()));
    }

    #[test]
    fn same_seed_replays_identically() {
        let play = |seed| {
            let mut session = GameSession::new(campaign(), seed);
            (0..10)
                .map(|_| session.play_turn(&NoEnhancement, &mut FirstOption).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(play(11), play(11));
    }

    #[test]
    fn restart_returns_to_initial_state() {
        let mut session = GameSession::new(campaign(), 12);
        session.play_turn(&NoEnhancement, &mut FirstOption).unwrap();
        session.restart();
        assert_eq!(session.progress(), &fresh_progress(session.campaign()));
        assert!(session.log().is_empty());
    }
}
