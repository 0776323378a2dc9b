//! Unitrail Game Engine
//!
//! Platform-agnostic core of the Unitrail student-life board game: board
//! parsing, stat bounds, tile events, turn resolution and progress snapshots.
//! Rendering, file I/O and the narrative text service live outside this crate.

pub mod board;
pub mod campaign;
pub mod config;
pub mod constants;
pub mod data;
pub mod enhance;
pub mod events;
pub mod numbers;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod turn;

// Re-export commonly used types
pub use board::{Board, BoardError, BoardLayout, BoardSides, Tile, TileKind, parse_board};
pub use campaign::Campaign;
pub use config::{
    BoxMeta, ConfigError, CreditsConfig, DiceConfig, GameConfig, LevelConfig, LevelsConfig,
};
pub use data::ReferenceLists;
#[cfg(feature = "async")]
pub use enhance::{AsyncEnhancer, enhance_with_timeout};
pub use enhance::{
    EffectRange, Enhancement, EnhancementError, EnhancementOption, EnhancementRequest, Enhancer,
    NoEnhancement, OptionEffects, TextEnhancer, TextGenerator, enhance_or_default,
    parse_enhancement,
};
pub use events::{EventOutcome, EventResolver, ResolverFn, compute_event_outcome};
pub use rng::{CountingRng, RngBundle};
pub use session::{
    ChoicePolicy, EngineError, FirstOption, GameSession, LandingOutcome, LandingRequest,
    PendingChoice, RollOutcome, SkipChoice, TurnPhase,
};
pub use snapshot::{MemoryStorage, Progress, Snapshot, SnapshotStorage};
pub use stats::{
    Delta, Quantity, StatConfig, StatKind, StatSet, StatsConfig, clamp_stats, initial_stats,
};
pub use turn::{LevelTransition, StatChange, StepList, StepRecord, TurnLog, TurnReport};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the game configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self) -> Result<GameConfig, Self::Error>;

    /// Load the flavor reference lists
    ///
    /// # Errors
    ///
    /// Returns an error if the reference lists cannot be loaded.
    fn load_references(&self) -> Result<ReferenceLists, Self::Error>;
}

/// Main game engine binding data loading and snapshot persistence
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: SnapshotStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: SnapshotStorage,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load configuration and references and build the campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the configuration is invalid.
    pub fn load_campaign(&self) -> Result<Campaign, anyhow::Error> {
        let config = self.data_loader.load_config()?;
        let refs = self.data_loader.load_references()?;
        Ok(Campaign::new(config, refs)?)
    }

    /// Start a fresh game, replacing any stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the campaign cannot be built or the snapshot saved.
    pub fn create_session(&self, seed: u64) -> Result<GameSession, anyhow::Error> {
        let session = GameSession::new(self.load_campaign()?, seed);
        self.save(&session)?;
        Ok(session)
    }

    /// Resume the stored game, or start a new one if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the campaign cannot be built or storage fails.
    pub fn load_session(&self, seed: u64) -> Result<GameSession, anyhow::Error> {
        let campaign = self.load_campaign()?;
        match self.storage.load_snapshot()? {
            Some(snapshot) => Ok(GameSession::restore(campaign, snapshot, seed)),
            None => {
                let session = GameSession::new(campaign, seed);
                self.save(&session)?;
                Ok(session)
            }
        }
    }

    /// Persist the session's progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn save(&self, session: &GameSession) -> Result<(), S::Error> {
        self.storage.save_snapshot(&session.snapshot())
    }

    /// Play one full turn and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a turn is already in flight or saving fails.
    pub fn play_turn(
        &self,
        session: &mut GameSession,
        enhancer: &dyn Enhancer,
        policy: &mut dyn ChoicePolicy,
    ) -> Result<TurnReport, anyhow::Error> {
        let report = session.play_turn(enhancer, policy)?;
        self.save(session)?;
        Ok(report)
    }

    /// Like [`Self::play_turn`], waiting at most `timeout` for the enhancer.
    ///
    /// # Errors
    ///
    /// Returns an error if a turn is already in flight or saving fails.
    #[cfg(feature = "async")]
    pub async fn play_turn_async<E: AsyncEnhancer>(
        &self,
        session: &mut GameSession,
        enhancer: &E,
        timeout: std::time::Duration,
        policy: &mut dyn ChoicePolicy,
    ) -> Result<TurnReport, anyhow::Error> {
        let report = session.play_turn_async(enhancer, timeout, policy).await?;
        self.save(session)?;
        Ok(report)
    }

    /// Roll and move; saves when a level-up during movement ends the turn.
    ///
    /// # Errors
    ///
    /// Returns an error if a turn is already in flight or saving fails.
    pub fn roll(&self, session: &mut GameSession) -> Result<RollOutcome, anyhow::Error> {
        let outcome = session.roll()?;
        if matches!(outcome, RollOutcome::Completed(_)) {
            self.save(session)?;
        }
        Ok(outcome)
    }

    /// Resolve a pending landing; saves when the turn completes.
    ///
    /// # Errors
    ///
    /// Returns an error if no landing is pending or saving fails.
    pub fn land(
        &self,
        session: &mut GameSession,
        enhancement: Option<Enhancement>,
    ) -> Result<LandingOutcome, anyhow::Error> {
        let outcome = session.land(enhancement)?;
        if matches!(outcome, LandingOutcome::Completed(_)) {
            self.save(session)?;
        }
        Ok(outcome)
    }

    /// Answer a pending choice and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if no choice is pending or saving fails.
    pub fn choose(
        &self,
        session: &mut GameSession,
        index: Option<usize>,
    ) -> Result<TurnReport, anyhow::Error> {
        let report = session.choose(index)?;
        self.save(session)?;
        Ok(report)
    }

    /// Restart from the initial level and overwrite the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn reset(&self, session: &mut GameSession) -> Result<(), S::Error> {
        session.restart();
        self.save(session)
    }

    /// Drop the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    pub fn delete_snapshot(&self) -> Result<(), S::Error> {
        self.storage.delete_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "title": "Fixture",
        "stats": {
            "intelligence": {"initial": 10, "minimum": 0, "maximum": 100},
            "energy": {"initial": 50, "minimum": 0, "maximum": 100},
            "luck": {"initial": 0},
            "money": {"initial": 100}
        },
        "levels": {
            "initial": 1,
            "maximum": 2,
            "1": {"label": "Year 1", "board": "scfr", "credits_to_advance": 10},
            "2": {"label": "Graduation", "board": "snnn"}
        }
    }"#;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = ConfigError;

        fn load_config(&self) -> Result<GameConfig, Self::Error> {
            GameConfig::from_json(CONFIG)
        }

        fn load_references(&self) -> Result<ReferenceLists, Self::Error> {
            Ok(ReferenceLists::empty())
        }
    }

    #[derive(Clone, Copy, Default)]
    struct BrokenLoader;

    impl DataLoader for BrokenLoader {
        type Error = ConfigError;

        fn load_config(&self) -> Result<GameConfig, Self::Error> {
            GameConfig::from_json("{}")
        }

        fn load_references(&self) -> Result<ReferenceLists, Self::Error> {
            Ok(ReferenceLists::empty())
        }
    }

    #[test]
    fn engine_saves_after_every_turn_and_resumes() {
        let storage = MemoryStorage::new();
        let engine = GameEngine::new(FixtureLoader, storage.clone());
        let mut session = engine.create_session(0xABCD).unwrap();
        assert_eq!(storage.load_snapshot().unwrap(), Some(session.snapshot()));

        for _ in 0..5 {
            engine
                .play_turn(&mut session, &NoEnhancement, &mut FirstOption)
                .unwrap();
            assert_eq!(storage.load_snapshot().unwrap(), Some(session.snapshot()));
        }

        let resumed = engine.load_session(1).unwrap();
        assert_eq!(resumed.progress(), session.progress());
    }

    #[test]
    fn load_session_without_snapshot_starts_fresh() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::new());
        let session = engine.load_session(3).unwrap();
        assert_eq!(session.progress().level, 1);
        assert_eq!(session.progress().position, 0);
        assert!(engine.storage().raw().is_some());
    }

    #[test]
    fn corrupt_snapshot_is_replaced_by_a_new_game() {
        let storage = MemoryStorage::new();
        storage.put_raw("definitely not json");
        let engine = GameEngine::new(FixtureLoader, storage);
        let session = engine.load_session(4).unwrap();
        assert_eq!(session.progress().credits, 0);
        assert_eq!(session.progress().stats.money, 100);
    }

    #[test]
    fn reset_and_delete_touch_storage() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::new());
        let mut session = engine.create_session(5).unwrap();
        engine
            .play_turn(&mut session, &NoEnhancement, &mut SkipChoice)
            .unwrap();
        engine.reset(&mut session).unwrap();
        assert_eq!(session.progress().position, 0);
        assert_eq!(
            engine.storage().load_snapshot().unwrap(),
            Some(session.snapshot())
        );
        engine.delete_snapshot().unwrap();
        assert!(engine.storage().raw().is_none());
    }

    #[test]
    fn level_up_while_moving_reaches_storage() {
        let storage = MemoryStorage::new();
        let engine = GameEngine::new(FixtureLoader, storage.clone());
        storage
            .save_snapshot(&Snapshot {
                level: 1,
                stats: StatSet::default(),
                credits: 10,
                position: 3,
            })
            .unwrap();
        let mut session = engine.load_session(8).unwrap();

        let RollOutcome::Completed(report) = engine.roll(&mut session).unwrap() else {
            panic!("passing start with enough credits should end the turn");
        };
        assert_eq!(report.transition.map(|t| t.to), Some(2));
        let stored = storage.load_snapshot().unwrap().unwrap();
        assert_eq!(stored.level, 2);
        assert_eq!(stored, session.snapshot());
    }

    #[test]
    fn plain_roll_defers_saving_until_the_landing_resolves() {
        let storage = MemoryStorage::new();
        let engine = GameEngine::new(FixtureLoader, storage.clone());
        let mut session = engine.create_session(9).unwrap();
        let saved = storage.load_snapshot().unwrap();
        assert!(matches!(
            engine.roll(&mut session).unwrap(),
            RollOutcome::Landed(_)
        ));
        assert_eq!(storage.load_snapshot().unwrap(), saved);
        engine.land(&mut session, None).unwrap();
        assert_eq!(storage.load_snapshot().unwrap(), Some(session.snapshot()));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn async_turns_are_persisted() {
        struct Silent;

        impl AsyncEnhancer for Silent {
            async fn enhance(
                &self,
                _request: &EnhancementRequest,
            ) -> Result<Option<Enhancement>, EnhancementError> {
                Ok(None)
            }
        }

        let storage = MemoryStorage::new();
        let engine = GameEngine::new(FixtureLoader, storage.clone());
        let mut session = engine.create_session(10).unwrap();
        for _ in 0..5 {
            engine
                .play_turn_async(
                    &mut session,
                    &Silent,
                    std::time::Duration::from_secs(1),
                    &mut FirstOption,
                )
                .await
                .unwrap();
            assert_eq!(storage.load_snapshot().unwrap(), Some(session.snapshot()));
        }
    }

    #[test]
    fn invalid_configuration_surfaces_as_error() {
        let engine = GameEngine::new(BrokenLoader, MemoryStorage::new());
        assert!(engine.create_session(1).is_err());
        assert!(engine.load_session(1).is_err());
    }
}
