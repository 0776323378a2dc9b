use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;
use unitrail_game::{
    DataLoader, GameEngine, GameSession, NoEnhancement, Progress, Quantity, SnapshotStorage,
    StatKind, TileKind, TurnReport,
};

use crate::logic::policy::PolicyKind;
use crate::logic::script::ScriptedEnhancer;

/// Parameters of one seeded run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub max_turns: u32,
    pub policy: PolicyKind,
    pub enhancement_timeout: Duration,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(seed: u64, policy: PolicyKind) -> Self {
        Self {
            seed,
            max_turns: 500,
            policy,
            enhancement_timeout: Duration::from_millis(2_000),
        }
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.enhancement_timeout = timeout;
        self
    }
}

/// Level-up observed during a run.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRecord {
    pub turn: u32,
    pub from: u32,
    pub to: u32,
    pub label: String,
}

/// Summary of one seeded run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRun {
    pub seed: u64,
    pub policy: String,
    pub turns_played: u32,
    pub completed: bool,
    pub turns_to_complete: Option<u32>,
    pub transitions: Vec<TransitionRecord>,
    pub enhanced_turns: u32,
    pub choices_taken: u32,
    pub credits_earned: i64,
    pub final_progress: Progress,
    pub violations: Vec<String>,
    #[serde(skip)]
    pub duration: Duration,
}

impl SimulationRun {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check every progress invariant after a turn.
pub fn check_invariants(session: &GameSession) -> Vec<String> {
    let mut violations = Vec::new();
    let campaign = session.campaign();
    let progress = session.progress();
    if progress.level < campaign.initial_level() || progress.level > campaign.max_level() {
        violations.push(format!("level {} out of range", progress.level));
    }
    for stat in StatKind::ALL {
        let (lower, upper) = campaign.config().stats.bounds(stat);
        let value = progress.stats.get(stat);
        if !(lower..=upper).contains(&value) {
            violations.push(format!("{stat} = {value} outside [{lower}, {upper}]"));
        }
    }
    let (lower, upper) = campaign.credit_bounds(progress.level);
    if !(lower..=upper).contains(&progress.credits) {
        violations.push(format!(
            "credits = {} outside [{lower}, {upper}]",
            progress.credits
        ));
    }
    match session.board() {
        Some(board) if progress.position < board.len() => {}
        Some(board) => violations.push(format!(
            "position {} beyond path of {}",
            progress.position,
            board.len()
        )),
        None => violations.push(format!("level {} has no board", progress.level)),
    }
    violations
}

fn check_report(report: &TurnReport, previous: &Progress) -> Vec<String> {
    let mut violations = Vec::new();
    let credit_change = report.change(Quantity::Credits);
    if credit_change != 0 && report.landing != Some(TileKind::Class) {
        violations.push(format!(
            "credits moved by {credit_change} on {:?}",
            report.landing
        ));
    }
    if report.progress.level < previous.level {
        violations.push(format!(
            "level went backwards: {} -> {}",
            previous.level, report.progress.level
        ));
    }
    violations
}

/// Play one seeded game, saving after every turn.
pub async fn run_simulation<L, S>(
    engine: &GameEngine<L, S>,
    config: SimulationConfig,
    enhancer: Option<&ScriptedEnhancer>,
    verbose: bool,
) -> Result<SimulationRun>
where
    L: DataLoader,
    S: SnapshotStorage,
{
    let started = Instant::now();
    let mut session = engine.create_session(config.seed)?;
    let mut policy = config.policy.create_policy(config.seed);
    let mut run = SimulationRun {
        seed: config.seed,
        policy: config.policy.to_string(),
        turns_played: 0,
        completed: session.is_completed(),
        turns_to_complete: None,
        transitions: Vec::new(),
        enhanced_turns: 0,
        choices_taken: 0,
        credits_earned: 0,
        final_progress: *session.progress(),
        violations: check_invariants(&session),
        duration: Duration::ZERO,
    };

    for turn in 1..=config.max_turns {
        let previous = *session.progress();
        let report = match enhancer {
            Some(enhancer) => {
                engine
                    .play_turn_async(
                        &mut session,
                        enhancer,
                        config.enhancement_timeout,
                        policy.as_mut(),
                    )
                    .await?
            }
            None => engine.play_turn(&mut session, &NoEnhancement, policy.as_mut())?,
        };

        run.turns_played = turn;
        if report.title.is_some() || report.story.is_some() {
            run.enhanced_turns += 1;
        }
        if report.selected_option.is_some() {
            run.choices_taken += 1;
        }
        run.credits_earned += i64::from(report.change(Quantity::Credits).max(0));
        if let Some(transition) = &report.transition {
            run.transitions.push(TransitionRecord {
                turn,
                from: transition.from,
                to: transition.to,
                label: transition.label.clone(),
            });
        }
        if verbose {
            log::info!(
                "seed {} turn {turn}: roll {} -> {}",
                config.seed,
                report.roll,
                report.message
            );
        }
        for violation in check_report(&report, &previous)
            .into_iter()
            .chain(check_invariants(&session))
        {
            run.violations.push(format!("turn {turn}: {violation}"));
        }
        if session.is_completed() && run.turns_to_complete.is_none() {
            run.turns_to_complete = Some(turn);
        }
    }

    run.completed = session.is_completed();
    run.final_progress = *session.progress();
    run.duration = started.elapsed();
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::assets::FsLoader;
    use unitrail_game::MemoryStorage;

    fn engine() -> GameEngine<FsLoader, MemoryStorage> {
        GameEngine::new(FsLoader::new(None, None), MemoryStorage::new())
    }

    #[tokio::test]
    async fn bundled_game_runs_cleanly() {
        let engine = engine();
        let config = SimulationConfig::new(1337, PolicyKind::First).with_max_turns(1_000);
        let run = run_simulation(&engine, config, None, false).await.unwrap();
        assert!(run.passed(), "{:?}", run.violations);
        assert_eq!(run.turns_played, 1_000);
        assert!(run.completed);
        assert_eq!(run.transitions.len(), 3);
        assert_eq!(
            engine.storage().load_snapshot().unwrap(),
            Some(run.final_progress)
        );
    }

    #[tokio::test]
    async fn scripted_choices_are_counted() {
        let script = ScriptedEnhancer::from_json(
            r#"{"entries": [{"reply": "{\"title\": \"Crossroads\", \"options\": [{\"label\": \"Go\", \"effects\": {\"energy\": [1, 2]}}]}"}]}"#,
        )
        .unwrap();
        let config = SimulationConfig::new(5, PolicyKind::First).with_max_turns(30);
        let run = run_simulation(&engine(), config, Some(&script), false)
            .await
            .unwrap();
        assert!(run.passed(), "{:?}", run.violations);
        assert!(run.choices_taken > 0);
        assert!(run.enhanced_turns >= run.choices_taken);
    }
}
