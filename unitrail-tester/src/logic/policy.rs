use std::fmt;

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use unitrail_game::{
    ChoicePolicy, EnhancementOption, FirstOption, PendingChoice, Quantity, SkipChoice,
};

/// Built-in strategies for answering enhancement choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum PolicyKind {
    /// Always take the first option
    First,
    /// Decline every option
    Skip,
    /// Pick uniformly among the options
    Random,
    /// Pick the option with the best expected payoff, declining losing ones
    Greedy,
}

impl PolicyKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Skip => "skip",
            Self::Random => "random",
            Self::Greedy => "greedy",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn ChoicePolicy> {
        match self {
            Self::First => Box::new(FirstOption),
            Self::Skip => Box::new(SkipChoice),
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Greedy => Box::new(GreedyPolicy),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl ChoicePolicy for RandomPolicy {
    fn choose(&mut self, pending: &PendingChoice) -> Option<usize> {
        (!pending.options.is_empty()).then(|| self.rng.gen_range(0..pending.options.len()))
    }
}

struct GreedyPolicy;

/// Weighted midpoint of an option's ranges; credits dominate.
fn expected_payoff(option: &EnhancementOption) -> i64 {
    let Some(effects) = &option.effects else {
        return 0;
    };
    effects
        .0
        .iter()
        .map(|(quantity, range)| {
            let midpoint = (i64::from(range.min) + i64::from(range.max)) / 2;
            let weight = match quantity {
                Quantity::Credits => 50,
                Quantity::Intelligence | Quantity::Energy => 5,
                Quantity::Luck => 2,
                Quantity::Money => 1,
            };
            midpoint * weight
        })
        .sum()
}

impl ChoicePolicy for GreedyPolicy {
    fn choose(&mut self, pending: &PendingChoice) -> Option<usize> {
        pending
            .options
            .iter()
            .enumerate()
            .map(|(idx, option)| (idx, expected_payoff(option)))
            .filter(|(_, payoff)| *payoff > 0)
            .max_by_key(|(idx, payoff)| (*payoff, std::cmp::Reverse(*idx)))
            .map(|(idx, _)| idx)
    }
}
