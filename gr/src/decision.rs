//! Trial decision rule
//!
//! The physical rule that settles a single pull of the rope is injected into
//! the monitor. The monitor calls it once per trial, under the lock, with the
//! summed effort of each team's fielded contestants.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::domain::{TEAM_COUNT, TeamId};

/// Effort put into one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialEffort {
    pub game: u32,
    pub trial: u32,
    /// Summed strength of each team's fielded contestants
    pub pull: [u32; TEAM_COUNT],
}

/// Which team the rope moved towards, and how far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialVerdict {
    pub winner: TeamId,
    pub displacement: u32,
}

pub trait DecisionRule: Send {
    fn decide(&mut self, effort: &TrialEffort) -> TrialVerdict;
}

/// The stronger pull wins; equal pulls are settled by a seeded coin flip
pub struct StrengthRule {
    rng: StdRng,
}

impl StrengthRule {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DecisionRule for StrengthRule {
    fn decide(&mut self, effort: &TrialEffort) -> TrialVerdict {
        let [a, b] = TeamId::ALL;
        let [pull_a, pull_b] = effort.pull;
        let verdict = if pull_a == pull_b {
            let winner = if self.rng.random_bool(0.5) { a } else { b };
            TrialVerdict {
                winner,
                displacement: 0,
            }
        } else {
            TrialVerdict {
                winner: if pull_a > pull_b { a } else { b },
                displacement: pull_a.abs_diff(pull_b),
            }
        };
        debug!(game = effort.game, trial = effort.trial, ?effort.pull, winner = %verdict.winner, "StrengthRule::decide");
        verdict
    }
}

/// Replays a fixed list of winners, cycling when exhausted
pub struct ScriptedRule {
    winners: Vec<TeamId>,
    next: usize,
}

impl ScriptedRule {
    pub fn new(winners: Vec<TeamId>) -> Self {
        Self { winners, next: 0 }
    }

    /// Every trial goes to `team`
    pub fn always(team: TeamId) -> Self {
        Self::new(vec![team])
    }
}

impl DecisionRule for ScriptedRule {
    fn decide(&mut self, effort: &TrialEffort) -> TrialVerdict {
        let winner = match self.winners.get(self.next % self.winners.len().max(1)) {
            Some(team) => *team,
            None => TeamId::ALL[0],
        };
        self.next += 1;
        let [pull_a, pull_b] = effort.pull;
        TrialVerdict {
            winner,
            displacement: pull_a.abs_diff(pull_b).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn effort(pull: [u32; 2]) -> TrialEffort {
        TrialEffort { game: 1, trial: 1, pull }
    }

    #[test]
    fn test_tie_is_deterministic_per_seed() {
        let mut first = StrengthRule::seeded(42);
        let mut second = StrengthRule::seeded(42);
        for _ in 0..10 {
            assert_eq!(first.decide(&effort([9, 9])), second.decide(&effort([9, 9])));
        }
    }

    #[test]
    fn test_tie_does_not_move_rope() {
        let mut rule = StrengthRule::seeded(1);
        assert_eq!(rule.decide(&effort([4, 4])).displacement, 0);
    }

    #[test]
    fn test_scripted_rule_cycles() {
        let [a, b] = TeamId::ALL;
        let mut rule = ScriptedRule::new(vec![a, b]);
        let winners: Vec<TeamId> = (0..4).map(|_| rule.decide(&effort([1, 1])).winner).collect();
        assert_eq!(winners, vec![a, b, a, b]);
    }

    proptest! {
        #[test]
        fn prop_stronger_team_wins(pull_a in 0u32..1000, pull_b in 0u32..1000, seed in any::<u64>()) {
            prop_assume!(pull_a != pull_b);
            let mut rule = StrengthRule::seeded(seed);
            let verdict = rule.decide(&effort([pull_a, pull_b]));
            let expected = if pull_a > pull_b { TeamId::ALL[0] } else { TeamId::ALL[1] };
            prop_assert_eq!(verdict.winner, expected);
            prop_assert_eq!(verdict.displacement, pull_a.abs_diff(pull_b));
        }
    }
}
