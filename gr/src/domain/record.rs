//! Trial, game and match records

use serde::{Deserialize, Serialize};

use super::id::{TEAM_COUNT, TeamId};

/// Outcome of asserting a trial decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialDecision {
    /// The game goes on with another trial ('C')
    Continue,
    /// One team holds the majority of trials ('E')
    EndOfGame,
}

impl TrialDecision {
    pub fn as_char(self) -> char {
        match self {
            Self::Continue => 'C',
            Self::EndOfGame => 'E',
        }
    }
}

impl std::fmt::Display for TrialDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One rope-pulling round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Trial number within the game, starting at 1
    pub number: u32,

    /// Contestant indices per team, in the order they took the rope
    pub roster: [Vec<usize>; TEAM_COUNT],

    /// Summed effort per team, filled in when the trial is decided
    pub pull: [u32; TEAM_COUNT],

    pub winner: Option<TeamId>,

    /// How far the rope moved towards the winner
    pub displacement: u32,
}

impl TrialRecord {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            roster: Default::default(),
            pull: [0; TEAM_COUNT],
            winner: None,
            displacement: 0,
        }
    }
}

/// A best-of-N sequence of trials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Game number within the match, starting at 1
    pub number: u32,
    pub trials: Vec<TrialRecord>,
    pub winner: Option<TeamId>,
}

impl GameRecord {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            trials: Vec::new(),
            winner: None,
        }
    }

    /// Trials won per team so far
    pub fn score(&self) -> [u32; TEAM_COUNT] {
        let mut score = [0; TEAM_COUNT];
        for winner in self.trials.iter().filter_map(|t| t.winner) {
            score[winner.index()] += 1;
        }
        score
    }

    /// Team holding a strict majority of `trials_per_game`, if any
    pub fn majority_holder(&self, trials_per_game: u32) -> Option<TeamId> {
        let score = self.score();
        TeamId::ALL
            .into_iter()
            .find(|team| score[team.index()] * 2 > trials_per_game)
    }

    /// Net rope displacement over the game (team 0 negative, team 1 positive)
    pub fn rope_position(&self) -> i64 {
        self.trials
            .iter()
            .filter_map(|t| t.winner.map(|w| w.pull_sign() * i64::from(t.displacement)))
            .sum()
    }
}

/// Result of declaring a game winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameVerdict {
    pub game: u32,
    pub winner: TeamId,
    pub score: [u32; TEAM_COUNT],
    /// The winner now holds the majority of games
    pub match_decided: bool,
}

/// Result of declaring the match winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: TeamId,
    pub games_won: [u32; TEAM_COUNT],
    pub games_played: u32,
}

/// Match bookkeeping exposed for inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub games: Vec<GameRecord>,
    pub games_won: [u32; TEAM_COUNT],
    pub match_winner: Option<TeamId>,
    pub match_over: bool,
}
