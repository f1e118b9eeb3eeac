//! Journal entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::domain::{CoachStatus, ContestantId, ContestantStatus, RefereeStatus, TEAM_COUNT, TeamId};

/// One contestant as seen in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestantView {
    pub index: usize,
    pub status: ContestantStatus,
    pub strength: u32,
}

/// Copy of the monitor state taken under the lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub referee: RefereeStatus,
    pub coaches: [CoachStatus; TEAM_COUNT],
    pub contestants: [Vec<ContestantView>; TEAM_COUNT],
    pub game: u32,
    pub trial: u32,
    pub rope_position: i64,
    pub positioned: [usize; TEAM_COUNT],
    pub finished: usize,
    pub match_over: bool,
}

impl Snapshot {
    pub fn contestant(&self, id: ContestantId) -> Option<&ContestantView> {
        self.contestants[id.team.index()].get(id.index)
    }
}

/// Everything the monitor asks the state logger to save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JournalEntry {
    /// Run header, written by the one-time initialization
    Header { run_id: String, layout: MatchConfig },

    /// A new game was announced
    GameHeader { game: u32 },

    /// State after a saved transition
    State { snapshot: Snapshot },

    /// A game was won
    GameResult {
        game: u32,
        winner: TeamId,
        score: [u32; TEAM_COUNT],
        trials: u32,
    },

    /// The match was won
    MatchResult { winner: TeamId, games_won: [u32; TEAM_COUNT] },
}

impl JournalEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Header { .. } => "Header",
            Self::GameHeader { .. } => "GameHeader",
            Self::State { .. } => "State",
            Self::GameResult { .. } => "GameResult",
            Self::MatchResult { .. } => "MatchResult",
        }
    }
}

/// Journal line as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub entry: JournalEntry,
}

impl JournalRecord {
    pub fn new(seq: u64, entry: JournalEntry) -> Self {
        Self {
            seq,
            timestamp: Utc::now(),
            entry,
        }
    }
}
