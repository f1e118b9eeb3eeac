//! Participant identities
//!
//! A tug of war always has two teams. Contestants are addressed by
//! `(team, index)` where the index is bounded by the configured team size.

use serde::{Deserialize, Serialize};

/// Number of teams pulling the rope
pub const TEAM_COUNT: usize = 2;

/// Team identity (0 or 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(u8);

impl TeamId {
    /// Both teams, in index order
    pub const ALL: [TeamId; TEAM_COUNT] = [TeamId(0), TeamId(1)];

    /// Create a team id, `None` if out of range
    pub fn new(index: usize) -> Option<Self> {
        if index < TEAM_COUNT { Some(Self(index as u8)) } else { None }
    }

    /// Index usable for per-team tables
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The team at the other end of the rope
    pub fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Direction this team drags the rope: team 0 pulls negative, team 1 positive
    pub fn pull_sign(self) -> i64 {
        if self.0 == 0 { -1 } else { 1 }
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contestant identity: team plus position within the team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContestantId {
    pub team: TeamId,
    pub index: usize,
}

impl ContestantId {
    pub fn new(team: TeamId, index: usize) -> Self {
        Self { team, index }
    }
}

impl std::fmt::Display for ContestantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.team, self.index)
    }
}
