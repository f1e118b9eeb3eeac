//! Domain types for the tug-of-war match
//!
//! Identities, participant statuses and the trial/game/match records the
//! monitor keeps while the match runs.

mod id;
mod record;
mod status;

pub use id::{ContestantId, TEAM_COUNT, TeamId};
pub use record::{GameRecord, GameVerdict, MatchResult, Standings, TrialDecision, TrialRecord};
pub use status::{CoachStatus, ContestantStatus, RefereeStatus};
