//! Game of Rope - a tug-of-war match coordinated by one shared monitor
//!
//! One referee, one coach per team and several contestants per team run as
//! independent threads. They never talk to each other directly: every
//! interaction is an operation on a single [`Monitor`], which serializes
//! access to the match state and lets participants wait for the conditions
//! they depend on.
//!
//! # Modules
//!
//! - [`monitor`] - the shared monitor and the participant operations
//! - [`domain`] - identities, statuses and match records
//! - [`decision`] - the injected rule that settles a single trial
//! - [`journal`] - state logger implementations and journal replay
//! - [`runner`] - launches all participants against one monitor
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```ignore
//! use gameofrope::{Arena, Config};
//!
//! let arena = Arena::from_config(&Config::default())?;
//! let result = arena.run()?;
//! println!("team {} wins {:?}", result.winner, result.games_won);
//! ```

pub mod cli;
pub mod config;
pub mod decision;
pub mod domain;
pub mod error;
pub mod journal;
pub mod monitor;
pub mod runner;

pub use config::{CoachPolicyKind, Config, JournalFormat, MAX_STRENGTH, MatchConfig};
pub use decision::{DecisionRule, ScriptedRule, StrengthRule, TrialEffort, TrialVerdict};
pub use domain::{
    CoachStatus, ContestantId, ContestantStatus, GameRecord, GameVerdict, MatchResult, RefereeStatus, Standings,
    TEAM_COUNT, TeamId, TrialDecision, TrialRecord,
};
pub use error::{JournalError, MonitorError};
pub use journal::{
    ContestantView, JournalEntry, JournalRecord, JsonlLogger, MemoryLogger, NullLogger, ReplaySummary, Snapshot,
    StateLogger, TableLogger, read_journal,
};
pub use monitor::{CoachPolicy, DEFAULT_STRENGTH, Monitor, MonitorStats, Rotation, StrongestFirst};
pub use runner::{Arena, Pacing};
