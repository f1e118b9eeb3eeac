//! Participant status vocabulary
//!
//! Every status carries a short code used by the table journal.

use serde::{Deserialize, Serialize};

/// Referee progress through the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefereeStatus {
    #[default]
    StartOfTheMatch,
    StartOfAGame,
    TeamsReady,
    WaitForTrialConclusion,
    EndOfAGame,
    EndOfTheMatch,
}

impl RefereeStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::StartOfTheMatch => "SOM",
            Self::StartOfAGame => "SOG",
            Self::TeamsReady => "TRD",
            Self::WaitForTrialConclusion => "WTC",
            Self::EndOfAGame => "EOG",
            Self::EndOfTheMatch => "EOM",
        }
    }
}

/// Coach activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachStatus {
    #[default]
    WaitForRefereeCommand,
    AssembleTeam,
    WatchTrial,
}

impl CoachStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::WaitForRefereeCommand => "WFRC",
            Self::AssembleTeam => "ASTM",
            Self::WatchTrial => "WTTR",
        }
    }
}

/// Contestant position in its per-trial cycle
///
/// A cycle is `Seated -> Positioned -> Pulling -> Seated`. `Resting` only
/// appears before a contestant first sits down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestantStatus {
    #[default]
    Resting,
    Seated,
    Positioned,
    Pulling,
}

impl ContestantStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::Resting => "RST",
            Self::Seated => "SAB",
            Self::Positioned => "SIP",
            Self::Pulling => "DYB",
        }
    }

    /// Whether `next` is a legal recorded successor of `self`
    pub fn may_precede(self, next: ContestantStatus) -> bool {
        matches!(
            (self, next),
            (Self::Resting, Self::Seated)
                | (Self::Seated, Self::Positioned)
                | (Self::Positioned, Self::Pulling)
                | (Self::Pulling, Self::Seated)
        )
    }
}

macro_rules! display_as_code {
    ($($ty:ty),*) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.code())
            }
        })*
    };
}

display_as_code!(RefereeStatus, CoachStatus, ContestantStatus);
