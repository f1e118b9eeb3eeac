//! Shared monitor state
//!
//! One aggregate holds everything the participants coordinate on. It is only
//! ever touched through a guard on the monitor lock.

use tracing::debug;
use uuid::Uuid;

use super::MonitorStats;
use crate::config::MatchConfig;
use crate::decision::{DecisionRule, TrialEffort, TrialVerdict};
use crate::domain::{
    CoachStatus, ContestantId, ContestantStatus, GameRecord, RefereeStatus, TEAM_COUNT, TeamId, TrialDecision,
    TrialRecord,
};
use crate::error::MonitorError;
use crate::journal::{ContestantView, JournalEntry, Snapshot, StateLogger};

/// Where the referee is in the match state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// No game announced yet
    BeforeGame,
    /// Game announced, next trial may be called
    GameOn,
    /// Trial called, teams assembling
    Assembling,
    /// Both teams in position
    Assembled,
    /// Contestants released to pull
    Pulling,
    /// Every fielded contestant reported done
    Pulled,
    /// Trial decision asserted
    Decided(TrialDecision),
    /// Game winner declared
    GameOver,
    /// Match winner declared
    MatchOver,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ContestantSlot {
    pub status: ContestantStatus,
    pub strength: u32,
    pub must_join: bool,
    pub must_pull: bool,
    pub must_return: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CoachSlot {
    pub status: CoachStatus,
    pub must_assemble: bool,
    pub trial_decided: bool,
}

pub(crate) struct MatchState {
    pub layout: MatchConfig,
    initialized: bool,
    pub aborted: bool,

    pub referee: RefereeStatus,
    pub coaches: [CoachSlot; TEAM_COUNT],
    pub contestants: [Vec<ContestantSlot>; TEAM_COUNT],

    pub phase: Phase,
    pub positioned: [usize; TEAM_COUNT],
    pub finished: usize,

    pub games: Vec<GameRecord>,
    pub games_won: [u32; TEAM_COUNT],
    pub match_winner: Option<TeamId>,
    pub match_over: bool,

    pub stats: MonitorStats,
    logger: Box<dyn StateLogger>,
    rule: Box<dyn DecisionRule>,
}

impl MatchState {
    pub fn new(
        layout: MatchConfig,
        strengths: [Vec<u32>; TEAM_COUNT],
        logger: Box<dyn StateLogger>,
        rule: Box<dyn DecisionRule>,
    ) -> Self {
        let contestants: [Vec<ContestantSlot>; TEAM_COUNT] = strengths.map(|team| {
            team.into_iter()
                .map(|strength| ContestantSlot {
                    strength,
                    ..Default::default()
                })
                .collect()
        });
        Self {
            layout,
            initialized: false,
            aborted: false,
            referee: RefereeStatus::default(),
            coaches: Default::default(),
            contestants,
            phase: Phase::BeforeGame,
            positioned: [0; TEAM_COUNT],
            finished: 0,
            games: Vec::new(),
            games_won: [0; TEAM_COUNT],
            match_winner: None,
            match_over: false,
            stats: MonitorStats::default(),
            logger,
            rule,
        }
    }

    /// One-time start of the run; a no-op on every later entry
    pub fn ensure_initialized(&mut self) -> Result<(), MonitorError> {
        if self.initialized {
            return Ok(());
        }
        debug!(layout = ?self.layout, "MatchState::ensure_initialized: first entry into the monitor");
        self.initialized = true;
        self.stats.initializations += 1;

        self.journal(JournalEntry::Header {
            run_id: Uuid::now_v7().to_string(),
            layout: self.layout.clone(),
        })?;
        self.persist()
    }

    /// Save the current state through the state logger
    pub fn persist(&mut self) -> Result<(), MonitorError> {
        let snapshot = self.snapshot();
        self.journal(JournalEntry::State { snapshot })
    }

    pub fn journal(&mut self, entry: JournalEntry) -> Result<(), MonitorError> {
        self.logger.record(&entry)?;
        Ok(())
    }

    pub fn decide(&mut self, effort: &TrialEffort) -> TrialVerdict {
        self.rule.decide(effort)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            referee: self.referee,
            coaches: self.coaches.each_ref().map(|coach| coach.status),
            contestants: self.contestants.each_ref().map(|team| {
                team.iter()
                    .enumerate()
                    .map(|(index, slot)| ContestantView {
                        index,
                        status: slot.status,
                        strength: slot.strength,
                    })
                    .collect::<Vec<_>>()
            }),
            game: self.games.len() as u32,
            trial: self.current_game().map_or(0, |game| game.trials.len() as u32),
            rope_position: self.current_game().map_or(0, GameRecord::rope_position),
            positioned: self.positioned,
            finished: self.finished,
            match_over: self.match_over,
        }
    }

    pub fn check_contestant(&self, operation: &'static str, id: ContestantId) -> Result<(), MonitorError> {
        if id.index < self.contestants[id.team.index()].len() {
            Ok(())
        } else {
            Err(MonitorError::violation(
                operation,
                format!("no contestant {} in a team of {}", id, self.layout.contestants_per_team),
            ))
        }
    }

    /// Callers must have passed `check_contestant`
    pub fn contestant(&self, id: ContestantId) -> &ContestantSlot {
        &self.contestants[id.team.index()][id.index]
    }

    pub fn contestant_mut(&mut self, id: ContestantId) -> &mut ContestantSlot {
        &mut self.contestants[id.team.index()][id.index]
    }

    pub fn coach_mut(&mut self, team: TeamId) -> &mut CoachSlot {
        &mut self.coaches[team.index()]
    }

    pub fn current_game(&self) -> Option<&GameRecord> {
        self.games.last()
    }

    pub fn current_game_mut(&mut self) -> Option<&mut GameRecord> {
        self.games.last_mut()
    }

    pub fn current_trial(&self) -> Option<&TrialRecord> {
        self.current_game().and_then(|game| game.trials.last())
    }

    pub fn current_trial_mut(&mut self) -> Option<&mut TrialRecord> {
        self.current_game_mut().and_then(|game| game.trials.last_mut())
    }

    /// Contestants fielded in the current trial
    pub fn fielded(&self) -> Vec<ContestantId> {
        let Some(trial) = self.current_trial() else {
            return Vec::new();
        };
        TeamId::ALL
            .into_iter()
            .flat_map(|team| trial.roster[team.index()].iter().map(move |&index| ContestantId::new(team, index)))
            .collect()
    }

    /// Team holding a strict majority of the games, if any
    pub fn match_majority(&self) -> Option<TeamId> {
        TeamId::ALL
            .into_iter()
            .find(|team| self.games_won[team.index()] * 2 > self.layout.games_per_match)
    }

    pub fn expect_phase(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), MonitorError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(MonitorError::violation(
                operation,
                format!("not allowed while the match is in phase {:?}", self.phase),
            ))
        }
    }

    pub fn refuse_after_end(&self, operation: &'static str) -> Result<(), MonitorError> {
        if self.match_over {
            Err(MonitorError::violation(operation, "the match is over"))
        } else {
            Ok(())
        }
    }
}
