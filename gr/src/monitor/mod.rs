//! The shared monitor
//!
//! All coordination between the referee, the coaches and the contestants goes
//! through one [`Monitor`]: a single lock over the whole match state plus a
//! table of conditions to wait on.
//!
//! # Transaction shape
//!
//! Every operation follows the same steps:
//!
//! ```text
//! lock -> initialize once -> mutate / persist -> wait for guard -> consume -> unlock
//! ```
//!
//! Waits never time out. A woken thread re-checks its guard before going on.
//! Signals are issued after the state they announce has been written.
//!
//! # Operations
//!
//! - Contestant: [`Monitor::seat_down`], [`Monitor::follow_coach_advice`],
//!   [`Monitor::get_ready`], [`Monitor::am_done`], [`Monitor::end_oper_contestant`]
//! - Referee: [`Monitor::announce_new_game`], [`Monitor::call_trial`],
//!   [`Monitor::start_trial`], [`Monitor::assert_trial_decision`],
//!   [`Monitor::declare_game_winner`], [`Monitor::declare_match_winner`]
//! - Coach: [`Monitor::review_notes`], [`Monitor::call_contestants`],
//!   [`Monitor::inform_referee`]

mod coach;
mod contestant;
mod referee;
mod state;
mod sync;

use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, warn};

pub use coach::{CoachPolicy, Rotation, StrongestFirst, policy_for};

use self::state::MatchState;
use self::sync::{Signals, StateGuard};
use crate::config::{MAX_STRENGTH, MatchConfig};
use crate::decision::DecisionRule;
use crate::domain::{Standings, TEAM_COUNT};
use crate::error::MonitorError;
use crate::journal::{Snapshot, StateLogger};

/// Strength given to every contestant when none is supplied
pub const DEFAULT_STRENGTH: u32 = 10;

/// Counters describing how the monitor has been driven
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    /// Times the one-time initialization ran
    pub initializations: u32,
    /// "Team assembled" notices issued, per team
    pub assembled_notices: [u32; TEAM_COUNT],
    /// "All finished" notices issued to the referee
    pub all_finished_notices: u32,
    /// Trials whose pulling phase was started
    pub trials_started: u32,
}

/// Shared state plus conditions for one match
pub struct Monitor {
    layout: MatchConfig,
    state: Mutex<MatchState>,
    signals: Signals,
}

impl Monitor {
    /// Create a monitor whose contestants all start at [`DEFAULT_STRENGTH`]
    pub fn new(
        layout: MatchConfig,
        logger: Box<dyn StateLogger>,
        rule: Box<dyn DecisionRule>,
    ) -> Result<Self, MonitorError> {
        let strengths = std::array::from_fn(|_| vec![DEFAULT_STRENGTH; layout.contestants_per_team]);
        Self::build(layout, strengths, logger, rule)
    }

    /// Create a monitor with explicit starting strengths per team
    pub fn with_strengths(
        layout: MatchConfig,
        strengths: [Vec<u32>; TEAM_COUNT],
        logger: Box<dyn StateLogger>,
        rule: Box<dyn DecisionRule>,
    ) -> Result<Self, MonitorError> {
        if let Some(team) = strengths.iter().find(|team| team.len() != layout.contestants_per_team) {
            return Err(MonitorError::violation(
                "with_strengths",
                format!(
                    "expected {} strengths per team, got {}",
                    layout.contestants_per_team,
                    team.len()
                ),
            ));
        }
        if let Some(&strength) = strengths.iter().flatten().find(|&&s| s > MAX_STRENGTH) {
            return Err(MonitorError::violation(
                "with_strengths",
                format!("strength {} exceeds the maximum of {}", strength, MAX_STRENGTH),
            ));
        }
        Self::build(layout, strengths, logger, rule)
    }

    /// A layout that could end in a tie is refused before any thread starts
    fn build(
        layout: MatchConfig,
        strengths: [Vec<u32>; TEAM_COUNT],
        logger: Box<dyn StateLogger>,
        rule: Box<dyn DecisionRule>,
    ) -> Result<Self, MonitorError> {
        debug!(?layout, "Monitor::build: called");
        layout
            .validate()
            .map_err(|e| MonitorError::violation("build", format!("invalid layout: {}", e)))?;
        Ok(Self {
            signals: Signals::new(layout.contestants_per_team),
            state: Mutex::new(MatchState::new(layout.clone(), strengths, logger, rule)),
            layout,
        })
    }

    pub fn layout(&self) -> &MatchConfig {
        &self.layout
    }

    /// Enter the monitor, running the one-time initialization on first entry
    fn enter(&self, operation: &'static str) -> Result<StateGuard<'_>, MonitorError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| MonitorError::LockPoisoned { operation })?;
        if state.aborted {
            return Err(MonitorError::Aborted { operation });
        }
        state.ensure_initialized()?;
        Ok(state)
    }

    pub fn snapshot(&self) -> Result<Snapshot, MonitorError> {
        Ok(self.enter("snapshot")?.snapshot())
    }

    pub fn standings(&self) -> Result<Standings, MonitorError> {
        let state = self.enter("standings")?;
        Ok(Standings {
            games: state.games.clone(),
            games_won: state.games_won,
            match_winner: state.match_winner,
            match_over: state.match_over,
        })
    }

    pub fn stats(&self) -> Result<MonitorStats, MonitorError> {
        Ok(self.enter("stats")?.stats)
    }

    /// Tear the monitor down: every current and future wait fails with
    /// [`MonitorError::Aborted`]
    pub fn abort(&self) {
        warn!("Monitor::abort: waking every participant");
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.aborted = true;
        drop(state);
        self.signals.wake_everyone();
    }
}
