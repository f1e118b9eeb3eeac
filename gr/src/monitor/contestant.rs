//! Contestant operations
//!
//! A contestant cycles `seat_down -> follow_coach_advice -> get_ready ->
//! am_done` until `seat_down` reports the end of the match.

use tracing::debug;

use super::Monitor;
use super::sync::wait_until;
use crate::domain::{ContestantId, ContestantStatus};
use crate::error::MonitorError;
use crate::monitor::state::Phase;

impl Monitor {
    /// Sit on the bench and wait to be called by the coach
    ///
    /// Returns the termination flag: `true` once the match is over.
    pub fn seat_down(&self, id: ContestantId) -> Result<bool, MonitorError> {
        const OP: &str = "seat_down";
        debug!(contestant = %id, "Monitor::seat_down: called");
        let mut state = self.enter(OP)?;
        state.check_contestant(OP, id)?;

        state.contestant_mut(id).status = ContestantStatus::Seated;
        state.persist()?;

        let mut state = wait_until(self.signals.contestant(id), state, OP, |s| {
            s.contestant(id).must_join || s.match_over
        })?;
        state.contestant_mut(id).must_join = false;
        Ok(state.match_over)
    }

    /// Take the next free position on the rope and wait for the start signal
    ///
    /// The contestant completing its team notifies the team condition.
    pub fn follow_coach_advice(&self, id: ContestantId) -> Result<(), MonitorError> {
        const OP: &str = "follow_coach_advice";
        debug!(contestant = %id, "Monitor::follow_coach_advice: called");
        let mut state = self.enter(OP)?;
        state.check_contestant(OP, id)?;
        state.refuse_after_end(OP)?;
        state.expect_phase(OP, &[Phase::Assembling])?;

        let team = id.team.index();
        let positions = state.layout.positions_per_team;
        if state.positioned[team] >= positions {
            return Err(MonitorError::violation(
                OP,
                format!("team {} already has {} contestants in position", id.team, positions),
            ));
        }
        let Some(trial) = state.current_trial_mut() else {
            return Err(MonitorError::violation(OP, "no trial has been called"));
        };
        if trial.roster[team].contains(&id.index) {
            return Err(MonitorError::violation(OP, format!("contestant {} is already in position", id)));
        }
        trial.roster[team].push(id.index);

        state.contestant_mut(id).status = ContestantStatus::Positioned;
        state.positioned[team] += 1;
        state.persist()?;

        if state.positioned[team] == positions {
            debug!(team = %id.team, "Monitor::follow_coach_advice: team assembled");
            state.stats.assembled_notices[team] += 1;
            self.signals.coach(id.team).notify_all();
        }

        let mut state = wait_until(self.signals.contestant(id), state, OP, |s| s.contestant(id).must_pull)?;
        state.contestant_mut(id).must_pull = false;
        Ok(())
    }

    /// Record the start of the pulling effort; never blocks
    pub fn get_ready(&self, id: ContestantId) -> Result<(), MonitorError> {
        const OP: &str = "get_ready";
        debug!(contestant = %id, "Monitor::get_ready: called");
        let mut state = self.enter(OP)?;
        state.check_contestant(OP, id)?;
        state.expect_phase(OP, &[Phase::Pulling])?;

        state.contestant_mut(id).status = ContestantStatus::Pulling;
        state.persist()
    }

    /// Report the end of the pulling effort and wait to be sent back to the bench
    ///
    /// Not persisted: the pull itself is not part of the saved standings.
    pub fn am_done(&self, id: ContestantId) -> Result<(), MonitorError> {
        const OP: &str = "am_done";
        debug!(contestant = %id, "Monitor::am_done: called");
        let mut state = self.enter(OP)?;
        state.check_contestant(OP, id)?;
        state.expect_phase(OP, &[Phase::Pulling])?;

        let pullers = state.layout.pullers();
        if state.finished >= pullers {
            return Err(MonitorError::violation(OP, "every fielded contestant already reported"));
        }
        state.finished += 1;
        if state.finished == pullers {
            debug!("Monitor::am_done: all contestants finished pulling");
            state.stats.all_finished_notices += 1;
            self.signals.all_finished().notify_all();
        }

        let mut state = wait_until(self.signals.contestant(id), state, OP, |s| s.contestant(id).must_return)?;
        state.contestant_mut(id).must_return = false;
        Ok(())
    }

    /// Check for the end of operations without blocking
    ///
    /// Once the match is over the contestant's final state is recorded.
    pub fn end_oper_contestant(&self, id: ContestantId) -> Result<bool, MonitorError> {
        const OP: &str = "end_oper_contestant";
        debug!(contestant = %id, "Monitor::end_oper_contestant: called");
        let mut state = self.enter(OP)?;
        state.check_contestant(OP, id)?;

        let end = state.match_over;
        if end {
            state.contestant_mut(id).status = ContestantStatus::Seated;
            state.persist()?;
        }
        Ok(end)
    }
}
