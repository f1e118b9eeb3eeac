//! Coach operations and team selection policies
//!
//! A coach waits for the referee's call, fields M contestants, watches the
//! trial and goes back to reviewing notes, until the match is over.

use tracing::debug;

use super::Monitor;
use super::state::Phase;
use super::sync::wait_until;
use crate::config::CoachPolicyKind;
use crate::domain::{CoachStatus, ContestantId, TeamId};
use crate::error::MonitorError;
use crate::journal::ContestantView;

/// Chooses which contestants take the rope
pub trait CoachPolicy: Send {
    /// Return exactly `positions` distinct indices into `bench`
    fn select(&mut self, team: TeamId, bench: &[ContestantView], positions: usize) -> Vec<usize>;
}

/// Field the strongest contestants, lower index first on equal strength
#[derive(Debug, Default)]
pub struct StrongestFirst;

impl CoachPolicy for StrongestFirst {
    fn select(&mut self, _team: TeamId, bench: &[ContestantView], positions: usize) -> Vec<usize> {
        let mut ranked: Vec<&ContestantView> = bench.iter().collect();
        ranked.sort_by(|a, b| b.strength.cmp(&a.strength).then(a.index.cmp(&b.index)));
        ranked.into_iter().take(positions).map(|view| view.index).collect()
    }
}

/// Give everyone a turn, round-robin over the bench
#[derive(Debug, Default)]
pub struct Rotation {
    next: usize,
}

impl CoachPolicy for Rotation {
    fn select(&mut self, _team: TeamId, bench: &[ContestantView], positions: usize) -> Vec<usize> {
        if bench.is_empty() {
            return Vec::new();
        }
        let picks = (0..positions.min(bench.len()))
            .map(|offset| bench[(self.next + offset) % bench.len()].index)
            .collect();
        self.next = (self.next + positions) % bench.len();
        picks
    }
}

pub fn policy_for(kind: CoachPolicyKind) -> Box<dyn CoachPolicy> {
    match kind {
        CoachPolicyKind::Strongest => Box::new(StrongestFirst),
        CoachPolicyKind::Rotation => Box::new(Rotation::default()),
    }
}

impl Monitor {
    /// Wait for the referee to call a trial
    ///
    /// Returns the termination flag: `true` once the match is over.
    pub fn review_notes(&self, team: TeamId) -> Result<bool, MonitorError> {
        const OP: &str = "review_notes";
        debug!(%team, "Monitor::review_notes: called");
        let mut state = self.enter(OP)?;

        state.coach_mut(team).status = CoachStatus::WaitForRefereeCommand;
        state.persist()?;

        let mut state = wait_until(self.signals.coach(team), state, OP, |s| {
            s.coaches[team.index()].must_assemble || s.match_over
        })?;
        if state.match_over {
            return Ok(true);
        }
        state.coach_mut(team).must_assemble = false;
        Ok(false)
    }

    /// Pick the team for the current trial and call each pick to the rope
    pub fn call_contestants(
        &self,
        team: TeamId,
        policy: &mut dyn CoachPolicy,
    ) -> Result<Vec<ContestantId>, MonitorError> {
        const OP: &str = "call_contestants";
        debug!(%team, "Monitor::call_contestants: called");
        let mut state = self.enter(OP)?;
        state.refuse_after_end(OP)?;
        state.expect_phase(OP, &[Phase::Assembling])?;

        let positions = state.layout.positions_per_team;
        let bench = state.snapshot().contestants[team.index()].clone();
        let picks = policy.select(team, &bench, positions);

        let mut distinct = picks.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if picks.len() != positions || distinct.len() != positions || distinct.iter().any(|&i| i >= bench.len()) {
            return Err(MonitorError::violation(
                OP,
                format!("team {} needs {} distinct contestants, policy picked {:?}", team, positions, picks),
            ));
        }

        state.coach_mut(team).status = CoachStatus::AssembleTeam;
        let called: Vec<ContestantId> = picks.into_iter().map(|index| ContestantId::new(team, index)).collect();
        for &id in &called {
            state.contestant_mut(id).must_join = true;
            self.signals.contestant(id).notify_one();
        }
        state.persist()?;
        Ok(called)
    }

    /// Wait for the team to be assembled, then watch the trial until the
    /// referee decides it
    pub fn inform_referee(&self, team: TeamId) -> Result<(), MonitorError> {
        const OP: &str = "inform_referee";
        debug!(%team, "Monitor::inform_referee: called");
        let state = self.enter(OP)?;
        let positions = state.layout.positions_per_team;

        let mut state = wait_until(self.signals.coach(team), state, OP, |s| {
            s.positioned[team.index()] == positions || s.coaches[team.index()].trial_decided || s.match_over
        })?;
        state.coach_mut(team).status = CoachStatus::WatchTrial;
        state.persist()?;

        let mut state = wait_until(self.signals.coach(team), state, OP, |s| {
            s.coaches[team.index()].trial_decided || s.match_over
        })?;
        state.coach_mut(team).trial_decided = false;
        Ok(())
    }
}
