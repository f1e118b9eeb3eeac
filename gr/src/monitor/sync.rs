//! Condition table and the wait discipline
//!
//! One condition per contestant carries that contestant's commands, one per
//! coach carries team-level notices (trial called, team assembled, trial
//! decided) and one carries the "all finished" notice to the referee. All of
//! them pair with the single monitor lock.

use std::sync::{Condvar, MutexGuard};

use super::state::MatchState;
use crate::domain::{ContestantId, TEAM_COUNT, TeamId};
use crate::error::MonitorError;

pub(crate) type StateGuard<'a> = MutexGuard<'a, MatchState>;

pub(crate) struct Signals {
    contestants: [Vec<Condvar>; TEAM_COUNT],
    coaches: [Condvar; TEAM_COUNT],
    all_finished: Condvar,
}

impl Signals {
    pub fn new(contestants_per_team: usize) -> Self {
        Self {
            contestants: std::array::from_fn(|_| (0..contestants_per_team).map(|_| Condvar::new()).collect()),
            coaches: std::array::from_fn(|_| Condvar::new()),
            all_finished: Condvar::new(),
        }
    }

    /// Single-waiter condition of one contestant
    pub fn contestant(&self, id: ContestantId) -> &Condvar {
        &self.contestants[id.team.index()][id.index]
    }

    /// Team condition; the coach and the referee both wait on it
    pub fn coach(&self, team: TeamId) -> &Condvar {
        &self.coaches[team.index()]
    }

    pub fn all_finished(&self) -> &Condvar {
        &self.all_finished
    }

    pub fn wake_everyone(&self) {
        for team in &self.contestants {
            for condvar in team {
                condvar.notify_all();
            }
        }
        for condvar in &self.coaches {
            condvar.notify_all();
        }
        self.all_finished.notify_all();
    }
}

/// Block until `ready` holds, releasing the lock while suspended
///
/// The predicate is re-checked on every wakeup. An aborted monitor ends the
/// wait with [`MonitorError::Aborted`].
pub(crate) fn wait_until<'a, F>(
    condvar: &Condvar,
    state: StateGuard<'a>,
    operation: &'static str,
    mut ready: F,
) -> Result<StateGuard<'a>, MonitorError>
where
    F: FnMut(&MatchState) -> bool,
{
    let state = condvar
        .wait_while(state, |s| !s.aborted && !ready(s))
        .map_err(|_| MonitorError::LockPoisoned { operation })?;
    if state.aborted {
        return Err(MonitorError::Aborted { operation });
    }
    Ok(state)
}
