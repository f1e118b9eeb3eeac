//! Participant life cycles
//!
//! Each function is the body of one thread. It only talks to the other
//! participants through the monitor.

use rand::rngs::StdRng;
use tracing::{debug, info};

use super::Pacing;
use crate::domain::{ContestantId, MatchResult, TeamId, TrialDecision};
use crate::error::MonitorError;
use crate::monitor::{CoachPolicy, Monitor};

/// Play games until one team holds the majority, then declare the match
pub fn referee(monitor: &Monitor) -> Result<MatchResult, MonitorError> {
    info!("Referee on the field");
    loop {
        let game = monitor.announce_new_game()?;
        let decision = loop {
            let trial = monitor.call_trial()?;
            debug!(game, trial, "referee: teams ready");
            monitor.start_trial()?;
            let decision = monitor.assert_trial_decision()?;
            if decision == TrialDecision::EndOfGame {
                break decision;
            }
        };
        let verdict = monitor.declare_game_winner(decision)?;
        if verdict.match_decided {
            break;
        }
    }
    monitor.declare_match_winner()
}

/// Assemble the team whenever the referee calls a trial
pub fn coach(monitor: &Monitor, team: TeamId, policy: &mut dyn CoachPolicy) -> Result<u32, MonitorError> {
    info!(%team, "Coach on the field");
    let mut trials = 0;
    while !monitor.review_notes(team)? {
        let called = monitor.call_contestants(team, policy)?;
        debug!(%team, ?called, "coach: team called");
        monitor.inform_referee(team)?;
        trials += 1;
    }
    Ok(trials)
}

/// Sit, join, pull, repeat until the match is over; returns trials pulled
pub fn contestant(
    monitor: &Monitor,
    id: ContestantId,
    pacing: Pacing,
    rng: &mut StdRng,
) -> Result<u32, MonitorError> {
    debug!(contestant = %id, "Contestant on the bench");
    let mut pulls = 0;
    while !monitor.seat_down(id)? {
        monitor.follow_coach_advice(id)?;
        monitor.get_ready(id)?;
        pacing.pull(rng);
        monitor.am_done(id)?;
        pulls += 1;
    }
    monitor.end_oper_contestant(id)?;
    Ok(pulls)
}
