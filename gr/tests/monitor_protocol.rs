//! Protocol tests driving the monitor directly
//!
//! Each test plays the participants by hand so the ordering guarantees of the
//! monitor can be checked at the exact points they matter.

use std::sync::Barrier;
use std::thread;

use gameofrope::{
    ContestantId, JournalEntry, JournalError, MAX_STRENGTH, MatchConfig, MemoryLogger, Monitor, MonitorError, ScriptedRule,
    StateLogger, StrongestFirst, TeamId, TrialDecision,
};

fn layout(contestants: usize, positions: usize, trials: u32, games: u32) -> MatchConfig {
    MatchConfig {
        contestants_per_team: contestants,
        positions_per_team: positions,
        trials_per_game: trials,
        games_per_match: games,
    }
}

fn monitor(layout: MatchConfig, logger: &MemoryLogger) -> Monitor {
    Monitor::new(
        layout,
        Box::new(logger.clone()),
        Box::new(ScriptedRule::always(TeamId::ALL[0])),
    )
    .unwrap()
}

struct FailingLogger;

impl StateLogger for FailingLogger {
    fn record(&mut self, _entry: &JournalEntry) -> Result<(), JournalError> {
        Err(std::io::Error::other("disk full").into())
    }
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_concurrent_first_entry_initializes_once() {
    let logger = MemoryLogger::new();
    let monitor = monitor(layout(3, 3, 3, 3), &logger);
    let barrier = Barrier::new(16);

    thread::scope(|scope| {
        for i in 0..16 {
            let (monitor, barrier) = (&monitor, &barrier);
            scope.spawn(move || {
                barrier.wait();
                let id = ContestantId::new(TeamId::ALL[i % 2], i % 3);
                assert!(!monitor.end_oper_contestant(id).unwrap());
            });
        }
    });

    assert_eq!(monitor.stats().unwrap().initializations, 1);
    assert_eq!(logger.count("Header"), 1);
    assert_eq!(logger.entries()[0].kind(), "Header");

    let first = &logger.snapshots()[0];
    assert!(first.contestants.iter().flatten().all(|c| c.status == gameofrope::ContestantStatus::Resting));
    assert_eq!(first.positioned, [0, 0]);
    assert!(!first.match_over);
}

#[test]
fn test_logger_failure_is_fatal_to_caller() {
    let monitor = Monitor::new(
        layout(3, 3, 3, 3),
        Box::new(FailingLogger),
        Box::new(ScriptedRule::always(TeamId::ALL[0])),
    )
    .unwrap();
    let err = monitor.end_oper_contestant(ContestantId::new(TeamId::ALL[0], 0)).unwrap_err();
    assert!(matches!(err, MonitorError::Logger(_)));
    assert!(err.is_fatal());
}

// =============================================================================
// Trial choreography
// =============================================================================

#[test]
fn test_two_teams_of_three_assemble_and_pull() {
    let logger = MemoryLogger::new();
    let monitor = monitor(layout(3, 3, 1, 1), &logger);
    let [a, _] = TeamId::ALL;

    assert_eq!(monitor.announce_new_game().unwrap(), 1);

    let (trial, after_call, after_start, decision) = thread::scope(|scope| {
        let monitor = &monitor;
        let referee = scope.spawn(move || {
            let trial = monitor.call_trial()?;
            let after_call = (monitor.stats()?, monitor.snapshot()?);
            monitor.start_trial()?;
            let after_start = monitor.stats()?;
            let decision = monitor.assert_trial_decision()?;
            Ok::<_, MonitorError>((trial, after_call, after_start, decision))
        });

        for team in TeamId::ALL {
            scope.spawn(move || {
                assert!(!monitor.review_notes(team).unwrap());
                let called = monitor.call_contestants(team, &mut StrongestFirst).unwrap();
                assert_eq!(called.len(), 3);
                monitor.inform_referee(team).unwrap();
            });
            for index in 0..3 {
                let id = ContestantId::new(team, index);
                scope.spawn(move || {
                    assert!(!monitor.seat_down(id).unwrap());
                    monitor.follow_coach_advice(id).unwrap();
                    monitor.get_ready(id).unwrap();
                    monitor.am_done(id).unwrap();
                });
            }
        }

        referee.join().unwrap().unwrap()
    });

    assert_eq!(trial, 1);
    let (stats, snapshot) = after_call;
    assert_eq!(stats.assembled_notices, [1, 1]);
    assert_eq!(stats.all_finished_notices, 0);
    assert_eq!(snapshot.positioned, [3, 3]);
    assert_eq!(after_start.all_finished_notices, 1);
    assert_eq!(decision, TrialDecision::EndOfGame);

    // am_done and assert_trial_decision never reach the journal:
    // init 1 + announce 1 + call 1 + start 1 + coaches 2x3 + contestants 6x3
    assert_eq!(logger.count("State"), 28);

    let verdict = monitor.declare_game_winner(decision).unwrap();
    assert_eq!(verdict.winner, a);
    assert!(verdict.match_decided);

    let result = monitor.declare_match_winner().unwrap();
    assert_eq!(result.winner, a);
    assert_eq!(result.games_won, [1, 0]);
    assert!(monitor.standings().unwrap().match_over);

    let standings = monitor.standings().unwrap();
    let roster = &standings.games[0].trials[0].roster;
    assert_eq!(roster[0].len(), 3);
    assert_eq!(roster[1].len(), 3);
}

#[test]
fn test_abort_releases_seated_contestant() {
    let logger = MemoryLogger::new();
    let monitor = monitor(layout(3, 3, 1, 1), &logger);
    let id = ContestantId::new(TeamId::ALL[1], 2);

    let end = thread::scope(|scope| {
        let monitor = &monitor;
        let seated = scope.spawn(move || monitor.seat_down(id));

        // No coach will ever call this contestant
        monitor.abort();
        seated.join().unwrap()
    });
    assert!(matches!(end, Err(MonitorError::Aborted { .. })));
}

// =============================================================================
// Contract violations
// =============================================================================

#[test]
fn test_declare_game_winner_with_continue_is_rejected() {
    let logger = MemoryLogger::new();
    let monitor = monitor(layout(3, 3, 3, 3), &logger);
    monitor.announce_new_game().unwrap();

    let err = monitor.declare_game_winner(TrialDecision::Continue).unwrap_err();
    assert!(err.is_contract_violation());

    let standings = monitor.standings().unwrap();
    assert_eq!(standings.games.len(), 1);
    assert_eq!(standings.games[0].winner, None);
    assert_eq!(standings.games_won, [0, 0]);
    assert_eq!(logger.count("GameResult"), 0);
}

#[test]
fn test_out_of_order_referee_calls_are_rejected() {
    let logger = MemoryLogger::new();
    let monitor = monitor(layout(3, 3, 3, 3), &logger);

    assert!(monitor.call_trial().unwrap_err().is_contract_violation());
    assert!(monitor.start_trial().unwrap_err().is_contract_violation());
    assert!(monitor.assert_trial_decision().unwrap_err().is_contract_violation());
    assert!(monitor.declare_match_winner().unwrap_err().is_contract_violation());

    monitor.announce_new_game().unwrap();
    assert!(monitor.announce_new_game().unwrap_err().is_contract_violation());
    assert!(monitor.start_trial().unwrap_err().is_contract_violation());
    assert!(
        monitor
            .declare_game_winner(TrialDecision::EndOfGame)
            .unwrap_err()
            .is_contract_violation()
    );
}

#[test]
fn test_contestant_out_of_range_is_rejected() {
    let logger = MemoryLogger::new();
    let monitor = monitor(layout(3, 3, 3, 3), &logger);
    let err = monitor.seat_down(ContestantId::new(TeamId::ALL[0], 7)).unwrap_err();
    assert!(err.is_contract_violation());
    assert!(err.to_string().contains("0-7"));
}

#[test]
fn test_follow_without_trial_is_rejected() {
    let logger = MemoryLogger::new();
    let monitor = monitor(layout(3, 3, 3, 3), &logger);
    let err = monitor.follow_coach_advice(ContestantId::new(TeamId::ALL[0], 0)).unwrap_err();
    assert!(err.is_contract_violation());
    assert_eq!(monitor.snapshot().unwrap().positioned, [0, 0]);
}

#[test]
fn test_with_strengths_checks_shape() {
    let result = Monitor::with_strengths(
        layout(3, 2, 3, 3),
        [vec![1, 2, 3], vec![1, 2]],
        Box::new(MemoryLogger::new()),
        Box::new(ScriptedRule::always(TeamId::ALL[0])),
    );
    assert!(matches!(result, Err(MonitorError::ContractViolation { .. })));
}

#[test]
fn test_layout_that_could_tie_is_rejected_up_front() {
    for bad in [layout(3, 3, 2, 3), layout(3, 3, 3, 4), layout(3, 0, 3, 3), layout(2, 3, 3, 3)] {
        let result = Monitor::new(
            bad.clone(),
            Box::new(MemoryLogger::new()),
            Box::new(ScriptedRule::always(TeamId::ALL[0])),
        );
        match result {
            Err(err) => assert!(err.is_contract_violation(), "{:?}: {}", bad, err),
            Ok(_) => panic!("layout {:?} accepted", bad),
        }
    }
}

#[test]
fn test_with_strengths_rejects_oversized_strength() {
    let result = Monitor::with_strengths(
        layout(3, 3, 3, 3),
        [vec![1, 2, 3], vec![1, 2, MAX_STRENGTH + 1]],
        Box::new(MemoryLogger::new()),
        Box::new(ScriptedRule::always(TeamId::ALL[0])),
    );
    assert!(matches!(result, Err(MonitorError::ContractViolation { .. })));
}
