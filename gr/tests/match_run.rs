//! Whole matches played by the arena on real threads

use std::collections::HashSet;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use gameofrope::{
    Arena, CoachPolicyKind, ContestantId, ContestantStatus, DecisionRule, JournalEntry, JournalError, MAX_STRENGTH,
    MatchConfig, MemoryLogger, Monitor, NullLogger, Pacing, ScriptedRule, StateLogger, StrengthRule, TeamId,
    TrialDecision, TrialEffort, TrialVerdict,
};

fn default_layout() -> MatchConfig {
    MatchConfig::default()
}

fn play(layout: MatchConfig, policy: CoachPolicyKind, seed: u64) -> (Arena, MemoryLogger) {
    let logger = MemoryLogger::new();
    let monitor = Monitor::new(layout, Box::new(logger.clone()), Box::new(StrengthRule::seeded(seed))).unwrap();
    let arena = Arena::new(monitor, Pacing::instant(), policy, seed);
    (arena, logger)
}

#[test]
fn test_full_match_produces_majority_winner() {
    let (arena, logger) = play(default_layout(), CoachPolicyKind::Strongest, 42);
    let result = arena.run().unwrap();

    assert_eq!(result.games_won[result.winner.index()], 2);
    assert!(result.games_won[result.winner.opponent().index()] < 2);
    assert_eq!(result.games_played, result.games_won.iter().sum::<u32>());

    let standings = arena.monitor().standings().unwrap();
    assert!(standings.match_over);
    assert_eq!(standings.match_winner, Some(result.winner));
    for game in &standings.games {
        let winner = game.winner.expect("every played game has a winner");
        assert!(game.trials.len() <= 5);
        // A game ends on a trial majority or when the trials run out
        let score = game.score();
        assert!(score[winner.index()] >= score[winner.opponent().index()]);
    }

    assert_eq!(logger.count("Header"), 1);
    assert_eq!(logger.count("GameHeader"), standings.games.len());
    assert_eq!(logger.count("GameResult"), standings.games.len());
    assert_eq!(logger.count("MatchResult"), 1);

    let trials: usize = standings.games.iter().map(|g| g.trials.len()).sum();
    assert_eq!(arena.monitor().stats().unwrap().trials_started as usize, trials);
}

#[test]
fn test_snapshots_respect_assembly_and_pull_bounds() {
    let layout = default_layout();
    let (arena, logger) = play(layout.clone(), CoachPolicyKind::Strongest, 7);
    arena.run().unwrap();

    let snapshots = logger.snapshots();
    assert!(!snapshots.is_empty());
    for snapshot in &snapshots {
        for team in TeamId::ALL {
            assert!(snapshot.positioned[team.index()] <= layout.positions_per_team);
        }
        assert!(snapshot.finished <= layout.pullers());
    }
    assert!(snapshots.last().unwrap().match_over);
}

#[test]
fn test_contestant_status_sequences_are_valid() {
    let layout = default_layout();
    let (arena, logger) = play(layout.clone(), CoachPolicyKind::Rotation, 99);
    arena.run().unwrap();

    let snapshots = logger.snapshots();
    for team in TeamId::ALL {
        for index in 0..layout.contestants_per_team {
            let id = ContestantId::new(team, index);
            let mut history: Vec<ContestantStatus> = snapshots
                .iter()
                .filter_map(|s| s.contestant(id).map(|c| c.status))
                .collect();
            history.dedup();

            assert_eq!(history.first(), Some(&ContestantStatus::Resting), "{}", id);
            assert_eq!(history.last(), Some(&ContestantStatus::Seated), "{}", id);
            for pair in history.windows(2) {
                assert!(pair[0].may_precede(pair[1]), "{}: {:?} -> {:?}", id, pair[0], pair[1]);
            }
        }
    }
}

#[test]
fn test_rotation_fields_every_contestant() {
    let layout = default_layout();
    let (arena, _logger) = play(layout.clone(), CoachPolicyKind::Rotation, 3);
    arena.run().unwrap();

    let standings = arena.monitor().standings().unwrap();
    for team in TeamId::ALL {
        let fielded: HashSet<usize> = standings
            .games
            .iter()
            .flat_map(|game| &game.trials)
            .flat_map(|trial| trial.roster[team.index()].iter().copied())
            .collect();
        assert_eq!(fielded.len(), layout.contestants_per_team, "team {}", team);
    }
}

#[test]
fn test_trial_majority_ends_game_early() {
    let layout = MatchConfig {
        contestants_per_team: 3,
        positions_per_team: 3,
        trials_per_game: 3,
        games_per_match: 3,
    };
    let [a, b] = TeamId::ALL;
    let monitor = Monitor::new(layout, Box::new(MemoryLogger::new()), Box::new(ScriptedRule::always(a))).unwrap();
    let arena = Arena::new(monitor, Pacing::instant(), CoachPolicyKind::Strongest, 0);

    let result = arena.run().unwrap();
    assert_eq!(result.winner, a);
    assert_eq!(result.games_won, [2, 0]);

    let standings = arena.monitor().standings().unwrap();
    assert_eq!(standings.games.len(), 2);
    for game in &standings.games {
        assert_eq!(game.trials.len(), 2);
        assert_eq!(game.winner, Some(a));
        assert!(game.trials.iter().all(|t| t.winner == Some(a)));
        assert!(game.trials.iter().all(|t| t.winner != Some(b)));
    }
}

#[test]
fn test_operations_after_match_end() {
    let (arena, _logger) = play(default_layout(), CoachPolicyKind::Strongest, 11);
    arena.run().unwrap();
    let monitor = arena.monitor();
    let id = ContestantId::new(TeamId::ALL[0], 0);

    // Termination is visible without blocking
    assert!(monitor.seat_down(id).unwrap());
    assert!(monitor.review_notes(TeamId::ALL[1]).unwrap());
    assert!(monitor.end_oper_contestant(id).unwrap());

    assert!(monitor.follow_coach_advice(id).unwrap_err().is_contract_violation());
    assert!(monitor.announce_new_game().unwrap_err().is_contract_violation());
    assert!(monitor.call_trial().unwrap_err().is_contract_violation());
    assert!(monitor.declare_match_winner().unwrap_err().is_contract_violation());
    assert!(
        monitor
            .declare_game_winner(TrialDecision::EndOfGame)
            .unwrap_err()
            .is_contract_violation()
    );
}

#[test]
fn test_same_seed_same_outcome() {
    let layout = MatchConfig {
        contestants_per_team: 3,
        positions_per_team: 3,
        trials_per_game: 3,
        games_per_match: 3,
    };
    let strengths = [vec![10, 12, 8], vec![9, 11, 14]];
    let run = || {
        let monitor = Monitor::with_strengths(
            layout.clone(),
            strengths.clone(),
            Box::new(MemoryLogger::new()),
            Box::new(StrengthRule::seeded(5)),
        )
        .unwrap();
        let arena = Arena::new(monitor, Pacing::instant(), CoachPolicyKind::Strongest, 5);
        let result = arena.run().unwrap();
        let trials: Vec<_> = arena
            .monitor()
            .standings()
            .unwrap()
            .games
            .iter()
            .flat_map(|game| game.trials.iter().map(|t| (t.pull, t.winner, t.displacement)))
            .collect();
        (result, trials)
    };

    // With every contestant fielded the pulls are fixed by the seed
    let (first, first_trials) = run();
    let (second, second_trials) = run();
    assert_eq!(first, second);
    assert_eq!(first_trials, second_trials);
}

// =============================================================================
// Failing participants
// =============================================================================

/// Rule that blows up on the first trial, while the referee holds the lock
struct PanickingRule;

impl DecisionRule for PanickingRule {
    fn decide(&mut self, _effort: &TrialEffort) -> TrialVerdict {
        panic!("decision rule exploded");
    }
}

/// Logger that accepts `remaining` entries, then fails every write
struct ExhaustedLogger {
    remaining: usize,
}

impl StateLogger for ExhaustedLogger {
    fn record(&mut self, _entry: &JournalEntry) -> Result<(), JournalError> {
        if self.remaining == 0 {
            return Err(std::io::Error::other("journal device gone").into());
        }
        self.remaining -= 1;
        Ok(())
    }
}

/// Run the arena on its own thread and give up if it does not finish in time
fn run_bounded(arena: Arena) -> eyre::Result<gameofrope::MatchResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(arena.run());
    });
    rx.recv_timeout(Duration::from_secs(20))
        .expect("match did not finish: a participant was left waiting")
}

#[test]
fn test_panicking_rule_fails_the_match_without_hanging() {
    for seed in 0..5 {
        let monitor = Monitor::new(default_layout(), Box::new(NullLogger), Box::new(PanickingRule)).unwrap();
        let arena = Arena::new(monitor, Pacing::instant(), CoachPolicyKind::Strongest, seed);
        let err = run_bounded(arena).unwrap_err();
        assert!(format!("{:#}", err).contains("referee"), "{:#}", err);
    }
}

#[test]
fn test_logger_failure_mid_match_fails_the_match_without_hanging() {
    for remaining in [1, 10, 40, 120] {
        let monitor = Monitor::new(
            default_layout(),
            Box::new(ExhaustedLogger { remaining }),
            Box::new(StrengthRule::seeded(1)),
        )
        .unwrap();
        let arena = Arena::new(monitor, Pacing::instant(), CoachPolicyKind::Rotation, 1);
        let err = run_bounded(arena).unwrap_err();
        assert!(format!("{:#}", err).contains("state logger failed"), "{:#}", err);
    }
}

#[test]
fn test_strongest_allowed_contestants_play_to_the_end() {
    let layout = MatchConfig {
        contestants_per_team: 3,
        positions_per_team: 3,
        trials_per_game: 3,
        games_per_match: 3,
    };
    let monitor = Monitor::with_strengths(
        layout,
        [vec![MAX_STRENGTH; 3], vec![MAX_STRENGTH; 3]],
        Box::new(NullLogger),
        Box::new(StrengthRule::seeded(8)),
    )
    .unwrap();
    let arena = Arena::new(monitor, Pacing::instant(), CoachPolicyKind::Strongest, 8);

    let result = run_bounded(arena).unwrap();
    assert_eq!(result.games_won[result.winner.index()], 2);
}
