//! Referee operations
//!
//! The referee drives the match:
//!
//! ```text
//! announce_new_game -> (call_trial -> start_trial -> assert_trial_decision)+
//!                   -> declare_game_winner -> ... -> declare_match_winner
//! ```

use tracing::{debug, info};

use super::Monitor;
use super::state::Phase;
use super::sync::wait_until;
use crate::decision::TrialEffort;
use crate::domain::{
    ContestantId, GameRecord, GameVerdict, MatchResult, RefereeStatus, TEAM_COUNT, TeamId, TrialDecision, TrialRecord,
};
use crate::error::MonitorError;
use crate::journal::JournalEntry;

impl Monitor {
    /// Start the next game and return its number
    pub fn announce_new_game(&self) -> Result<u32, MonitorError> {
        const OP: &str = "announce_new_game";
        debug!("Monitor::announce_new_game: called");
        let mut state = self.enter(OP)?;
        state.refuse_after_end(OP)?;
        state.expect_phase(OP, &[Phase::BeforeGame, Phase::GameOver])?;
        if let Some(team) = state.match_majority() {
            return Err(MonitorError::violation(
                OP,
                format!("team {} already won the match; declare the match winner", team),
            ));
        }

        let game = state.games.len() as u32 + 1;
        state.games.push(GameRecord::new(game));
        state.referee = RefereeStatus::StartOfAGame;
        state.phase = Phase::GameOn;

        state.journal(JournalEntry::GameHeader { game })?;
        state.persist()?;
        info!(game, "Game announced");
        Ok(game)
    }

    /// Call both teams to the rope and wait until each has M contestants in
    /// position; returns the trial number
    pub fn call_trial(&self) -> Result<u32, MonitorError> {
        const OP: &str = "call_trial";
        debug!("Monitor::call_trial: called");
        let mut state = self.enter(OP)?;
        state.refuse_after_end(OP)?;
        state.expect_phase(OP, &[Phase::GameOn, Phase::Decided(TrialDecision::Continue)])?;

        let trials_per_game = state.layout.trials_per_game;
        let Some(game) = state.current_game_mut() else {
            return Err(MonitorError::violation(OP, "no game has been announced"));
        };
        if game.trials.len() as u32 >= trials_per_game {
            return Err(MonitorError::violation(
                OP,
                format!("game {} already played {} trials", game.number, trials_per_game),
            ));
        }
        let trial = game.trials.len() as u32 + 1;
        game.trials.push(TrialRecord::new(trial));

        state.positioned = [0; TEAM_COUNT];
        state.phase = Phase::Assembling;
        for team in TeamId::ALL {
            state.coach_mut(team).must_assemble = true;
            self.signals.coach(team).notify_all();
        }

        let positions = state.layout.positions_per_team;
        for team in TeamId::ALL {
            state = wait_until(self.signals.coach(team), state, OP, |s| {
                s.positioned[team.index()] == positions
            })?;
            debug!(%team, trial, "Monitor::call_trial: team ready");
        }

        state.phase = Phase::Assembled;
        state.referee = RefereeStatus::TeamsReady;
        state.persist()?;
        Ok(trial)
    }

    /// Release the fielded contestants and wait until all of them are done
    pub fn start_trial(&self) -> Result<(), MonitorError> {
        const OP: &str = "start_trial";
        debug!("Monitor::start_trial: called");
        let mut state = self.enter(OP)?;
        state.expect_phase(OP, &[Phase::Assembled])?;

        state.finished = 0;
        state.phase = Phase::Pulling;
        state.referee = RefereeStatus::WaitForTrialConclusion;
        state.stats.trials_started += 1;

        for id in state.fielded() {
            state.contestant_mut(id).must_pull = true;
            self.signals.contestant(id).notify_one();
        }

        let pullers = state.layout.pullers();
        let mut state = wait_until(self.signals.all_finished(), state, OP, |s| s.finished == pullers)?;

        state.phase = Phase::Pulled;
        state.persist()
    }

    /// Decide the trial, send everyone back and tell whether the game goes on
    ///
    /// Not persisted: the next saved transition captures the outcome.
    pub fn assert_trial_decision(&self) -> Result<TrialDecision, MonitorError> {
        const OP: &str = "assert_trial_decision";
        debug!("Monitor::assert_trial_decision: called");
        let mut state = self.enter(OP)?;
        state.expect_phase(OP, &[Phase::Pulled])?;

        let fielded = state.fielded();
        let mut pull = [0u32; TEAM_COUNT];
        for &id in &fielded {
            let team = id.team.index();
            pull[team] = pull[team].saturating_add(state.contestant(id).strength);
        }
        let effort = TrialEffort {
            game: state.games.len() as u32,
            trial: state.current_trial().map_or(0, |t| t.number),
            pull,
        };
        let verdict = state.decide(&effort);

        if let Some(trial) = state.current_trial_mut() {
            trial.pull = pull;
            trial.winner = Some(verdict.winner);
            trial.displacement = verdict.displacement;
        }

        // Pulling tires the fielded contestants; the bench recovers.
        for team in TeamId::ALL {
            for (index, slot) in state.contestants[team.index()].iter_mut().enumerate() {
                if fielded.contains(&ContestantId::new(team, index)) {
                    slot.strength = slot.strength.saturating_sub(1);
                } else {
                    slot.strength = slot.strength.saturating_add(1);
                }
            }
        }

        for &id in &fielded {
            state.contestant_mut(id).must_return = true;
            self.signals.contestant(id).notify_one();
        }
        for team in TeamId::ALL {
            state.coach_mut(team).trial_decided = true;
            self.signals.coach(team).notify_all();
        }

        let trials_per_game = state.layout.trials_per_game;
        let decision = match state.current_game() {
            Some(game)
                if game.majority_holder(trials_per_game).is_some()
                    || game.trials.len() as u32 >= trials_per_game =>
            {
                TrialDecision::EndOfGame
            }
            _ => TrialDecision::Continue,
        };
        state.phase = Phase::Decided(decision);
        info!(
            game = effort.game,
            trial = effort.trial,
            winner = %verdict.winner,
            ?pull,
            %decision,
            "Trial decided"
        );
        Ok(decision)
    }

    /// Record the winner of the current game
    ///
    /// `decision` must be [`TrialDecision::EndOfGame`]; anything else is a
    /// contract violation and leaves the game untouched.
    pub fn declare_game_winner(&self, decision: TrialDecision) -> Result<GameVerdict, MonitorError> {
        const OP: &str = "declare_game_winner";
        debug!(%decision, "Monitor::declare_game_winner: called");
        if decision != TrialDecision::EndOfGame {
            return Err(MonitorError::violation(
                OP,
                format!("decision '{}' does not end the game", decision),
            ));
        }
        let mut state = self.enter(OP)?;
        state.expect_phase(OP, &[Phase::Decided(TrialDecision::EndOfGame)])?;

        let trials_per_game = state.layout.trials_per_game;
        let Some(game) = state.current_game_mut() else {
            return Err(MonitorError::violation(OP, "no game has been announced"));
        };
        let Some(winner) = game.majority_holder(trials_per_game) else {
            return Err(MonitorError::violation(
                OP,
                format!("no team holds a majority in game {}", game.number),
            ));
        };
        game.winner = Some(winner);
        let number = game.number;
        let score = game.score();
        let trials = game.trials.len() as u32;

        state.games_won[winner.index()] += 1;
        state.referee = RefereeStatus::EndOfAGame;
        state.phase = Phase::GameOver;
        let match_decided = state.match_majority().is_some();

        state.persist()?;
        state.journal(JournalEntry::GameResult {
            game: number,
            winner,
            score,
            trials,
        })?;
        info!(game = number, %winner, ?score, "Game won");
        Ok(GameVerdict {
            game: number,
            winner,
            score,
            match_decided,
        })
    }

    /// Record the match winner and raise the termination flag
    ///
    /// Every waiting participant is woken so it can observe the end.
    pub fn declare_match_winner(&self) -> Result<MatchResult, MonitorError> {
        const OP: &str = "declare_match_winner";
        debug!("Monitor::declare_match_winner: called");
        let mut state = self.enter(OP)?;
        state.refuse_after_end(OP)?;
        state.expect_phase(OP, &[Phase::GameOver])?;
        let Some(winner) = state.match_majority() else {
            return Err(MonitorError::violation(
                OP,
                format!("no team holds a majority of games ({:?})", state.games_won),
            ));
        };

        state.match_winner = Some(winner);
        state.match_over = true;
        state.referee = RefereeStatus::EndOfTheMatch;
        state.phase = Phase::MatchOver;
        self.signals.wake_everyone();

        let games_won = state.games_won;
        state.persist()?;
        state.journal(JournalEntry::MatchResult { winner, games_won })?;
        info!(%winner, ?games_won, "Match won");
        Ok(MatchResult {
            winner,
            games_won,
            games_played: state.games.len() as u32,
        })
    }
}
