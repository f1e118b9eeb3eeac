//! Match launcher
//!
//! [`Arena`] owns one [`Monitor`] and runs a whole match on it: one referee
//! thread, one coach thread per team and one thread per contestant. If any
//! participant fails, the monitor is aborted so every other thread unblocks
//! and the failure is reported.

pub mod participants;

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use eyre::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

use crate::config::{CoachPolicyKind, Config, TimingConfig};
use crate::decision::StrengthRule;
use crate::domain::{ContestantId, MatchResult, TeamId};
use crate::error::MonitorError;
use crate::journal::open_logger;
use crate::monitor::{Monitor, policy_for};

/// How long a pull lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub pull_min: Duration,
    pub pull_max: Duration,
}

impl Pacing {
    /// No sleeping at all
    pub fn instant() -> Self {
        Self {
            pull_min: Duration::ZERO,
            pull_max: Duration::ZERO,
        }
    }

    /// Spend a random time within the range pulling
    pub fn pull(&self, rng: &mut impl Rng) {
        if self.pull_max.is_zero() {
            return;
        }
        let min = self.pull_min.as_millis() as u64;
        let max = (self.pull_max.as_millis() as u64).max(min);
        thread::sleep(Duration::from_millis(rng.random_range(min..=max)));
    }
}

impl From<&TimingConfig> for Pacing {
    fn from(timing: &TimingConfig) -> Self {
        Self {
            pull_min: Duration::from_millis(timing.pull_min_ms),
            pull_max: Duration::from_millis(timing.pull_max_ms),
        }
    }
}

/// A monitor plus everything needed to play a match on it
pub struct Arena {
    monitor: Monitor,
    pacing: Pacing,
    policy: CoachPolicyKind,
    seed: u64,
}

impl Arena {
    pub fn new(monitor: Monitor, pacing: Pacing, policy: CoachPolicyKind, seed: u64) -> Self {
        Self {
            monitor,
            pacing,
            policy,
            seed,
        }
    }

    /// Validate the configuration, draw starting strengths and open the journal
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(seed, "Arena::from_config: called");

        let mut rng = StdRng::seed_from_u64(seed);
        let (min, max) = (config.contestants.min_strength, config.contestants.max_strength);
        let strengths = std::array::from_fn(|_| {
            (0..config.layout.contestants_per_team)
                .map(|_| rng.random_range(min..=max))
                .collect()
        });

        let logger = open_logger(&config.journal)
            .with_context(|| format!("Failed to open journal {}", config.journal.path.display()))?;
        let monitor = Monitor::with_strengths(
            config.layout.clone(),
            strengths,
            logger,
            Box::new(StrengthRule::seeded(seed)),
        )?;

        Ok(Self::new(monitor, Pacing::from(&config.timing), config.coach.policy, seed))
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run the match to completion on scoped threads
    pub fn run(&self) -> Result<MatchResult> {
        info!(seed = self.seed, layout = ?self.monitor.layout(), "Match starting");
        let contestants_per_team = self.monitor.layout().contestants_per_team;

        thread::scope(|scope| {
            let mut failures: Vec<eyre::Report> = Vec::new();

            let referee = thread::Builder::new()
                .name("referee".to_string())
                .spawn_scoped(scope, || self.supervise("referee", || participants::referee(&self.monitor)));

            let mut coaches = Vec::new();
            for team in TeamId::ALL {
                let mut policy = policy_for(self.policy);
                let spawned = thread::Builder::new()
                    .name(format!("coach-{}", team))
                    .spawn_scoped(scope, move || {
                        self.supervise("coach", || participants::coach(&self.monitor, team, policy.as_mut()))
                    });
                coaches.push(spawned);
            }

            let mut contestants = Vec::new();
            for team in TeamId::ALL {
                for index in 0..contestants_per_team {
                    let id = ContestantId::new(team, index);
                    let mut rng = StdRng::seed_from_u64(self.seed ^ (((team.index() as u64) << 32) | index as u64));
                    let pacing = self.pacing;
                    let spawned = thread::Builder::new()
                        .name(format!("contestant-{}", id))
                        .spawn_scoped(scope, move || {
                            self.supervise("contestant", || {
                                participants::contestant(&self.monitor, id, pacing, &mut rng)
                            })
                        });
                    contestants.push(spawned);
                }
            }

            let result = match referee {
                Ok(handle) => join(handle, "referee", &mut failures),
                Err(e) => {
                    self.monitor.abort();
                    failures.push(eyre::Report::new(e).wrap_err("Failed to spawn referee"));
                    None
                }
            };
            for spawned in coaches.into_iter().chain(contestants) {
                match spawned {
                    Ok(handle) => {
                        join(handle, "participant", &mut failures);
                    }
                    Err(e) => {
                        self.monitor.abort();
                        failures.push(eyre::Report::new(e).wrap_err("Failed to spawn participant"));
                    }
                }
            }

            if let Some(failure) = failures.into_iter().next() {
                return Err(failure);
            }
            result.ok_or_else(|| eyre::eyre!("Referee finished without a match result"))
        })
    }

    /// Run one participant body, aborting the monitor when it fails for a
    /// reason of its own
    ///
    /// A panic aborts the monitor too, then keeps unwinding so the join
    /// reports it.
    fn supervise<T>(
        &self,
        role: &str,
        body: impl FnOnce() -> Result<T, MonitorError>,
    ) -> Result<T, MonitorError> {
        let result = match panic::catch_unwind(AssertUnwindSafe(body)) {
            Ok(result) => result,
            Err(payload) => {
                error!(role, "Participant panicked, aborting the match");
                self.monitor.abort();
                panic::resume_unwind(payload);
            }
        };
        match &result {
            Err(MonitorError::Aborted { .. }) | Ok(_) => {}
            Err(e) => {
                error!(role, error = %e, "Participant failed, aborting the match");
                self.monitor.abort();
            }
        }
        result
    }
}

/// Join one participant, collecting any failure other than a secondary abort
fn join<T>(
    handle: thread::ScopedJoinHandle<'_, Result<T, MonitorError>>,
    role: &str,
    failures: &mut Vec<eyre::Report>,
) -> Option<T> {
    match handle.join() {
        Ok(Ok(value)) => Some(value),
        Ok(Err(MonitorError::Aborted { .. })) => None,
        Ok(Err(e)) => {
            failures.push(eyre::Report::new(e).wrap_err(format!("{} failed", role)));
            None
        }
        Err(_) => {
            failures.push(eyre::eyre!("{} thread panicked", role));
            None
        }
    }
}
