//! Game of Rope configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Largest starting strength a contestant may have
pub const MAX_STRENGTH: u32 = 10_000;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Seed for strengths, pacing and tie-breaks; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Match structure
    #[serde(rename = "match")]
    pub layout: MatchConfig,

    /// Contestant strengths
    pub contestants: ContestantConfig,

    /// Pulling effort pacing
    pub timing: TimingConfig,

    /// Coach selection policy
    pub coach: CoachConfig,

    /// State journal output
    pub journal: JournalConfig,
}

impl Config {
    /// Reject configurations that could produce a tie or an impossible team
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;

        if self.contestants.min_strength > self.contestants.max_strength {
            return Err(eyre::eyre!(
                "min-strength ({}) exceeds max-strength ({})",
                self.contestants.min_strength,
                self.contestants.max_strength
            ));
        }
        if self.contestants.max_strength > MAX_STRENGTH {
            return Err(eyre::eyre!(
                "max-strength ({}) exceeds {}",
                self.contestants.max_strength,
                MAX_STRENGTH
            ));
        }
        if self.timing.pull_min_ms > self.timing.pull_max_ms {
            return Err(eyre::eyre!(
                "pull-min-ms ({}) exceeds pull-max-ms ({})",
                self.timing.pull_min_ms,
                self.timing.pull_max_ms
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }
        Self::load_first(search_paths())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Consults the same files as [`Config::load`], in the same order.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        match config_path {
            Some(path) => Self::log_level_from([path.clone()]),
            None => Self::log_level_from(search_paths()),
        }
    }

    /// First existing file that parses wins; defaults otherwise
    fn load_first(paths: impl IntoIterator<Item = PathBuf>) -> Result<Self> {
        for path in paths.into_iter().filter(|p| p.exists()) {
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn log_level_from(paths: impl IntoIterator<Item = PathBuf>) -> Option<String> {
        paths
            .into_iter()
            .filter(|p| p.exists())
            .find_map(|path| {
                let content = fs::read_to_string(path).ok()?;
                serde_yaml::from_str::<Self>(&content).ok()
            })?
            .log_level
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Config files consulted when no path is given: project-local
/// `.gameofrope.yml`, then `<config_dir>/gameofrope/gameofrope.yml`
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".gameofrope.yml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("gameofrope").join("gameofrope.yml"));
    }
    paths
}

/// Fixed shape of the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Contestants on each team's bench
    #[serde(rename = "contestants-per-team")]
    pub contestants_per_team: usize,

    /// Contestants each team fields on the rope per trial
    #[serde(rename = "positions-per-team")]
    pub positions_per_team: usize,

    /// Trials in a game; a game is won by a strict majority
    #[serde(rename = "trials-per-game")]
    pub trials_per_game: u32,

    /// Games in the match; the match is won by a strict majority
    #[serde(rename = "games-per-match")]
    pub games_per_match: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            contestants_per_team: 5,
            positions_per_team: 3,
            trials_per_game: 5,
            games_per_match: 3,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.positions_per_team == 0 {
            return Err(eyre::eyre!("positions-per-team must be at least 1"));
        }
        if self.positions_per_team > self.contestants_per_team {
            return Err(eyre::eyre!(
                "positions-per-team ({}) exceeds contestants-per-team ({})",
                self.positions_per_team,
                self.contestants_per_team
            ));
        }
        if self.trials_per_game % 2 == 0 {
            return Err(eyre::eyre!(
                "trials-per-game must be odd so a game cannot tie (got {})",
                self.trials_per_game
            ));
        }
        if self.games_per_match % 2 == 0 {
            return Err(eyre::eyre!(
                "games-per-match must be odd so a match cannot tie (got {})",
                self.games_per_match
            ));
        }
        Ok(())
    }

    /// Contestants that must report "am done" before a trial can be decided
    pub fn pullers(&self) -> usize {
        crate::domain::TEAM_COUNT * self.positions_per_team
    }
}

/// Contestant strength range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContestantConfig {
    #[serde(rename = "min-strength")]
    pub min_strength: u32,

    #[serde(rename = "max-strength")]
    pub max_strength: u32,
}

impl Default for ContestantConfig {
    fn default() -> Self {
        Self {
            min_strength: 5,
            max_strength: 15,
        }
    }
}

/// How long a contestant spends pulling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    #[serde(rename = "pull-min-ms")]
    pub pull_min_ms: u64,

    #[serde(rename = "pull-max-ms")]
    pub pull_max_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pull_min_ms: 1,
            pull_max_ms: 20,
        }
    }
}

/// Which contestants a coach fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoachPolicyKind {
    /// The strongest contestants on the bench
    #[default]
    Strongest,
    /// Everyone in turn
    Rotation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub policy: CoachPolicyKind,
}

/// Journal output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum JournalFormat {
    /// One JSON record per line
    #[default]
    Jsonl,
    /// Human-readable status table
    Table,
    /// Discard everything
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub path: PathBuf,
    pub format: JournalFormat,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("gameofrope.jsonl"),
            format: JournalFormat::Jsonl,
        }
    }
}
