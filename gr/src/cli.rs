//! CLI argument parsing for gr

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, JournalFormat};

#[derive(Parser, Debug)]
#[command(name = "gr")]
#[command(author, version, about = "Game of the Rope: a tug-of-war match run by a shared monitor", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a match
    Run {
        /// Seed for strengths, pacing and tie-breaks
        #[arg(long)]
        seed: Option<u64>,

        /// Journal file to write
        #[arg(short, long)]
        journal: Option<PathBuf>,

        /// Journal format
        #[arg(short, long, value_enum)]
        format: Option<JournalFormat>,

        /// Trials per game (odd)
        #[arg(long)]
        trials: Option<u32>,

        /// Games per match (odd)
        #[arg(long)]
        games: Option<u32>,

        /// Do not sleep while pulling
        #[arg(long)]
        instant: bool,
    },

    /// Summarize a JSONL journal
    Replay {
        /// Journal file to read
        #[arg(required = true)]
        journal: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

impl Command {
    /// Fold `run` flags into the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Command::Run {
            seed,
            journal,
            format,
            trials,
            games,
            instant,
        } = self
        {
            if seed.is_some() {
                config.seed = *seed;
            }
            if let Some(path) = journal {
                config.journal.path = path.clone();
            }
            if let Some(format) = format {
                config.journal.format = *format;
            }
            if let Some(trials) = trials {
                config.layout.trials_per_game = *trials;
            }
            if let Some(games) = games {
                config.layout.games_per_match = *games;
            }
            if *instant {
                config.timing.pull_min_ms = 0;
                config.timing.pull_max_ms = 0;
            }
        }
    }
}
