//! Game of Rope - CLI entry point

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use gameofrope::cli::{Cli, Command};
use gameofrope::config::{Config, JournalFormat};
use gameofrope::journal::{ReplaySummary, read_journal};
use gameofrope::runner::Arena;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install subscriber: {}", e))?;

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    cli.command.apply_overrides(&mut config);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run { .. } => cmd_run(&config),
        Command::Replay { journal } => cmd_replay(&journal),
        Command::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

fn cmd_run(config: &Config) -> Result<()> {
    let arena = Arena::from_config(config)?;
    let result = arena.run().context("Match failed")?;
    let standings = arena.monitor().standings()?;
    let stats = arena.monitor().stats()?;

    for game in &standings.games {
        let score = game.score();
        let winner = game.winner.map_or("-".to_string(), |team| format!("team {}", team));
        println!(
            "Game {}: {} ({}-{}, {} trials, rope at {})",
            game.number,
            winner.cyan(),
            score[0],
            score[1],
            game.trials.len(),
            game.rope_position()
        );
    }
    println!(
        "{} Team {} wins the match {}-{}",
        "✓".green(),
        result.winner.to_string().bold(),
        result.games_won[0],
        result.games_won[1]
    );
    println!("Trials pulled: {}", stats.trials_started);
    if config.journal.format != JournalFormat::None {
        println!("Journal: {}", config.journal.path.display().to_string().dimmed());
    }
    println!("Seed: {}", arena.seed().to_string().dimmed());
    Ok(())
}

fn cmd_replay(path: &std::path::Path) -> Result<()> {
    let records = read_journal(path).with_context(|| format!("Failed to read journal {}", path.display()))?;
    let summary = ReplaySummary::from_records(&records);

    if let Some(run_id) = &summary.run_id {
        println!("Run: {}", run_id.cyan());
    }
    println!("Snapshots: {}", summary.snapshots);
    for (game, winner, score) in &summary.games {
        println!("Game {}: team {} ({}-{})", game, winner, score[0], score[1]);
    }
    match summary.match_winner {
        Some((winner, games_won)) => {
            println!(
                "{} Team {} won the match {}-{}",
                "✓".green(),
                winner.to_string().bold(),
                games_won[0],
                games_won[1]
            );
        }
        None => println!("{} Journal ends before the match was decided", "!".yellow()),
    }
    Ok(())
}
