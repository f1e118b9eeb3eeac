//! State logger implementations
//!
//! Loggers are called under the monitor lock. A failed write is returned to
//! the participant that triggered it; the monitor never retries.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::types::{JournalEntry, JournalRecord, Snapshot};
use crate::config::{JournalConfig, JournalFormat};
use crate::domain::TeamId;
use crate::error::JournalError;

/// Sink for the monitor's saved transitions
pub trait StateLogger: Send {
    fn record(&mut self, entry: &JournalEntry) -> Result<(), JournalError>;
}

/// Open the logger described by the journal configuration
pub fn open_logger(config: &JournalConfig) -> eyre::Result<Box<dyn StateLogger>> {
    debug!(path = ?config.path, format = ?config.format, "open_logger: called");
    let logger: Box<dyn StateLogger> = match config.format {
        JournalFormat::Jsonl => Box::new(JsonlLogger::create(&config.path)?),
        JournalFormat::Table => Box::new(TableLogger::create(&config.path)?),
        JournalFormat::None => Box::new(NullLogger),
    };
    Ok(logger)
}

/// Writes one JSON record per line
pub struct JsonlLogger {
    writer: BufWriter<File>,
    seq: u64,
}

impl JsonlLogger {
    /// Create (or truncate) a journal file
    pub fn create(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref();
        debug!(?path, "JsonlLogger::create: opening journal");
        let file = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            seq: 0,
        })
    }
}

impl StateLogger for JsonlLogger {
    fn record(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        self.seq += 1;
        let record = JournalRecord::new(self.seq, entry.clone());
        let json = serde_json::to_string(&record)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the human-readable status table
pub struct TableLogger<W: Write + Send = BufWriter<File>> {
    writer: W,
}

impl TableLogger {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> TableLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn title_row(&mut self, contestants_per_team: usize) -> std::io::Result<()> {
        let mut row = String::from("Ref ");
        for team in TeamId::ALL {
            row.push_str(&format!(" Coa{}", team));
            for index in 0..contestants_per_team {
                row.push_str(&format!(" Cont{}-{}", team, index));
            }
        }
        row.push_str("  Gm Tr    PS");
        writeln!(self.writer, "{}", row)
    }

    fn state_row(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        let mut row = format!("{:<4}", snapshot.referee.code());
        for team in TeamId::ALL {
            row.push_str(&format!(" {:>4}", snapshot.coaches[team.index()].code()));
            for view in &snapshot.contestants[team.index()] {
                row.push_str(&format!(" {:>3} {:>2}", view.status.code(), view.strength));
            }
        }
        row.push_str(&format!(
            "  {:>2} {:>2} {:>5}",
            snapshot.game, snapshot.trial, snapshot.rope_position
        ));
        writeln!(self.writer, "{}", row)
    }
}

impl<W: Write + Send> StateLogger for TableLogger<W> {
    fn record(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        match entry {
            JournalEntry::Header { run_id, layout } => {
                writeln!(self.writer, "                Game of the Rope - Description of the internal state")?;
                writeln!(self.writer, "run {}", run_id)?;
                self.title_row(layout.contestants_per_team)?;
            }
            JournalEntry::GameHeader { game } => {
                writeln!(self.writer, "Game {}", game)?;
            }
            JournalEntry::State { snapshot } => {
                self.state_row(snapshot)?;
            }
            JournalEntry::GameResult {
                game,
                winner,
                score,
                trials,
            } => {
                writeln!(
                    self.writer,
                    "Game {} was won by team {} ({}-{}) after {} trials.",
                    game, winner, score[0], score[1], trials
                )?;
            }
            JournalEntry::MatchResult { winner, games_won } => {
                writeln!(
                    self.writer,
                    "Match was won by team {} ({}-{}).",
                    winner, games_won[0], games_won[1]
                )?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every entry in memory; clones share the same buffer
#[derive(Clone, Default)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn entries(&self) -> Vec<JournalEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Every recorded snapshot, in order
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                JournalEntry::State { snapshot } => Some(snapshot),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.entries().iter().filter(|e| e.kind() == kind).count()
    }
}

impl StateLogger for MemoryLogger {
    fn record(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| std::io::Error::other("memory journal poisoned"))?;
        entries.push(entry.clone());
        Ok(())
    }
}

/// Discards every entry
pub struct NullLogger;

impl StateLogger for NullLogger {
    fn record(&mut self, _entry: &JournalEntry) -> Result<(), JournalError> {
        Ok(())
    }
}
