//! Reading JSONL journals back

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::types::{JournalEntry, JournalRecord};
use crate::domain::{TEAM_COUNT, TeamId};

/// Read every record of a JSONL journal
///
/// Unparseable lines are skipped with a warning.
pub fn read_journal(path: impl AsRef<Path>) -> eyre::Result<Vec<JournalRecord>> {
    let path = path.as_ref();
    debug!(?path, "read_journal: reading journal");

    let content = fs::read_to_string(path)?;
    let mut records = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<JournalRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(line, error = %e, "read_journal: failed to parse line");
            }
        }
    }

    Ok(records)
}

/// Results reconstructed from a journal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub run_id: Option<String>,
    /// (game, winner, score) in the order the games were won
    pub games: Vec<(u32, TeamId, [u32; TEAM_COUNT])>,
    pub match_winner: Option<(TeamId, [u32; TEAM_COUNT])>,
    pub snapshots: usize,
}

impl ReplaySummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a JournalRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            match &record.entry {
                JournalEntry::Header { run_id, .. } => summary.run_id = Some(run_id.clone()),
                JournalEntry::GameHeader { .. } => {}
                JournalEntry::State { .. } => summary.snapshots += 1,
                JournalEntry::GameResult { game, winner, score, .. } => {
                    summary.games.push((*game, *winner, *score));
                }
                JournalEntry::MatchResult { winner, games_won } => {
                    summary.match_winner = Some((*winner, *games_won));
                }
            }
        }
        summary
    }

    /// The journal ends with a match result
    pub fn is_complete(&self) -> bool {
        self.match_winner.is_some()
    }
}
