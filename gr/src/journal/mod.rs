//! State journal
//!
//! The monitor hands a [`JournalEntry`] to its [`StateLogger`] at every
//! transition that should be saved. The logger runs synchronously under the
//! monitor lock, so entries arrive in the exact order the state changed.
//!
//! # Entries
//!
//! ```text
//! Header            once, on lazy initialization
//! GameHeader        announce_new_game
//! State             every persisted transition
//! GameResult        declare_game_winner
//! MatchResult       declare_match_winner
//! ```
//!
//! JSONL journals can be read back with [`read_journal`] and condensed into
//! a [`ReplaySummary`].

mod logger;
mod replay;
mod types;

pub use logger::{JsonlLogger, MemoryLogger, NullLogger, StateLogger, TableLogger, open_logger};
pub use replay::{ReplaySummary, read_journal};
pub use types::{ContestantView, JournalEntry, JournalRecord, Snapshot};
