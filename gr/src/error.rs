//! Error types for the monitor and the state journal
//!
//! - Lock-discipline faults: the monitor lost mutual exclusion (a poisoned
//!   lock). Fatal to the calling participant, never retried.
//! - Contract violations: an operation was invoked out of order or with a
//!   bad argument. Reported to the caller, shared state left untouched.
//! - Journal failures: the state logger could not persist a record. Fatal to
//!   the caller that triggered persistence.

use thiserror::Error;

/// Errors raised by the state journal
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by monitor operations
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("monitor lock poisoned during {operation}")]
    LockPoisoned { operation: &'static str },

    #[error("contract violation in {operation}: {reason}")]
    ContractViolation { operation: &'static str, reason: String },

    #[error("state logger failed: {0}")]
    Logger(#[from] JournalError),

    #[error("monitor aborted during {operation}")]
    Aborted { operation: &'static str },
}

impl MonitorError {
    pub(crate) fn violation(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            operation,
            reason: reason.into(),
        }
    }

    /// Usage errors leave the monitor usable; everything else is fatal
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }

    pub fn is_fatal(&self) -> bool {
        !self.is_contract_violation()
    }
}
