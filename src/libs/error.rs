//! Error kinds raised by the ledger engine.
//!
//! Validation failures (`InvalidProject`, `InvalidTransition`, `NotFound`,
//! `AmbiguousId`, `DuplicateProject`, `InvalidInput`) are deterministic and
//! always carry the offending identifier. `StoreUnavailable` is the only
//! variant a caller may retry. `MigrationFailure` is fatal at startup.
//!
//! Store errors that are not connectivity problems pass through untouched as
//! [`LedgerError::Store`].

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::libs::entry::EntryState;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid project: {0}")]
    InvalidProject(String),

    #[error("Cannot {operation} entry {id} while it is {state}")]
    InvalidTransition {
        id: String,
        operation: &'static str,
        state: EntryState,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Multiple entries ({matches}) start with {prefix}, use a longer id")]
    AmbiguousId { prefix: String, matches: usize },

    #[error("Project already exists: {0}")]
    DuplicateProject(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Migration failed: {0}")]
    MigrationFailure(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Store(rusqlite::Error),
}

impl LedgerError {
    /// Only transient connectivity problems are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::StoreUnavailable(_))
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(error: rusqlite::Error) -> Self {
        match error.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) | Some(ErrorCode::CannotOpen) => {
                LedgerError::StoreUnavailable(error.to_string())
            }
            _ => LedgerError::Store(error),
        }
    }
}

impl From<regex::Error> for LedgerError {
    fn from(error: regex::Error) -> Self {
        LedgerError::InvalidInput(error.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
