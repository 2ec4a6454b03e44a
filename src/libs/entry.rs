//! The time entry record and its derived lifecycle state.

use crate::libs::duration::{self, Timing};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::fmt;

/// Longest identifier (and so longest prefix) accepted from callers.
pub const MAX_ID_LEN: usize = 64;

/// Notes equal to this literal are treated as "no note".
pub const NO_NOTE: &str = "None";

/// Lifecycle state of an entry, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Running,
    Paused,
    Stopped,
    Archived,
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryState::Running => "running",
            EntryState::Paused => "paused",
            EntryState::Stopped => "stopped",
            EntryState::Archived => "archived",
        };
        write!(f, "{}", name)
    }
}

/// One tracked interval of work.
///
/// `timestamp_*` fields are absolute instants; `start` / `end` are the
/// user-local wall clock projections, truncated to whole seconds.
/// `hours` is a cache of [`duration::duration`] as of the last mutation and
/// must never be trusted for unfinished entries, see [`TimeEntry::live_hours`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub id: String,
    pub date: NaiveDate,
    pub project: String,
    pub note: Option<String>,
    pub timestamp_start: DateTime<Utc>,
    pub start: NaiveDateTime,
    pub timestamp_end: Option<DateTime<Utc>>,
    pub end: Option<NaiveDateTime>,
    pub billable: bool,
    pub active: bool,
    pub paused: bool,
    pub archived: bool,
    pub timestamp_paused: Option<DateTime<Utc>>,
    pub paused_counter: u32,
    pub paused_hours: f64,
    pub hours: f64,
}

impl TimeEntry {
    pub fn state(&self) -> EntryState {
        if self.archived {
            EntryState::Archived
        } else if self.timestamp_end.is_some() {
            EntryState::Stopped
        } else if self.paused {
            EntryState::Paused
        } else {
            EntryState::Running
        }
    }

    pub fn timing(&self) -> Timing {
        Timing {
            start: self.timestamp_start,
            end: self.timestamp_end,
            paused: self.paused,
            paused_at: self.timestamp_paused,
            paused_hours: self.paused_hours,
        }
    }

    /// Current duration: frozen for paused entries, running for active ones.
    pub fn live_hours(&self, now: DateTime<Utc>) -> f64 {
        match self.state() {
            EntryState::Stopped => self.hours,
            _ => duration::duration(&self.timing(), now),
        }
    }

    /// Recomputes the cached `hours` from the timing fields.
    pub fn refresh_hours(&mut self, now: DateTime<Utc>) {
        self.hours = duration::duration(&self.timing(), now);
    }

    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(7)]
    }
}

/// Derives the opaque identifier of a new entry.
pub fn entry_id(project: &str, note: Option<&str>, start: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(project.as_bytes());
    hasher.update(b"\0");
    hasher.update(note.unwrap_or_default().as_bytes());
    hasher.update(b"\0");
    hasher.update(start.to_rfc3339_opts(SecondsFormat::Nanos, true).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Maps the literal absent-note sentinel to a real absence.
pub fn normalize_note(note: Option<&str>) -> Option<String> {
    note.filter(|n| *n != NO_NOTE).map(str::to_string)
}

/// Identifier prefixes are word characters only, at most [`MAX_ID_LEN`] long.
pub fn is_valid_id_prefix(prefix: &str) -> bool {
    !prefix.is_empty() && prefix.len() <= MAX_ID_LEN && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
