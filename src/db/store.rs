//! Storage port used by the engine.
//!
//! Each method is a single request to the store. Mutations of one row are
//! atomic; anything that spans rows or tables runs in one store transaction.
//! The engine holds no state of its own between calls.

use crate::libs::entry::{EntryState, TimeEntry};
use crate::libs::error::LedgerResult;
use crate::libs::project::{Project, ProjectFilter};
use chrono::NaiveDate;

/// Row selection for entry reads.
#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub project: Option<String>,
    pub include_archived: bool,
    pub unfinished_only: bool,
}

impl EntryQuery {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        EntryQuery {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn for_project(project: &str) -> Self {
        EntryQuery {
            project: Some(project.to_string()),
            include_archived: true,
            ..Default::default()
        }
    }
}

pub trait EntryStore {
    fn insert_entry(&self, entry: &TimeEntry) -> LedgerResult<()>;

    fn fetch_entry(&self, id: &str) -> LedgerResult<Option<TimeEntry>>;

    fn fetch_entries(&self, query: &EntryQuery) -> LedgerResult<Vec<TimeEntry>>;

    /// Full identifiers starting with `prefix`.
    fn match_ids(&self, prefix: &str) -> LedgerResult<Vec<String>>;

    /// Writes `entry` only if the stored row is still in `expected` state.
    ///
    /// Returns `false` when the guard did not match, meaning another request
    /// changed the entry first.
    fn update_entry(&self, entry: &TimeEntry, expected: EntryState) -> LedgerResult<bool>;

    /// Writes all entries in one transaction, each guarded by the state it
    /// was read in.
    ///
    /// Returns `false` and writes nothing if any guard did not match.
    fn update_entries(&self, entries: &[(TimeEntry, EntryState)]) -> LedgerResult<bool>;

    /// Sets the note of every listed entry. `None` clears it.
    fn set_notes(&self, ids: &[String], note: Option<&str>) -> LedgerResult<usize>;

    fn delete_entry(&self, id: &str) -> LedgerResult<usize>;
}

pub trait ProjectStore {
    fn insert_project(&self, project: &Project) -> LedgerResult<()>;

    fn fetch_project(&self, name: &str) -> LedgerResult<Option<Project>>;

    fn fetch_projects(&self, filter: ProjectFilter) -> LedgerResult<Vec<Project>>;

    /// Overwrites description, default-billable and archived marker.
    fn update_project(&self, project: &Project) -> LedgerResult<usize>;

    /// Renames the project and every entry referencing it, atomically.
    fn rename_project(&self, name: &str, new_name: &str) -> LedgerResult<usize>;

    /// Sets the archived flag of every entry of `project`.
    fn archive_project_entries(&self, project: &str, archived: bool) -> LedgerResult<usize>;

    /// Deletes the project together with all of its entries.
    fn delete_project(&self, name: &str) -> LedgerResult<usize>;
}

/// Everything the engine needs from a store.
pub trait Store: EntryStore + ProjectStore {}

impl<T: EntryStore + ProjectStore> Store for T {}
