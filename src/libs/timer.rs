//! Lifecycle of time entries.
//!
//! ```text
//!            pause            stop
//! Running ─────────▶ Paused ───────▶ Stopped
//!    ▲  ◀───────────   │
//!    │      resume     │
//!    └──── stop ───────┴──────────▶ Stopped
//! ```
//!
//! Every transition is written with a state guard: the update only applies
//! if the stored row is still in the state the transition was computed from.
//! Two requests racing on the same entry are therefore serialized by the
//! store, and the loser gets [`LedgerError::InvalidTransition`].

use crate::db::store::{EntryQuery, Store};
use crate::libs::clock::{from_local, local_date, to_local, truncate, Clock};
use crate::libs::duration::{hours_between, hours_to_units, open_pause_hours, round_hours, units_to_hours};
use crate::libs::entry::{entry_id, is_valid_id_prefix, normalize_note, EntryState, TimeEntry};
use crate::libs::error::{LedgerError, LedgerResult};
use crate::libs::messages::Message;
use crate::libs::project::Project;
use crate::msg_warning;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use regex::Regex;

/// Field overrides for [`Timer::edit`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct EntryEdit {
    pub project: Option<String>,
    pub note: Option<String>,
    pub billable: Option<bool>,
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl EntryEdit {
    pub fn is_empty(&self) -> bool {
        self.project.is_none()
            && self.note.is_none()
            && self.billable.is_none()
            && !self.touches_timing()
    }

    pub fn touches_timing(&self) -> bool {
        self.date.is_some() || self.start.is_some() || self.end.is_some()
    }
}

/// Selection for [`Timer::list`].
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Regex matched against the project name.
    pub project: Option<String>,
    /// Regex matched against the note; entries without a note never match.
    pub note: Option<String>,
    pub include_archived: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListedEntry {
    /// The entry with `hours` set to its live duration.
    pub entry: TimeEntry,
    /// Sum of `hours` over this and all earlier rows.
    pub running_total: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Listing {
    pub rows: Vec<ListedEntry>,
    pub total: f64,
}

pub struct Timer<'a, S: Store> {
    store: &'a S,
    clock: &'a dyn Clock,
    tz: Tz,
}

impl<'a, S: Store> Timer<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock, tz: Tz) -> Self {
        Self { store, clock, tz }
    }

    /// Looks up a project that may receive new entries.
    fn open_project(&self, name: &str) -> LedgerResult<Project> {
        match self.store.fetch_project(name)? {
            None => Err(LedgerError::InvalidProject(format!("{} does not exist", name))),
            Some(project) if project.is_archived() => Err(LedgerError::InvalidProject(format!("{} is archived", name))),
            Some(project) => Ok(project),
        }
    }

    /// Resolves an id prefix to exactly one entry.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidInput`] if the prefix is not a word-character token
    /// - [`LedgerError::NotFound`] if nothing matches
    /// - [`LedgerError::AmbiguousId`] if more than one entry matches
    pub fn resolve(&self, prefix: &str) -> LedgerResult<TimeEntry> {
        if !is_valid_id_prefix(prefix) {
            return Err(LedgerError::InvalidInput(format!("'{}' is not a valid entry id", prefix)));
        }

        let ids = self.store.match_ids(prefix)?;
        match ids.as_slice() {
            [] => Err(LedgerError::NotFound(format!("entry {}", prefix))),
            [id] => self
                .store
                .fetch_entry(id)?
                .ok_or_else(|| LedgerError::NotFound(format!("entry {}", prefix))),
            _ => Err(LedgerError::AmbiguousId {
                prefix: prefix.to_string(),
                matches: ids.len(),
            }),
        }
    }

    /// Writes a transition computed from `expected`, or reports why it lost.
    fn commit(&self, entry: &TimeEntry, expected: EntryState, operation: &'static str) -> LedgerResult<()> {
        if self.store.update_entry(entry, expected)? {
            return Ok(());
        }

        match self.store.fetch_entry(&entry.id)? {
            Some(current) => Err(LedgerError::InvalidTransition {
                id: entry.id.clone(),
                operation,
                state: current.state(),
            }),
            None => Err(LedgerError::NotFound(format!("entry {}", entry.id))),
        }
    }

    fn require(entry: &TimeEntry, operation: &'static str, allowed: &[EntryState]) -> LedgerResult<EntryState> {
        let state = entry.state();
        if allowed.contains(&state) {
            Ok(state)
        } else {
            Err(LedgerError::InvalidTransition {
                id: entry.id.clone(),
                operation,
                state,
            })
        }
    }

    fn new_entry(&self, project: &Project, note: Option<&str>, start: DateTime<Utc>, billable: Option<bool>) -> TimeEntry {
        let note = normalize_note(note);
        TimeEntry {
            id: entry_id(&project.name, note.as_deref(), start),
            date: local_date(start, &self.tz),
            project: project.name.clone(),
            note,
            timestamp_start: start,
            start: to_local(start, &self.tz),
            timestamp_end: None,
            end: None,
            billable: billable.unwrap_or(project.default_billable),
            active: true,
            paused: false,
            archived: false,
            timestamp_paused: None,
            paused_counter: 0,
            paused_hours: 0.0,
            hours: 0.0,
        }
    }

    fn insert_new(&self, entry: &TimeEntry) -> LedgerResult<()> {
        if self.store.fetch_entry(&entry.id)?.is_some() {
            return Err(LedgerError::InvalidInput(format!(
                "an entry for {} with the same note already starts at {}",
                entry.project, entry.start
            )));
        }
        self.store.insert_entry(entry)
    }

    /// Starts a running entry. `billable` defaults to the project's flag.
    pub fn start(&self, project: &str, note: Option<&str>, at: DateTime<Utc>, billable: Option<bool>) -> LedgerResult<TimeEntry> {
        let project = self.open_project(project)?;
        let entry = self.new_entry(&project, note, truncate(at), billable);

        self.insert_new(&entry)?;
        tracing::debug!(id = %entry.id, project = %entry.project, "started entry");
        Ok(entry)
    }

    /// Records an already finished entry in one step.
    pub fn add(
        &self,
        project: &str,
        note: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        billable: Option<bool>,
    ) -> LedgerResult<TimeEntry> {
        let project = self.open_project(project)?;
        let (start, end) = (truncate(start), truncate(end));
        if end < start {
            return Err(LedgerError::InvalidInput(format!("end {} precedes start {}", end, start)));
        }

        let mut entry = self.new_entry(&project, note, start, billable);
        entry.timestamp_end = Some(end);
        entry.end = Some(to_local(end, &self.tz));
        entry.active = false;
        entry.hours = hours_between(start, end);

        self.insert_new(&entry)?;
        tracing::debug!(id = %entry.id, project = %entry.project, hours = entry.hours, "added entry");
        Ok(entry)
    }

    pub fn pause(&self, id: &str, at: DateTime<Utc>) -> LedgerResult<TimeEntry> {
        let mut entry = self.resolve(id)?;
        let state = Self::require(&entry, "pause", &[EntryState::Running])?;
        let at = truncate(at);

        entry.active = false;
        entry.paused = true;
        entry.timestamp_paused = Some(at);
        entry.paused_counter += 1;
        entry.refresh_hours(at);

        self.commit(&entry, state, "pause")?;
        tracing::debug!(id = %entry.id, pauses = entry.paused_counter, "paused entry");
        Ok(entry)
    }

    pub fn resume(&self, id: &str, at: DateTime<Utc>) -> LedgerResult<TimeEntry> {
        let mut entry = self.resolve(id)?;
        let state = Self::require(&entry, "resume", &[EntryState::Paused])?;
        let at = truncate(at);

        entry.paused_hours = round_hours(entry.paused_hours + open_pause_hours(entry.timestamp_paused, at));
        entry.timestamp_paused = None;
        entry.paused = false;
        entry.active = true;
        entry.refresh_hours(at);

        self.commit(&entry, state, "resume")?;
        tracing::debug!(id = %entry.id, paused_hours = entry.paused_hours, "resumed entry");
        Ok(entry)
    }

    /// Stops a running or paused entry. An open pause is closed at `at`.
    ///
    /// The pause counter is left as is when stopping a paused entry.
    pub fn stop(&self, id: &str, at: DateTime<Utc>) -> LedgerResult<TimeEntry> {
        let mut entry = self.resolve(id)?;
        let state = Self::require(&entry, "stop", &[EntryState::Running, EntryState::Paused])?;
        let at = truncate(at);

        if entry.paused {
            entry.paused_hours = round_hours(entry.paused_hours + open_pause_hours(entry.timestamp_paused, at));
        }
        entry.timestamp_end = Some(at);
        entry.end = Some(to_local(at, &self.tz));
        entry.active = false;
        entry.paused = false;
        entry.timestamp_paused = None;
        entry.refresh_hours(at);

        self.commit(&entry, state, "stop")?;
        tracing::debug!(id = %entry.id, hours = entry.hours, "stopped entry");
        Ok(entry)
    }

    /// Applies `edit` to every entry in `ids`, all or nothing.
    ///
    /// Times are local wall-clock values on the entry's (possibly new) date.
    /// Hours are recomputed from the new timing and the pause time already
    /// accumulated.
    pub fn edit(&self, ids: &[&str], edit: &EntryEdit) -> LedgerResult<Vec<TimeEntry>> {
        if edit.is_empty() {
            return Err(LedgerError::InvalidInput("nothing to edit".to_string()));
        }
        if let Some(project) = &edit.project {
            self.open_project(project)?;
        }

        let entries = ids.iter().map(|id| self.resolve(id)).collect::<LedgerResult<Vec<_>>>()?;
        let now = truncate(self.clock.now());

        let mut edited = Vec::with_capacity(entries.len());
        for mut entry in entries {
            let state = entry.state();
            if edit.touches_timing() {
                Self::require(&entry, "edit times of", &[EntryState::Running, EntryState::Paused, EntryState::Stopped])?;
                if edit.end.is_some() {
                    Self::require(&entry, "set end of", &[EntryState::Stopped])?;
                }
                self.retime(&mut entry, edit)?;
            }

            if let Some(project) = &edit.project {
                entry.project = project.clone();
            }
            if let Some(note) = &edit.note {
                entry.note = normalize_note(Some(note));
            }
            if let Some(billable) = edit.billable {
                entry.billable = billable;
            }

            entry.refresh_hours(now);
            edited.push((entry, state));
        }

        if !self.store.update_entries(&edited)? {
            return Err(self.lost_edit(&edited)?);
        }
        tracing::debug!(count = edited.len(), "edited entries");
        Ok(edited.into_iter().map(|(entry, _)| entry).collect())
    }

    /// Names the first entry whose state changed under a failed bulk edit.
    fn lost_edit(&self, edited: &[(TimeEntry, EntryState)]) -> LedgerResult<LedgerError> {
        for (entry, expected) in edited {
            match self.store.fetch_entry(&entry.id)? {
                None => return Ok(LedgerError::NotFound(format!("entry {}", entry.id))),
                Some(current) if current.state() != *expected => {
                    return Ok(LedgerError::InvalidTransition {
                        id: entry.id.clone(),
                        operation: "edit",
                        state: current.state(),
                    })
                }
                Some(_) => {}
            }
        }
        Err(LedgerError::StoreUnavailable("bulk edit was not applied".to_string()))
    }

    fn retime(&self, entry: &mut TimeEntry, edit: &EntryEdit) -> LedgerResult<()> {
        let date = edit.date.unwrap_or(entry.date);
        let start_time = edit.start.unwrap_or_else(|| entry.start.time());
        let start = from_local(date.and_time(start_time), &self.tz)?;

        if let Some(old_end) = entry.end {
            // Keep an entry that ran past midnight spanning the same number of days.
            let days = old_end.date() - entry.start.date();
            let end_time = edit.end.unwrap_or_else(|| old_end.time());
            let end = from_local((date + days).and_time(end_time), &self.tz)?;
            if end < start {
                return Err(LedgerError::InvalidInput(format!("end {} precedes start {}", end, start)));
            }
            entry.timestamp_end = Some(end);
            entry.end = Some(to_local(end, &self.tz));
        }

        if let Some(paused_at) = entry.timestamp_paused {
            if start > paused_at {
                msg_warning!(Message::StartMovedAcrossPause(entry.short_id().to_string()));
            }
        }

        entry.timestamp_start = start;
        entry.start = to_local(start, &self.tz);
        entry.date = date;
        Ok(())
    }

    /// Replaces the note of every entry of `project` whose note matches `pattern`.
    ///
    /// Applies regardless of entry state. Returns the number of entries changed.
    pub fn update_notes(&self, project: &str, pattern: &str, note: &str) -> LedgerResult<usize> {
        let regex = Regex::new(pattern)?;
        let note = normalize_note(Some(note));
        if self.store.fetch_project(project)?.is_none() {
            return Err(LedgerError::InvalidProject(format!("{} does not exist", project)));
        }

        let ids: Vec<String> = self
            .store
            .fetch_entries(&EntryQuery::for_project(project))?
            .into_iter()
            .filter(|entry| entry.note.as_deref().is_some_and(|n| regex.is_match(n)))
            .map(|entry| entry.id)
            .collect();

        let updated = self.store.set_notes(&ids, note.as_deref())?;
        tracing::debug!(project, updated, "updated notes");
        Ok(updated)
    }

    /// Deletes the single entry identified by `prefix` and returns it.
    pub fn delete(&self, prefix: &str) -> LedgerResult<TimeEntry> {
        let entry = self.resolve(prefix)?;
        if self.store.delete_entry(&entry.id)? == 0 {
            return Err(LedgerError::NotFound(format!("entry {}", prefix)));
        }
        tracing::debug!(id = %entry.id, "deleted entry");
        Ok(entry)
    }

    /// Entries in a window with live hours and a running total.
    pub fn list(&self, filter: &EntryFilter) -> LedgerResult<Listing> {
        let project = filter.project.as_deref().map(Regex::new).transpose()?;
        let note = filter.note.as_deref().map(Regex::new).transpose()?;
        let now = self.clock.now();

        let query = EntryQuery {
            from: filter.from,
            to: filter.to,
            include_archived: filter.include_archived,
            ..Default::default()
        };

        let mut listing = Listing::default();
        let mut total = 0;
        for mut entry in self.store.fetch_entries(&query)? {
            if project.as_ref().is_some_and(|re| !re.is_match(&entry.project)) {
                continue;
            }
            if note
                .as_ref()
                .is_some_and(|re| !entry.note.as_deref().is_some_and(|n| re.is_match(n)))
            {
                continue;
            }

            entry.hours = entry.live_hours(now);
            total += hours_to_units(entry.hours);
            listing.rows.push(ListedEntry {
                entry,
                running_total: units_to_hours(total),
            });
        }
        listing.total = units_to_hours(total);

        Ok(listing)
    }

    fn unfinished(&self, state: EntryState) -> LedgerResult<Vec<TimeEntry>> {
        let now = self.clock.now();
        let query = EntryQuery {
            unfinished_only: true,
            ..Default::default()
        };

        Ok(self
            .store
            .fetch_entries(&query)?
            .into_iter()
            .filter(|entry| entry.state() == state)
            .map(|mut entry| {
                entry.hours = entry.live_hours(now);
                entry
            })
            .collect())
    }

    pub fn running(&self) -> LedgerResult<Vec<TimeEntry>> {
        self.unfinished(EntryState::Running)
    }

    pub fn paused(&self) -> LedgerResult<Vec<TimeEntry>> {
        self.unfinished(EntryState::Paused)
    }
}

