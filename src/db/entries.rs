//! SQLite implementation of the entry half of the storage port.
//!
//! The `entries` table holds one row per time entry. Instants are stored as
//! UTC timestamps, wall-clock projections as naive local datetimes.

use crate::db::db::Db;
use crate::db::store::{EntryQuery, EntryStore};
use crate::libs::entry::{EntryState, TimeEntry};
use crate::libs::error::LedgerResult;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

pub const ENTRIES_TABLE: &str = "entries";

/// Date index standing in for date partitioning of the entries table.
pub const ENTRIES_DATE_INDEX: &str = "idx_entries_date";

/// Current layout of the entries table. `{table}` is substituted so the same
/// definition builds both the live table and a new generation of it.
pub const SCHEMA_ENTRIES: &str = "CREATE TABLE {table} (
    id TEXT NOT NULL PRIMARY KEY,
    date DATE NOT NULL,
    project TEXT NOT NULL,
    note TEXT,
    timestamp_start TIMESTAMP NOT NULL,
    start DATETIME NOT NULL,
    timestamp_end TIMESTAMP,
    end DATETIME,
    billable BOOLEAN NOT NULL DEFAULT FALSE,
    active BOOLEAN NOT NULL DEFAULT FALSE,
    paused BOOLEAN NOT NULL DEFAULT FALSE,
    archived BOOLEAN NOT NULL DEFAULT FALSE,
    timestamp_paused TIMESTAMP,
    paused_counter INTEGER NOT NULL DEFAULT 0,
    paused_hours REAL NOT NULL DEFAULT 0,
    hours REAL NOT NULL DEFAULT 0
)";

pub const INDEX_ENTRIES_DATE: &str = "CREATE INDEX idx_entries_date ON entries(date)";

pub const ENTRY_COLUMNS: &str = "id, date, project, note, timestamp_start, start, timestamp_end, end, \
    billable, active, paused, archived, timestamp_paused, paused_counter, paused_hours, hours";

const INSERT_ENTRY: &str = "INSERT INTO entries (id, date, project, note, timestamp_start, start, timestamp_end, end, \
    billable, active, paused, archived, timestamp_paused, paused_counter, paused_hours, hours) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)";

const UPDATE_ENTRY: &str = "UPDATE entries SET date = ?2, project = ?3, note = ?4, timestamp_start = ?5, start = ?6, \
    timestamp_end = ?7, end = ?8, billable = ?9, active = ?10, paused = ?11, archived = ?12, timestamp_paused = ?13, \
    paused_counter = ?14, paused_hours = ?15, hours = ?16 WHERE id = ?1";

const SELECT_IDS_BY_PREFIX: &str = "SELECT id FROM entries WHERE substr(id, 1, length(?1)) = ?1 ORDER BY timestamp_start DESC";
const DELETE_ENTRY: &str = "DELETE FROM entries WHERE id = ?1";
const UPDATE_NOTE: &str = "UPDATE entries SET note = ?2 WHERE id = ?1";

/// SQL predicate selecting rows that are currently in `state`.
fn state_guard(state: EntryState) -> &'static str {
    match state {
        EntryState::Running => "archived = FALSE AND timestamp_end IS NULL AND paused = FALSE",
        EntryState::Paused => "archived = FALSE AND timestamp_end IS NULL AND paused = TRUE",
        EntryState::Stopped => "archived = FALSE AND timestamp_end IS NOT NULL",
        EntryState::Archived => "archived = TRUE",
    }
}

/// Maps a row selected with [`ENTRY_COLUMNS`].
pub fn entry_from_row(row: &Row) -> rusqlite::Result<TimeEntry> {
    Ok(TimeEntry {
        id: row.get(0)?,
        date: row.get(1)?,
        project: row.get(2)?,
        note: row.get(3)?,
        timestamp_start: row.get(4)?,
        start: row.get(5)?,
        timestamp_end: row.get(6)?,
        end: row.get(7)?,
        billable: row.get(8)?,
        active: row.get(9)?,
        paused: row.get(10)?,
        archived: row.get(11)?,
        timestamp_paused: row.get(12)?,
        paused_counter: row.get(13)?,
        paused_hours: row.get(14)?,
        hours: row.get(15)?,
    })
}

/// Inserts `entry` into `table`, which must have the current layout.
pub fn insert_into(conn: &Connection, table: &str, entry: &TimeEntry) -> rusqlite::Result<usize> {
    let sql = INSERT_ENTRY.replacen("entries", table, 1);
    conn.execute(
        &sql,
        params![
            entry.id,
            entry.date,
            entry.project,
            entry.note,
            entry.timestamp_start,
            entry.start,
            entry.timestamp_end,
            entry.end,
            entry.billable,
            entry.active,
            entry.paused,
            entry.archived,
            entry.timestamp_paused,
            entry.paused_counter,
            entry.paused_hours,
            entry.hours,
        ],
    )
}

fn update_row(conn: &Connection, sql: &str, entry: &TimeEntry) -> rusqlite::Result<usize> {
    conn.execute(
        sql,
        params![
            entry.id,
            entry.date,
            entry.project,
            entry.note,
            entry.timestamp_start,
            entry.start,
            entry.timestamp_end,
            entry.end,
            entry.billable,
            entry.active,
            entry.paused,
            entry.archived,
            entry.timestamp_paused,
            entry.paused_counter,
            entry.paused_hours,
            entry.hours,
        ],
    )
}

/// Reads every row of `table` in chronological order.
pub fn select_all(conn: &Connection, table: &str) -> rusqlite::Result<Vec<TimeEntry>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM \"{}\" ORDER BY timestamp_start, id", ENTRY_COLUMNS, table))?;
    let entry_iter = stmt.query_map([], entry_from_row)?;

    let mut entries = Vec::new();
    for entry in entry_iter {
        entries.push(entry?);
    }
    Ok(entries)
}

impl EntryStore for Db {
    fn insert_entry(&self, entry: &TimeEntry) -> LedgerResult<()> {
        insert_into(&self.conn, ENTRIES_TABLE, entry)?;
        Ok(())
    }

    fn fetch_entry(&self, id: &str) -> LedgerResult<Option<TimeEntry>> {
        let sql = format!("SELECT {} FROM entries WHERE id = ?1", ENTRY_COLUMNS);
        let entry = self.conn.query_row(&sql, [id], entry_from_row).optional()?;
        Ok(entry)
    }

    fn fetch_entries(&self, query: &EntryQuery) -> LedgerResult<Vec<TimeEntry>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(from) = query.from {
            conditions.push("date >= ?");
            values.push(from.format("%Y-%m-%d").to_string());
        }
        if let Some(to) = query.to {
            conditions.push("date <= ?");
            values.push(to.format("%Y-%m-%d").to_string());
        }
        if let Some(project) = &query.project {
            conditions.push("project = ?");
            values.push(project.clone());
        }
        if !query.include_archived {
            conditions.push("archived = FALSE");
        }
        if query.unfinished_only {
            conditions.push("timestamp_end IS NULL");
        }

        let mut sql = format!("SELECT {} FROM entries", ENTRY_COLUMNS);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY timestamp_start, timestamp_end, id");

        let mut stmt = self.conn.prepare(&sql)?;
        let entry_iter = stmt.query_map(params_from_iter(values.iter()), entry_from_row)?;

        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }
        Ok(entries)
    }

    fn match_ids(&self, prefix: &str) -> LedgerResult<Vec<String>> {
        let mut stmt = self.conn.prepare(SELECT_IDS_BY_PREFIX)?;
        let ids = stmt
            .query_map([prefix], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn update_entry(&self, entry: &TimeEntry, expected: EntryState) -> LedgerResult<bool> {
        let sql = format!("{} AND {}", UPDATE_ENTRY, state_guard(expected));
        let changed = update_row(&self.conn, &sql, entry)?;
        Ok(changed == 1)
    }

    fn update_entries(&self, entries: &[(TimeEntry, EntryState)]) -> LedgerResult<bool> {
        if entries.is_empty() {
            return Ok(true);
        }

        let tx = self.conn.unchecked_transaction()?;
        for (entry, expected) in entries {
            let sql = format!("{} AND {}", UPDATE_ENTRY, state_guard(*expected));
            if update_row(&tx, &sql, entry)? != 1 {
                tx.rollback()?;
                return Ok(false);
            }
        }
        tx.commit()?;

        Ok(true)
    }

    fn set_notes(&self, ids: &[String], note: Option<&str>) -> LedgerResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut updated = 0;
        for id in ids {
            updated += tx.execute(UPDATE_NOTE, params![id, note])?;
        }
        tx.commit()?;

        Ok(updated)
    }

    fn delete_entry(&self, id: &str) -> LedgerResult<usize> {
        Ok(self.conn.execute(DELETE_ENTRY, [id])?)
    }
}
