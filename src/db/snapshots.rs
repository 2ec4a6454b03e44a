//! Point-in-time copies of the entries table.
//!
//! A snapshot is a plain table holding a copy of `entries`, registered in the
//! `snapshots` table together with the layout version it was taken from and
//! an optional expiry. Snapshots of an unversioned layout can be listed and
//! purged but never restored.

use crate::db::db::Db;
use crate::db::entries::{select_all, ENTRIES_TABLE, ENTRY_COLUMNS, INDEX_ENTRIES_DATE, SCHEMA_ENTRIES};
use crate::db::schema::{Schema, VERSION_LABEL};
use crate::libs::entry::TimeEntry;
use crate::libs::error::{LedgerError, LedgerResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const SCHEMA_SNAPSHOTS: &str = "CREATE TABLE IF NOT EXISTS snapshots (
    name TEXT NOT NULL PRIMARY KEY,
    source TEXT NOT NULL,
    version TEXT,
    created_at TIMESTAMP NOT NULL,
    expires_at TIMESTAMP
)";

const SNAPSHOT_PREFIX: &str = "entries_snapshot_";
const SNAPSHOT_COLUMNS: &str = "name, source, version, created_at, expires_at";

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub name: String,
    pub source: String,
    /// Layout version of the copied table; `None` for unversioned layouts.
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

fn snapshot_from_row(row: &Row) -> rusqlite::Result<Snapshot> {
    Ok(Snapshot {
        name: row.get(0)?,
        source: row.get(1)?,
        version: row.get(2)?,
        created_at: row.get(3)?,
        expires_at: row.get(4)?,
    })
}

/// Snapshot names become table names, so they are restricted to word characters.
fn validate_name(name: &str) -> LedgerResult<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(LedgerError::InvalidInput(format!("invalid snapshot name '{}'", name)));
    }
    Ok(())
}

pub struct Snapshots<'a> {
    conn: &'a Connection,
}

impl Db {
    pub fn snapshots(&self) -> Snapshots<'_> {
        Snapshots::new(&self.conn)
    }
}

impl<'a> Snapshots<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Snapshots { conn }
    }

    /// Copies the entries table into a new snapshot.
    ///
    /// Without an explicit name the snapshot is called
    /// `entries_snapshot_<YYYYmmddHHMMSS>`, suffixed when that name is taken.
    pub fn create(&self, name: Option<&str>, now: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> LedgerResult<Snapshot> {
        let schema = Schema::new(self.conn);
        let name = match name {
            Some(name) => {
                validate_name(name)?;
                if schema.table_exists(name)? {
                    return Err(LedgerError::InvalidInput(format!("table '{}' already exists", name)));
                }
                name.to_string()
            }
            None => self.free_name(now)?,
        };

        let version = schema.label(ENTRIES_TABLE, VERSION_LABEL).or_else(|e| match &e {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("no such table") => Ok(None),
            _ => Err(e),
        })?;

        let snapshot = Snapshot {
            name,
            source: ENTRIES_TABLE.to_string(),
            version,
            created_at: now,
            expires_at,
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(SCHEMA_SNAPSHOTS)?;
        tx.execute(&format!("CREATE TABLE \"{}\" AS SELECT * FROM {}", snapshot.name, ENTRIES_TABLE), [])?;
        tx.execute(
            &format!("INSERT INTO snapshots ({}) VALUES (?1, ?2, ?3, ?4, ?5)", SNAPSHOT_COLUMNS),
            params![snapshot.name, snapshot.source, snapshot.version, snapshot.created_at, snapshot.expires_at],
        )?;
        tx.commit()?;

        tracing::debug!(snapshot = %snapshot.name, "created snapshot of entries");
        Ok(snapshot)
    }

    fn free_name(&self, now: DateTime<Utc>) -> LedgerResult<String> {
        let schema = Schema::new(self.conn);
        let base = format!("{}{}", SNAPSHOT_PREFIX, now.format("%Y%m%d%H%M%S"));
        let mut name = base.clone();
        let mut suffix = 1;
        while schema.table_exists(&name)? {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        Ok(name)
    }

    /// All registered snapshots, newest first.
    pub fn list(&self) -> LedgerResult<Vec<Snapshot>> {
        if !Schema::new(self.conn).table_exists("snapshots")? {
            return Ok(Vec::new());
        }
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM snapshots ORDER BY created_at DESC, name DESC", SNAPSHOT_COLUMNS))?;
        let snapshots = stmt.query_map([], snapshot_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(snapshots)
    }

    pub fn get(&self, name: &str) -> LedgerResult<Option<Snapshot>> {
        if !Schema::new(self.conn).table_exists("snapshots")? {
            return Ok(None);
        }
        let snapshot = self
            .conn
            .query_row(
                &format!("SELECT {} FROM snapshots WHERE name = ?1", SNAPSHOT_COLUMNS),
                [name],
                snapshot_from_row,
            )
            .optional()?;
        Ok(snapshot)
    }

    /// Replaces the entries table with the contents of a snapshot.
    ///
    /// The table is rebuilt with the current layout and re-indexed. Snapshots
    /// without a version label are rejected as incompatible.
    pub fn restore(&self, name: &str) -> LedgerResult<usize> {
        let snapshot = self
            .get(name)?
            .ok_or_else(|| LedgerError::NotFound(format!("snapshot {}", name)))?;
        let version = snapshot.version.ok_or_else(|| {
            LedgerError::InvalidInput(format!("snapshot {} is from an unversioned layout and is incompatible", name))
        })?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", ENTRIES_TABLE))?;
        tx.execute_batch(&SCHEMA_ENTRIES.replace("{table}", ENTRIES_TABLE))?;
        let rows = tx.execute(
            &format!(
                "INSERT INTO {table} ({columns}) SELECT {columns} FROM \"{name}\"",
                table = ENTRIES_TABLE,
                columns = ENTRY_COLUMNS,
                name = name
            ),
            [],
        )?;
        tx.execute_batch(INDEX_ENTRIES_DATE)?;
        Schema::new(&tx).set_label(ENTRIES_TABLE, VERSION_LABEL, &version)?;
        tx.commit()?;

        tracing::info!(snapshot = name, rows, "restored entries from snapshot");
        Ok(rows)
    }

    /// Drops every snapshot whose expiry has passed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> LedgerResult<usize> {
        let expired: Vec<Snapshot> = self.list()?.into_iter().filter(|s| s.is_expired(now)).collect();
        for snapshot in &expired {
            self.remove(&snapshot.name)?;
        }
        Ok(expired.len())
    }

    pub fn remove(&self, name: &str) -> LedgerResult<()> {
        validate_name(name)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\"", name))?;
        tx.execute("DELETE FROM snapshots WHERE name = ?1", [name])?;
        tx.commit()?;
        Ok(())
    }

    /// Entries as they were at `instant`, read from the newest compatible
    /// snapshot taken at or before it.
    pub fn read_as_of(&self, instant: DateTime<Utc>) -> LedgerResult<Vec<TimeEntry>> {
        let snapshot = self
            .list()?
            .into_iter()
            .find(|s| s.version.is_some() && s.created_at <= instant)
            .ok_or_else(|| LedgerError::NotFound(format!("snapshot taken before {}", instant.to_rfc3339())))?;

        Ok(select_all(self.conn, &snapshot.name)?)
    }
}
