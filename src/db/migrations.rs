//! Versioned migration of the entries table.
//!
//! The entries table carries a `version` label. On startup the [`Migrator`]
//! compares that label with [`CURRENT_VERSION`] and brings the table up to
//! date before any other component touches it:
//!
//! - no entries table: create it at the current layout and label it;
//! - no label, or an older one: snapshot the table, build the next
//!   generation, backfill it from the snapshot and swap it in;
//! - current label but the date index is missing: rebuild the same way;
//! - current label and index present: nothing happens, not even DDL;
//! - a label newer than this build: refuse to run.
//!
//! Every mutating path snapshots first, so a failed migration leaves the
//! original rows recoverable. The swap itself runs in one transaction.
//!
//! ```rust,no_run
//! use tock::db::{db::Db, migrations::Migrator};
//!
//! let db = Db::open("tock.db")?;
//! let outcome = Migrator::new(chrono_tz::UTC).run(&db, chrono::Utc::now())?;
//! # Ok::<(), tock::libs::error::LedgerError>(())
//! ```

use crate::db::db::Db;
use crate::db::entries::{insert_into, select_all, ENTRIES_DATE_INDEX, ENTRIES_TABLE, INDEX_ENTRIES_DATE, SCHEMA_ENTRIES};
use crate::db::projects::SCHEMA_PROJECTS;
use crate::db::schema::{Schema, SCHEMA_TABLE_LABELS, VERSION_LABEL};
use crate::db::snapshots::SCHEMA_SNAPSHOTS;
use crate::libs::clock::{local_date, to_local, truncate};
use crate::libs::duration::{self, round_hours};
use crate::libs::entry::{normalize_note, TimeEntry};
use crate::libs::error::{LedgerError, LedgerResult};
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error, msg_info, msg_success};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rusqlite::Row;

/// Layout version written by this build.
pub const CURRENT_VERSION: &str = "1.0.0";

/// Name of the table a rebuild is staged in before the swap.
pub const NEXT_GENERATION: &str = "entries__next";

/// Store diagnostics that mean "this step was already done".
const BENIGN_DIAGNOSTICS: &[&str] = &["no such table: table_labels", "already exists", "duplicate column name"];

const DEFAULT_RETENTION_DAYS: i64 = 7;

/// What a migration run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The entries table did not exist and was created.
    Created,
    /// Label and index were current; no statement was issued.
    UpToDate,
    /// Rows were moved into the current layout.
    Migrated {
        from: Option<String>,
        snapshot: String,
        rows: usize,
    },
    /// The layout was current but the date index had to be rebuilt.
    Repaired { snapshot: String, rows: usize },
}

/// Physical layout found in a table about to be backfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Original unversioned layout with `is_*` flags and UTC-only times.
    Legacy,
    Current,
}

pub struct Migrator {
    tz: Tz,
    retention: chrono::Duration,
}

fn is_benign(error: &LedgerError) -> bool {
    let text = error.to_string();
    BENIGN_DIAGNOSTICS.iter().any(|pattern| text.contains(pattern))
}

/// `"1.2.3"` as comparable components.
fn parse_version(version: &str) -> Option<Vec<u32>> {
    version.split('.').map(|part| part.parse::<u32>().ok()).collect()
}

impl Migrator {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            retention: chrono::Duration::days(DEFAULT_RETENTION_DAYS),
        }
    }

    /// How long pre-migration snapshots are kept before they are purged.
    pub fn with_retention(mut self, retention: chrono::Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Runs a step that must succeed. Any failure aborts the migration.
    fn step<T>(&self, name: &str, f: impl FnOnce() -> LedgerResult<T>) -> LedgerResult<T> {
        f().map_err(|e| {
            msg_error!(Message::MigrationFailed(name.to_string(), e.to_string()));
            LedgerError::MigrationFailure(format!("{}: {}", name, e))
        })
    }

    /// Runs an idempotent step, treating "already done" diagnostics as success.
    fn tolerant_step<T: Default>(&self, name: &str, f: impl FnOnce() -> LedgerResult<T>) -> LedgerResult<T> {
        match f() {
            Ok(value) => Ok(value),
            Err(e) if is_benign(&e) => {
                msg_debug!(Message::MigrationIgnoredDiagnostic(name.to_string(), e.to_string()));
                Ok(T::default())
            }
            Err(e) => self.step(name, || Err(e)),
        }
    }

    /// Brings the entries table to [`CURRENT_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MigrationFailure`] naming the failed step. The
    /// caller must not serve requests against the store after a failure.
    pub fn run(&self, db: &Db, now: DateTime<Utc>) -> LedgerResult<MigrationOutcome> {
        let schema = db.schema();

        // Read before the metadata tables exist so a fresh store is detectable.
        let label = self.tolerant_step("read version label", || Ok(schema.label(ENTRIES_TABLE, VERSION_LABEL)?))?;

        self.tolerant_step("create metadata tables", || {
            db.conn.execute_batch(SCHEMA_TABLE_LABELS)?;
            db.conn.execute_batch(SCHEMA_SNAPSHOTS)?;
            db.conn.execute_batch(SCHEMA_PROJECTS)?;
            Ok(())
        })?;

        let purged = self.step("purge expired snapshots", || db.snapshots().purge_expired(now))?;
        if purged > 0 {
            msg_info!(Message::SnapshotsPurged(purged));
        }

        if !self.step("inspect entries table", || Ok(schema.table_exists(ENTRIES_TABLE)?))? {
            return self.create(db);
        }

        match label {
            Some(version) if version == CURRENT_VERSION => {
                if self.step("inspect date index", || Ok(schema.index_exists(ENTRIES_DATE_INDEX)?))? {
                    msg_debug!(Message::SchemaUpToDate(version));
                    return Ok(MigrationOutcome::UpToDate);
                }
                msg_info!(Message::MigrationRepairingIndex);
                let (snapshot, rows) = self.rebuild(db, now)?;
                msg_success!(Message::MigrationCompleted(CURRENT_VERSION.to_string()));
                Ok(MigrationOutcome::Repaired { snapshot, rows })
            }
            Some(version) => {
                let found = parse_version(&version);
                let current = parse_version(CURRENT_VERSION);
                match (found, current) {
                    (Some(found), Some(current)) if found < current => self.migrate(db, now, Some(version)),
                    _ => self.step("check version label", || {
                        Err(LedgerError::InvalidInput(format!(
                            "entries table is labelled {}, this build understands up to {}",
                            version, CURRENT_VERSION
                        )))
                    }),
                }
            }
            None => self.migrate(db, now, None),
        }
    }

    fn create(&self, db: &Db) -> LedgerResult<MigrationOutcome> {
        self.step("create entries table", || {
            let tx = db.conn.unchecked_transaction()?;
            tx.execute_batch(&SCHEMA_ENTRIES.replace("{table}", ENTRIES_TABLE))?;
            tx.execute_batch(INDEX_ENTRIES_DATE)?;
            Schema::new(&tx).set_label(ENTRIES_TABLE, VERSION_LABEL, CURRENT_VERSION)?;
            tx.commit()?;
            Ok(())
        })?;

        msg_success!(Message::SchemaCreated(CURRENT_VERSION.to_string()));
        Ok(MigrationOutcome::Created)
    }

    fn migrate(&self, db: &Db, now: DateTime<Utc>, from: Option<String>) -> LedgerResult<MigrationOutcome> {
        msg_info!(Message::MigrationStarted(
            from.clone().unwrap_or_else(|| "unversioned".to_string()),
            CURRENT_VERSION.to_string()
        ));

        let (snapshot, rows) = self.rebuild(db, now)?;

        msg_success!(Message::MigrationCompleted(CURRENT_VERSION.to_string()));
        Ok(MigrationOutcome::Migrated { from, snapshot, rows })
    }

    /// Snapshot, build the next generation, backfill, swap.
    fn rebuild(&self, db: &Db, now: DateTime<Utc>) -> LedgerResult<(String, usize)> {
        let snapshot = self.step("snapshot entries", || {
            db.snapshots().create(None, now, Some(now + self.retention))
        })?;
        msg_info!(Message::MigrationSnapshotTaken(snapshot.name.clone()));

        self.step("create next generation", || {
            db.conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", NEXT_GENERATION))?;
            db.conn.execute_batch(&SCHEMA_ENTRIES.replace("{table}", NEXT_GENERATION))?;
            Ok(())
        })?;

        let rows = self.step("backfill next generation", || self.backfill(db, &snapshot.name, now))?;
        msg_info!(Message::MigrationBackfilled(rows));

        self.step("swap entries table", || {
            let tx = db.conn.unchecked_transaction()?;
            tx.execute_batch(&format!(
                "DROP TABLE {}; ALTER TABLE {} RENAME TO {};",
                ENTRIES_TABLE, NEXT_GENERATION, ENTRIES_TABLE
            ))?;
            tx.execute_batch(INDEX_ENTRIES_DATE)?;
            Schema::new(&tx).set_label(ENTRIES_TABLE, VERSION_LABEL, CURRENT_VERSION)?;
            tx.commit()?;
            Ok(())
        })?;

        Ok((snapshot.name, rows))
    }

    fn backfill(&self, db: &Db, source: &str, now: DateTime<Utc>) -> LedgerResult<usize> {
        let schema = db.schema();
        let columns = schema.columns(source)?;
        let layout = if columns.iter().any(|c| c == "is_billable") {
            Layout::Legacy
        } else {
            Layout::Current
        };

        let entries = match layout {
            Layout::Current => select_all(&db.conn, source)?,
            Layout::Legacy => self.read_legacy(db, source, &columns, now)?,
        };

        let tx = db.conn.unchecked_transaction()?;
        for entry in &entries {
            insert_into(&tx, NEXT_GENERATION, entry)?;
        }
        tx.commit()?;

        Ok(entries.len())
    }

    fn read_legacy(&self, db: &Db, source: &str, columns: &[String], now: DateTime<Utc>) -> LedgerResult<Vec<TimeEntry>> {
        let pick = |name: &str| {
            if columns.iter().any(|c| c == name) {
                name.to_string()
            } else {
                format!("NULL AS {}", name)
            }
        };
        let sql = format!(
            "SELECT id, project, {}, start, end, is_billable, is_paused, is_archived, {}, {}, {}, {} FROM \"{}\" ORDER BY start, id",
            pick("note"),
            pick("time_paused"),
            pick("paused_hrs"),
            pick("paused_counter"),
            pick("hours"),
            source
        );

        let mut stmt = db.conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], |row| upgrade_legacy_row(row, self.tz, now))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

/// Maps a legacy row onto the current layout.
///
/// Instants are truncated to whole seconds, wall-clock fields are projected
/// into `tz` and hours are rounded to four places. Flags are normalized so a
/// finished entry is never active or paused.
fn upgrade_legacy_row(row: &Row, tz: Tz, now: DateTime<Utc>) -> rusqlite::Result<TimeEntry> {
    let start = truncate(row.get::<_, DateTime<Utc>>("start")?);
    let end = row.get::<_, Option<DateTime<Utc>>>("end")?.map(truncate);
    let was_paused: bool = row.get("is_paused")?;
    let paused_at = row.get::<_, Option<DateTime<Utc>>>("time_paused")?.map(truncate);

    let (active, paused, timestamp_paused) = match end {
        Some(_) => (false, false, None),
        None if was_paused => (false, true, paused_at),
        None => (true, false, None),
    };

    let mut entry = TimeEntry {
        id: row.get("id")?,
        date: local_date(start, &tz),
        project: row.get("project")?,
        note: normalize_note(row.get::<_, Option<String>>("note")?.as_deref()),
        timestamp_start: start,
        start: to_local(start, &tz),
        timestamp_end: end,
        end: end.map(|end| to_local(end, &tz)),
        billable: row.get("is_billable")?,
        active,
        paused,
        archived: row.get("is_archived")?,
        timestamp_paused,
        paused_counter: row.get::<_, Option<u32>>("paused_counter")?.unwrap_or(u32::from(paused)),
        paused_hours: round_hours(row.get::<_, Option<f64>>("paused_hrs")?.unwrap_or(0.0)),
        hours: 0.0,
    };

    entry.hours = match (end, row.get::<_, Option<f64>>("hours")?) {
        (Some(_), Some(hours)) => round_hours(hours),
        _ => duration::duration(&entry.timing(), now),
    };

    Ok(entry)
}

/// Version label of the entries table, `None` when unlabelled or absent.
pub fn current_version(db: &Db) -> LedgerResult<Option<String>> {
    let schema = db.schema();
    if !schema.table_exists("table_labels")? {
        return Ok(None);
    }
    Ok(schema.label(ENTRIES_TABLE, VERSION_LABEL)?)
}

/// Whether [`Migrator::run`] would change anything.
pub fn needs_migration(db: &Db) -> LedgerResult<bool> {
    let schema = db.schema();
    if !schema.table_exists(ENTRIES_TABLE)? {
        return Ok(true);
    }
    let version = current_version(db)?;
    Ok(version.as_deref() != Some(CURRENT_VERSION) || !schema.index_exists(ENTRIES_DATE_INDEX)?)
}
