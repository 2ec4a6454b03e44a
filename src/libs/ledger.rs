//! Entry point tying the store, the clock and the user's zone together.
//!
//! A [`Ledger`] can only be obtained after the migrator has brought the
//! entries table up to date, so nothing downstream ever reads through a
//! half-migrated layout.

use crate::db::db::Db;
use crate::db::migrations::{MigrationOutcome, Migrator};
use crate::db::snapshots::Snapshots;
use crate::db::store::{EntryQuery, EntryStore};
use crate::libs::clock::{Clock, SystemClock};
use crate::libs::config::Config;
use crate::libs::error::LedgerResult;
use crate::libs::registry::Registry;
use crate::libs::report::{summarize, ReportOptions, Summary};
use crate::libs::timer::Timer;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

pub struct Ledger {
    db: Db,
    clock: Arc<dyn Clock>,
    tz: Tz,
    migration: MigrationOutcome,
}

impl Ledger {
    /// Migrates `db` and makes sure the default project exists.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::MigrationFailure`](crate::libs::error::LedgerError::MigrationFailure)
    /// if the store could not be brought to the current layout. No ledger is
    /// returned in that case.
    pub fn open(db: Db, clock: Arc<dyn Clock>, tz: Tz, retention: chrono::Duration) -> LedgerResult<Ledger> {
        let migration = Migrator::new(tz).with_retention(retention).run(&db, clock.now())?;

        let ledger = Ledger {
            db,
            clock,
            tz,
            migration,
        };
        if ledger.registry().ensure_default_project()? {
            tracing::debug!("created default project");
        }
        Ok(ledger)
    }

    /// Opens the ledger described by the user's configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Ledger> {
        let db = match &config.database {
            Some(path) => Db::open(path)?,
            None => Db::new()?,
        };
        Ok(Ledger::open(db, Arc::new(SystemClock), config.zone()?, config.snapshot_retention())?)
    }

    pub fn timer(&self) -> Timer<'_, Db> {
        Timer::new(&self.db, self.clock.as_ref(), self.tz)
    }

    pub fn registry(&self) -> Registry<'_, Db> {
        Registry::new(&self.db, self.clock.as_ref(), self.tz)
    }

    pub fn snapshots(&self) -> Snapshots<'_> {
        self.db.snapshots()
    }

    pub fn summary(&self, options: &ReportOptions) -> LedgerResult<Summary> {
        let (from, to) = options.window.bounds();
        let entries = self.db.fetch_entries(&EntryQuery::between(from, to))?;
        summarize(&entries, options, self.now())
    }

    /// Summary over the entries as they were at `instant`.
    pub fn summary_as_of(&self, options: &ReportOptions, instant: DateTime<Utc>) -> LedgerResult<Summary> {
        let entries = self.snapshots().read_as_of(instant)?;
        summarize(&entries, options, instant)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn zone(&self) -> Tz {
        self.tz
    }

    /// What the migrator did when this ledger was opened.
    pub fn migration(&self) -> &MigrationOutcome {
        &self.migration
    }

    pub fn db(&self) -> &Db {
        &self.db
    }
}
