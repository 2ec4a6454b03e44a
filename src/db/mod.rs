//! SQLite persistence for the ledger.
//!
//! The engine only talks to the [`store`] traits; everything in here is the
//! SQLite side of that port plus the schema machinery around it.
//!
//! ```rust,no_run
//! use tock::db::{db::Db, migrations::Migrator, store::EntryStore};
//!
//! let db = Db::open("tock.db")?;
//! Migrator::new(chrono_tz::UTC).run(&db, chrono::Utc::now())?;
//! let running = db.fetch_entries(&Default::default())?;
//! # Ok::<(), tock::libs::error::LedgerError>(())
//! ```

/// Connection handling.
pub mod db;

/// Entry rows and the entry half of the storage port.
pub mod entries;

/// Layout versioning, backfill and repair of the entries table.
pub mod migrations;

/// Project rows and the project half of the storage port.
pub mod projects;

/// Table labels and catalog introspection.
pub mod schema;

/// Point-in-time copies of the entries table.
pub mod snapshots;

/// The storage port itself.
pub mod store;
