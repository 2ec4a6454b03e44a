//! # Tock - personal time-entry ledger
//!
//! Tracks time entries against projects and rolls them up into summaries.
//!
//! ## Features
//!
//! - **Entry lifecycle**: start, pause, resume and stop entries; several may run at once
//! - **Pause accounting**: paused time is excluded from an entry's hours
//! - **Projects**: create, archive, rename and delete projects with cascades onto entries
//! - **Summaries**: day / project / billable totals with optional quarter-hour rounding
//! - **Schema migration**: versioned entries table, snapshotted before every rebuild
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tock::libs::config::Config;
//! use tock::libs::ledger::Ledger;
//!
//! let ledger = Ledger::from_config(&Config::read()?)?;
//! let entry = ledger.timer().start("acme", Some("design"), ledger.now(), None)?;
//! ledger.timer().stop(&entry.id, ledger.now())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod commands;
pub mod db;
pub mod libs;
