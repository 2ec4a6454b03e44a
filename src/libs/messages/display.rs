//! Display implementation for ledger messages.
//!
//! All user-facing text lives here so commands and the engine only deal with
//! structured [`Message`] values.

use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            // === ENTRY MESSAGES ===
            Message::EntryStarted(id, project) => format!("Started entry {} on project '{}'", id, project),
            Message::EntryPaused(id) => format!("Paused entry {}", id),
            Message::EntryResumed(id) => format!("Resumed entry {}", id),
            Message::EntryStopped(id, hours) => format!("Stopped entry {} after {:.4} hours", id, hours),
            Message::EntryAdded(id, project) => format!("Added entry {} to project '{}'", id, project),
            Message::EntryDeleted(id) => format!("Deleted entry {}", id),
            Message::EntriesEdited(count) => format!("Edited {} entries", count),
            Message::NotesUpdated(count, note) => format!("Updated {} notes to '{}'", count, note),
            Message::NoEntriesFound => "No entries found".to_string(),
            Message::NoRunningEntries => "No running entries".to_string(),
            Message::NoPausedEntries => "No paused entries".to_string(),
            Message::StartMovedAcrossPause(id) => {
                format!("Start of entry {} moved past its pause, duration clamps to zero", id)
            }

            // === PROJECT MESSAGES ===
            Message::ProjectCreated(name) => format!("Project '{}' created", name),
            Message::ProjectArchived(name) => format!("Project '{}' archived", name),
            Message::ProjectUnarchived(name) => format!("Project '{}' unarchived", name),
            Message::ProjectRenamed(old, new) => format!("Project '{}' renamed to '{}'", old, new),
            Message::ProjectDescriptionUpdated(name) => format!("Description of '{}' updated", name),
            Message::ProjectBillableUpdated(name, billable) => {
                format!("Project '{}' default billable set to {}", name, billable)
            }
            Message::ProjectDeleted(name, entries) => format!("Project '{}' deleted with {} entries", name, entries),
            Message::NoProjectsFound => "No projects found".to_string(),

            // === SUMMARY MESSAGES ===
            Message::SummaryHeader(from, to) => format!("Summary {} .. {}", from, to),
            Message::SummaryEmpty => "Nothing to summarize".to_string(),
            Message::SummaryTotal(hours) => format!("Total: {:.4} hours", hours),

            // === SNAPSHOT MESSAGES ===
            Message::SnapshotCreated(name) => format!("Snapshot '{}' created", name),
            Message::SnapshotRestored(name, rows) => format!("Restored {} entries from snapshot '{}'", rows, name),
            Message::SnapshotsPurged(count) => format!("Purged {} expired snapshots", count),
            Message::NoSnapshotsFound => "No snapshots found".to_string(),

            // === MIGRATION MESSAGES ===
            Message::SchemaCreated(version) => format!("Created entries table at version {}", version),
            Message::SchemaUpToDate(version) => format!("Entries table is up to date ({})", version),
            Message::SchemaCurrentVersion(version) => match version {
                Some(version) => format!("Entries table version: {}", version),
                None => "Entries table is unversioned".to_string(),
            },
            Message::MigrationStarted(from, to) => format!("Migrating entries table from {} to {}", from, to),
            Message::MigrationSnapshotTaken(name) => format!("Saved entries to snapshot '{}'", name),
            Message::MigrationBackfilled(rows) => format!("Copied {} entries into the new layout", rows),
            Message::MigrationCompleted(version) => format!("Entries table migrated to {}", version),
            Message::MigrationRepairingIndex => "Rebuilding missing date index".to_string(),
            Message::MigrationIgnoredDiagnostic(step, diagnostic) => {
                format!("Ignoring store diagnostic during '{}': {}", step, diagnostic)
            }
            Message::MigrationFailed(step, error) => format!("Migration step '{}' failed: {}", step, error),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved".to_string(),
            Message::ConfigTimezoneSet(zone) => format!("Time zone set to {}", zone),
        };
        write!(f, "{}", s)
    }
}
