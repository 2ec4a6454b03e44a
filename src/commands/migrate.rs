use crate::db::migrations::{current_version, MigrationOutcome, CURRENT_VERSION};
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::{msg_info, msg_print, msg_success};
use anyhow::Result;

/// Migrations run when the ledger opens; this reports what happened.
pub fn cmd(ledger: &Ledger) -> Result<()> {
    match ledger.migration() {
        MigrationOutcome::Created => msg_success!(Message::SchemaCreated(CURRENT_VERSION.to_string())),
        MigrationOutcome::UpToDate => msg_info!(Message::SchemaUpToDate(CURRENT_VERSION.to_string())),
        MigrationOutcome::Migrated { snapshot, rows, .. } | MigrationOutcome::Repaired { snapshot, rows } => {
            msg_info!(Message::MigrationSnapshotTaken(snapshot.clone()));
            msg_info!(Message::MigrationBackfilled(*rows));
            msg_success!(Message::MigrationCompleted(CURRENT_VERSION.to_string()));
        }
    }

    msg_print!(Message::SchemaCurrentVersion(current_version(ledger.db())?));
    Ok(())
}
