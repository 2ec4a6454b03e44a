use crate::libs::config::Config;
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
enum SnapshotCommand {
    #[command(about = "Copy the entries table")]
    Create {
        #[arg(long, short, help = "Snapshot name, generated from the current time by default")]
        name: Option<String>,
        #[arg(long, short, help = "Days to keep the snapshot, forever if omitted")]
        days: Option<i64>,
    },
    #[command(about = "List snapshots")]
    List,
    #[command(about = "Replace the entries table with a snapshot")]
    Restore { name: String },
    #[command(about = "Remove expired snapshots")]
    Purge,
}

pub fn cmd(ledger: &Ledger, _config: &Config, args: SnapshotArgs) -> Result<()> {
    let snapshots = ledger.snapshots();
    let now = ledger.now();

    match args.command {
        SnapshotCommand::Create { name, days } => {
            let expires_at = days.map(|days| now + chrono::Duration::days(days));
            let snapshot = snapshots.create(name.as_deref(), now, expires_at)?;
            msg_success!(Message::SnapshotCreated(snapshot.name));
        }
        SnapshotCommand::List => {
            let list = snapshots.list()?;
            if list.is_empty() {
                msg_info!(Message::NoSnapshotsFound);
            } else {
                View::snapshots(&list);
            }
        }
        SnapshotCommand::Restore { name } => {
            let rows = snapshots.restore(&name)?;
            msg_success!(Message::SnapshotRestored(name, rows));
        }
        SnapshotCommand::Purge => {
            let purged = snapshots.purge_expired(now)?;
            msg_success!(Message::SnapshotsPurged(purged));
        }
    }

    Ok(())
}
