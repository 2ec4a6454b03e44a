use super::parse_instant;
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::libs::project::DEFAULT_PROJECT;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StartArgs {
    #[arg(default_value = DEFAULT_PROJECT, help = "Project to track time against")]
    project: String,

    #[arg(long, short, help = "What the time is spent on")]
    note: Option<String>,

    #[arg(long, short, help = "Start time (HH:MM, or YYYY-MM-DD HH:MM), defaults to now")]
    at: Option<String>,

    #[arg(long, short, help = "Override the project's default billable flag")]
    billable: Option<bool>,
}

pub fn cmd(ledger: &Ledger, args: StartArgs) -> Result<()> {
    let at = parse_instant(ledger, args.at.as_deref())?;
    let entry = ledger.timer().start(&args.project, args.note.as_deref(), at, args.billable)?;

    msg_success!(Message::EntryStarted(entry.short_id().to_string(), entry.project));
    Ok(())
}
