use super::parse_instant;
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::libs::project::DEFAULT_PROJECT;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(default_value = DEFAULT_PROJECT, help = "Project the entry belongs to")]
    project: String,

    #[arg(long, short, help = "What the time was spent on")]
    note: Option<String>,

    #[arg(long, short, help = "Start time (HH:MM, or YYYY-MM-DD HH:MM)")]
    start: String,

    #[arg(long, short, help = "End time (HH:MM, or YYYY-MM-DD HH:MM), defaults to now")]
    end: Option<String>,

    #[arg(long, short, help = "Override the project's default billable flag")]
    billable: Option<bool>,
}

pub fn cmd(ledger: &Ledger, args: AddArgs) -> Result<()> {
    let start = parse_instant(ledger, Some(&args.start))?;
    let end = parse_instant(ledger, args.end.as_deref())?;

    let entry = ledger
        .timer()
        .add(&args.project, args.note.as_deref(), start, end, args.billable)?;

    msg_success!(Message::EntryAdded(entry.short_id().to_string(), entry.project));
    Ok(())
}
