use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct NotesArgs {
    #[arg(help = "Project whose entries are updated")]
    project: String,

    #[arg(help = "Regular expression matched against existing notes")]
    pattern: String,

    #[arg(help = "Note that replaces every match")]
    note: String,
}

pub fn cmd(ledger: &Ledger, args: NotesArgs) -> Result<()> {
    let updated = ledger.timer().update_notes(&args.project, &args.pattern, &args.note)?;

    msg_success!(Message::NotesUpdated(updated, args.note));
    Ok(())
}
