use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[arg(help = "Entry id or unique prefix")]
    id: String,
}

pub fn cmd(ledger: &Ledger, args: DeleteArgs) -> Result<()> {
    let entry = ledger.timer().delete(&args.id)?;

    msg_success!(Message::EntryDeleted(entry.short_id().to_string()));
    Ok(())
}
