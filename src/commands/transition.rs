use super::{parse_instant, single_id};
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct TransitionArgs {
    #[arg(help = "Entry id or unique prefix, defaults to the only candidate entry")]
    id: Option<String>,

    #[arg(long, short, help = "Time of the change (HH:MM, or YYYY-MM-DD HH:MM), defaults to now")]
    at: Option<String>,
}

pub fn pause(ledger: &Ledger, args: TransitionArgs) -> Result<()> {
    let timer = ledger.timer();
    let id = match args.id {
        Some(id) => Some(id),
        None => single_id(timer.running()?, "running")?,
    };
    let Some(id) = id else {
        msg_info!(Message::NoRunningEntries);
        return Ok(());
    };

    let entry = timer.pause(&id, parse_instant(ledger, args.at.as_deref())?)?;
    msg_success!(Message::EntryPaused(entry.short_id().to_string()));
    Ok(())
}

pub fn resume(ledger: &Ledger, args: TransitionArgs) -> Result<()> {
    let timer = ledger.timer();
    let id = match args.id {
        Some(id) => Some(id),
        None => single_id(timer.paused()?, "paused")?,
    };
    let Some(id) = id else {
        msg_info!(Message::NoPausedEntries);
        return Ok(());
    };

    let entry = timer.resume(&id, parse_instant(ledger, args.at.as_deref())?)?;
    msg_success!(Message::EntryResumed(entry.short_id().to_string()));
    Ok(())
}
